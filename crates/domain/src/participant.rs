use serde::{Deserialize, Serialize};
use time::Duration;

use crate::value_objects::{ParticipantName, Timestamp};

/// 在线参与者。名称在所有在线参与者中唯一。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: ParticipantName,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: Timestamp,
    #[serde(with = "time::serde::rfc3339")]
    pub last_heartbeat: Timestamp,
}

impl Participant {
    pub fn register(name: ParticipantName, now: Timestamp) -> Self {
        Self {
            name,
            joined_at: now,
            last_heartbeat: now,
        }
    }

    pub fn heartbeat(&mut self, now: Timestamp) {
        // 时钟回拨时保留较新的心跳
        if now > self.last_heartbeat {
            self.last_heartbeat = now;
        }
    }

    /// `now - last_heartbeat > timeout` 时视为超时
    pub fn is_expired(&self, now: Timestamp, timeout: Duration) -> bool {
        now - self.last_heartbeat > timeout
    }
}
