//! 请求体与响应体

use domain::{Message, MessageKind, Participant, Timestamp};
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct RegisterPayload {
    /// 长度上限由 `ParticipantName` 在去掉首尾空白后检查
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct PostMessagePayload {
    #[validate(length(min = 1))]
    pub to: String,
    #[validate(length(min = 1))]
    pub text: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    pub kind: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessagesQuery {
    /// 保留原始字符串，非法值由处理函数统一返回 422
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub name: String,
    /// 最近一次心跳，Unix 毫秒
    pub last_status: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: Timestamp,
}

impl From<&Participant> for ParticipantDto {
    fn from(participant: &Participant) -> Self {
        Self {
            name: participant.name.to_string(),
            last_status: unix_millis(participant.last_heartbeat),
            joined_at: participant.joined_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageDto {
    pub id: u64,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// UTC 钟点，`HH:MM:SS`
    pub time: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: Timestamp,
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.value(),
            from: message.from.to_string(),
            to: message.to.clone(),
            text: message.text.to_string(),
            kind: message.kind,
            time: clock_time(message.timestamp),
            timestamp: message.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostedMessageDto {
    pub id: u64,
}

fn unix_millis(timestamp: Timestamp) -> i64 {
    (timestamp.unix_timestamp_nanos() / 1_000_000) as i64
}

fn clock_time(timestamp: Timestamp) -> String {
    timestamp
        .to_offset(time::UtcOffset::UTC)
        .format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default()
}
