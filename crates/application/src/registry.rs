//! 在线参与者登记表
//!
//! 按注册顺序保存在线参与者，并维护名称到注册序号的索引。
//! 本身不加锁，由持有者（见 `store::memory`）负责串行化写操作。

use std::collections::{BTreeMap, HashMap};

use domain::{DomainError, Participant, ParticipantName, Timestamp};

#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    by_order: BTreeMap<u64, Participant>,
    index: HashMap<ParticipantName, u64>,
    next_order: u64,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 名称已被占用时返回 `NameTaken`，不修改任何状态
    pub fn register(
        &mut self,
        name: ParticipantName,
        now: Timestamp,
    ) -> Result<Participant, DomainError> {
        if self.index.contains_key(&name) {
            return Err(DomainError::name_taken(name.as_str()));
        }

        let order = self.next_order;
        self.next_order += 1;

        let participant = Participant::register(name.clone(), now);
        self.index.insert(name, order);
        self.by_order.insert(order, participant.clone());
        Ok(participant)
    }

    pub fn heartbeat(&mut self, name: &str, now: Timestamp) -> Result<Participant, DomainError> {
        let participant = self
            .index
            .get(name)
            .and_then(|order| self.by_order.get_mut(order))
            .ok_or_else(|| DomainError::not_registered(name))?;

        participant.heartbeat(now);
        Ok(participant.clone())
    }

    /// 不存在时返回 `None`，重复调用是安全的
    pub fn evict(&mut self, name: &str) -> Option<Participant> {
        let order = self.index.remove(name)?;
        self.by_order.remove(&order)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// 按注册顺序返回快照
    pub fn list(&self) -> Vec<Participant> {
        self.by_order.values().cloned().collect()
    }

    /// 超过 `timeout` 没有心跳的参与者，按注册顺序
    pub fn expired(&self, now: Timestamp, timeout: time::Duration) -> Vec<ParticipantName> {
        self.by_order
            .values()
            .filter(|participant| participant.is_expired(now, timeout))
            .map(|participant| participant.name.clone())
            .collect()
    }
}
