//! 只追加的消息日志
//!
//! 插入顺序即全局顺序：序号从 1 开始递增，时间戳不回退。

use domain::{Message, MessageDraft, MessageId, Timestamp};

#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加消息并分配序号；`now` 早于上一条消息时沿用上一条的时间戳
    pub fn append(&mut self, draft: MessageDraft, now: Timestamp) -> &Message {
        let id = MessageId::new(self.messages.len() as u64 + 1);
        let timestamp = match self.last_timestamp() {
            Some(last) if last > now => last,
            _ => now,
        };

        self.messages.push(Message::from_draft(id, draft, timestamp));
        &self.messages[self.messages.len() - 1]
    }

    /// 从旧到新
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.messages.last().map(|message| message.timestamp)
    }
}
