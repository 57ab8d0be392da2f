//! 消息可见性过滤
//!
//! 保留发给请求者、由请求者发出、公开或状态类的消息，
//! 结果按插入顺序倒序（最新的在前），再按 `limit` 截断。

use domain::Message;

/// `limit` 缺省或不为正数时不限制条数，过大的值按实际条数截断
pub fn effective_limit(limit: Option<i64>) -> Option<usize> {
    match limit {
        Some(value) if value > 0 => Some(usize::try_from(value).unwrap_or(usize::MAX)),
        _ => None,
    }
}

/// `messages` 必须按插入顺序排列（从旧到新）
pub fn visible_messages(messages: &[Message], requester: &str, limit: Option<i64>) -> Vec<Message> {
    let visible = messages
        .iter()
        .rev()
        .filter(|message| message.is_visible_to(requester));

    match effective_limit(limit) {
        Some(limit) => visible.take(limit).cloned().collect(),
        None => visible.cloned().collect(),
    }
}
