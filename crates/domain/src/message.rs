use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{MessageId, MessageText, ParticipantName, Timestamp, BROADCAST_TARGET};

/// 进入聊天室时的状态消息正文
pub const JOIN_NOTICE: &str = "entra na sala...";
/// 离开聊天室时的状态消息正文
pub const LEAVE_NOTICE: &str = "sai da sala...";

/// 消息类型。线上格式沿用 `message` / `private_message` / `status`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "message")]
    Public,
    #[serde(rename = "private_message")]
    Private,
    /// 系统生成的进入/离开通知，客户端不能发送
    #[serde(rename = "status")]
    Status,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Public => "message",
            MessageKind::Private => "private_message",
            MessageKind::Status => "status",
        }
    }

    /// 解析客户端提交的类型，`status` 只能由系统产生。
    pub fn parse_client(value: &str) -> Result<Self, DomainError> {
        match value.parse::<MessageKind>() {
            Ok(kind @ (MessageKind::Public | MessageKind::Private)) => Ok(kind),
            _ => Err(DomainError::invalid_kind(value)),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(MessageKind::Public),
            "private_message" => Ok(MessageKind::Private),
            "status" => Ok(MessageKind::Status),
            other => Err(DomainError::invalid_kind(other)),
        }
    }
}

/// 尚未写入日志的消息：序号和时间戳由消息日志分配。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub from: ParticipantName,
    pub to: String,
    pub text: MessageText,
    pub kind: MessageKind,
}

impl MessageDraft {
    pub fn new(
        from: ParticipantName,
        to: impl Into<String>,
        text: MessageText,
        kind: MessageKind,
    ) -> Result<Self, DomainError> {
        let to = to.into().trim().to_owned();
        if to.is_empty() {
            return Err(DomainError::invalid_argument("to", "cannot be empty"));
        }
        Ok(Self {
            from,
            to,
            text,
            kind,
        })
    }

    pub fn joined(name: &ParticipantName) -> Self {
        Self::status(name, JOIN_NOTICE)
    }

    pub fn left(name: &ParticipantName) -> Self {
        Self::status(name, LEAVE_NOTICE)
    }

    fn status(name: &ParticipantName, notice: &'static str) -> Self {
        Self {
            from: name.clone(),
            to: BROADCAST_TARGET.to_owned(),
            text: MessageText::notice(notice),
            kind: MessageKind::Status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from: ParticipantName,
    pub to: String,
    pub text: MessageText,
    pub kind: MessageKind,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: Timestamp,
}

impl Message {
    pub fn from_draft(id: MessageId, draft: MessageDraft, timestamp: Timestamp) -> Self {
        Self {
            id,
            from: draft.from,
            to: draft.to,
            text: draft.text,
            kind: draft.kind,
            timestamp,
        }
    }

    /// 公开消息和状态消息对所有人可见，私聊只对收发双方可见。
    pub fn is_visible_to(&self, requester: &str) -> bool {
        self.to == requester
            || self.from.as_str() == requester
            || matches!(self.kind, MessageKind::Public | MessageKind::Status)
    }

    pub fn is_status(&self) -> bool {
        self.kind == MessageKind::Status
    }
}
