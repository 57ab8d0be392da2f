//! 群聊系统核心领域模型
//!
//! 包含参与者、消息等核心实体，以及名称、正文等值对象的校验规则。

pub mod errors;
pub mod message;
pub mod participant;
pub mod value_objects;

// 重新导出常用类型
pub use errors::*;
pub use message::{Message, MessageDraft, MessageKind};
pub use participant::Participant;
pub use value_objects::{
    MessageId, MessageText, ParticipantName, Timestamp, BROADCAST_TARGET, MAX_NAME_LENGTH,
};
