//! 应用层实现。
//!
//! 围绕领域模型提供在线状态与消息可见性的用例服务：
//! 参与者登记、消息日志、可见性过滤和心跳超时清理。
//! 存储通过 [`ChatStore`] 抽象，默认提供内存实现。

pub mod clock;
pub mod error;
pub mod message_log;
pub mod registry;
pub mod services;
pub mod store;
pub mod sweeper;
pub mod visibility;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ApplicationError;
pub use message_log::MessageLog;
pub use registry::ParticipantRegistry;
pub use services::{ChatService, ChatServiceDependencies, PostMessageRequest, SweepReport};
pub use store::{memory::MemoryChatStore, ChatStore};
pub use sweeper::{LivenessSweeper, SweeperHandle, SweeperState};
pub use visibility::visible_messages;
