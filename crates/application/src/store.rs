use domain::{Message, MessageDraft, Participant, ParticipantName, Timestamp};

use crate::error::ApplicationError;
use crate::visibility::visible_messages;

/// 参与者登记表与消息日志的存储抽象
///
/// 每个写操作都是一个完整的临界区：要么全部生效，要么状态不变。
/// 注册与进入通知、清理与离开通知在同一个临界区内写入。
#[async_trait::async_trait]
pub trait ChatStore: Send + Sync {
    /// 原子地检查名称并插入参与者，同时追加进入通知
    async fn register(
        &self,
        name: ParticipantName,
        now: Timestamp,
    ) -> Result<Participant, ApplicationError>;

    /// 刷新心跳
    async fn heartbeat(&self, name: &str, now: Timestamp) -> Result<Participant, ApplicationError>;

    /// 移除参与者并追加离开通知；参与者不存在时返回 `None`
    async fn evict(&self, name: &str, now: Timestamp) -> Result<Option<Message>, ApplicationError>;

    /// 一次性清理所有超时的参与者，返回写入的离开通知
    async fn evict_expired(
        &self,
        now: Timestamp,
        timeout: time::Duration,
    ) -> Result<Vec<Message>, ApplicationError>;

    /// 发送者必须在线，检查与追加在同一个临界区内完成
    async fn post(&self, draft: MessageDraft, now: Timestamp) -> Result<Message, ApplicationError>;

    /// 按注册顺序返回在线参与者快照
    async fn participants(&self) -> Result<Vec<Participant>, ApplicationError>;

    /// 按插入顺序返回全部消息快照
    async fn messages(&self) -> Result<Vec<Message>, ApplicationError>;

    /// 返回请求者可见的消息，最新的在前
    async fn visible_to(
        &self,
        requester: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, ApplicationError> {
        let messages = self.messages().await?;
        Ok(visible_messages(&messages, requester, limit))
    }
}

/// 内存实现：登记表和消息日志共用一把读写锁
pub mod memory {
    use super::*;
    use crate::message_log::MessageLog;
    use crate::registry::ParticipantRegistry;
    use domain::DomainError;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    struct ChatState {
        registry: ParticipantRegistry,
        log: MessageLog,
    }

    #[derive(Debug, Default)]
    pub struct MemoryChatStore {
        state: RwLock<ChatState>,
    }

    impl MemoryChatStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait::async_trait]
    impl ChatStore for MemoryChatStore {
        async fn register(
            &self,
            name: ParticipantName,
            now: Timestamp,
        ) -> Result<Participant, ApplicationError> {
            let mut state = self.state.write().await;
            let participant = state.registry.register(name, now)?;
            state.log.append(MessageDraft::joined(&participant.name), now);
            Ok(participant)
        }

        async fn heartbeat(
            &self,
            name: &str,
            now: Timestamp,
        ) -> Result<Participant, ApplicationError> {
            let mut state = self.state.write().await;
            Ok(state.registry.heartbeat(name, now)?)
        }

        async fn evict(
            &self,
            name: &str,
            now: Timestamp,
        ) -> Result<Option<Message>, ApplicationError> {
            let mut state = self.state.write().await;
            let Some(participant) = state.registry.evict(name) else {
                return Ok(None);
            };
            let notice = state.log.append(MessageDraft::left(&participant.name), now);
            Ok(Some(notice.clone()))
        }

        async fn evict_expired(
            &self,
            now: Timestamp,
            timeout: time::Duration,
        ) -> Result<Vec<Message>, ApplicationError> {
            let mut state = self.state.write().await;
            let expired = state.registry.expired(now, timeout);

            let mut notices = Vec::with_capacity(expired.len());
            for name in expired {
                if state.registry.evict(name.as_str()).is_some() {
                    notices.push(state.log.append(MessageDraft::left(&name), now).clone());
                }
            }
            Ok(notices)
        }

        async fn post(
            &self,
            draft: MessageDraft,
            now: Timestamp,
        ) -> Result<Message, ApplicationError> {
            let mut state = self.state.write().await;
            if !state.registry.contains(draft.from.as_str()) {
                return Err(DomainError::not_registered(draft.from.as_str()).into());
            }
            Ok(state.log.append(draft, now).clone())
        }

        async fn participants(&self) -> Result<Vec<Participant>, ApplicationError> {
            let state = self.state.read().await;
            Ok(state.registry.list())
        }

        async fn messages(&self) -> Result<Vec<Message>, ApplicationError> {
            let state = self.state.read().await;
            Ok(state.log.all().to_vec())
        }

        // 在读锁内过滤，避免复制整份日志
        async fn visible_to(
            &self,
            requester: &str,
            limit: Option<i64>,
        ) -> Result<Vec<Message>, ApplicationError> {
            let state = self.state.read().await;
            Ok(visible_messages(state.log.all(), requester, limit))
        }
    }

}
