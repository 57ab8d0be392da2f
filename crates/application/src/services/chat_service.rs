use std::sync::Arc;

use domain::{
    DomainError, Message, MessageDraft, MessageId, MessageKind, MessageText, Participant,
    ParticipantName, Timestamp,
};

use crate::{clock::Clock, error::ApplicationError, store::ChatStore};

#[derive(Debug, Clone)]
pub struct PostMessageRequest {
    pub from: String,
    pub to: String,
    pub text: String,
    /// 客户端提交的原始类型字符串
    pub kind: String,
}

/// 一次清理的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub swept_at: Timestamp,
    pub evicted: Vec<ParticipantName>,
}

pub struct ChatServiceDependencies {
    pub store: Arc<dyn ChatStore>,
    pub clock: Arc<dyn Clock>,
    /// 超过这个时长没有心跳的参与者会在下一次清理时被移除
    pub liveness_timeout: std::time::Duration,
}

/// 在线状态与消息可见性的用例入口
pub struct ChatService {
    store: Arc<dyn ChatStore>,
    clock: Arc<dyn Clock>,
    liveness_timeout: time::Duration,
}

impl ChatService {
    pub fn new(deps: ChatServiceDependencies) -> Self {
        let liveness_timeout =
            time::Duration::try_from(deps.liveness_timeout).unwrap_or(time::Duration::MAX);
        Self {
            store: deps.store,
            clock: deps.clock,
            liveness_timeout,
        }
    }

    pub fn liveness_timeout(&self) -> time::Duration {
        self.liveness_timeout
    }

    pub async fn register(&self, name: &str) -> Result<Participant, ApplicationError> {
        let name = ParticipantName::parse(name)?;
        let now = self.clock.now();

        let participant = self.store.register(name, now).await?;
        tracing::info!(participant = %participant.name, "participant joined");
        Ok(participant)
    }

    pub async fn heartbeat(&self, name: &str) -> Result<(), ApplicationError> {
        // 无法通过校验的名称不可能已注册
        let name = ParticipantName::parse(name)
            .map_err(|_| DomainError::not_registered(name.trim()))?;

        self.store.heartbeat(name.as_str(), self.clock.now()).await?;
        tracing::debug!(participant = %name, "heartbeat");
        Ok(())
    }

    pub async fn list_participants(&self) -> Result<Vec<Participant>, ApplicationError> {
        self.store.participants().await
    }

    /// 校验顺序：类型 -> 发送者名称 -> 正文和接收者 -> 发送者是否在线
    pub async fn post_message(
        &self,
        request: PostMessageRequest,
    ) -> Result<MessageId, ApplicationError> {
        let kind = MessageKind::parse_client(request.kind.trim())?;
        let from = ParticipantName::parse(&request.from)
            .map_err(|_| DomainError::not_registered(request.from.trim()))?;
        let text = MessageText::new(request.text)?;
        let draft = MessageDraft::new(from, request.to, text, kind)?;

        let message = self.store.post(draft, self.clock.now()).await?;
        tracing::debug!(
            message_id = %message.id,
            from = %message.from,
            kind = %message.kind,
            "message posted"
        );
        Ok(message.id)
    }

    /// 请求者不需要在线；`limit` 不为正数时返回全部可见消息
    pub async fn read_messages(
        &self,
        requester: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, ApplicationError> {
        self.store.visible_to(requester.trim(), limit).await
    }

    /// 幂等：参与者不存在时什么也不做
    pub async fn evict(&self, name: &str) -> Result<(), ApplicationError> {
        let now = self.clock.now();
        if let Some(notice) = self.store.evict(name.trim(), now).await? {
            tracing::info!(participant = %notice.from, "participant left");
        }
        Ok(())
    }

    /// 移除所有心跳超时的参与者
    pub async fn sweep(&self) -> Result<SweepReport, ApplicationError> {
        let now = self.clock.now();
        let notices = self.store.evict_expired(now, self.liveness_timeout).await?;

        let evicted: Vec<ParticipantName> =
            notices.into_iter().map(|notice| notice.from).collect();
        for name in &evicted {
            tracing::info!(participant = %name, "participant timed out");
        }

        Ok(SweepReport {
            swept_at: now,
            evicted,
        })
    }
}
