//! 聊天服务单元测试
//!
//! 覆盖注册、心跳、发消息、读取可见消息和超时清理。

use std::sync::Arc;
use std::time::Duration as StdDuration;

use domain::{DomainError, Message, MessageKind, BROADCAST_TARGET};
use time::{Duration, OffsetDateTime};

use super::{ChatService, ChatServiceDependencies, PostMessageRequest};
use crate::clock::{Clock, ManualClock};
use crate::error::ApplicationError;
use crate::store::memory::MemoryChatStore;

fn test_service() -> (ChatService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        OffsetDateTime::UNIX_EPOCH + Duration::days(365),
    ));
    let service = ChatService::new(ChatServiceDependencies {
        store: Arc::new(MemoryChatStore::new()),
        clock: clock.clone(),
        liveness_timeout: StdDuration::from_secs(15),
    });
    (service, clock)
}

fn request(from: &str, to: &str, text: &str, kind: &str) -> PostMessageRequest {
    PostMessageRequest {
        from: from.to_string(),
        to: to.to_string(),
        text: text.to_string(),
        kind: kind.to_string(),
    }
}

fn texts(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .map(|message| format!("{}:{}", message.from, message.text))
        .collect()
}

fn domain_error(err: &ApplicationError) -> &DomainError {
    err.as_domain().expect("expected a domain error")
}

#[tokio::test]
async fn test_distinct_registrations_are_listed_in_order() {
    let (service, _) = test_service();
    for name in ["Alice", "Bob", "Carol"] {
        service.register(name).await.unwrap();
    }

    let names: Vec<String> = service
        .list_participants()
        .await
        .unwrap()
        .into_iter()
        .map(|participant| participant.name.to_string())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
}

#[tokio::test]
async fn test_duplicate_registration_is_name_taken() {
    let (service, _) = test_service();
    service.register("Alice").await.unwrap();

    let err = service.register(" Alice ").await.unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::NameTaken { name } if name == "Alice"));
}

#[tokio::test]
async fn test_register_rejects_invalid_names() {
    let (service, _) = test_service();

    let err = service.register("   ").await.unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::InvalidArgument { .. }));

    let err = service.register(BROADCAST_TARGET).await.unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_join_notice_visible_to_others() {
    let (service, _) = test_service();
    service.register("Alice").await.unwrap();

    let messages = service.read_messages("Bob", None).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind, MessageKind::Status);
    assert_eq!(messages[0].from.as_str(), "Alice");
}

#[tokio::test]
async fn test_private_message_visibility() {
    let (service, _) = test_service();
    service.register("Alice").await.unwrap();

    service
        .post_message(request("Alice", "Bob", "hi", "private_message"))
        .await
        .unwrap();

    let is_private = |messages: &[Message]| {
        messages
            .iter()
            .any(|message| message.kind == MessageKind::Private)
    };
    assert!(is_private(&service.read_messages("Bob", None).await.unwrap()));
    assert!(is_private(&service.read_messages("Alice", None).await.unwrap()));
    assert!(!is_private(&service.read_messages("Carol", None).await.unwrap()));
}

#[tokio::test]
async fn test_public_message_visible_to_unregistered_names() {
    let (service, _) = test_service();
    service.register("Alice").await.unwrap();
    service
        .post_message(request("Alice", BROADCAST_TARGET, "hi", "message"))
        .await
        .unwrap();

    for requester in ["Alice", "Bob", "nobody-registered"] {
        let messages = service.read_messages(requester, None).await.unwrap();
        assert_eq!(messages[0].kind, MessageKind::Public);
        assert_eq!(messages[0].text.as_str(), "hi");
    }
}

#[tokio::test]
async fn test_limit_is_clamped_and_most_recent_first() {
    let (service, _) = test_service();
    service.register("Alice").await.unwrap();
    service
        .post_message(request("Alice", BROADCAST_TARGET, "one", "message"))
        .await
        .unwrap();
    service
        .post_message(request("Alice", BROADCAST_TARGET, "two", "message"))
        .await
        .unwrap();

    let limited = service.read_messages("Bob", Some(2)).await.unwrap();
    assert_eq!(texts(&limited), vec!["Alice:two", "Alice:one"]);

    let all = service.read_messages("Bob", Some(1000)).await.unwrap();
    assert_eq!(all.len(), 3);

    let unbounded = service.read_messages("Bob", Some(0)).await.unwrap();
    assert_eq!(unbounded.len(), 3);
}

#[tokio::test]
async fn test_post_message_error_taxonomy() {
    let (service, _) = test_service();

    let err = service
        .post_message(request("Alice", BROADCAST_TARGET, "hi", "message"))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::NotRegistered { .. }));

    service.register("Alice").await.unwrap();

    let err = service
        .post_message(request("Alice", BROADCAST_TARGET, "hi", "status"))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::InvalidKind { kind } if kind == "status"));

    let err = service
        .post_message(request("Alice", BROADCAST_TARGET, "hi", "whisper"))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::InvalidKind { .. }));

    let err = service
        .post_message(request("Alice", BROADCAST_TARGET, "  ", "message"))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::InvalidArgument { .. }));

    // 失败的请求不会写入日志
    assert_eq!(service.read_messages("Alice", None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_heartbeat_requires_registration() {
    let (service, clock) = test_service();

    let err = service.heartbeat("Alice").await.unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::NotRegistered { .. }));

    service.register("Alice").await.unwrap();
    clock.advance(Duration::seconds(12));
    service.heartbeat("Alice").await.unwrap();

    let participants = service.list_participants().await.unwrap();
    assert_eq!(participants[0].last_heartbeat, clock.now());
}

#[tokio::test]
async fn test_heartbeat_keeps_participant_alive() {
    let (service, clock) = test_service();
    service.register("Alice").await.unwrap();
    service.register("Bob").await.unwrap();

    clock.advance(Duration::seconds(10));
    service.heartbeat("Bob").await.unwrap();
    clock.advance(Duration::seconds(10));

    let report = service.sweep().await.unwrap();
    let evicted: Vec<&str> = report.evicted.iter().map(|name| name.as_str()).collect();
    assert_eq!(evicted, vec!["Alice"]);
    assert_eq!(report.swept_at, clock.now());

    let remaining = service.list_participants().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name.as_str(), "Bob");
}

#[tokio::test]
async fn test_sweep_at_exact_timeout_keeps_participant() {
    let (service, clock) = test_service();
    service.register("Alice").await.unwrap();

    clock.advance(Duration::seconds(15));
    assert!(service.sweep().await.unwrap().evicted.is_empty());

    clock.advance(Duration::milliseconds(1));
    assert_eq!(service.sweep().await.unwrap().evicted.len(), 1);
}

#[tokio::test]
async fn test_evict_is_idempotent_and_announces_once() {
    let (service, _) = test_service();
    service.register("Alice").await.unwrap();

    service.evict("Alice").await.unwrap();
    service.evict("Alice").await.unwrap();
    service.evict("never-joined").await.unwrap();

    let messages = service.read_messages("Bob", None).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text.as_str(), domain::message::LEAVE_NOTICE);
    assert!(service.list_participants().await.unwrap().is_empty());

    // 离开后名称可以重新注册
    service.register("Alice").await.unwrap();
}

#[tokio::test]
async fn test_departed_requester_still_reads_private_messages() {
    let (service, _) = test_service();
    service.register("Alice").await.unwrap();
    service.register("Bob").await.unwrap();
    service
        .post_message(request("Alice", "Bob", "psst", "private_message"))
        .await
        .unwrap();
    service.evict("Bob").await.unwrap();

    let messages = service.read_messages("Bob", None).await.unwrap();
    assert!(messages.iter().any(|message| message.text.as_str() == "psst"));
}

#[tokio::test]
async fn test_full_session_scenario() {
    let (service, clock) = test_service();
    service.register("A").await.unwrap();
    service.register("B").await.unwrap();
    service
        .post_message(request("A", BROADCAST_TARGET, "hello", "message"))
        .await
        .unwrap();
    service
        .post_message(request("A", "B", "secret", "private_message"))
        .await
        .unwrap();

    let before_sweep = service.read_messages("B", None).await.unwrap();
    let expected = vec![
        "A:secret".to_string(),
        "A:hello".to_string(),
        format!("B:{}", domain::message::JOIN_NOTICE),
        format!("A:{}", domain::message::JOIN_NOTICE),
    ];
    assert_eq!(texts(&before_sweep), expected);

    clock.advance(Duration::seconds(16));
    let report = service.sweep().await.unwrap();
    assert_eq!(report.evicted.len(), 2);

    // 日志按插入顺序：join(A) join(B) hello secret leave(A) leave(B)
    let log: Vec<Message> = service
        .read_messages("A", None)
        .await
        .unwrap()
        .into_iter()
        .rev()
        .collect();
    let kinds: Vec<MessageKind> = log.iter().map(|message| message.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MessageKind::Status,
            MessageKind::Status,
            MessageKind::Public,
            MessageKind::Private,
            MessageKind::Status,
            MessageKind::Status,
        ]
    );
    assert_eq!(log[4].from.as_str(), "A");
    assert_eq!(log[4].text.as_str(), domain::message::LEAVE_NOTICE);
    assert_eq!(log[5].from.as_str(), "B");

    let ids: Vec<u64> = log.iter().map(|message| message.id.value()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    assert!(log
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp));
}
