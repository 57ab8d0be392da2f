use std::num::IntErrorKind;

use axum::{
    extract::{Query, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use application::PostMessageRequest;

use crate::{
    dto::{
        MessageDto, MessagesQuery, ParticipantDto, PostMessagePayload, PostedMessageDto,
        RegisterPayload,
    },
    error::ApiError,
    extract::{RequestUser, ValidatedJson},
    state::AppState,
};

/// `cors_origins` 为空时允许任意来源
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(chat_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn chat_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/participants",
            post(register_participant)
                .get(list_participants)
                .delete(leave),
        )
        .route("/messages", post(post_message).get(read_messages))
        .route("/status", post(heartbeat))
}

pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(origin = %origin, error = %err, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn register_participant(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterPayload>,
) -> Result<(StatusCode, Json<ParticipantDto>), ApiError> {
    let participant = state.chat_service.register(&payload.name).await?;

    Ok((StatusCode::CREATED, Json(ParticipantDto::from(&participant))))
}

async fn list_participants(
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipantDto>>, ApiError> {
    let participants = state.chat_service.list_participants().await?;

    Ok(Json(participants.iter().map(ParticipantDto::from).collect()))
}

async fn leave(
    State(state): State<AppState>,
    RequestUser(name): RequestUser,
) -> Result<StatusCode, ApiError> {
    state.chat_service.evict(&name).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn post_message(
    State(state): State<AppState>,
    RequestUser(from): RequestUser,
    ValidatedJson(payload): ValidatedJson<PostMessagePayload>,
) -> Result<(StatusCode, Json<PostedMessageDto>), ApiError> {
    let id = state
        .chat_service
        .post_message(PostMessageRequest {
            from,
            to: payload.to,
            text: payload.text,
            kind: payload.kind,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PostedMessageDto { id: id.value() })))
}

async fn read_messages(
    State(state): State<AppState>,
    RequestUser(requester): RequestUser,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let limit = parse_limit(query.limit.as_deref())?;
    let messages = state.chat_service.read_messages(&requester, limit).await?;

    Ok(Json(messages.iter().map(MessageDto::from).collect()))
}

async fn heartbeat(
    State(state): State<AppState>,
    RequestUser(name): RequestUser,
) -> Result<StatusCode, ApiError> {
    state.chat_service.heartbeat(&name).await?;

    Ok(StatusCode::OK)
}

/// 缺省或空字符串表示不限制；负数和 0 交给应用层按“不限制”处理。
/// 超出 `i64` 的正数按最大值处理，非数字返回 422。
fn parse_limit(raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(value) => value,
    };

    match value.parse::<i64>() {
        Ok(limit) => Ok(Some(limit)),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Ok(Some(i64::MAX)),
            IntErrorKind::NegOverflow => Ok(None),
            _ => Err(ApiError::validation(format!(
                "limit must be an integer: {}",
                value
            ))),
        },
    }
}
