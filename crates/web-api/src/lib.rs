//! Web API 层。
//!
//! 提供 Axum 路由，将 HTTP 请求委托给应用层的用例服务。
//! 负责请求体校验、`User` 请求头解析、错误到状态码的映射和时间的展示格式。

mod dto;
mod error;
mod extract;
mod routes;
mod state;

pub use dto::{MessageDto, ParticipantDto, PostedMessageDto};
pub use error::{ApiError, ErrorBody};
pub use routes::{cors_layer, router};
pub use state::AppState;
