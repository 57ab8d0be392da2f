use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_FAILED",
            message,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.body.code
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        use domain::DomainError;

        match error {
            ApplicationError::Domain(DomainError::NameTaken { name }) => ApiError::new(
                StatusCode::CONFLICT,
                "NAME_TAKEN",
                format!("name already taken: {}", name),
            ),
            ApplicationError::Domain(DomainError::NotRegistered { name }) => ApiError::new(
                StatusCode::NOT_FOUND,
                "NOT_REGISTERED",
                format!("participant not registered: {}", name),
            ),
            ApplicationError::Domain(DomainError::InvalidKind { kind }) => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_KIND",
                format!("unsupported message type: {}", kind),
            ),
            ApplicationError::Domain(DomainError::InvalidArgument { field, reason }) => {
                ApiError::new(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "INVALID_ARGUMENT",
                    format!("{}: {}", field, reason),
                )
            }
            ApplicationError::Infrastructure { message, source } => {
                tracing::error!(
                    error = %message,
                    source = ?source,
                    "request failed on infrastructure error"
                );
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INFRASTRUCTURE_ERROR",
                    message,
                )
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<&str> = field_errors.keys().map(|field| field.as_ref()).collect();
        fields.sort_unstable();
        ApiError::validation(format!("invalid fields: {}", fields.join(", ")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
