//! 自定义提取器：`User` 请求头和带校验的 JSON 请求体

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

pub(crate) const USER_HEADER: &str = "user";

/// 客户端在 `User` 请求头中声明的参与者名称（已去掉首尾空白）
#[derive(Debug, Clone)]
pub(crate) struct RequestUser(pub String);

impl<S> FromRequestParts<S> for RequestUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_HEADER)
            .ok_or_else(|| ApiError::validation("missing User header"))?;

        // 名称允许非 ASCII 字符，按 UTF-8 解码而不是 to_str()
        let name = String::from_utf8(value.as_bytes().to_vec())
            .map_err(|_| ApiError::validation("User header is not valid UTF-8"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("User header is empty"));
        }

        Ok(Self(name.to_owned()))
    }
}

/// 反序列化后执行 `validator` 校验；两种失败都返回 422
#[derive(Debug, Clone)]
pub(crate) struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}
