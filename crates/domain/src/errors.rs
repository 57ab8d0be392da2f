//! 领域模型错误定义
//!
//! 所有错误都是可恢复的，调用方根据类型决定提示用户还是拒绝请求。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 名称已被在线参与者占用
    #[error("name already taken: {name}")]
    NameTaken { name: String },

    /// 名称没有对应的在线参与者
    #[error("participant not registered: {name}")]
    NotRegistered { name: String },

    /// 客户端只能发送 message / private_message
    #[error("invalid message kind: {kind}")]
    InvalidKind { kind: String },

    /// 参数校验失败
    #[error("invalid argument {field}: {reason}")]
    InvalidArgument { field: String, reason: String },
}

impl DomainError {
    pub fn name_taken(name: impl Into<String>) -> Self {
        Self::NameTaken { name: name.into() }
    }

    pub fn not_registered(name: impl Into<String>) -> Self {
        Self::NotRegistered { name: name.into() }
    }

    pub fn invalid_kind(kind: impl Into<String>) -> Self {
        Self::InvalidKind { kind: kind.into() }
    }

    /// 创建参数校验错误
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;
