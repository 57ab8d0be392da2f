//! 统一配置中心
//!
//! 提供应用的全局配置管理，包括：
//! - HTTP 服务监听地址
//! - 心跳与在线状态清理的时间参数

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// 全局应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务配置
    pub server: ServerConfig,
    /// 在线状态配置
    pub presence: PresenceConfig,
}

/// 服务器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 为空时允许任意来源
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// 心跳与超时清理参数，单位为秒
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// 客户端预期的心跳间隔
    pub heartbeat_interval_secs: u64,
    /// 超过这个时长没有心跳的参与者会被清理
    pub liveness_timeout_secs: u64,
    /// 清理任务的执行间隔
    pub sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_origins: Vec::new(),
        }
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 10,
            liveness_timeout_secs: 15,
            sweep_interval_secs: 15,
        }
    }
}

impl PresenceConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_secs(self.liveness_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl AppConfig {
    /// 加载配置，优先级：默认值 -> 可选配置文件（APP_CONFIG_FILE）-> 环境变量（APP_*）
    ///
    /// 嵌套字段用双下划线分隔，例如 `APP_PRESENCE__LIVENESS_TIMEOUT_SECS=30`。
    pub fn load() -> Result<Self, ConfigError> {
        let mut fig = Figment::new().merge(Serialized::defaults(AppConfig::default()));
        if let Ok(path) = env::var("APP_CONFIG_FILE") {
            if path.ends_with(".yml") || path.ends_with(".yaml") {
                fig = fig.merge(Yaml::file(path));
            } else if path.ends_with(".json") {
                fig = fig.merge(Json::file(path));
            } else {
                fig = fig.merge(Toml::file(path));
            }
        }
        fig = fig.merge(Env::prefixed("APP_").split("__"));

        let cfg: AppConfig = fig.extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidServerConfig(
                "host cannot be empty".to_string(),
            ));
        }

        let presence = &self.presence;
        if presence.heartbeat_interval_secs == 0 {
            return Err(ConfigError::InvalidPresenceConfig(
                "heartbeat interval must be greater than 0".to_string(),
            ));
        }
        if presence.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidPresenceConfig(
                "sweep interval must be greater than 0".to_string(),
            ));
        }
        // 超时短于心跳间隔时，按时心跳的客户端也会被清理
        if presence.liveness_timeout_secs < presence.heartbeat_interval_secs {
            return Err(ConfigError::InvalidPresenceConfig(format!(
                "liveness timeout ({}s) must not be shorter than heartbeat interval ({}s)",
                presence.liveness_timeout_secs, presence.heartbeat_interval_secs
            )));
        }

        Ok(())
    }

    /// 监听地址，形如 `127.0.0.1:5000`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server configuration: {0}")]
    InvalidServerConfig(String),
    #[error("Invalid presence configuration: {0}")]
    InvalidPresenceConfig(String),
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}
