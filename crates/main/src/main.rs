//! 主应用程序入口
//!
//! 加载配置，启动心跳清理任务和 Axum Web API 服务。

use application::{
    ChatService, ChatServiceDependencies, Clock, LivenessSweeper, MemoryChatStore, SystemClock,
};
use config::AppConfig;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        heartbeat_interval = ?config.presence.heartbeat_interval(),
        liveness_timeout = ?config.presence.liveness_timeout(),
        sweep_interval = ?config.presence.sweep_interval(),
        "presence settings loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let chat_service = Arc::new(ChatService::new(ChatServiceDependencies {
        store: Arc::new(MemoryChatStore::new()),
        clock,
        liveness_timeout: config.presence.liveness_timeout(),
    }));

    let shutdown = CancellationToken::new();
    let sweeper = LivenessSweeper::new(chat_service.clone(), config.presence.sweep_interval())
        .spawn(shutdown.child_token());

    let app = router(AppState::new(chat_service), &config.server.cors_origins);
    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    tracing::info!("聊天服务器启动在 http://{}", bind_address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    sweeper.shutdown().await;
    tracing::info!("聊天服务器已停止");

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                tracing::error!(error = %err, "failed to listen for ctrl-c");
            }
            tracing::info!("收到退出信号，开始关闭");
        }
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}
