//! 心跳超时清理任务
//!
//! 后台循环只有两个状态：`Idle`（等待下一次触发）和 `Sweeping`（扫描登记表）。
//! 每次触发都是完整扫描，不在两次触发之间保留扫描进度。
//! 取消后不再开始新的扫描，正在进行的扫描会先完成。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::services::ChatService;

/// `tokio::time::interval` 不接受零时长
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweeperState {
    Idle,
    Sweeping,
    Stopped,
}

pub struct LivenessSweeper {
    service: Arc<ChatService>,
    interval: Duration,
}

impl LivenessSweeper {
    /// 间隔小于 1ms 时按 1ms 处理
    pub fn new(service: Arc<ChatService>, interval: Duration) -> Self {
        Self {
            service,
            interval: interval.max(MIN_SWEEP_INTERVAL),
        }
    }

    /// 在当前 tokio 运行时上启动清理循环
    pub fn spawn(self, cancel: CancellationToken) -> SweeperHandle {
        let (state_tx, state_rx) = watch::channel(SweeperState::Idle);
        let (sweeps_tx, sweeps_rx) = watch::channel(0u64);
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            self.run(task_cancel, state_tx, sweeps_tx).await;
        });

        SweeperHandle {
            cancel,
            task,
            state: state_rx,
            sweeps: sweeps_rx,
        }
    }

    async fn run(
        self,
        cancel: CancellationToken,
        state: watch::Sender<SweeperState>,
        sweeps: watch::Sender<u64>,
    ) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            timeout_ms = self.service.liveness_timeout().whole_milliseconds() as u64,
            "liveness sweeper started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 第一次 tick 立即返回，跳过它让首次扫描发生在一个周期之后
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    state.send_replace(SweeperState::Sweeping);
                    match self.service.sweep().await {
                        Ok(report) if !report.evicted.is_empty() => {
                            tracing::info!(evicted = report.evicted.len(), "sweep finished");
                        }
                        Ok(_) => tracing::trace!("sweep finished, nothing expired"),
                        Err(err) => tracing::error!(error = %err, "sweep failed"),
                    }
                    sweeps.send_modify(|count| *count += 1);
                    state.send_replace(SweeperState::Idle);
                }
            }
        }

        state.send_replace(SweeperState::Stopped);
        tracing::info!("liveness sweeper stopped");
    }
}

/// 清理任务的句柄，进程退出前调用 [`SweeperHandle::shutdown`]
pub struct SweeperHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    state: watch::Receiver<SweeperState>,
    sweeps: watch::Receiver<u64>,
}

impl SweeperHandle {
    pub fn state(&self) -> SweeperState {
        *self.state.borrow()
    }

    /// 已完成的扫描次数
    pub fn completed_sweeps(&self) -> u64 {
        *self.sweeps.borrow()
    }

    /// 等待至少完成 `count` 次扫描；任务已经退出时提前返回
    pub async fn wait_for_sweeps(&self, count: u64) {
        let mut sweeps = self.sweeps.clone();
        let _ = sweeps.wait_for(|done| *done >= count).await;
    }

    /// 停止接收新的触发，等待正在进行的扫描结束
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(err) = self.task.await {
            tracing::error!(error = %err, "liveness sweeper task panicked");
        }
    }
}
