//! 进度上报
//!
//! 调度器每完成一个任务（成功、无内容、失败都算）调用一次上报器。
//! 上报器由调用方提供，调度器不关心进度如何展示。

use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

/// 一次进度快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
}

impl ProgressUpdate {
    /// 完成比例，范围 0.0 ~ 1.0
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }

    /// 形如 `3/10` 的文本
    pub fn label(&self) -> String {
        format!("{}/{}", self.completed, self.total)
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }
}

/// 进度上报器
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

impl<F> ProgressReporter for F
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        self(update)
    }
}

/// 写日志的上报器
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, update: ProgressUpdate) {
        info!(
            "⏳ 处理进度: {} ({:.0}%)",
            update.label(),
            update.fraction() * 100.0
        );
    }
}

/// 不上报
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _update: ProgressUpdate) {}
}

/// 通过 channel 把进度推给展示层
///
/// 接收端已关闭时静默丢弃
#[derive(Debug, Clone)]
pub struct ChannelProgress(pub UnboundedSender<ProgressUpdate>);

impl ProgressReporter for ChannelProgress {
    fn report(&self, update: ProgressUpdate) {
        let _ = self.0.send(update);
    }
}
