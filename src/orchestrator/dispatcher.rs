//! 批量调度器 - 编排层
//!
//! ## 职责
//!
//! 把一批文档分发到固定大小的工作池，按完成顺序收集结果。
//!
//! ## 核心流程
//!
//! 1. **任务数 = 文档数**：每个文档一个独立任务，任务之间没有共享可变状态
//! 2. **并发控制**：Semaphore 限制同时运行的任务数，提取在阻塞线程池上执行
//! 3. **完成顺序**：`FuturesUnordered` 按任务完成的先后返回
//! 4. **失败隔离**：提取报错或 panic 都转换成单文档通知，不影响其他任务
//! 5. **进度上报**：每完成一个任务上报一次 (completed, total)
//!
//! 没有取消和超时：调用会一直等到所有任务结束。

use crate::extraction::Extractor;
use crate::models::{DocumentHandle, ExtractionRecord};
use crate::orchestrator::document_task;
use crate::orchestrator::progress::{ProgressReporter, ProgressUpdate};
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

/// 默认工作池大小：CPU 核数 - 1，至少为 1
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// 单文档通知类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    /// 提取成功但没有可用内容
    NoContent,
    /// 提取失败（附错误描述）
    Failed(String),
}

/// 单文档通知（警告或错误）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNotice {
    /// 文档显示名
    pub document: String,
    pub kind: NoticeKind,
}

impl DocumentNotice {
    pub fn no_content(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            kind: NoticeKind::NoContent,
        }
    }

    pub fn failed(document: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            kind: NoticeKind::Failed(description.into()),
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.kind, NoticeKind::NoContent)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, NoticeKind::Failed(_))
    }
}

impl fmt::Display for DocumentNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NoticeKind::NoContent => write!(f, "No data extracted from {}", self.document),
            NoticeKind::Failed(description) => {
                write!(f, "Error processing {}: {}", self.document, description)
            }
        }
    }
}

/// 一次批处理的结果
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// 成功的记录，按完成顺序
    pub records: Vec<ExtractionRecord>,
    /// 无内容 / 失败的文档
    pub notices: Vec<DocumentNotice>,
    /// 提交的文档总数
    pub total: usize,
}

impl BatchOutcome {
    fn with_total(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DocumentNotice> {
        self.notices.iter().filter(|n| n.is_warning())
    }

    pub fn errors(&self) -> impl Iterator<Item = &DocumentNotice> {
        self.notices.iter().filter(|n| n.is_error())
    }

    /// 没有任何有效记录
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 批量调度器
#[derive(Debug, Clone)]
pub struct BatchDispatcher {
    workers: usize,
    temp_dir: Option<PathBuf>,
}

impl Default for BatchDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchDispatcher {
    /// 使用默认工作池大小
    pub fn new() -> Self {
        Self::with_workers(default_worker_count())
    }

    /// 指定工作池大小，0 按 1 处理
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            temp_dir: None,
        }
    }

    /// 临时文件目录，默认使用系统临时目录
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 处理一批文档
    ///
    /// 任何单个文档的失败都不会让这个调用失败；所有任务结束后才返回
    pub async fn dispatch(
        &self,
        documents: &[DocumentHandle],
        extractor: Arc<dyn Extractor>,
        progress: &dyn ProgressReporter,
    ) -> BatchOutcome {
        let total = documents.len();
        let mut outcome = BatchOutcome::with_total(total);

        if total == 0 {
            return outcome;
        }

        info!("📦 提交 {} 个文档，工作池大小 {}", total, self.workers);

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut pending = FuturesUnordered::new();

        // 为每个文档创建一个任务
        for (index, doc) in documents.iter().enumerate() {
            let doc = doc.clone();
            let extractor = extractor.clone();
            let semaphore = semaphore.clone();
            let temp_dir = self.temp_dir.clone();

            let handle = tokio::spawn(async move {
                // semaphore 不会被关闭，permit 一直持有到任务结束
                let _permit = semaphore.acquire_owned().await.ok();
                tokio::task::spawn_blocking(move || {
                    document_task::process_single_document(
                        &doc,
                        extractor.as_ref(),
                        temp_dir.as_deref(),
                    )
                })
                .await
            });

            pending.push(async move { (index, handle.await) });
        }

        // 按完成顺序收集结果
        let mut completed = 0;
        while let Some((index, joined)) = pending.next().await {
            let name = &documents[index].name;

            match joined {
                Ok(Ok(Ok(Some(record)))) if !record.is_empty() => {
                    debug!("✓ {} 提取完成 ({} 个字段)", name, record.len());
                    outcome.records.push(record);
                }
                Ok(Ok(Ok(_))) => {
                    warn!("⚠️ No data extracted from {}", name);
                    outcome.notices.push(DocumentNotice::no_content(name));
                }
                Ok(Ok(Err(e))) => {
                    error!("❌ Error processing {}: {}", name, e);
                    outcome.notices.push(DocumentNotice::failed(name, e.to_string()));
                }
                Ok(Err(join_err)) | Err(join_err) => {
                    let description = describe_join_error(join_err);
                    error!("❌ Error processing {}: {}", name, description);
                    outcome.notices.push(DocumentNotice::failed(name, description));
                }
            }

            completed += 1;
            progress.report(ProgressUpdate { completed, total });
        }

        info!(
            "✓ 批处理完成: 成功 {}, 无内容 {}, 失败 {}, 共 {}",
            outcome.records.len(),
            outcome.warnings().count(),
            outcome.errors().count(),
            total
        );

        outcome
    }
}

/// 把任务 panic / 被取消转换成错误描述
fn describe_join_error(err: JoinError) -> String {
    if err.is_panic() {
        let payload = err.into_panic();
        if let Some(msg) = payload.downcast_ref::<&str>() {
            format!("worker panicked: {}", msg)
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            format!("worker panicked: {}", msg)
        } else {
            "worker panicked".to_string()
        }
    } else {
        format!("worker aborted: {}", err)
    }
}
