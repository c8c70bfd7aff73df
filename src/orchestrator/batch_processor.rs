//! 批量 EOB 处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整的批处理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：初始化日志文件、构建提取器和调度器
//! 2. **批量加载**：扫描输入目录，加载所有待处理文档
//! 3. **并行处理**：委托 `BatchDispatcher` 分发到工作池
//! 4. **结果输出**：写报表、写单文档通知
//! 5. **全局统计**：汇总成功 / 无内容 / 失败数量

use crate::config::Config;
use crate::error::AppError;
use crate::extraction::{build_extractor, Extractor};
use crate::models::{load_all_documents, DocumentHandle};
use crate::orchestrator::dispatcher::{BatchDispatcher, BatchOutcome};
use crate::orchestrator::progress::{LogProgress, ProgressReporter};
use crate::services::ReportWriter;
use crate::utils::{logging, RunSummary};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    dispatcher: BatchDispatcher,
    extractor: Arc<dyn Extractor>,
    writer: ReportWriter,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        let workers = config
            .max_workers
            .map(|n| n.to_string())
            .unwrap_or_else(|| "auto".to_string());
        logging::init_log_file(
            &config.output_log_file,
            &[
                ("输入目录", config.input_folder.clone()),
                ("文本引擎", config.text_engine.as_str().to_string()),
                ("工作池", workers),
            ],
        )?;

        let extractor: Arc<dyn Extractor> = Arc::from(build_extractor(&config)?);
        Ok(Self::with_extractor(config, extractor))
    }

    /// 使用自定义提取器创建应用
    pub fn with_extractor(config: Config, extractor: Arc<dyn Extractor>) -> Self {
        let dispatcher = match config.max_workers {
            Some(workers) => BatchDispatcher::with_workers(workers),
            None => BatchDispatcher::new(),
        };
        let writer = ReportWriter::new(config.output_file.clone(), config.notice_file.clone())
            .json_output(config.json_output_file.clone());

        logging::log_startup(dispatcher.workers(), config.text_engine.as_str());

        Self {
            config,
            dispatcher,
            extractor,
            writer,
        }
    }

    /// 运行应用主逻辑：扫描输入目录并处理
    pub async fn run(&self) -> Result<BatchOutcome> {
        info!("\n📁 正在扫描待处理的文档...");
        let documents = load_all_documents(
            &self.config.input_folder,
            self.config.text_engine.input_extension(),
        )
        .await?;

        if documents.is_empty() {
            warn!("⚠️ 没有找到待处理的文档，程序结束");
            return Ok(BatchOutcome::default());
        }

        logging::log_documents_loaded(documents.len());
        self.process(&documents, &LogProgress).await
    }

    /// 处理一批已加载的文档
    ///
    /// 所有文档都没有产出记录时返回 `AppError::NoValidData`
    pub async fn process(
        &self,
        documents: &[DocumentHandle],
        progress: &dyn ProgressReporter,
    ) -> Result<BatchOutcome> {
        let started = Instant::now();
        let outcome = self
            .dispatcher
            .dispatch(documents, self.extractor.clone(), progress)
            .await;

        self.writer.write_notices(&outcome.notices)?;

        if outcome.is_empty() {
            error!("❌ {}", AppError::NoValidData);
            return Err(AppError::NoValidData.into());
        }

        self.writer.write_report(outcome.records.clone())?;

        logging::print_final_stats(
            &RunSummary {
                success: outcome.records.len(),
                warned: outcome.warnings().count(),
                failed: outcome.errors().count(),
                total: outcome.total,
                elapsed: started.elapsed(),
            },
            self.writer.output_path(),
        );
        info!("\n日志已保存至: {}", self.config.output_log_file);

        Ok(outcome)
    }
}
