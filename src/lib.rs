//! # EOB Batch
//!
//! 从 EOB（Explanation of Benefits）PDF 中批量提取理赔金额字段并生成报表
//!
//! ## 架构设计
//!
//! ### ① 模型层（Models）
//! - `models/` - 文档句柄、提取记录、输入目录加载
//!
//! ### ② 提取层（Extraction）
//! - `extraction/text_source` - PDF 转文本（lopdf / pdftotext / 纯文本）
//! - `extraction/eob_parser` - 正则字段解析
//! - `Extractor` - 路径 → 记录 / 无内容 / 错误
//!
//! ### ③ 业务能力层（Services）
//! - `ReportWriter` - 排序、格式化、写 xlsx 报表（可选 JSON）和通知文件
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/dispatcher` - 并行批量调度，收集部分结果和部分失败
//! - `orchestrator/batch_processor` - 应用入口
//!
//! ## 模块结构
//!
//! ```text
//! config        配置（环境变量 / TOML）
//! error         分层错误类型
//! models        DocumentHandle、ExtractionRecord、目录加载
//! extraction    文本来源 + EOB 字段解析
//! services      报表写入
//! orchestrator  App、BatchDispatcher、单文档任务、进度上报
//! utils         日志初始化与统计输出
//! ```

pub mod config;
pub mod error;
pub mod extraction;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::{Config, TextEngine};
pub use error::{AppError, AppResult};
pub use extraction::{EobExtractor, Extractor};
pub use models::{DocumentHandle, ExtractionRecord, FieldValue};
pub use orchestrator::{
    App, BatchDispatcher, BatchOutcome, DocumentNotice, NoticeKind, ProgressReporter,
    ProgressUpdate,
};
pub use services::ReportWriter;
