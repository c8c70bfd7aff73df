//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用入口
//! - 加载输入目录中的文档
//! - 调用调度器、写报表、输出全局统计
//!
//! ### `dispatcher` - 批量调度器
//! - 固定大小的工作池（Semaphore）
//! - 按完成顺序收集记录和单文档通知
//! - 每完成一个任务上报一次进度
//!
//! ### `document_task` - 单文档任务
//! - 临时文件的创建、使用、删除
//!
//! ### `progress` - 进度上报
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理整个输入目录)
//!     ↓
//! dispatcher (处理 Vec<DocumentHandle>)
//!     ↓
//! document_task (处理单个文档)
//!     ↓
//! extraction (文本来源 + 字段解析)
//! ```

pub mod batch_processor;
pub mod dispatcher;
pub mod document_task;
pub mod progress;

// 重新导出主要类型
pub use batch_processor::App;
pub use dispatcher::{default_worker_count, BatchDispatcher, BatchOutcome, DocumentNotice, NoticeKind};
pub use document_task::{process_single_document, TempDocument};
pub use progress::{ChannelProgress, LogProgress, NoProgress, ProgressReporter, ProgressUpdate};
