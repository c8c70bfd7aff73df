/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use anyhow::{Context, Result};
use std::fs;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 默认级别为 info，可通过 RUST_LOG 覆盖；重复调用不会报错
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件，写入本次运行的时间和参数
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `settings`: 需要记录的运行参数（名称, 值）
pub fn init_log_file(log_file_path: &str, settings: &[(&str, String)]) -> Result<()> {
    let rule = "=".repeat(60);
    let mut header = format!(
        "{rule}\nEOB 处理日志 - {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    for (name, value) in settings {
        header.push_str(&format!("{}: {}\n", name, value));
    }
    header.push_str(&rule);
    header.push_str("\n\n");

    fs::write(log_file_path, header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `workers`: 工作池大小
/// - `engine`: 文本提取引擎名称
pub fn log_startup(workers: usize, engine: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 并行 EOB 处理模式");
    info!("📊 工作池大小: {}", workers);
    info!("🔧 文本提取引擎: {}", engine);
    info!("{}", "=".repeat(60));
}

/// 记录文档加载信息
pub fn log_documents_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的 PDF", total);
}

/// 一次运行的汇总
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub success: usize,
    /// 无内容
    pub warned: usize,
    pub failed: usize,
    pub total: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    /// 成功率（百分比），没有文档时为 0
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.success as f64 * 100.0 / self.total as f64
        }
    }
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &RunSummary, output_path: &str) {
    let rule = "=".repeat(60);
    info!("\n{}", rule);
    info!(
        "📊 处理完成 ({:.1}s)",
        summary.elapsed.as_secs_f64()
    );
    info!(
        "✅ 成功: {}/{} ({:.1}%)",
        summary.success,
        summary.total,
        summary.success_rate()
    );
    if summary.warned > 0 {
        info!("⚠️ 无内容: {}", summary.warned);
    }
    if summary.failed > 0 {
        info!("❌ 失败: {}", summary.failed);
    }
    info!("📄 报表: {}", output_path);
    info!("{}", rule);
}

/// 日志预览用：空白折叠成单个空格，超过 `max_chars` 个字符时截断
pub fn preview_text(text: &str, max_chars: usize) -> String {
    let mut preview = String::new();
    for (count, word) in text.split_whitespace().enumerate() {
        if count > 0 {
            preview.push(' ');
        }
        preview.push_str(word);
    }

    match preview.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &preview[..cut]),
        None => preview,
    }
}
