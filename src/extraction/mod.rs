//! 提取层
//!
//! 给定一个文件路径，产出一条记录或失败信号。与批处理层之间没有任何共享状态。

pub mod eob_parser;
pub mod text_source;

use crate::config::{Config, TextEngine};
use crate::error::AppResult;
use crate::models::ExtractionRecord;
use crate::utils::preview_text;
use std::path::Path;
use tracing::{debug, warn};

pub use eob_parser::EobParser;
pub use text_source::{LopdfSource, PdftotextSource, PlainTextSource, TextSource};

/// 提取函数
///
/// - `Ok(Some(record))`：提取成功
/// - `Ok(None)`：文档中没有可用内容
/// - `Err(_)`：文档损坏或格式异常
pub trait Extractor: Send + Sync {
    fn extract(&self, path: &Path) -> AppResult<Option<ExtractionRecord>>;
}

impl<F> Extractor for F
where
    F: Fn(&Path) -> AppResult<Option<ExtractionRecord>> + Send + Sync,
{
    fn extract(&self, path: &Path) -> AppResult<Option<ExtractionRecord>> {
        self(path)
    }
}

/// EOB 提取器：文本来源 + 字段解析
pub struct EobExtractor<S> {
    source: S,
    parser: EobParser,
    verbose_logging: bool,
}

impl<S: TextSource> EobExtractor<S> {
    pub fn new(source: S) -> AppResult<Self> {
        Ok(Self {
            source,
            parser: EobParser::new()?,
            verbose_logging: false,
        })
    }

    pub fn verbose(mut self, verbose_logging: bool) -> Self {
        self.verbose_logging = verbose_logging;
        self
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }
}

impl<S: TextSource> Extractor for EobExtractor<S> {
    fn extract(&self, path: &Path) -> AppResult<Option<ExtractionRecord>> {
        let Some(text) = self.source.extract_text(path)? else {
            debug!("无可用文本: {}", path.display());
            return Ok(None);
        };

        if self.verbose_logging {
            debug!("文本预览: {}", preview_text(&text, 120));
        }

        let record = self.parser.parse(&text)?;

        let missing = record.missing_fields();
        if !missing.is_empty() {
            warn!(
                "部分字段缺失 ({}): {}",
                path.file_name().unwrap_or_default().to_string_lossy(),
                missing.join(", ")
            );
        }

        Ok(Some(record))
    }
}

/// 按配置构建提取器
pub fn build_extractor(config: &Config) -> AppResult<Box<dyn Extractor>> {
    let extractor: Box<dyn Extractor> = match config.text_engine {
        TextEngine::Lopdf => Box::new(EobExtractor::new(LopdfSource)?.verbose(config.verbose_logging)),
        TextEngine::Pdftotext => Box::new(
            EobExtractor::new(PdftotextSource::new(config.pdftotext_path.clone()))?
                .verbose(config.verbose_logging),
        ),
        TextEngine::PlainText => {
            Box::new(EobExtractor::new(PlainTextSource)?.verbose(config.verbose_logging))
        }
    };
    Ok(extractor)
}
