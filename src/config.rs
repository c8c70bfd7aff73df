use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// 文本提取引擎
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEngine {
    /// 进程内 lopdf 解析
    Lopdf,
    /// 每个文档启动一个外部 pdftotext 进程
    Pdftotext,
    /// 输入已经是解析好的纯文本
    PlainText,
}

impl TextEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEngine::Lopdf => "lopdf",
            TextEngine::Pdftotext => "pdftotext",
            TextEngine::PlainText => "text",
        }
    }

    /// 输入目录中待处理文件的扩展名
    pub fn input_extension(&self) -> &'static str {
        match self {
            TextEngine::Lopdf | TextEngine::Pdftotext => "pdf",
            TextEngine::PlainText => "txt",
        }
    }
}

impl FromStr for TextEngine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lopdf" => Ok(TextEngine::Lopdf),
            "pdftotext" => Ok(TextEngine::Pdftotext),
            "text" | "plain" => Ok(TextEngine::PlainText),
            other => Err(ConfigError::UnknownTextEngine(other.to_string())),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 工作池大小，None 表示按 CPU 核数自动计算
    pub max_workers: Option<usize>,
    /// 待处理 PDF 存放目录
    pub input_folder: String,
    /// xlsx 报表输出文件
    pub output_file: String,
    /// 额外输出一份 JSON 报表（可选）
    pub json_output_file: Option<String>,
    /// 单文档警告/错误记录文件
    pub notice_file: String,
    /// 运行日志文件
    pub output_log_file: String,
    /// 文本提取引擎
    pub text_engine: TextEngine,
    /// pdftotext 可执行文件路径
    pub pdftotext_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_workers: None,
            input_folder: "input_pdf".to_string(),
            output_file: "processed_data.xlsx".to_string(),
            json_output_file: None,
            notice_file: "warn.txt".to_string(),
            output_log_file: "output.txt".to_string(),
            text_engine: TextEngine::Lopdf,
            pdftotext_path: "pdftotext".to_string(),
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件的内容，所有字段都可省略
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    max_workers: Option<usize>,
    input_folder: Option<String>,
    output_file: Option<String>,
    json_output_file: Option<String>,
    notice_file: Option<String>,
    output_log_file: Option<String>,
    text_engine: Option<String>,
    pdftotext_path: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 从环境变量读取配置，未设置的使用默认值
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 按变量名查找配置值；值存在但无法解析时返回错误
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let default = Self::default();

        let max_workers = match lookup("MAX_WORKERS") {
            Some(value) => Some(value.trim().parse::<usize>().map_err(|_| {
                ConfigError::InvalidEnvVar {
                    name: "MAX_WORKERS".to_string(),
                    value: value.clone(),
                }
            })?),
            None => default.max_workers,
        };
        let text_engine = match lookup("TEXT_ENGINE") {
            Some(value) => value.parse::<TextEngine>()?,
            None => default.text_engine,
        };
        let verbose_logging = match lookup("VERBOSE_LOGGING") {
            Some(value) => value.trim().parse::<bool>().map_err(|_| {
                ConfigError::InvalidEnvVar {
                    name: "VERBOSE_LOGGING".to_string(),
                    value: value.clone(),
                }
            })?,
            None => default.verbose_logging,
        };

        Ok(Self {
            max_workers,
            input_folder: lookup("INPUT_FOLDER").unwrap_or(default.input_folder),
            output_file: lookup("OUTPUT_FILE").unwrap_or(default.output_file),
            json_output_file: lookup("JSON_OUTPUT_FILE").or(default.json_output_file),
            notice_file: lookup("NOTICE_FILE").unwrap_or(default.notice_file),
            output_log_file: lookup("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            text_engine,
            pdftotext_path: lookup("PDFTOTEXT_PATH").unwrap_or(default.pdftotext_path),
            verbose_logging,
        })
    }

    /// 从 TOML 字符串解析配置，缺省字段使用默认值
    pub fn from_toml_str(content: &str, origin: &str) -> AppResult<Self> {
        let file: FileConfig =
            toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
                path: origin.to_string(),
                source,
            })?;

        let default = Self::default();
        let text_engine = match file.text_engine {
            Some(engine) => engine.parse::<TextEngine>()?,
            None => default.text_engine,
        };

        Ok(Self {
            max_workers: file.max_workers.or(default.max_workers),
            input_folder: file.input_folder.unwrap_or(default.input_folder),
            output_file: file.output_file.unwrap_or(default.output_file),
            json_output_file: file.json_output_file.or(default.json_output_file),
            notice_file: file.notice_file.unwrap_or(default.notice_file),
            output_log_file: file.output_log_file.unwrap_or(default.output_log_file),
            text_engine,
            pdftotext_path: file.pdftotext_path.unwrap_or(default.pdftotext_path),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
        })
    }

    /// 从 TOML 文件加载配置
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// 设置了 EOB_CONFIG 时读取该文件，否则读取环境变量
    pub fn load() -> AppResult<Self> {
        match std::env::var("EOB_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path)),
            Err(_) => Self::from_env(),
        }
    }
}
