use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 文本提取 / 字段解析错误
    #[error("提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 整批文档都没有产出有效记录
    #[error("No valid data extracted from PDFs")]
    NoValidData,
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 创建临时文件失败
    #[error("创建临时文件失败: {source}")]
    TempFileFailed {
        #[source]
        source: std::io::Error,
    },
    /// 生成 xlsx 报表失败
    #[error("写入报表失败 ({path}): {source}")]
    SpreadsheetFailed {
        path: String,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

/// 文本提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// PDF 解析失败（文件损坏或格式异常）
    #[error("PDF解析失败 ({path}): {message}")]
    MalformedPdf { path: String, message: String },
    /// 外部解析进程启动失败
    #[error("无法启动外部解析程序 {program}: {source}")]
    EngineSpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// 外部解析进程返回非零状态
    #[error("外部解析程序 {program} 执行失败 (状态: {status}): {stderr}")]
    EngineFailed {
        program: String,
        status: String,
        stderr: String,
    },
    /// 文本不是合法的 UTF-8
    #[error("文本编码无效 ({path})")]
    InvalidEncoding { path: String },
    /// 金额字段无法解析
    #[error("无法解析金额 {field}: {value}")]
    InvalidAmount { field: String, value: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 未知的文本提取引擎
    #[error("未知的文本提取引擎: {0}")]
    UnknownTextEngine(String),
    /// 环境变量的值无法解析
    #[error("环境变量 {name} 的值无效: {value}")]
    InvalidEnvVar { name: String, value: String },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Other(format!("正则表达式编译失败: {}", err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建 PDF 解析错误
    pub fn malformed_pdf(path: impl Into<String>, message: impl ToString) -> Self {
        AppError::Extraction(ExtractionError::MalformedPdf {
            path: path.into(),
            message: message.to_string(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
