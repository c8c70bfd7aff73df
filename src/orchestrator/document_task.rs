//! 单文档任务
//!
//! 1. 把文档字节写入一个只属于本任务的临时文件
//! 2. 用该路径调用提取函数
//! 3. 无论成功失败都删除临时文件（尽力而为）
//! 4. 返回记录或错误
//!
//! 临时文件由 `TempDocument` 持有，即使提取函数 panic 也会在 drop 时删除。

use crate::error::{AppResult, FileError};
use crate::extraction::Extractor;
use crate::models::{DocumentHandle, ExtractionRecord};
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::TempPath;
use tracing::debug;

/// 任务私有的临时文件
#[derive(Debug)]
pub struct TempDocument {
    path: TempPath,
}

impl TempDocument {
    /// 将文档写入唯一命名的临时文件
    ///
    /// `dir` 为 None 时使用系统临时目录
    pub fn materialize(doc: &DocumentHandle, dir: Option<&Path>) -> AppResult<Self> {
        let suffix = Path::new(&doc.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_else(|| ".pdf".to_string());

        let mut builder = tempfile::Builder::new();
        builder.prefix("eob-").suffix(&suffix);

        let created = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        let mut file = created.map_err(|source| FileError::TempFileFailed { source })?;

        if let Err(source) = file.write_all(doc.bytes()).and_then(|_| file.flush()) {
            return Err(FileError::WriteFailed {
                path: file.path().display().to_string(),
                source,
            }
            .into());
        }

        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 删除临时文件
    ///
    /// 删除失败（已不存在、无权限等）只记 debug 日志，不向上报告
    pub fn release(self) {
        let path_text = self.path.display().to_string();
        match self.path.close() {
            Ok(()) => debug!("临时文件已删除: {}", path_text),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
                debug!("临时文件删除跳过 ({}): {}", path_text, e)
            }
            Err(e) => debug!("临时文件删除失败，忽略 ({}): {}", path_text, e),
        }
    }
}

/// 处理单个文档
pub fn process_single_document(
    doc: &DocumentHandle,
    extractor: &dyn Extractor,
    temp_dir: Option<&Path>,
) -> AppResult<Option<ExtractionRecord>> {
    let temp = TempDocument::materialize(doc, temp_dir)?;
    debug!("[{}] 临时文件: {}", doc.name, temp.path().display());

    let result = extractor.extract(temp.path());
    temp.release();
    result
}
