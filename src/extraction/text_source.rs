//! 文本来源 - PDF 转文本的边界
//!
//! 解析引擎本身不属于本 crate 的核心，这里只定义统一接口，
//! 并提供三种实现：进程内 lopdf、外部 pdftotext 进程、纯文本输入

use crate::error::{AppError, AppResult, ExtractionError};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// PDF 转文本接口
///
/// 返回 `Ok(None)` 表示文档里没有任何可用文本
pub trait TextSource: Send + Sync {
    /// 引擎名称（用于日志）
    fn name(&self) -> &'static str;

    fn extract_text(&self, path: &Path) -> AppResult<Option<String>>;
}

/// 空白文本视为无内容
fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// 进程内 lopdf 解析
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfSource;

impl TextSource for LopdfSource {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract_text(&self, path: &Path) -> AppResult<Option<String>> {
        let doc = lopdf::Document::load(path)
            .map_err(|e| AppError::malformed_pdf(path.display().to_string(), e))?;

        let mut pages: Vec<u32> = doc.get_pages().keys().cloned().collect();
        pages.sort();

        let mut full_text = String::new();
        for page_num in &pages {
            let page_text = doc.extract_text(&[*page_num]).unwrap_or_default();
            full_text.push_str(&page_text);
            if !page_text.ends_with('\n') && !page_text.is_empty() {
                full_text.push('\n');
            }
        }

        debug!(
            "lopdf 提取 {} 字符，共 {} 页: {}",
            full_text.len(),
            pages.len(),
            path.display()
        );

        Ok(non_blank(full_text))
    }
}

/// 外部 pdftotext 进程
///
/// 每个文档在独立的操作系统进程中解析
#[derive(Debug, Clone)]
pub struct PdftotextSource {
    program: String,
}

impl PdftotextSource {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftotextSource {
    fn default() -> Self {
        Self::new("pdftotext")
    }
}

impl TextSource for PdftotextSource {
    fn name(&self) -> &'static str {
        "pdftotext"
    }

    fn extract_text(&self, path: &Path) -> AppResult<Option<String>> {
        let output = Command::new(&self.program)
            .arg("-layout")
            .arg(path)
            .arg("-")
            .output()
            .map_err(|source| ExtractionError::EngineSpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExtractionError::EngineFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        Ok(non_blank(text))
    }
}

/// 已经由外部服务解析好的纯文本
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn name(&self) -> &'static str {
        "text"
    }

    fn extract_text(&self, path: &Path) -> AppResult<Option<String>> {
        let bytes = std::fs::read(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let text = String::from_utf8(bytes).map_err(|_| ExtractionError::InvalidEncoding {
            path: path.display().to_string(),
        })?;
        Ok(non_blank(text))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object, Stream};

    /// 生成一个单页 PDF；`text` 为空时页面没有任何文字
    pub(crate) fn create_test_pdf(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let content = if text.is_empty() {
            String::new()
        } else {
            format!(
                "BT /F1 12 Tf 100 700 Td ({}) Tj ET",
                text.replace('\\', "\\\\")
                    .replace('(', "\\(")
                    .replace(')', "\\)")
            )
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", pages_id);
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_lopdf_extracts_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.pdf");
        std::fs::write(&path, create_test_pdf("Claim Number 12345")).unwrap();

        let text = LopdfSource.extract_text(&path).unwrap().expect("应当有文本");
        assert!(
            text.contains("Claim") || text.contains("12345"),
            "unexpected text: '{}'",
            text
        );
    }

    #[test]
    fn test_lopdf_blank_page_is_no_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.pdf");
        std::fs::write(&path, create_test_pdf("")).unwrap();

        assert!(LopdfSource.extract_text(&path).unwrap().is_none());
    }

    #[test]
    fn test_lopdf_corrupted_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a valid pdf file").unwrap();

        let err = LopdfSource.extract_text(&path).unwrap_err();
        assert!(matches!(
            err,
            AppError::Extraction(ExtractionError::MalformedPdf { .. })
        ));
    }

    #[test]
    fn test_plain_text_source() {
        let dir = tempfile::tempdir().unwrap();
        let ok = dir.path().join("ok.txt");
        let blank = dir.path().join("blank.txt");
        let bad = dir.path().join("bad.txt");
        std::fs::write(&ok, "Paid $1.00").unwrap();
        std::fs::write(&blank, "  \n\t ").unwrap();
        std::fs::write(&bad, [0xff, 0xfe, 0x00]).unwrap();

        assert_eq!(
            PlainTextSource.extract_text(&ok).unwrap().as_deref(),
            Some("Paid $1.00")
        );
        assert!(PlainTextSource.extract_text(&blank).unwrap().is_none());
        assert!(PlainTextSource.extract_text(&bad).is_err());
    }

    #[test]
    fn test_pdftotext_missing_binary() {
        let source = PdftotextSource::new("/no/such/pdftotext-binary");
        let err = source.extract_text(Path::new("x.pdf")).unwrap_err();
        assert!(matches!(
            err,
            AppError::Extraction(ExtractionError::EngineSpawnFailed { .. })
        ));
    }
}
