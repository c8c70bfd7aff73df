use crate::models::DocumentHandle;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 读取单个文件为 DocumentHandle，显示名取文件名
pub async fn load_document(path: &Path) -> Result<DocumentHandle> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("无法读取文件: {}", path.display()))?;

    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    Ok(DocumentHandle::new(name, bytes))
}

/// 从文件夹中加载所有指定扩展名的文件
///
/// 结果按文件名排序；单个文件读取失败只记录警告
pub async fn load_all_documents(folder_path: &str, extension: &str) -> Result<Vec<DocumentHandle>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            paths.push(path);
        }
    }
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        match load_document(&path).await {
            Ok(doc) => {
                tracing::info!("正在加载: {} ({} 字节)", doc.name, doc.len());
                documents.push(doc);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(documents)
}

/// 加载文件夹中的所有 PDF
pub async fn load_all_pdfs(folder_path: &str) -> Result<Vec<DocumentHandle>> {
    load_all_documents(folder_path, "pdf").await
}
