//! 待处理文档
//!
//! 上传方提供的一份 PDF：显示名 + 原始字节

use std::fmt;
use std::sync::Arc;

/// 文档句柄
///
/// 字节使用 `Arc<[u8]>` 共享，克隆进工作任务时不复制内容
#[derive(Clone)]
pub struct DocumentHandle {
    /// 显示名称（通常是上传时的文件名）
    pub name: String,
    bytes: Arc<[u8]>,
}

impl DocumentHandle {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::from(bytes.into()),
        }
    }

    /// 文档原始字节
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentHandle")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}
