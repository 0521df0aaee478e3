//! 语料文档存储
//!
//! 服务只需要「列出全部文档」和「写入文档」两个能力，
//! 具体存在内存还是磁盘目录由实现决定。

use crate::models::Document;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 按稳定顺序列出全部文档
    async fn list_documents(&self) -> Result<Vec<Document>>;

    /// 写入文档，已存在同 id 的文档时原位替换
    async fn upsert(&self, document: Document) -> Result<()>;
}

/// 内存文档存储，保持插入顺序
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_documents(&self) -> Result<Vec<Document>> {
        Ok(self.documents.read().await.clone())
    }

    async fn upsert(&self, document: Document) -> Result<()> {
        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => existing.content = document.content,
            None => documents.push(document),
        }
        Ok(())
    }
}

/// 目录文档存储：每个 `.txt` 文件是一篇文档，文件名（不含扩展名）为 id
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    folder: PathBuf,
}

impl FsDocumentStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn list_documents(&self) -> Result<Vec<Document>> {
        if !self.folder.exists() {
            warn!("语料目录不存在: {}", self.folder.display());
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&self.folder)
            .await
            .with_context(|| format!("无法读取语料目录: {}", self.folder.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("txt") {
                paths.push(path);
            }
        }
        // 按文件名排序，保证语料拼接顺序稳定
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)
                .await
                .with_context(|| format!("无法读取文档: {}", path.display()))?;
            debug!("读取文档 {} ({} 字符)", id, content.chars().count());
            documents.push(Document::new(id, content));
        }

        info!(
            "已从 {} 加载 {} 篇文档",
            self.folder.display(),
            documents.len()
        );
        Ok(documents)
    }

    async fn upsert(&self, document: Document) -> Result<()> {
        if !is_safe_id(&document.id) {
            bail!("非法的文档 id: {:?}", document.id);
        }
        fs::create_dir_all(&self.folder)
            .await
            .with_context(|| format!("无法创建语料目录: {}", self.folder.display()))?;
        let path = self.folder.join(format!("{}.txt", document.id));
        fs::write(&path, &document.content)
            .await
            .with_context(|| format!("无法写入文档: {}", path.display()))?;
        Ok(())
    }
}

/// 文档 id 直接作为文件名，不能为空，也不能包含路径分隔符或 `..`
fn is_safe_id(id: &str) -> bool {
    !id.is_empty() && !id.contains(['/', '\\']) && !id.contains("..")
}
