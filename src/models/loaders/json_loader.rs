use crate::models::qa_cache::QaCache;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 加载问答缓存
///
/// 文件缺失、为空或格式错误都只会记录警告并返回空缓存，
/// 此时匹配器对所有问题都返回「未命中」。
pub async fn load_qa_cache(json_file_path: &Path) -> QaCache {
    match try_load_qa_cache(json_file_path).await {
        Ok(cache) => {
            if cache.is_empty() {
                tracing::warn!("问答缓存为空: {}", json_file_path.display());
            } else {
                tracing::info!(
                    "已加载 {} 条问答缓存: {}",
                    cache.len(),
                    json_file_path.display()
                );
            }
            cache
        }
        Err(e) => {
            tracing::warn!("加载问答缓存失败，使用空缓存: {:#}", e);
            QaCache::new()
        }
    }
}

async fn try_load_qa_cache(json_file_path: &Path) -> Result<QaCache> {
    if !json_file_path.exists() {
        anyhow::bail!("文件不存在: {}", json_file_path.display());
    }

    let content = fs::read_to_string(json_file_path)
        .await
        .with_context(|| format!("无法读取JSON文件: {}", json_file_path.display()))?;

    if content.trim().is_empty() {
        return Ok(QaCache::new());
    }

    let cache: QaCache = serde_json::from_str(&content)
        .with_context(|| format!("无法解析JSON文件: {}", json_file_path.display()))?;

    Ok(cache)
}

/// 保存问答缓存（保持插入顺序）
pub async fn save_qa_cache(cache: &QaCache, json_file_path: &Path) -> Result<()> {
    if let Some(parent) = json_file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("无法创建目录: {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(cache)?;
    fs::write(json_file_path, json)
        .await
        .with_context(|| format!("无法写入JSON文件: {}", json_file_path.display()))?;

    tracing::info!(
        "已保存 {} 条问答缓存到 {}",
        cache.len(),
        json_file_path.display()
    );
    Ok(())
}

/// 读取批量问题文件：每个非空行一个问题
pub async fn load_questions(file_path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(file_path)
        .await
        .with_context(|| format!("无法读取问题文件: {}", file_path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_cache_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = load_qa_cache(&dir.path().join("missing.json")).await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_cache_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_qa_cache(&path).await.is_empty());

        std::fs::write(&path, "   ").unwrap();
        assert!(load_qa_cache(&path).await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        let mut cache = QaCache::new();
        cache.insert("List the courses for year 2", "level 2 - CS201 OOP");
        cache.insert("ملخص المعلومات عن doc1", "content");
        save_qa_cache(&cache, &path).await.unwrap();

        let loaded = load_qa_cache(&path).await;
        let keys: Vec<&str> = loaded.keys().collect();
        assert_eq!(
            keys,
            vec!["list the courses for year 2", "ملخص المعلومات عن doc1"]
        );
    }

    #[tokio::test]
    async fn test_load_questions_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.txt");
        std::fs::write(&path, "first?\n\n  second?  \n").unwrap();
        let questions = load_questions(&path).await.unwrap();
        assert_eq!(questions, vec!["first?", "second?"]);
    }
}
