use crate::models::catalog::ModelCatalog;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载模型别名表
///
/// 文件不存在时使用内置的默认别名表。
pub async fn load_model_catalog(toml_file_path: &Path) -> Result<ModelCatalog> {
    if !toml_file_path.exists() {
        tracing::info!(
            "未找到模型配置文件 {}，使用内置模型列表",
            toml_file_path.display()
        );
        return Ok(ModelCatalog::default());
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let catalog: ModelCatalog = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    if catalog.is_empty() {
        tracing::warn!(
            "模型配置文件 {} 中没有任何模型，使用内置模型列表",
            toml_file_path.display()
        );
        return Ok(ModelCatalog::default());
    }

    tracing::info!("成功加载 {} 个模型别名", catalog.models.len());
    Ok(catalog)
}
