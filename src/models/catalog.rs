use serde::{Deserialize, Serialize};

/// 可用模型的描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// 补全服务使用的模型 ID，例如 `openai/gpt-4-turbo`
    pub id: String,
    pub context_length: u32,
    #[serde(default)]
    pub description: String,
}

/// 模型别名表
///
/// TOML 格式：
/// ```toml
/// [[models]]
/// alias = "gpt-3.5"
/// id = "openai/gpt-3.5-turbo"
/// context_length = 16000
/// description = "GPT-3.5 Turbo - Fast and economical"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub alias: String,
    #[serde(flatten)]
    pub info: ModelInfo,
}

/// 兜底别名
pub const FALLBACK_MODEL_ALIAS: &str = "gpt-3.5";

impl ModelCatalog {
    pub fn get(&self, alias: &str) -> Option<&ModelInfo> {
        self.models
            .iter()
            .find(|entry| entry.alias == alias)
            .map(|entry| &entry.info)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// 解析请求的模型
    ///
    /// 顺序：请求的别名 → 默认别名 → `gpt-3.5` → 表中第一项
    pub fn resolve(&self, requested: Option<&str>, default_alias: &str) -> Option<(&str, &ModelInfo)> {
        let candidates = requested
            .into_iter()
            .chain([default_alias, FALLBACK_MODEL_ALIAS]);
        for alias in candidates {
            if let Some(entry) = self.models.iter().find(|entry| entry.alias == alias) {
                return Some((entry.alias.as_str(), &entry.info));
            }
        }
        self.models
            .first()
            .map(|entry| (entry.alias.as_str(), &entry.info))
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        let entry = |alias: &str, id: &str, context_length: u32, description: &str| ModelEntry {
            alias: alias.to_string(),
            info: ModelInfo {
                id: id.to_string(),
                context_length,
                description: description.to_string(),
            },
        };
        Self {
            models: vec![
                entry(
                    "gpt-4",
                    "openai/gpt-4-turbo",
                    128000,
                    "GPT-4 Turbo - Most powerful model for complex tasks",
                ),
                entry(
                    "claude-3",
                    "anthropic/claude-3-opus",
                    100000,
                    "Claude 3 Opus - Advanced reasoning capabilities",
                ),
                entry(
                    "mixtral",
                    "mistralai/mixtral-8x7b-instruct",
                    32000,
                    "Mixtral 8x7B - Fast and capable open model",
                ),
                entry(
                    "qwen",
                    "qwen/qwen-2-72b-instruct",
                    32768,
                    "Qwen 2 72B - Advanced Chinese/English model",
                ),
                entry(
                    "gpt-3.5",
                    "openai/gpt-3.5-turbo",
                    16000,
                    "GPT-3.5 Turbo - Fast and economical",
                ),
            ],
        }
    }
}
