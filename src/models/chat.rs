//! 对话补全接口的数据结构
//!
//! 请求：`{model, messages: [{role, content}], max_tokens, temperature}`
//! 响应：`{choices: [{message: {content}}], usage: {total_tokens}}`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// 发送给补全服务的请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: CompletionMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

/// 补全服务的响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
    /// 服务端实际使用的模型
    #[serde(default)]
    pub model: Option<String>,
}

impl CompletionResponse {
    /// 构造只有一条回复内容的响应
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            choices: vec![CompletionChoice {
                message: CompletionMessage {
                    content: Some(content.into()),
                },
            }],
            usage: None,
            model: None,
        }
    }

    /// 第一条回复的内容
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }

    pub fn total_tokens(&self) -> Option<u64> {
        self.usage.as_ref().and_then(|usage| usage.total_tokens)
    }
}
