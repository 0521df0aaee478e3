//! 问答上下文
//!
//! 封装「正在处理第几个问题、用什么参数」这一信息

use crate::config::Config;
use std::fmt::Display;

/// 单个问题的处理上下文
#[derive(Debug, Clone)]
pub struct QueryCtx {
    /// 问题序号（从1开始，仅用于日志显示）
    pub index: usize,

    /// 用户问题原文
    pub message: String,

    /// 请求的模型别名，`None` 时使用默认模型
    pub model: Option<String>,

    pub max_tokens: u32,

    pub temperature: f32,

    /// 会话 ID，原样带回
    pub conversation_id: Option<String>,
}

impl QueryCtx {
    /// 使用配置中的默认生成参数创建上下文
    pub fn new(index: usize, message: impl Into<String>, config: &Config) -> Self {
        Self {
            index,
            message: message.into(),
            model: None,
            max_tokens: config.default_max_tokens,
            temperature: config.default_temperature,
            conversation_id: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        if let Some(max_tokens) = max_tokens {
            self.max_tokens = max_tokens;
        }
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        if let Some(temperature) = temperature {
            self.temperature = temperature;
        }
        self
    }

    pub fn with_conversation_id(mut self, conversation_id: Option<String>) -> Self {
        self.conversation_id = conversation_id;
        self
    }
}

impl Display for QueryCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[问题 {}]", self.index)
    }
}
