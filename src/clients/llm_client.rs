//! 补全服务客户端
//!
//! 分两层：
//! - [`ChatTransport`]：一次 HTTP 往返，负责请求头、超时和错误分类
//! - [`CompletionClient`]：在传输层之上实现有上限的指数退避重试
//!
//! 只有网络层错误、429 和 5xx 会重试；401 等其他错误立即返回。

use crate::config::Config;
use crate::error::{AppError, AppResult, CompletionError, CompletionErrorKind};
use crate::models::{ChatMessage, CompletionRequest, CompletionResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// 健康检查超时
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// 一次补全请求的传输
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// 发送请求；非 200 响应应已分类为 [`CompletionError`]
    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, CompletionError>;

    /// 服务是否可用
    async fn check_status(&self) -> bool;
}

/// 基于 reqwest 的 HTTP 传输
pub struct HttpTransport {
    http: Client,
    api_url: String,
    status_url: String,
    api_key: String,
    referer: String,
    app_title: String,
}

impl HttpTransport {
    /// 根据配置创建传输，请求超时取自 `request_timeout_secs`
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(AppError::http_client_build_failed)?;

        debug!("补全服务地址: {}", config.llm_api_url);
        debug!("使用 API 密钥: {}", config.masked_api_key());

        Ok(Self {
            http,
            api_url: config.llm_api_url.clone(),
            status_url: config.llm_status_url.clone(),
            api_key: config.llm_api_key.clone(),
            referer: config.llm_referer.clone(),
            app_title: config.llm_app_title.clone(),
        })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, CompletionError> {
        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.app_title)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("补全服务请求超时: {}", e);
                } else {
                    warn!("无法连接补全服务: {}", e);
                }
                CompletionError::transport(format!(
                    "Could not reach the completion service: {}",
                    e
                ))
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            CompletionError::transport(format!("Failed to read completion response: {}", e))
        })?;
        debug!("补全服务响应状态: {}", status);

        if status != 200 {
            return Err(classify_error(status, &body));
        }

        let parsed: CompletionResponse = serde_json::from_str(&body).map_err(|e| {
            CompletionError::invalid_response(format!(
                "Invalid response from completion service: {}",
                e
            ))
        })?;
        Ok(parsed)
    }

    async fn check_status(&self) -> bool {
        match self
            .http
            .get(&self.status_url)
            .timeout(STATUS_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                error!("❌ 无法连接补全服务: {}", e);
                false
            }
        }
    }
}

/// 把非 200 响应分类为带消息的错误
///
/// # 参数
/// - `status`: HTTP 状态码
/// - `body`: 响应体原文，401 时根据内容细化消息
pub fn classify_error(status: u16, body: &str) -> CompletionError {
    let lowered = body.to_lowercase();
    match status {
        401 => {
            let message = if lowered.contains("no auth credentials found") {
                "Authentication failed: API key not recognized. Please get a valid key from https://openrouter.ai/keys".to_string()
            } else if lowered.contains("exceed") || lowered.contains("limit") {
                "Authentication failed: Usage limits exceeded. Check your account at https://openrouter.ai".to_string()
            } else {
                format!("Authentication failed: {}", body)
            };
            CompletionError::new(CompletionErrorKind::Authentication, status, message)
        }
        429 => CompletionError::new(
            CompletionErrorKind::RateLimited,
            status,
            "Rate limit exceeded. Please try again later.",
        ),
        s if s >= 500 => CompletionError::new(
            CompletionErrorKind::Unavailable,
            status,
            "Completion service error. Please try again later.",
        ),
        _ => CompletionError::new(
            CompletionErrorKind::Upstream,
            status,
            format!("Error from completion service: {}", body),
        ),
    }
}

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 总尝试次数（含第一次）
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// 第 `retry` 次重试前的等待时间：`base * 2^(retry-1)`，不超过 `max_delay`，不少于 `base_delay`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
            .max(self.base_delay)
    }
}

/// 补全服务客户端，可在多个任务间共享
#[derive(Clone)]
pub struct CompletionClient {
    transport: Arc<dyn ChatTransport>,
    retry: RetryPolicy,
}

impl CompletionClient {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
        }
    }

    /// 使用 HTTP 传输创建客户端
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 发送补全请求
    ///
    /// # 参数
    /// - `messages`: 对话消息
    /// - `model_id`: 服务端模型 ID
    /// - `max_tokens`: 最大生成 token 数
    /// - `temperature`: 采样温度
    ///
    /// # 返回
    /// 成功时返回服务端响应；可重试的错误在用尽尝试次数后返回最后一次的错误
    pub async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        model_id: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<CompletionResponse, CompletionError> {
        let request = CompletionRequest {
            model: model_id.to_string(),
            messages,
            max_tokens,
            temperature,
        };

        let mut attempt = 1;
        loop {
            debug!("调用补全服务，模型: {} (第 {} 次)", model_id, attempt);
            match self.transport.send(&request).await {
                Ok(response) => {
                    match response.total_tokens() {
                        Some(tokens) => debug!("补全成功，使用 {} tokens", tokens),
                        None => debug!("补全成功"),
                    }
                    return Ok(response);
                }
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "⚠️ 补全服务调用失败 (第 {}/{} 次)，{:?} 后重试: {}",
                        attempt, self.retry.max_attempts, delay, err
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    error!("❌ 补全服务调用失败: {}", err);
                    return Err(err);
                }
            }
        }
    }

    /// 健康检查
    pub async fn check_status(&self) -> bool {
        self.transport.check_status().await
    }
}
