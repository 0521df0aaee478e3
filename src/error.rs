use std::fmt;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 补全服务错误（重试后仍失败）
    Completion(CompletionError),
    /// 文件操作错误
    File(FileError),
    /// 配置错误
    Config(ConfigError),
}

impl AppError {
    /// 面向调用方的状态码
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Completion(e) => e.http_status(),
            _ => 500,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Completion(e) => write!(f, "补全服务错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Completion(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

/// 补全服务失败的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionErrorKind {
    /// 401：密钥无效或额度用尽
    Authentication,
    /// 429
    RateLimited,
    /// 5xx
    Unavailable,
    /// 其他非 200 响应
    Upstream,
    /// 连接失败、超时等网络层错误
    Transport,
    /// 200 但响应体无法解析
    InvalidResponse,
}

/// 补全服务错误：分类 + 原始状态码 + 可展示给用户的消息
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status})")]
pub struct CompletionError {
    pub kind: CompletionErrorKind,
    /// 上游返回的状态码；网络层错误为 0
    pub status: u16,
    pub message: String,
}

impl CompletionError {
    pub fn new(kind: CompletionErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::Transport, 0, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::InvalidResponse, 200, message)
    }

    /// 是否值得重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            CompletionErrorKind::Transport
                | CompletionErrorKind::RateLimited
                | CompletionErrorKind::Unavailable
        )
    }

    /// 映射到调用方应返回的状态码
    pub fn http_status(&self) -> u16 {
        match self.kind {
            CompletionErrorKind::Authentication => 401,
            CompletionErrorKind::RateLimited => 429,
            CompletionErrorKind::Unavailable | CompletionErrorKind::Transport => 503,
            CompletionErrorKind::InvalidResponse => 500,
            CompletionErrorKind::Upstream => self.status,
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 文件不存在
    NotFound { path: String },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::NotFound { path } => write!(f, "文件不存在: {}", path),
        }
    }
}

impl std::error::Error for FileError {}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 模型目录中没有可用的模型
    NoModelAvailable,
    /// 构建 HTTP 客户端失败
    HttpClientBuildFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoModelAvailable => write!(f, "模型目录为空，没有可用的模型"),
            ConfigError::HttpClientBuildFailed { source } => {
                write!(f, "构建 HTTP 客户端失败: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::HttpClientBuildFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<CompletionError> for AppError {
    fn from(err: CompletionError) -> Self {
        AppError::Completion(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件不存在错误
    pub fn file_not_found(path: impl Into<String>) -> Self {
        AppError::File(FileError::NotFound { path: path.into() })
    }

    /// 创建 HTTP 客户端构建错误
    pub fn http_client_build_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Config(ConfigError::HttpClientBuildFailed {
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_error_status_mapping() {
        let auth = CompletionError::new(CompletionErrorKind::Authentication, 401, "x");
        assert_eq!(auth.http_status(), 401);
        assert!(!auth.is_retryable());

        let unavailable = CompletionError::new(CompletionErrorKind::Unavailable, 502, "x");
        assert_eq!(unavailable.http_status(), 503);
        assert!(unavailable.is_retryable());

        let upstream = CompletionError::new(CompletionErrorKind::Upstream, 404, "x");
        assert_eq!(upstream.http_status(), 404);
        assert!(!upstream.is_retryable());

        assert!(CompletionError::transport("reset").is_retryable());
        assert_eq!(CompletionError::invalid_response("bad json").http_status(), 500);
    }

    #[test]
    fn test_app_error_wraps_completion() {
        let err: AppError = CompletionError::new(
            CompletionErrorKind::RateLimited,
            429,
            "Rate limit exceeded. Please try again later.",
        )
        .into();
        assert_eq!(err.http_status(), 429);
        assert!(err.to_string().contains("Rate limit exceeded"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_file_and_config_errors_are_internal() {
        let file = AppError::file_not_found("questions.txt");
        assert_eq!(file.http_status(), 500);
        assert!(file.to_string().contains("questions.txt"));

        let config = AppError::Config(ConfigError::NoModelAvailable);
        assert_eq!(config.http_status(), 500);
        assert!(std::error::Error::source(&config).is_some());
    }
}
