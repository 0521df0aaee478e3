/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- 补全服务配置 ---
    pub llm_api_key: String,
    /// 对话补全接口地址
    pub llm_api_url: String,
    /// 健康检查地址
    pub llm_status_url: String,
    /// 请求头 HTTP-Referer
    pub llm_referer: String,
    /// 请求头 X-Title
    pub llm_app_title: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    // --- 生成参数 ---
    /// 默认模型别名
    pub default_model: String,
    pub default_max_tokens: u32,
    pub default_temperature: f32,
    // --- 数据文件 ---
    /// 语料目录，每个 .txt 文件是一篇文档
    pub corpus_folder: String,
    /// 问答缓存 JSON 文件
    pub qa_cache_file: String,
    /// 模型目录 TOML 文件
    pub models_file: String,
    // --- 运行参数 ---
    /// 缓存命中置信度须超过该值才会使用
    pub match_threshold: f64,
    /// 批量模式下同时处理的问题数量
    pub max_concurrent_queries: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            llm_status_url: "https://openrouter.ai/api/v1/status".to_string(),
            llm_referer: "http://localhost".to_string(),
            llm_app_title: "College Chatbot".to_string(),
            request_timeout_secs: 60,
            default_model: "gpt-3.5".to_string(),
            default_max_tokens: 500,
            default_temperature: 0.7,
            corpus_folder: "data/documents".to_string(),
            qa_cache_file: "data/qa_cache.json".to_string(),
            models_file: "models.toml".to_string(),
            match_threshold: 0.3,
            max_concurrent_queries: 8,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_url: std::env::var("LLM_API_URL").unwrap_or(default.llm_api_url),
            llm_status_url: std::env::var("LLM_STATUS_URL").unwrap_or(default.llm_status_url),
            llm_referer: std::env::var("LLM_REFERER").unwrap_or(default.llm_referer),
            llm_app_title: std::env::var("LLM_APP_TITLE").unwrap_or(default.llm_app_title),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            default_model: std::env::var("DEFAULT_MODEL").unwrap_or(default.default_model),
            default_max_tokens: std::env::var("DEFAULT_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_max_tokens),
            default_temperature: std::env::var("DEFAULT_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_temperature),
            corpus_folder: std::env::var("CORPUS_FOLDER").unwrap_or(default.corpus_folder),
            qa_cache_file: std::env::var("QA_CACHE_FILE").unwrap_or(default.qa_cache_file),
            models_file: std::env::var("MODELS_FILE").unwrap_or(default.models_file),
            match_threshold: std::env::var("MATCH_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(default.match_threshold),
            max_concurrent_queries: std::env::var("MAX_CONCURRENT_QUERIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_queries),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// 打码后的密钥，只保留首尾各 4 个字符
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.llm_api_key.chars().collect();
        if chars.len() <= 8 {
            return "****".to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
