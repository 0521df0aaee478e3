//! 问答流程 - 流程层
//!
//! 核心职责：定义「一个问题」的完整处理流程
//!
//! 流程顺序：
//! 1. 课程列表问题 → 学年识别 → 段落提取 → 格式化，直接回答
//! 2. 问答缓存命中 → 缓存答案作为上下文 → 补全服务
//! 3. 语料片段作为上下文 → 补全服务（兜底）

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clients::CompletionClient;
use crate::config::Config;
use crate::error::{AppError, AppResult, CompletionError, CompletionErrorKind, ConfigError};
use crate::models::catalog::FALLBACK_MODEL_ALIAS;
use crate::models::{ChatMessage, CompletionResponse, Locale, ModelCatalog, QaCache};
use crate::services::{CourseListFormatter, LevelDetector, MatchResult, QaMatcher, SectionExtractor};
use crate::utils::truncate_text;
use crate::workflow::query_ctx::QueryCtx;

/// 课程列表类问题的关键词
pub const COURSE_KEYWORDS: &[&str] = &["مواد", "المقررات", "courses", "subjects"];

/// 直接回答时报告的模型名
pub const COURSE_CATALOG_MODEL: &str = "course-catalog";

/// 注入到提示词中的语料片段最大字符数
pub const DOCUMENT_CONTEXT_MAX_CHARS: usize = 6000;

const BASE_SYSTEM_PROMPT: &str = "You are a helpful assistant for the university that provides accurate information on \
university courses, academic subjects, and general knowledge. \
Always respond in the same language as the user's query.";

/// 回答来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum AnswerSource {
    /// 由语料中的课程列表直接生成
    CourseCatalog,
    /// 课程问题未指明学年，请用户补充
    ClarifyYear,
    /// 补全服务 + 问答缓存上下文
    CachedContext,
    /// 补全服务 + 语料片段上下文
    DocumentContext,
    /// 补全服务，无额外上下文
    GeneralKnowledge,
}

/// 单个问题的回答
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ChatReply {
    pub response: String,
    pub model: String,
    pub tokens_used: Option<u64>,
    pub conversation_id: Option<String>,
    pub source: AnswerSource,
}

/// 问答流程
///
/// - 持有只读的语料、问答缓存、模型目录（`Arc` 共享）
/// - 决定直接回答还是转交补全服务
/// - 不持有可变状态，可在多个任务间共享
#[derive(Clone)]
pub struct QueryFlow {
    detector: LevelDetector,
    extractor: SectionExtractor,
    formatter: CourseListFormatter,
    matcher: QaMatcher,
    corpus: Arc<String>,
    cache: Arc<QaCache>,
    catalog: Arc<ModelCatalog>,
    client: CompletionClient,
    default_model: String,
    match_threshold: f64,
}

impl QueryFlow {
    /// 创建问答流程
    ///
    /// # 参数
    /// - `corpus`: 全部语料拼接后的文本
    /// - `cache`: 问答缓存
    /// - `catalog`: 模型目录
    /// - `client`: 补全服务客户端
    pub fn new(
        config: &Config,
        corpus: Arc<String>,
        cache: Arc<QaCache>,
        catalog: Arc<ModelCatalog>,
        client: CompletionClient,
    ) -> Self {
        let detector = LevelDetector::new();
        Self {
            detector,
            extractor: SectionExtractor::new(detector),
            formatter: CourseListFormatter::new(),
            matcher: QaMatcher::new(),
            corpus,
            cache,
            catalog,
            client,
            default_model: config.default_model.clone(),
            match_threshold: config.match_threshold,
        }
    }

    pub async fn run(&self, ctx: &QueryCtx) -> AppResult<ChatReply> {
        let query = ctx.message.as_str();
        let locale = Locale::detect(query);
        debug!("{} 问题: {}", ctx, truncate_text(query, 80));

        // ========== 流程 1: 课程列表 ==========
        if is_course_query(query) {
            match self.detector.detect(query) {
                Some(level) => {
                    let lines = self.extractor.course_lines(&self.corpus, level);
                    if !lines.is_empty() {
                        info!("{} 📚 {} 课程列表命中 {} 行，直接回答", ctx, level, lines.len());
                        let response = self.formatter.format(&lines, level, locale);
                        let context = lines.join("\n");
                        return Ok(self.direct_reply(
                            ctx,
                            response,
                            word_count(&context) + word_count(query),
                            AnswerSource::CourseCatalog,
                        ));
                    }
                    info!("{} 语料中没有 {} 的课程列表，转交补全服务", ctx, level);
                }
                None => {
                    info!("{} 课程问题未指明学年", ctx);
                    return Ok(self.direct_reply(
                        ctx,
                        locale.specify_year().to_string(),
                        word_count(query),
                        AnswerSource::ClarifyYear,
                    ));
                }
            }
        }

        // ========== 流程 2: 问答缓存 ==========
        let matched = self.matcher.find_best_match(query, &self.cache);
        let cached_answer = self.accepted_answer(&matched);

        let mut system_prompt = BASE_SYSTEM_PROMPT.to_string();
        let source = if let Some(answer) = cached_answer {
            info!(
                "{} 🗂️ 问答缓存命中 (置信度 {:.2}): {:?}",
                ctx, matched.confidence, matched.matched_key
            );
            system_prompt.push_str(&cached_context_prompt(answer));
            AnswerSource::CachedContext
        } else if !self.corpus.trim().is_empty() {
            // ========== 流程 3: 语料片段 ==========
            let excerpt = self.extractor.extract(&self.corpus, query);
            debug!("{} 注入语料片段 ({} 字符)", ctx, excerpt.chars().count());
            system_prompt.push_str(&document_context_prompt(&truncate_text(
                &excerpt,
                DOCUMENT_CONTEXT_MAX_CHARS,
            )));
            AnswerSource::DocumentContext
        } else {
            info!("{} 没有可用的上下文，使用通用知识回答", ctx);
            AnswerSource::GeneralKnowledge
        };

        let messages = vec![ChatMessage::system(system_prompt), ChatMessage::user(query)];
        let (model_id, response) = self.complete_with_fallback(ctx, messages).await?;

        let content = response.content().ok_or_else(|| {
            AppError::Completion(CompletionError::invalid_response(
                "Invalid response from completion service",
            ))
        })?;

        let model = match source {
            AnswerSource::CachedContext => {
                format!("cached-answer (confidence: {:.2})", matched.confidence)
            }
            _ => response.model.clone().unwrap_or(model_id),
        };

        Ok(ChatReply {
            response: content.to_string(),
            model,
            tokens_used: response.total_tokens(),
            conversation_id: ctx.conversation_id.clone(),
            source,
        })
    }

    /// 置信度超过阈值时返回缓存答案
    fn accepted_answer(&self, matched: &MatchResult) -> Option<&str> {
        if matched.confidence <= self.match_threshold {
            return None;
        }
        matched
            .matched_key
            .as_deref()
            .and_then(|key| self.cache.get(key))
    }

    /// 调用补全服务；请求的模型被上游拒绝时改用兜底模型再试一次
    async fn complete_with_fallback(
        &self,
        ctx: &QueryCtx,
        messages: Vec<ChatMessage>,
    ) -> AppResult<(String, CompletionResponse)> {
        let (alias, info) = self
            .catalog
            .resolve(ctx.model.as_deref(), &self.default_model)
            .ok_or(AppError::Config(ConfigError::NoModelAvailable))?;
        info!("{} 使用模型: {} -> {}", ctx, alias, info.id);

        let first = self
            .client
            .complete(messages.clone(), &info.id, ctx.max_tokens, ctx.temperature)
            .await;

        match first {
            Ok(response) => Ok((info.id.clone(), response)),
            Err(err) if err.kind == CompletionErrorKind::Upstream && alias != FALLBACK_MODEL_ALIAS => {
                let Some(fallback) = self.catalog.get(FALLBACK_MODEL_ALIAS) else {
                    return Err(err.into());
                };
                warn!(
                    "{} ⚠️ 模型 {} 调用失败，改用 {} -> {}: {}",
                    ctx, alias, FALLBACK_MODEL_ALIAS, fallback.id, err
                );
                let response = self
                    .client
                    .complete(messages, &fallback.id, ctx.max_tokens, ctx.temperature)
                    .await?;
                Ok((fallback.id.clone(), response))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn direct_reply(&self, ctx: &QueryCtx, response: String, tokens: u64, source: AnswerSource) -> ChatReply {
        ChatReply {
            response,
            model: COURSE_CATALOG_MODEL.to_string(),
            tokens_used: Some(tokens),
            conversation_id: ctx.conversation_id.clone(),
            source,
        }
    }
}

/// 问题是否在询问课程列表
pub fn is_course_query(query: &str) -> bool {
    let lowered = query.to_lowercase();
    COURSE_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

fn cached_context_prompt(answer: &str) -> String {
    format!(
        "\n\nThe following information is relevant to the user's query: \n{}\n\n\
         Use this information to provide a comprehensive answer. Don't mention that this information \
         was retrieved from a database. Structure your response in a natural, conversational way. \
         If the query is in Arabic, respond in Arabic, otherwise respond in English.",
        answer
    )
}

fn document_context_prompt(excerpt: &str) -> String {
    format!(
        "\n\nRelevant excerpt from the university documents:\n{}\n\n\
         Answer from this excerpt when it covers the question. If it does not, say that the \
         information is not available in the documents.",
        excerpt
    )
}
