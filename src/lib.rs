//! # Course QA
//!
//! 面向课程目录的双语（阿拉伯语 / 英语）问答服务
//!
//! ## 架构设计
//!
//! ### ① 数据模型（Models）
//! - `models/` - 学年标签、课程记录、问答缓存、模型目录、补全接口数据结构
//! - `models/loaders` - JSON / TOML 文件加载
//!
//! ### ② 业务能力层（Services）
//! - `LevelDetector` - 从问题中识别学年
//! - `SectionExtractor` - 从语料中提取与学年相关的片段
//! - `CourseListFormatter` - 把课程行整理成分组、排序的本地化列表
//! - `QaMatcher` - 问答缓存的逐级匹配
//! - `CacheBuilder` - 离线生成问答缓存
//! - `DocumentStore` - 语料存储
//!
//! ### ③ 客户端（Clients）
//! - `CompletionClient` - 补全服务调用，带重试和错误分类
//!
//! ### ④ 流程层（Workflow）
//! - `QueryCtx` - 单个问题的上下文
//! - `QueryFlow` - 直接回答 / 缓存上下文 / 语料上下文 的决策
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator::App` - 初始化、单个与批量问答、构建缓存、健康检查

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ChatTransport, CompletionClient, HttpTransport, RetryPolicy};
pub use config::Config;
pub use error::{AppError, AppResult, CompletionError, CompletionErrorKind};
pub use models::{Document, LevelTag, Locale, ModelCatalog, QaCache};
pub use orchestrator::{App, BatchReport, ServiceStatus};
pub use services::{
    CacheBuilder, CourseListFormatter, LevelDetector, MatchResult, QaMatcher, SectionExtractor,
};
pub use workflow::{AnswerSource, ChatReply, QueryCtx, QueryFlow};
