//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：加载语料、问答缓存、模型目录，创建补全服务客户端
//! 2. **单个问答**：委托 [`QueryFlow`] 处理
//! 3. **批量问答**：使用 Semaphore 限制并发，每个问题一个 tokio 任务
//! 4. **离线构建**：从语料生成问答缓存
//! 5. **健康检查**：补全服务是否可用
//!
//! 语料、缓存和客户端在初始化后只读，通过 `Arc` 在任务间共享。

use crate::clients::CompletionClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{corpus_text, load_model_catalog, load_qa_cache, save_qa_cache, Document, ModelCatalog, QaCache};
use crate::services::{CacheBuilder, DocumentStore, FsDocumentStore};
use crate::utils::logging;
use crate::workflow::{ChatReply, QueryCtx, QueryFlow};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    documents: Vec<Document>,
    cache_entries: usize,
    client: CompletionClient,
    flow: Arc<QueryFlow>,
}

impl App {
    /// 从配置中的文件和目录初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let store = FsDocumentStore::new(&config.corpus_folder);
        let client = CompletionClient::from_config(&config).context("无法创建补全服务客户端")?;
        Self::load(config, &store, client).await
    }

    /// 从指定的文档存储加载语料，问答缓存和模型目录仍读取配置中的文件
    pub async fn load(config: Config, store: &dyn DocumentStore, client: CompletionClient) -> Result<Self> {
        let documents = store.list_documents().await.context("无法加载语料")?;
        if documents.is_empty() {
            warn!("⚠️ 语料为空，只能依靠问答缓存和通用知识回答");
        }

        let cache = load_qa_cache(Path::new(&config.qa_cache_file)).await;
        let catalog = load_model_catalog(Path::new(&config.models_file)).await?;

        Ok(Self::from_parts(config, documents, cache, catalog, client))
    }

    /// 由已加载的组件直接组装应用
    pub fn from_parts(
        config: Config,
        documents: Vec<Document>,
        cache: QaCache,
        catalog: ModelCatalog,
        client: CompletionClient,
    ) -> Self {
        logging::log_startup(documents.len(), cache.len(), config.max_concurrent_queries);

        let cache_entries = cache.len();
        let flow = QueryFlow::new(
            &config,
            Arc::new(corpus_text(&documents)),
            Arc::new(cache),
            Arc::new(catalog),
            client.clone(),
        );

        Self {
            config,
            documents,
            cache_entries,
            client,
            flow: Arc::new(flow),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 回答单个问题
    pub async fn ask(&self, ctx: &QueryCtx) -> AppResult<ChatReply> {
        self.flow.run(ctx).await
    }

    /// 并发回答一组问题，结果顺序与输入一致
    ///
    /// # 参数
    /// - `questions`: 问题列表
    ///
    /// # 返回
    /// 每个问题的结果以及成功/失败统计
    pub async fn ask_batch(&self, questions: Vec<String>) -> Result<BatchReport> {
        let total = questions.len();
        let max_concurrent = self.config.max_concurrent_queries.max(1);
        let log_file = self.config.output_log_file.clone();

        if !log_file.is_empty() {
            logging::init_log_file(&log_file)?;
        }
        logging::log_batch_start(total, max_concurrent);

        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let mut handles = Vec::with_capacity(total);

        for (idx, question) in questions.iter().enumerate() {
            let permit = semaphore.clone().acquire_owned().await?;
            let ctx = QueryCtx::new(idx + 1, question.clone(), &self.config);
            let flow = Arc::clone(&self.flow);

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = flow.run(&ctx).await;
                if let Err(e) = &result {
                    error!("{} ❌ 处理过程中发生错误: {}", ctx, e);
                }
                result
            });
            handles.push(handle);
        }

        let mut report = BatchReport {
            total,
            ..Default::default()
        };

        let results = futures::future::join_all(handles).await;
        for (idx, (question, joined)) in questions.into_iter().zip(results).enumerate() {
            let outcome = match joined {
                Ok(Ok(reply)) => {
                    report.success += 1;
                    BatchOutcome::Answered(reply)
                }
                Ok(Err(e)) => {
                    report.failed += 1;
                    BatchOutcome::Failed {
                        status: e.http_status(),
                        message: failure_message(&e),
                    }
                }
                Err(e) => {
                    error!("[问题 {}] 任务执行失败: {}", idx + 1, e);
                    report.failed += 1;
                    BatchOutcome::Failed {
                        status: 500,
                        message: e.to_string(),
                    }
                }
            };

            if !log_file.is_empty() {
                if let Err(e) = logging::append_log_entry(&log_file, idx + 1, &question, &outcome.summary()) {
                    warn!("写入日志文件失败: {:#}", e);
                }
            }
            report.items.push(BatchItem { question, outcome });
        }

        logging::log_batch_complete(report.success, total);
        logging::print_final_stats(report.success, report.failed, total, &log_file);
        Ok(report)
    }

    /// 从已加载的语料生成问答缓存并写入文件
    ///
    /// # 返回
    /// 生成的问答条数
    pub async fn build_cache(&self, output: &Path) -> Result<usize> {
        info!("🔧 正在从 {} 篇文档生成问答缓存...", self.documents.len());
        let cache = CacheBuilder::new().build(&self.documents);
        save_qa_cache(&cache, output).await?;
        Ok(cache.len())
    }

    /// 健康检查
    pub async fn status(&self) -> ServiceStatus {
        let completion_available = self.client.check_status().await;
        if completion_available {
            info!("✅ 补全服务可用");
        } else {
            warn!("⚠️ 补全服务不可用");
        }
        ServiceStatus {
            completion_available,
            documents: self.documents.len(),
            cache_entries: self.cache_entries,
        }
    }
}

/// 只暴露分类后的消息，不带状态码等内部细节
fn failure_message(e: &crate::error::AppError) -> String {
    match e {
        crate::error::AppError::Completion(c) => c.message.clone(),
        other => other.to_string(),
    }
}

/// 健康检查结果
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ServiceStatus {
    pub completion_available: bool,
    pub documents: usize,
    pub cache_entries: usize,
}

/// 单个问题的批处理结果
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum BatchOutcome {
    Answered(ChatReply),
    Failed { status: u16, message: String },
}

impl BatchOutcome {
    fn summary(&self) -> String {
        match self {
            BatchOutcome::Answered(reply) => format!("[{}] {}", reply.model, reply.response),
            BatchOutcome::Failed { status, message } => format!("[失败 {}] {}", status, message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BatchItem {
    pub question: String,
    pub outcome: BatchOutcome,
}

/// 批处理统计
#[derive(Debug, Default, serde::Serialize)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}
