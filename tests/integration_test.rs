use async_trait::async_trait;
use course_qa::clients::{classify_error, ChatTransport, CompletionClient, RetryPolicy};
use course_qa::config::Config;
use course_qa::error::{AppError, CompletionError, CompletionErrorKind};
use course_qa::models::{CompletionRequest, CompletionResponse, Document};
use course_qa::orchestrator::{App, BatchOutcome};
use course_qa::services::MemoryDocumentStore;
use course_qa::workflow::{AnswerSource, QueryCtx};
use course_qa::logger;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const CATALOG: &str = "level 1 - CS101 Intro\nlevel 2 - CS201 OOP";

/// 按脚本返回结果的传输，脚本用完后一律成功
#[derive(Default)]
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<CompletionResponse, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedTransport {
    fn with_script(script: Vec<Result<CompletionResponse, CompletionError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CompletionResponse::with_content("llm answer")))
    }

    async fn check_status(&self) -> bool {
        true
    }
}

fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.qa_cache_file = dir.join("qa_cache.json").display().to_string();
    config.models_file = dir.join("models.toml").display().to_string();
    config.output_log_file = dir.join("run.log").display().to_string();
    config.max_concurrent_queries = 2;
    config
}

fn client(transport: Arc<ScriptedTransport>) -> CompletionClient {
    CompletionClient::new(transport).with_retry(RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(10),
    })
}

async fn app(config: Config, transport: Arc<ScriptedTransport>) -> App {
    let store = MemoryDocumentStore::with_documents(vec![Document::new("catalog", CATALOG)]);
    App::load(config, &store, client(transport))
        .await
        .expect("初始化应用失败")
}

#[tokio::test]
async fn test_level_one_courses_answered_from_corpus() {
    logger::init(false);
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::with_script(Vec::new());
    let app = app(test_config(dir.path()), transport.clone()).await;

    let ctx = QueryCtx::new(1, "What are the level 1 courses?", app.config());
    let reply = app.ask(&ctx).await.unwrap();

    assert_eq!(
        reply.response,
        "The courses for the requested year are:\n\n\nComputer Science:\n- CS101: Intro\n"
    );
    assert_eq!(reply.source, AnswerSource::CourseCatalog);
    assert_eq!(transport.calls(), 0, "课程列表不应调用补全服务");
}

#[tokio::test]
async fn test_arabic_level_two_courses() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::with_script(Vec::new());
    let app = app(test_config(dir.path()), transport).await;

    let ctx = QueryCtx::new(1, "ما هي مواد الفرقة الثانية؟", app.config());
    let reply = app.ask(&ctx).await.unwrap();

    assert!(reply.response.starts_with("مواد الفرقة المطلوبة هي:"));
    assert!(reply.response.contains("- CS201: البرمجة كائنية التوجه"));
    assert!(!reply.response.contains("CS101"));
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::with_script(vec![
        Err(CompletionError::transport("connection reset")),
        Err(classify_error(503, "overloaded")),
        Ok(CompletionResponse::with_content("The dean is Dr. Example.")),
    ]);
    let app = app(test_config(dir.path()), transport.clone()).await;

    let ctx = QueryCtx::new(1, "Who is the dean?", app.config());
    let reply = app.ask(&ctx).await.unwrap();

    assert_eq!(reply.response, "The dean is Dr. Example.");
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn test_auth_failure_propagates_without_retry() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::with_script(vec![Err(classify_error(
        401,
        r#"{"error":{"message":"No auth credentials found"}}"#,
    ))]);
    let app = app(test_config(dir.path()), transport.clone()).await;

    let ctx = QueryCtx::new(1, "Who is the dean?", app.config());
    let err = app.ask(&ctx).await.unwrap_err();

    match err {
        AppError::Completion(e) => {
            assert_eq!(e.kind, CompletionErrorKind::Authentication);
            assert_eq!(e.http_status(), 401);
            assert!(e.message.contains("API key not recognized"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_batch_keeps_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::with_script(vec![Err(classify_error(429, ""))]);
    let mut config = test_config(dir.path());
    config.max_concurrent_queries = 1;
    let app = app(config.clone(), transport).await;

    let questions = vec![
        "What are the level 2 courses?".to_string(),
        "Which courses should I take?".to_string(),
        "Who is the dean?".to_string(),
    ];
    let report = app.ask_batch(questions).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.success, 3);
    assert_eq!(report.failed, 0);

    let sources: Vec<AnswerSource> = report
        .items
        .iter()
        .map(|item| match &item.outcome {
            BatchOutcome::Answered(reply) => reply.source,
            BatchOutcome::Failed { message, .. } => panic!("unexpected failure: {}", message),
        })
        .collect();
    assert_eq!(
        sources,
        vec![
            AnswerSource::CourseCatalog,
            AnswerSource::ClarifyYear,
            AnswerSource::DocumentContext,
        ]
    );

    let log = std::fs::read_to_string(&config.output_log_file).unwrap();
    assert!(log.contains("[问题 3] Who is the dean?"));
}

#[tokio::test]
async fn test_batch_reports_failures() {
    let dir = tempfile::tempdir().unwrap();
    let transport =
        ScriptedTransport::with_script(vec![Err(classify_error(400, "unknown parameter"))]);
    let app = app(test_config(dir.path()), transport).await;

    let report = app
        .ask_batch(vec!["hello".to_string()])
        .await
        .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(
        report.items[0].outcome,
        BatchOutcome::Failed {
            status: 400,
            message: "Error from completion service: unknown parameter".to_string(),
        }
    );
}

#[tokio::test]
async fn test_built_cache_is_used_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let transport = ScriptedTransport::with_script(Vec::new());
    let app = app(config.clone(), transport).await;

    let count = app
        .build_cache(Path::new(&config.qa_cache_file))
        .await
        .unwrap();
    // 两个学年各 6 条 + 5 条概述
    assert_eq!(count, 17);

    let transport = ScriptedTransport::with_script(Vec::new());
    let app = self::app(config, transport.clone()).await;
    assert_eq!(app.status().await.cache_entries, 17);

    let ctx = QueryCtx::new(1, "Give me an overview of catalog", app.config());
    let reply = app.ask(&ctx).await.unwrap();

    assert_eq!(reply.source, AnswerSource::CachedContext);
    assert_eq!(reply.model, "cached-answer (confidence: 1.00)");
    let requests = transport.requests.lock().unwrap();
    assert!(requests[0].messages[0].content.contains("CS201 OOP"));
}

#[tokio::test]
#[ignore] // 默认忽略，需要网络：cargo test -- --ignored
async fn test_real_service_status() {
    logger::init(true);
    let config = Config::from_env();
    let client = CompletionClient::from_config(&config).expect("创建客户端失败");
    assert!(client.check_status().await, "补全服务应该可用");
}
