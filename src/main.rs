use anyhow::Result;
use clap::{Parser, Subcommand};
use course_qa::error::AppError;
use course_qa::models::load_questions;
use course_qa::orchestrator::BatchOutcome;
use course_qa::{logger, App, Config, QueryCtx};
use std::path::PathBuf;
use tracing::info;

/// 课程目录问答
#[derive(Parser, Debug)]
#[command(name = "course-qa", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 回答单个问题
    Ask {
        /// 问题原文
        message: String,

        /// 模型别名（见模型目录）
        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        max_tokens: Option<u32>,

        #[arg(long)]
        temperature: Option<f32>,

        /// 会话 ID，原样带回
        #[arg(long)]
        conversation_id: Option<String>,
    },

    /// 批量回答文件中的问题（每行一个）
    Batch {
        file: PathBuf,
    },

    /// 从语料目录生成问答缓存
    BuildCache {
        /// 输出文件，默认使用 QA_CACHE_FILE
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// 检查补全服务与本地数据
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logger::init(config.verbose_logging);

    let app = App::initialize(config).await?;

    match cli.command {
        Commands::Ask {
            message,
            model,
            max_tokens,
            temperature,
            conversation_id,
        } => {
            let ctx = QueryCtx::new(1, message, app.config())
                .with_model(model)
                .with_max_tokens(max_tokens)
                .with_temperature(temperature)
                .with_conversation_id(conversation_id);

            match app.ask(&ctx).await {
                Ok(reply) => println!("{}", serde_json::to_string_pretty(&reply)?),
                Err(AppError::Completion(e)) => {
                    eprintln!("[{}] {}", e.http_status(), e.message);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Batch { file } => {
            if !file.exists() {
                return Err(AppError::file_not_found(file.display().to_string()).into());
            }
            let questions = load_questions(&file).await?;
            let report = app.ask_batch(questions).await?;
            for (idx, item) in report.items.iter().enumerate() {
                match &item.outcome {
                    BatchOutcome::Answered(reply) => {
                        println!("[{}] {}\n{}\n", idx + 1, item.question, reply.response)
                    }
                    BatchOutcome::Failed { status, message } => {
                        println!("[{}] {}\n({}) {}\n", idx + 1, item.question, status, message)
                    }
                }
            }
        }
        Commands::BuildCache { output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&app.config().qa_cache_file));
            let count = app.build_cache(&output).await?;
            info!("✓ 已生成 {} 条问答，保存至 {}", count, output.display());
        }
        Commands::Status => {
            let status = app.status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
