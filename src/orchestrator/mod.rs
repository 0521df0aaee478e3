//! 编排层（Orchestration Layer）
//!
//! 负责应用生命周期和批量调度，不做具体的问答判断。
//!
//! ```text
//! orchestrator::App (单个 / 批量问题)
//!     ↓
//! workflow::QueryFlow (处理单个问题)
//!     ↓
//! services (能力层：学年识别 / 段落提取 / 课程格式化 / 缓存匹配)
//!     ↓
//! clients (补全服务)
//! ```

pub mod batch_processor;

pub use batch_processor::{App, BatchItem, BatchOutcome, BatchReport, ServiceStatus};
