pub mod query_ctx;
pub mod query_flow;

pub use query_ctx::QueryCtx;
pub use query_flow::{AnswerSource, ChatReply, QueryFlow};
