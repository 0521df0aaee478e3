pub mod llm_client;

pub use llm_client::{classify_error, ChatTransport, CompletionClient, HttpTransport, RetryPolicy};
