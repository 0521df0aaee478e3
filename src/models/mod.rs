pub mod catalog;
pub mod chat;
pub mod course;
pub mod document;
pub mod level;
pub mod loaders;
pub mod locale;
pub mod qa_cache;

pub use catalog::{ModelCatalog, ModelInfo};
pub use chat::{ChatMessage, ChatRole, CompletionRequest, CompletionResponse};
pub use course::{CourseCategory, CourseRecord};
pub use document::{corpus_text, Document};
pub use level::LevelTag;
pub use loaders::{load_model_catalog, load_qa_cache, load_questions, save_qa_cache};
pub use locale::Locale;
pub use qa_cache::{QaCache, QaCacheEntry};
