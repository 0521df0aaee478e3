pub mod json_loader;
pub mod toml_loader;

pub use json_loader::{load_qa_cache, load_questions, save_qa_cache};
pub use toml_loader::load_model_catalog;
