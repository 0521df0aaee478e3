pub mod cache_builder;
pub mod course_formatter;
pub mod document_store;
pub mod level_detector;
pub mod qa_matcher;
pub mod section_extractor;

pub use cache_builder::CacheBuilder;
pub use course_formatter::CourseListFormatter;
pub use document_store::{DocumentStore, FsDocumentStore, MemoryDocumentStore};
pub use level_detector::LevelDetector;
pub use qa_matcher::{MatchResult, MatchStrategy, QaMatcher};
pub use section_extractor::{Extraction, ExtractionPass, SectionExtractor};
