//! 离线问答缓存构建
//!
//! 从语料文档生成模板化的「问题 → 答案」对，供 [`QaMatcher`](super::QaMatcher)
//! 在服务期间查找。

use crate::models::{Document, LevelTag, QaCache};
use tracing::{debug, info};

/// 概述类答案的最大字符数，超出部分截断并加 `...`
pub const SUMMARY_MAX_CHARS: usize = 1000;
/// 每篇文档最多考察的段落数
pub const MAX_PARAGRAPHS: usize = 5;
/// 段落长度必须超过该字符数才会生成问题
pub const MIN_PARAGRAPH_CHARS: usize = 50;
/// 关键词长度必须超过该字符数
pub const MIN_KEYWORD_CHARS: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheBuilder;

impl CacheBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 为全部文档生成问答缓存
    ///
    /// 键统一小写，重复的问题后写覆盖先写
    pub fn build(&self, documents: &[Document]) -> QaCache {
        let mut cache = QaCache::new();
        for document in documents {
            let before = cache.len();
            self.add_level_entries(&mut cache, document);
            self.add_summary_entries(&mut cache, document);
            self.add_paragraph_entries(&mut cache, document);
            debug!(
                "文档 {} 新增 {} 条问答",
                document.id,
                cache.len() - before
            );
        }
        info!("✓ 问答缓存构建完成，共 {} 条", cache.len());
        cache
    }

    /// 学年问题：答案是所有提到 `level N` 的行
    fn add_level_entries(&self, cache: &mut QaCache, document: &Document) {
        let lowered = document.content.to_lowercase();
        if !LevelTag::ALL.iter().any(|level| lowered.contains(level.tag())) {
            return;
        }

        for level in LevelTag::ALL {
            let answer = document
                .content
                .split('\n')
                .filter(|line| line.to_lowercase().contains(level.tag()))
                .collect::<Vec<_>>()
                .join("\n");
            if answer.is_empty() {
                continue;
            }
            for question in level_questions(level) {
                cache.insert(&question, answer.as_str());
            }
        }
    }

    /// 概述问题：以文档标识为主题，答案是截断后的全文
    fn add_summary_entries(&self, cache: &mut QaCache, document: &Document) {
        let answer = truncate_summary(&document.content);
        for question in summary_questions(&document.id) {
            cache.insert(&question, answer.as_str());
        }
    }

    /// 段落问题：取前几个足够长的段落，以第一个长词为关键词
    fn add_paragraph_entries(&self, cache: &mut QaCache, document: &Document) {
        let paragraphs = document
            .content
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .take(MAX_PARAGRAPHS);

        for paragraph in paragraphs {
            if paragraph.chars().count() <= MIN_PARAGRAPH_CHARS {
                continue;
            }
            let Some(keyword) = paragraph
                .split_whitespace()
                .find(|word| word.chars().count() > MIN_KEYWORD_CHARS)
            else {
                continue;
            };
            cache.insert(&format!("Tell me about {}", keyword), paragraph);
            cache.insert(&format!("What do you know about {}?", keyword), paragraph);
        }
    }
}

fn level_questions(level: LevelTag) -> Vec<String> {
    let n = level.number();
    vec![
        format!("ما هي مواد الفرقة {}؟", level.arabic_ordinal()),
        format!("أخبرني عن مقررات المستوى {}", n),
        format!("ما هي المواد الدراسية للسنة {}؟", n),
        format!("What are the level {} courses?", n),
        format!("Tell me about year {} subjects", n),
        format!("List the courses for year {}", n),
    ]
}

fn summary_questions(title: &str) -> Vec<String> {
    vec![
        format!("Summarize the content about {}", title),
        format!("Give me an overview of {}", title),
        format!("What information do you have about {}?", title),
        format!("ملخص المعلومات عن {}", title),
        format!("أعطني نظرة عامة عن {}", title),
    ]
}

fn truncate_summary(content: &str) -> String {
    if content.chars().count() > SUMMARY_MAX_CHARS {
        let head: String = content.chars().take(SUMMARY_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_entries() {
        let docs = vec![Document::new(
            "catalog",
            "level 1 - CS101 Intro\nlevel 2 - CS201 OOP\nlevel 1 - BS101 Math",
        )];
        let cache = CacheBuilder::new().build(&docs);

        assert_eq!(
            cache.get("what are the level 1 courses?"),
            Some("level 1 - CS101 Intro\nlevel 1 - BS101 Math")
        );
        assert_eq!(
            cache.get("ما هي مواد الفرقة الثانية؟"),
            Some("level 2 - CS201 OOP")
        );
        // 没有第三学年的行
        assert!(!cache.contains_key("list the courses for year 3"));
    }

    #[test]
    fn test_summary_entries_truncate() {
        let long = "x".repeat(1200);
        let docs = vec![Document::new("Rules", long)];
        let cache = CacheBuilder::new().build(&docs);

        let answer = cache.get("give me an overview of rules").unwrap();
        assert_eq!(answer.chars().count(), 1003);
        assert!(answer.ends_with("..."));
        assert!(cache.contains_key("ملخص المعلومات عن rules"));
    }

    #[test]
    fn test_paragraph_entries() {
        let paragraph = "The library opens every weekday from nine until five in the evening.";
        let content = format!("short\n\n{}", paragraph);
        let docs = vec![Document::new("library", content)];
        let cache = CacheBuilder::new().build(&docs);

        assert_eq!(cache.get("tell me about library"), Some(paragraph));
        assert_eq!(cache.get("what do you know about library?"), Some(paragraph));
        assert!(!cache.contains_key("tell me about short"));
    }

    #[test]
    fn test_empty_corpus() {
        let cache = CacheBuilder::new().build(&[]);
        assert!(cache.is_empty());
    }
}
