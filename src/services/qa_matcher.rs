//! 问答缓存匹配
//!
//! 缓存是离线用模板生成的问题，用户的真实问法很少与之逐字相同，
//! 所以按以下顺序逐级放宽，第一个成功的策略胜出：
//!
//! 1. 精确匹配（置信度 1.0）
//! 2. 学年关键词匹配（置信度 0.9）
//! 3. Jaccard 词集相似度，长词加分（置信度 = 得分，可能超过 1.0）
//! 4. 概述类问题 + 主题词匹配（置信度 0.8）
//!
//! 都不成功时返回 `(None, 0.0)`，调用方应转交补全服务。

use crate::models::QaCache;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// 精确匹配的置信度
pub const EXACT_CONFIDENCE: f64 = 1.0;
/// 学年关键词匹配的置信度
pub const YEAR_CONFIDENCE: f64 = 0.9;
/// 概述类问题匹配的置信度
pub const SUMMARY_CONFIDENCE: f64 = 0.8;
/// Jaccard 得分必须超过该值才接受
pub const JACCARD_THRESHOLD: f64 = 0.3;
/// 每个长度超过 6 的共同词的加分
pub const LONG_WORD_BONUS: f64 = 0.05;

/// 学年 → 关键词变体（数字、序数词、阿拉伯语），按学年顺序扫描
pub const YEAR_WORDS: &[(&str, &[&str])] = &[
    ("1", &["first", "one", "1", "أولى", "الأولى", "اولى", "الاولى"]),
    ("2", &["second", "two", "2", "ثانية", "الثانية"]),
    ("3", &["third", "three", "3", "ثالثة", "الثالثة"]),
    ("4", &["fourth", "four", "4", "رابعة", "الرابعة"]),
];

/// 概述/介绍类短语
pub const SUMMARY_KEYWORDS: &[&str] = &[
    "summary",
    "overview",
    "about",
    "tell me about",
    "what is",
    "ملخص",
    "نظرة عامة",
    "ما هو",
];

static WORD_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w{4,}\b").expect("valid word token regex"));

static SUBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:about|of|is|هو) (.+?)(?:\?|$|\.)").expect("valid subject regex")
});

/// 匹配使用的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum MatchStrategy {
    Exact,
    Year,
    Jaccard,
    Summary,
}

/// 匹配结果
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MatchResult {
    /// 命中的缓存键；`None` 表示未命中
    pub matched_key: Option<String>,
    pub confidence: f64,
    pub strategy: Option<MatchStrategy>,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            matched_key: None,
            confidence: 0.0,
            strategy: None,
        }
    }

    fn hit(key: &str, confidence: f64, strategy: MatchStrategy) -> Self {
        Self {
            matched_key: Some(key.to_string()),
            confidence,
            strategy: Some(strategy),
        }
    }

    pub fn is_match(&self) -> bool {
        self.matched_key.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QaMatcher;

impl QaMatcher {
    pub fn new() -> Self {
        Self
    }

    /// 在缓存中查找与问题最匹配的键
    pub fn find_best_match(&self, query: &str, cache: &QaCache) -> MatchResult {
        if cache.is_empty() {
            return MatchResult::none();
        }

        let query_lower = query.to_lowercase();

        if cache.contains_key(&query_lower) {
            debug!("问答缓存精确命中");
            return MatchResult::hit(&query_lower, EXACT_CONFIDENCE, MatchStrategy::Exact);
        }

        if let Some(key) = self.try_year_match(&query_lower, cache) {
            debug!("问答缓存学年命中: {}", key);
            return MatchResult::hit(key, YEAR_CONFIDENCE, MatchStrategy::Year);
        }

        if let Some((key, score)) = self.try_jaccard_match(&query_lower, cache) {
            debug!("问答缓存相似度命中: {} (得分 {:.2})", key, score);
            return MatchResult::hit(key, score, MatchStrategy::Jaccard);
        }

        if let Some(key) = self.try_summary_match(&query_lower, cache) {
            debug!("问答缓存概述命中: {}", key);
            return MatchResult::hit(key, SUMMARY_CONFIDENCE, MatchStrategy::Summary);
        }

        MatchResult::none()
    }

    /// 学年匹配：问题提到某个学年时，返回缓存中第一个提到同一学年的键
    fn try_year_match<'a>(&self, query_lower: &str, cache: &'a QaCache) -> Option<&'a str> {
        for (_, keywords) in YEAR_WORDS {
            if !keywords.iter().any(|keyword| query_lower.contains(keyword)) {
                continue;
            }
            if let Some(key) = cache
                .keys()
                .find(|key| keywords.iter().any(|keyword| key.contains(keyword)))
            {
                return Some(key);
            }
        }
        None
    }

    /// Jaccard 匹配：取得分最高的键，得分须超过阈值
    fn try_jaccard_match<'a>(&self, query_lower: &str, cache: &'a QaCache) -> Option<(&'a str, f64)> {
        let query_words = tokenize(query_lower);
        if query_words.is_empty() {
            return None;
        }

        let mut best: Option<(&str, f64)> = None;
        for key in cache.keys() {
            let stored_words = tokenize(&key.to_lowercase());
            if stored_words.is_empty() {
                continue;
            }
            let score = jaccard_score(&query_words, &stored_words);
            if best.map_or(score > 0.0, |(_, best_score)| score > best_score) {
                best = Some((key, score));
            }
        }

        best.filter(|&(_, score)| score > JACCARD_THRESHOLD)
    }

    /// 概述匹配：问题和键都属于概述类，且问题中的主题词出现在键里
    fn try_summary_match<'a>(&self, query_lower: &str, cache: &'a QaCache) -> Option<&'a str> {
        if !contains_any(query_lower, SUMMARY_KEYWORDS) {
            return None;
        }
        let subject = extract_subject(query_lower)?;
        cache
            .keys()
            .filter(|key| contains_any(key, SUMMARY_KEYWORDS))
            .find(|key| key.contains(subject.as_str()))
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// 长度不小于 4 的单词集合
pub fn tokenize(text: &str) -> HashSet<String> {
    WORD_TOKEN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// 交集 / 并集，每个长度超过 6 的共同词额外加 0.05（不封顶）
pub fn jaccard_score(query_words: &HashSet<String>, stored_words: &HashSet<String>) -> f64 {
    let union = query_words.union(stored_words).count();
    if union == 0 {
        return 0.0;
    }
    let common: Vec<&String> = query_words.intersection(stored_words).collect();
    let mut score = common.len() as f64 / union as f64;
    for word in common {
        if word.chars().count() > 6 {
            score += LONG_WORD_BONUS;
        }
    }
    score
}

/// 提取 about/of/is/هو 之后直到问号、句号或结尾的主题词
fn extract_subject(query_lower: &str) -> Option<String> {
    SUBJECT
        .captures(query_lower)
        .map(|caps| caps[1].trim().to_string())
        .filter(|subject| !subject.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(pairs: &[(&str, &str)]) -> QaCache {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_empty_cache_never_matches() {
        let result = QaMatcher::new().find_best_match("anything", &QaCache::new());
        assert_eq!(result, MatchResult::none());
    }

    #[test]
    fn test_exact_match_has_priority() {
        let cache = cache(&[
            ("computer science department courses overview", "a"),
            ("hello there", "b"),
        ]);
        let result = QaMatcher::new().find_best_match("Hello There", &cache);
        assert_eq!(result.matched_key.as_deref(), Some("hello there"));
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.strategy, Some(MatchStrategy::Exact));
    }

    #[test]
    fn test_year_match_uses_insertion_order() {
        let cache = cache(&[
            ("tell me about doc1", "summary"),
            ("list the courses for year 2", "year two"),
            ("what are the level 2 courses?", "level two"),
        ]);
        let result = QaMatcher::new().find_best_match("show me second year", &cache);
        assert_eq!(
            result.matched_key.as_deref(),
            Some("list the courses for year 2")
        );
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_year_match_arabic() {
        let cache = cache(&[
            ("ما هي مواد الفرقة الثانية؟", "level 2"),
            ("ما هي مواد الفرقة الأولى؟", "level 1"),
        ]);
        let result = QaMatcher::new().find_best_match("عايز مواد الفرقة الأولى", &cache);
        assert_eq!(
            result.matched_key.as_deref(),
            Some("ما هي مواد الفرقة الأولى؟")
        );
        assert_eq!(result.strategy, Some(MatchStrategy::Year));
    }

    #[test]
    fn test_year_match_falls_through_to_next_year() {
        // 问题同时提到第一和第二学年，缓存里只有第二学年
        let cache = cache(&[("second year subjects", "b")]);
        let result = QaMatcher::new().find_best_match("first or second?", &cache);
        assert_eq!(result.matched_key.as_deref(), Some("second year subjects"));
    }

    #[test]
    fn test_jaccard_score_with_bonus() {
        let stored: HashSet<String> = ["computer", "science", "courses"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let query: HashSet<String> = ["computer", "courses", "department"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        // 2 / 4 + 0.05 × 2（computer 与 courses 长度都超过 6）
        let score = jaccard_score(&query, &stored);
        assert!((score - 0.60).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_bonus_requires_more_than_six_chars() {
        let stored: HashSet<String> = ["computer", "science", "course"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let query: HashSet<String> = ["computer", "course", "department"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        // course 正好 6 个字符，没有加分
        let score = jaccard_score(&query, &stored);
        assert!((score - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_match() {
        let cache = cache(&[
            ("computer science courses", "cs courses"),
            ("library opening hours", "hours"),
        ]);
        let result = QaMatcher::new().find_best_match("computer courses department", &cache);
        assert_eq!(
            result.matched_key.as_deref(),
            Some("computer science courses")
        );
        assert!((result.confidence - 0.60).abs() < 1e-9);
        assert_eq!(result.strategy, Some(MatchStrategy::Jaccard));
    }

    #[test]
    fn test_jaccard_score_can_exceed_one() {
        let cache = cache(&[("programming algorithms", "x")]);
        let result = QaMatcher::new().find_best_match("algorithms programming", &cache);
        assert!((result.confidence - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_below_threshold_rejected() {
        let cache = cache(&[("library opening hours today", "x")]);
        let result = QaMatcher::new().find_best_match("library parking spaces nearby", &cache);
        assert!(!result.is_match());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_summary_match_requires_subject() {
        let cache = cache(&[("ملخص المعلومات عن ai", "summary of ai")]);
        let matcher = QaMatcher::new();

        let result = matcher.find_best_match("ما هو ai?", &cache);
        assert_eq!(
            result.matched_key.as_deref(),
            Some("ملخص المعلومات عن ai")
        );
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.strategy, Some(MatchStrategy::Summary));

        let result = matcher.find_best_match("ما هو ml?", &cache);
        assert!(!result.is_match());
    }

    #[test]
    fn test_no_match() {
        let cache = cache(&[("what are the level 1 courses?", "x")]);
        let result = QaMatcher::new().find_best_match("Who is the dean?", &cache);
        assert_eq!(result, MatchResult::none());
    }
}
