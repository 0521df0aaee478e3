//! 学年识别
//!
//! 把问题文本映射到 `level 1`..`level 4`。关键词表是有序的：
//! 按表中顺序扫描，第一个出现在（小写后的）问题里的关键词胜出，
//! 不做最长匹配。调整表顺序会改变结果。

use crate::models::LevelTag;

/// 有序关键词表（关键词必须是小写）
///
/// 顺序：第二、第一、第三、第四学年；每组内先阿拉伯语变体，后英语。
pub const LEVEL_KEYWORDS: &[(&str, LevelTag)] = &[
    ("الفرقة الثانية", LevelTag::Level2),
    ("الفرقة الثانيه", LevelTag::Level2),
    ("السنة الثانية", LevelTag::Level2),
    ("المستوى الثاني", LevelTag::Level2),
    ("second year", LevelTag::Level2),
    ("level 2", LevelTag::Level2),
    ("الفرقة الأولى", LevelTag::Level1),
    ("الفرقة الاولى", LevelTag::Level1),
    ("السنة الأولى", LevelTag::Level1),
    ("المستوى الأول", LevelTag::Level1),
    ("first year", LevelTag::Level1),
    ("level 1", LevelTag::Level1),
    ("الفرقة الثالثة", LevelTag::Level3),
    ("الفرقة الثالثه", LevelTag::Level3),
    ("السنة الثالثة", LevelTag::Level3),
    ("المستوى الثالث", LevelTag::Level3),
    ("third year", LevelTag::Level3),
    ("level 3", LevelTag::Level3),
    ("الفرقة الرابعة", LevelTag::Level4),
    ("الفرقة الرابعه", LevelTag::Level4),
    ("السنة الرابعة", LevelTag::Level4),
    ("المستوى الرابع", LevelTag::Level4),
    ("المقررات الدراسية للفرقة الرابعة", LevelTag::Level4),
    ("fourth year", LevelTag::Level4),
    ("level 4", LevelTag::Level4),
];

/// 学年识别器
#[derive(Debug, Clone, Copy)]
pub struct LevelDetector {
    table: &'static [(&'static str, LevelTag)],
}

impl LevelDetector {
    /// 使用默认关键词表
    pub fn new() -> Self {
        Self {
            table: LEVEL_KEYWORDS,
        }
    }

    /// 使用自定义关键词表（顺序即优先级）
    pub fn with_table(table: &'static [(&'static str, LevelTag)]) -> Self {
        Self { table }
    }

    /// 识别问题对应的学年，没有任何关键词命中时返回 `None`
    pub fn detect(&self, query: &str) -> Option<LevelTag> {
        let query_lower = query.to_lowercase();
        self.table
            .iter()
            .find(|(keyword, _)| query_lower.contains(keyword))
            .map(|&(_, level)| level)
    }

    /// 表中出现的所有学年标签（去重，保持表顺序）
    pub fn level_tags(&self) -> Vec<LevelTag> {
        let mut tags = Vec::new();
        for &(_, level) in self.table {
            if !tags.contains(&level) {
                tags.push(level);
            }
        }
        tags
    }
}

impl Default for LevelDetector {
    fn default() -> Self {
        Self::new()
    }
}
