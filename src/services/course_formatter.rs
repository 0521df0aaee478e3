//! 课程列表格式化
//!
//! 把提取出的课程行解析成结构化记录，按类别分组后渲染为本地化文本。
//! 无法解析的行不会报错，只会归入 `Other` 分组。

use crate::models::{CourseCategory, CourseRecord, LevelTag, Locale};
use once_cell::sync::Lazy;
use phf::phf_map;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// 课程名词典：英文名（小写）→ 阿拉伯语
pub static COURSE_LEXICON: phf::Map<&'static str, &'static str> = phf_map! {
    "data structures" => "هياكل البيانات",
    "oop" => "البرمجة كائنية التوجه",
    "system analysis" => "تحليل النظم",
    "file processing" => "معالجة الملفات",
    "computer networks" => "شبكات الحاسب",
    "operation research" => "بحوث العمليات",
    "stat prob" => "الإحصاء والاحتمالات",
    "co" => "تنظيم الحاسبات",
    "human rights" => "حقوق الإنسان",
    "work ethics" => "أخلاقيات العمل",
    "business administration" => "إدارة الأعمال",
    "professional ethics" => "أخلاقيات المهنة",
    "advanced programming" => "البرمجة المتقدمة",
    "database systems" => "نظم قواعد البيانات",
    "advanced mathematics" => "الرياضيات المتقدمة",
};

/// 文档转换遗留的噪声片段
const NOISE_TOKENS: &[&str] = &["_2F", "updated"];

static COURSE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^level \d+ - ([A-Z]+)[\s_]?(\d+)\s+(.+)").expect("valid course line regex")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

#[derive(Debug, Clone, Copy, Default)]
pub struct CourseListFormatter;

impl CourseListFormatter {
    pub fn new() -> Self {
        Self
    }

    /// 格式化课程列表
    ///
    /// # 参数
    /// - `lines`: 提取出的课程行
    /// - `target_level`: 目标学年（仅用于日志）
    /// - `locale`: 输出语言
    ///
    /// # 返回
    /// 带标题的分组列表；一条记录都没有时返回固定的「信息不可用」提示
    pub fn format<S: AsRef<str>>(&self, lines: &[S], target_level: LevelTag, locale: Locale) -> String {
        let records = self.parse(lines, locale);
        debug!(
            "{} 解析出 {} 条课程记录 (共 {} 行)",
            target_level,
            records.len(),
            lines.len()
        );

        if records.is_empty() {
            return locale.not_available().to_string();
        }

        let mut groups: BTreeMap<CourseCategory, Vec<CourseRecord>> = BTreeMap::new();
        for record in records {
            groups.entry(record.category).or_default().push(record);
        }

        let mut response = format!("{}\n\n", locale.courses_header());
        for category in CourseCategory::ORDER {
            let Some(group) = groups.get_mut(&category) else {
                continue;
            };
            group.sort_by_key(CourseRecord::sort_key);

            response.push_str(&format!("\n{}:\n", category.display_name(locale)));
            for record in group.iter() {
                response.push_str(&record.render());
                response.push('\n');
            }
        }

        response
    }

    /// 把课程行解析为记录（保持输入顺序）
    pub fn parse<S: AsRef<str>>(&self, lines: &[S], locale: Locale) -> Vec<CourseRecord> {
        lines
            .iter()
            .filter_map(|line| self.parse_line(line.as_ref(), locale))
            .collect()
    }

    /// 解析单行，清理后为空的行返回 `None`
    pub fn parse_line(&self, line: &str, locale: Locale) -> Option<CourseRecord> {
        let cleaned = clean_line(line);
        if cleaned.is_empty() {
            return None;
        }

        let parsed = COURSE_LINE.captures(&cleaned).and_then(|caps| {
            let category = CourseCategory::from_code(&caps[1])?;
            Some((category, caps[2].to_string(), caps[3].to_string()))
        });

        let record = match parsed {
            Some((category, number, raw_name)) => CourseRecord {
                category,
                number,
                name: localize_name(&normalize_name(&raw_name), locale),
            },
            None => CourseRecord {
                category: CourseCategory::Other,
                number: String::new(),
                name: cleaned,
            },
        };
        Some(record)
    }
}

/// 去掉噪声片段并合并连续空白
fn clean_line(line: &str) -> String {
    let mut cleaned = line.to_string();
    for token in NOISE_TOKENS {
        cleaned = cleaned.replace(token, "");
    }
    collapse_whitespace(cleaned.trim())
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

fn normalize_name(raw_name: &str) -> String {
    collapse_whitespace(&raw_name.replace('_', " "))
}

/// 按语言处理课程名
///
/// 阿拉伯语：查词典翻译；英语：如果存的是阿拉伯语译名则还原英文名，再做首字母大写。
fn localize_name(name: &str, locale: Locale) -> String {
    match locale {
        Locale::Arabic => COURSE_LEXICON
            .get(name.to_lowercase().as_str())
            .map(|arabic| arabic.to_string())
            .unwrap_or_else(|| name.to_string()),
        Locale::English => {
            let english = COURSE_LEXICON
                .entries()
                .find(|(_, arabic)| **arabic == name)
                .map(|(english, _)| *english)
                .unwrap_or(name);
            title_case(english)
        }
    }
}

/// 单词首字母大写、其余小写（字母之后的字母视为同一单词）
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(c);
            previous_is_letter = false;
        }
    }
    result
}
