use super::locale::Locale;

/// 课程类别
///
/// 输出时按 `ORDER` 固定顺序分组，无法识别的行统一归入 `Other`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum CourseCategory {
    /// 计算机科学
    Cs,
    /// 基础科学
    Bs,
    /// 人文
    H,
    /// 其他（解析失败的行）
    Other,
}

impl CourseCategory {
    /// 输出顺序
    pub const ORDER: [CourseCategory; 4] = [
        CourseCategory::Cs,
        CourseCategory::Bs,
        CourseCategory::H,
        CourseCategory::Other,
    ];

    /// 类别代码（课程编号前缀）
    pub fn code(self) -> &'static str {
        match self {
            CourseCategory::Cs => "CS",
            CourseCategory::Bs => "BS",
            CourseCategory::H => "H",
            CourseCategory::Other => "Other",
        }
    }

    /// 从课程编号前缀解析（精确匹配，区分大小写）
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CS" => Some(CourseCategory::Cs),
            "BS" => Some(CourseCategory::Bs),
            "H" => Some(CourseCategory::H),
            _ => None,
        }
    }

    /// 分组小标题
    pub fn display_name(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (CourseCategory::Cs, Locale::Arabic) => "علوم حاسب",
            (CourseCategory::Cs, Locale::English) => "Computer Science",
            (CourseCategory::Bs, Locale::Arabic) => "علوم أساسية",
            (CourseCategory::Bs, Locale::English) => "Basic Sciences",
            (CourseCategory::H, Locale::Arabic) => "علوم إنسانية",
            (CourseCategory::H, Locale::English) => "Humanities",
            (CourseCategory::Other, _) => "Other",
        }
    }
}

impl std::fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 从课程行解析出的一条课程记录
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CourseRecord {
    pub category: CourseCategory,
    /// 课程编号数字部分，`Other` 类别为空串
    pub number: String,
    pub name: String,
}

impl CourseRecord {
    /// 排序键：纯数字按数值，否则视为 "0"
    pub fn sort_key(&self) -> u64 {
        if !self.number.is_empty() && self.number.chars().all(|c| c.is_ascii_digit()) {
            self.number.parse().unwrap_or(0)
        } else {
            0
        }
    }

    /// 渲染为一行列表项
    pub fn render(&self) -> String {
        if self.number.is_empty() {
            format!("- {}", self.name)
        } else {
            format!("- {}{}: {}", self.category.code(), self.number, self.name)
        }
    }
}
