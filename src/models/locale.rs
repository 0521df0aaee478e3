/// 回复语言
///
/// 只区分阿拉伯语和英语：问题里出现任何阿拉伯字母就按阿拉伯语回复。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Arabic,
    English,
}

impl Locale {
    /// 根据文本检测语言（U+0600..=U+06FF 视为阿拉伯语）
    pub fn detect(text: &str) -> Self {
        if text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c)) {
            Locale::Arabic
        } else {
            Locale::English
        }
    }

    /// 课程列表标题
    pub fn courses_header(self) -> &'static str {
        match self {
            Locale::Arabic => "مواد الفرقة المطلوبة هي:",
            Locale::English => "The courses for the requested year are:",
        }
    }

    /// 文档中找不到信息时的固定回复
    pub fn not_available(self) -> &'static str {
        match self {
            Locale::Arabic => "المعلومات غير متوفرة في الوثيقة.",
            Locale::English => "Information not available in the document.",
        }
    }

    /// 询问课程但没有指明学年时的固定回复
    pub fn specify_year(self) -> &'static str {
        match self {
            Locale::Arabic => "من فضلك حدد السنة الدراسية التي تريد معرفة موادها.",
            Locale::English => "Please specify which year's courses you want to know about.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(Locale::detect("ما هي مواد الفرقة الأولى؟"), Locale::Arabic);
        assert_eq!(Locale::detect("What are the level 1 courses?"), Locale::English);
        assert_eq!(Locale::detect("level 2 مواد"), Locale::Arabic);
        assert_eq!(Locale::detect(""), Locale::English);
    }
}
