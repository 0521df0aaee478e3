/// 学年（年级）标签
///
/// 课程目录里每个学年都以 `level N` 开头，检索范围以此为界。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LevelTag {
    /// 第一学年
    #[serde(rename = "level 1")]
    Level1 = 1,
    /// 第二学年
    #[serde(rename = "level 2")]
    Level2 = 2,
    /// 第三学年
    #[serde(rename = "level 3")]
    Level3 = 3,
    /// 第四学年
    #[serde(rename = "level 4")]
    Level4 = 4,
}

impl LevelTag {
    /// 全部学年，按编号排列
    pub const ALL: [LevelTag; 4] = [
        LevelTag::Level1,
        LevelTag::Level2,
        LevelTag::Level3,
        LevelTag::Level4,
    ];

    /// 获取学年编号
    pub fn number(self) -> u8 {
        self as u8
    }

    /// 规范标签文本（小写）
    pub fn tag(self) -> &'static str {
        match self {
            LevelTag::Level1 => "level 1",
            LevelTag::Level2 => "level 2",
            LevelTag::Level3 => "level 3",
            LevelTag::Level4 => "level 4",
        }
    }

    /// 从编号解析学年
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(LevelTag::Level1),
            2 => Some(LevelTag::Level2),
            3 => Some(LevelTag::Level3),
            4 => Some(LevelTag::Level4),
            _ => None,
        }
    }

    /// 阿拉伯语序数词（الأولى / الثانية ...）
    pub fn arabic_ordinal(self) -> &'static str {
        match self {
            LevelTag::Level1 => "الأولى",
            LevelTag::Level2 => "الثانية",
            LevelTag::Level3 => "الثالثة",
            LevelTag::Level4 => "الرابعة",
        }
    }
}

impl std::fmt::Display for LevelTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}
