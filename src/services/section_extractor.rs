//! 相关段落提取
//!
//! 从语料文本中找出最可能包含答案的最小片段。按行扫描，最多三轮：
//!
//! 1. 课程标题：以目标学年标签开头的行开启区域，遇到以任意学年标签开头的行关闭
//! 2. 一般内容：同样的开启/关闭逻辑，但改为「包含」学年标签
//! 3. 宽松匹配：只收集包含目标学年标签的行
//!
//! 三轮都没有结果时原样返回输入文本，因此输入非空时输出一定非空。

use crate::models::LevelTag;
use crate::services::level_detector::LevelDetector;
use tracing::{debug, info};

/// 命中结果的那一轮
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPass {
    CourseHeader,
    GeneralContent,
    Flexible,
}

/// 提取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub lines: Vec<String>,
    /// `None` 表示三轮都没有命中
    pub pass: Option<ExtractionPass>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SectionExtractor {
    detector: LevelDetector,
}

impl SectionExtractor {
    pub fn new(detector: LevelDetector) -> Self {
        Self { detector }
    }

    /// 提取与问题相关的片段
    ///
    /// # 参数
    /// - `content`: 全部语料文本
    /// - `query`: 用户问题
    ///
    /// # 返回
    /// 命中的行（以换行连接）；未命中时返回 `content` 本身
    pub fn extract(&self, content: &str, query: &str) -> String {
        let extraction = self.extract_lines(content, self.detector.detect(query));
        if extraction.is_empty() {
            content.to_string()
        } else {
            extraction.lines.join("\n")
        }
    }

    /// 按学年运行三轮扫描，返回命中的行和命中的轮次
    pub fn extract_lines(&self, content: &str, level: Option<LevelTag>) -> Extraction {
        let lines = clean_lines(content);
        let all_tags = self.detector.level_tags();

        let Some(level) = level else {
            debug!("未识别到学年，跳过段落提取");
            return Extraction {
                lines: Vec::new(),
                pass: None,
            };
        };
        let target = level.tag();

        let found = capture_regions(
            &lines,
            |line| line.starts_with(target),
            |line| all_tags.iter().any(|tag| line.starts_with(tag.tag())),
        );
        if !found.is_empty() {
            debug!("课程标题匹配命中 {} 行", found.len());
            return Extraction {
                lines: found,
                pass: Some(ExtractionPass::CourseHeader),
            };
        }

        info!("未找到课程列表，尝试查找一般内容");
        let found = capture_regions(
            &lines,
            |line| line.contains(target),
            |line| all_tags.iter().any(|tag| line.contains(tag.tag())),
        );
        if !found.is_empty() {
            debug!("一般内容匹配命中 {} 行", found.len());
            return Extraction {
                lines: found,
                pass: Some(ExtractionPass::GeneralContent),
            };
        }

        info!("尝试宽松匹配");
        let found: Vec<String> = lines
            .iter()
            .filter(|line| line.to_lowercase().contains(target))
            .map(|line| line.to_string())
            .collect();
        debug!("宽松匹配命中 {} 行", found.len());
        let pass = (!found.is_empty()).then_some(ExtractionPass::Flexible);
        Extraction {
            lines: found,
            pass,
        }
    }

    /// 只运行第一轮（课程标题）扫描，供课程列表格式化使用
    pub fn course_lines(&self, content: &str, level: LevelTag) -> Vec<String> {
        let lines = clean_lines(content);
        let all_tags = self.detector.level_tags();
        let target = level.tag();
        capture_regions(
            &lines,
            |line| line.starts_with(target),
            |line| all_tags.iter().any(|tag| line.starts_with(tag.tag())),
        )
    }
}

/// 去掉首尾空白并丢弃空行
fn clean_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// 区域捕获：`opens` 命中的行开启区域并被收录，
/// 区域开启时 `closes` 命中的行关闭区域且不被收录。
/// 两个判断都作用于小写后的行。
fn capture_regions<O, C>(lines: &[&str], opens: O, closes: C) -> Vec<String>
where
    O: Fn(&str) -> bool,
    C: Fn(&str) -> bool,
{
    let mut captured = Vec::new();
    let mut in_section = false;

    for line in lines {
        let lower = line.to_lowercase();
        if opens(&lower) {
            in_section = true;
            captured.push(line.to_string());
            continue;
        }
        if in_section && closes(&lower) {
            in_section = false;
            continue;
        }
        if in_section {
            captured.push(line.to_string());
        }
    }

    captured
}
