//! 问答缓存
//!
//! 离线生成的「问题 → 答案」映射。键统一小写，保持插入顺序；
//! 重复的键后写覆盖先写，但位置保留在第一次出现处。
//! 服务期间只读，可以放进 `Arc` 在多个任务间共享。

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// 缓存中的一条问答
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaCacheEntry {
    /// 小写后的问题，作为键
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default)]
pub struct QaCache {
    entries: Vec<QaCacheEntry>,
    index: HashMap<String, usize>,
}

impl QaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一条问答，键会被转为小写
    pub fn insert(&mut self, question: &str, answer: impl Into<String>) {
        let key = question.to_lowercase();
        let answer = answer.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].answer = answer,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(QaCacheEntry {
                    question: key,
                    answer,
                });
            }
        }
    }

    /// 按键精确查找
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].answer.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// 按插入顺序遍历所有键
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.question.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<Q, A> FromIterator<(Q, A)> for QaCache
where
    Q: AsRef<str>,
    A: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (Q, A)>>(iter: I) -> Self {
        let mut cache = QaCache::new();
        for (question, answer) in iter {
            cache.insert(question.as_ref(), answer);
        }
        cache
    }
}

impl Serialize for QaCache {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.question, &entry.answer)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for QaCache {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct QaCacheVisitor;

        impl<'de> Visitor<'de> for QaCacheVisitor {
            type Value = QaCache;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of question strings to answer strings")
            }

            // 按文件中的顺序逐条读取，保留插入顺序
            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut cache = QaCache::new();
                while let Some((question, answer)) = access.next_entry::<String, String>()? {
                    cache.insert(&question, answer);
                }
                Ok(cache)
            }
        }

        deserializer.deserialize_map(QaCacheVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins_keeps_first_position() {
        let cache: QaCache = vec![
            ("What are the level 1 courses?", "old"),
            ("second", "b"),
            ("what are the LEVEL 1 courses?", "new"),
        ]
        .into_iter()
        .collect();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("what are the level 1 courses?"), Some("new"));
        let keys: Vec<&str> = cache.keys().collect();
        assert_eq!(keys, vec!["what are the level 1 courses?", "second"]);
    }

    #[test]
    fn test_json_preserves_file_order() {
        let json = r#"{"zeta question": "z", "alpha question": "a", "mid question": "m"}"#;
        let cache: QaCache = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = cache.keys().collect();
        assert_eq!(keys, vec!["zeta question", "alpha question", "mid question"]);

        let back = serde_json::to_string(&cache).unwrap();
        assert_eq!(
            back,
            r#"{"zeta question":"z","alpha question":"a","mid question":"m"}"#
        );
    }
}
