use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 原始欄位名稱 -> 標準欄位名稱
///
/// 套用在原始文件的每一層物件上，例如 `items -> recipes`、`text -> instruction`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    renames: HashMap<String, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    /// 解析 `from=to` 形式的字串
    pub fn parse_pair(pair: &str) -> Option<(String, String)> {
        let (from, to) = pair.split_once('=')?;
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() {
            return None;
        }
        Some((from.to_string(), to.to_string()))
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.renames.insert(from.into(), to.into());
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.renames.iter()
    }

    /// 遞迴重新命名所有物件的欄位
    pub fn apply(&self, value: Value) -> Value {
        if self.is_empty() {
            return value;
        }

        match value {
            Value::Object(obj) => Value::Object(self.apply_object(obj)),
            Value::Array(items) => Value::Array(items.into_iter().map(|v| self.apply(v)).collect()),
            other => other,
        }
    }

    fn apply_object(&self, obj: Map<String, Value>) -> Map<String, Value> {
        let mut mapped = Map::with_capacity(obj.len());
        let mut renamed = Vec::new();

        // 原本就是標準名稱的欄位優先保留
        for (key, value) in obj {
            let value = self.apply(value);
            match self.renames.get(&key) {
                Some(target) if target != &key => renamed.push((key, target.clone(), value)),
                _ => {
                    mapped.insert(key, value);
                }
            }
        }

        for (source, target, value) in renamed {
            if mapped.contains_key(&target) {
                tracing::debug!(
                    "Field '{}' not mapped: '{}' already present",
                    source,
                    target
                );
                continue;
            }
            mapped.insert(target, value);
        }

        mapped
    }
}

impl From<HashMap<String, String>> for FieldMapping {
    fn from(renames: HashMap<String, String>) -> Self {
        Self { renames }
    }
}
