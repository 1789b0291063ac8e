use serde::{Deserialize, Serialize};
use std::fmt;

/// App 端需要的食譜格式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub step_index: u64,
    /// 短標題，約三個字
    pub title: String,
    pub instruction: String,
    /// 沒有計時器時輸出 `null`
    pub timer_seconds: Option<u64>,
}

/// 輸出檔 `{"recipes": [...]}` 的根節點
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeCollection {
    pub recipes: Vec<Recipe>,
}

impl RecipeCollection {
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// 無法正規化的輸入記錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordIssue {
    /// 在原始集合中的位置
    pub index: usize,
    pub id: Option<String>,
    pub reason: String,
}

impl RecordIssue {
    pub fn new(index: usize, id: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            index,
            id,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "record #{} (id {:?}): {}", self.index, id, self.reason),
            None => write!(f, "record #{}: {}", self.index, self.reason),
        }
    }
}

/// 正規化的結果：合格的食譜與被排除的記錄
#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub collection: RecipeCollection,
    pub rejected: Vec<RecordIssue>,
}
