//! 把格式不固定的原始 JSON 清理成 App 使用的食譜格式。
//!
//! 純函式，不做任何 I/O。缺少的選填欄位一律補預設值，只有缺少標題的記錄
//! 會被列為錯誤。

use crate::domain::model::{
    Ingredient, Recipe, RecipeCollection, RecordIssue, Step, TransformResult,
};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use serde_json::{Map, Value};
use std::collections::HashSet;

const MISSING_TITLE: &str = "missing usable title";

/// 正規化已套用欄位映射的原始文件
pub fn normalize(raw: &Value) -> Result<TransformResult> {
    let candidates = locate_records(raw)?;
    tracing::debug!("Found {} candidate recipe records", candidates.len());

    let mut recipes = Vec::with_capacity(candidates.len());
    let mut rejected = Vec::new();
    let mut used_ids = HashSet::new();

    for (index, candidate) in candidates.into_iter().enumerate() {
        let Some(obj) = candidate.as_object() else {
            rejected.push(RecordIssue::new(index, None, "record is not an object"));
            continue;
        };

        match normalize_recipe(index, obj, &mut used_ids) {
            Ok(recipe) => recipes.push(recipe),
            Err(issue) => rejected.push(issue),
        }
    }

    let collection = RecipeCollection { recipes };
    collection.validate()?;

    Ok(TransformResult {
        collection,
        rejected,
    })
}

/// 嚴格版本：任何記錄不合格就回傳 `ValidationError`
pub fn normalize_strict(raw: &Value) -> Result<RecipeCollection> {
    let result = normalize(raw)?;
    if !result.rejected.is_empty() {
        return Err(EtlError::ValidationError {
            failures: result.rejected,
        });
    }
    Ok(result.collection)
}

/// 找出文件中的食譜記錄
fn locate_records(raw: &Value) -> Result<Vec<&Value>> {
    match raw {
        Value::Array(items) => Ok(items.iter().collect()),
        Value::Object(obj) => match obj.get("recipes") {
            Some(Value::Array(items)) => Ok(items.iter().collect()),
            Some(single @ Value::Object(_)) => Ok(vec![single]),
            Some(Value::Null) => Ok(Vec::new()),
            Some(other) => Err(EtlError::ProcessingError {
                message: format!("'recipes' must be an array, found {}", kind(other)),
            }),
            // 單一食譜（例如文字解析服務的回應）
            None => Ok(vec![raw]),
        },
        other => Err(EtlError::ProcessingError {
            message: format!(
                "expected a JSON object or array of recipes, found {}",
                kind(other)
            ),
        }),
    }
}

fn normalize_recipe(
    index: usize,
    obj: &Map<String, Value>,
    used_ids: &mut HashSet<String>,
) -> std::result::Result<Recipe, RecordIssue> {
    let raw_id = obj
        .get("id")
        .and_then(coerce_string)
        .filter(|s| !s.trim().is_empty());

    let Some(title) = ["title", "name"]
        .iter()
        .filter_map(|key| obj.get(*key).and_then(coerce_string))
        .find(|s| !s.trim().is_empty())
    else {
        return Err(RecordIssue::new(index, raw_id, MISSING_TITLE));
    };

    let base_id = raw_id.unwrap_or_else(|| generate_id(&title, index));
    let id = unique_id(base_id, used_ids);

    Ok(Recipe {
        ingredients: normalize_ingredients(&id, obj.get("ingredients")),
        steps: normalize_steps(obj.get("steps")),
        id,
        title,
    })
}

fn normalize_ingredients(recipe_id: &str, value: Option<&Value>) -> Vec<Ingredient> {
    let items: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ (Value::Object(_) | Value::String(_))) => vec![single],
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| {
            let ingredient = match item {
                // 空字串名稱仍是合法的 {name, amount}
                Value::Object(obj) => obj
                    .get("name")
                    .and_then(coerce_string)
                    .map(|name| Ingredient {
                        name,
                        amount: obj.get("amount").and_then(coerce_string).unwrap_or_default(),
                    }),
                Value::String(text) if !text.trim().is_empty() => Some(Ingredient {
                    name: text.trim().to_string(),
                    amount: String::new(),
                }),
                _ => None,
            };

            if ingredient.is_none() {
                tracing::warn!("Dropping ingredient without a usable name in recipe '{}'", recipe_id);
            }
            ingredient
        })
        .collect()
}

fn normalize_steps(value: Option<&Value>) -> Vec<Step> {
    let items: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ (Value::Object(_) | Value::String(_))) => vec![single],
        _ => Vec::new(),
    };

    // (原始編號, 步驟)
    let mut steps: Vec<(Option<u64>, Step)> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(obj) => Some((
                obj.get("step_index").and_then(coerce_index),
                Step {
                    step_index: 0,
                    title: obj.get("title").and_then(coerce_string).unwrap_or_default(),
                    instruction: obj
                        .get("instruction")
                        .and_then(coerce_string)
                        .unwrap_or_default(),
                    timer_seconds: obj.get("timer_seconds").and_then(coerce_index),
                },
            )),
            Value::String(text) => Some((
                None,
                Step {
                    step_index: 0,
                    title: String::new(),
                    instruction: text.trim().to_string(),
                    timer_seconds: None,
                },
            )),
            _ => None,
        })
        .collect();

    let all_indexed = steps.iter().all(|(index, _)| index.is_some());
    if all_indexed {
        steps.sort_by_key(|(index, _)| *index);
    }

    let keep_original = all_indexed
        && steps
            .windows(2)
            .all(|pair| match (pair[0].0, pair[1].0) {
                (Some(prev), Some(next)) => prev.checked_add(1) == Some(next),
                _ => false,
            });

    steps
        .into_iter()
        .enumerate()
        .map(|(position, (original, mut step))| {
            step.step_index = match original {
                Some(index) if keep_original => index,
                _ => position as u64,
            };
            step
        })
        .collect()
}

/// 字串原樣保留，數字轉成字串，其餘型別視為缺值
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 非負整數或純數字字串，其餘（小數、負數、文字）一律視為 null
fn coerce_index(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

/// 由標題產生 id，例如 "Green Tea!" -> "green-tea"
fn generate_id(title: &str, index: usize) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        format!("recipe-{}", index)
    } else {
        slug
    }
}

fn unique_id(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }

    let mut suffix = 2;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if used.insert(candidate.clone()) {
            tracing::debug!("Recipe id '{}' already used, renamed to '{}'", base, candidate);
            return candidate;
        }
        suffix += 1;
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
