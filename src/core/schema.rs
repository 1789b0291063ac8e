use crate::domain::model::{Recipe, RecipeCollection};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use std::collections::HashSet;

impl RecipeCollection {
    /// 讀取已經是標準格式的文件，並檢查所有不變量
    pub fn from_json_str(content: &str) -> Result<Self> {
        let collection: RecipeCollection = serde_json::from_str(content)?;
        collection.validate()?;
        Ok(collection)
    }
}

impl Validate for RecipeCollection {
    fn validate(&self) -> Result<()> {
        let mut seen_ids = HashSet::new();
        for recipe in &self.recipes {
            recipe.validate()?;
            if !seen_ids.insert(recipe.id.as_str()) {
                return Err(violation(format!("duplicate recipe id {:?}", recipe.id)));
            }
        }
        Ok(())
    }
}

impl Validate for Recipe {
    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(violation(format!("recipe {:?} has an empty id", self.title)));
        }
        if self.title.trim().is_empty() {
            return Err(violation(format!("recipe {:?} has an empty title", self.id)));
        }

        let mut indices: Vec<u64> = self.steps.iter().map(|s| s.step_index).collect();
        indices.sort_unstable();
        for pair in indices.windows(2) {
            if pair[0] == pair[1] {
                return Err(violation(format!(
                    "recipe {:?} repeats step_index {}",
                    self.id, pair[0]
                )));
            }
            if pair[1] != pair[0] + 1 {
                return Err(violation(format!(
                    "recipe {:?} has a gap between step_index {} and {}",
                    self.id, pair[0], pair[1]
                )));
            }
        }

        Ok(())
    }
}

fn violation(message: String) -> EtlError {
    EtlError::SchemaViolation { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Ingredient, Step};

    fn step(index: u64) -> Step {
        Step {
            step_index: index,
            title: String::new(),
            instruction: format!("Step {}", index),
            timer_seconds: None,
        }
    }

    fn recipe(id: &str, title: &str, steps: Vec<Step>) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: title.to_string(),
            ingredients: vec![Ingredient {
                name: "Water".to_string(),
                amount: "1 cup".to_string(),
            }],
            steps,
        }
    }

    #[test]
    fn test_valid_collection() {
        let collection = RecipeCollection {
            recipes: vec![
                recipe("tea", "Tea", vec![step(0), step(1)]),
                recipe("soup", "Soup", vec![]),
            ],
        };
        assert!(collection.validate().is_ok());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let collection = RecipeCollection {
            recipes: vec![recipe("tea", "Tea", vec![]), recipe("tea", "Tea 2", vec![])],
        };
        assert!(matches!(
            collection.validate(),
            Err(EtlError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn test_rejects_blank_title_and_id() {
        assert!(recipe("tea", "  ", vec![]).validate().is_err());
        assert!(recipe("", "Tea", vec![]).validate().is_err());
    }

    #[test]
    fn test_rejects_repeated_or_gapped_step_index() {
        assert!(recipe("tea", "Tea", vec![step(0), step(0)]).validate().is_err());
        assert!(recipe("tea", "Tea", vec![step(0), step(2)]).validate().is_err());
        assert!(recipe("tea", "Tea", vec![step(2), step(1)]).validate().is_ok());
    }

    #[test]
    fn test_from_json_str_is_strict() {
        let ok = r#"{"recipes":[{"id":"tea","title":"Tea","ingredients":[],"steps":[
            {"step_index":0,"title":"Boil","instruction":"Boil water","timer_seconds":300}]}]}"#;
        let collection = RecipeCollection::from_json_str(ok).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.recipes[0].steps[0].timer_seconds, Some(300));

        let unknown_field = r#"{"recipes":[{"id":"tea","title":"Tea","ingredients":[],"steps":[],"notes":""}]}"#;
        assert!(matches!(
            RecipeCollection::from_json_str(unknown_field),
            Err(EtlError::SerializationError(_))
        ));

        let negative_timer = r#"{"recipes":[{"id":"tea","title":"Tea","ingredients":[],"steps":[
            {"step_index":0,"title":"","instruction":"","timer_seconds":-5}]}]}"#;
        assert!(RecipeCollection::from_json_str(negative_timer).is_err());
    }
}
