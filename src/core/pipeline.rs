use crate::adapters::source::fetch_document;
use crate::core::normalizer;
use crate::domain::model::TransformResult;
use crate::domain::ports::{ConfigProvider, InvalidRecordPolicy, Pipeline, RecipeSource, Storage};
use crate::utils::error::{EtlError, Result};
use std::path::Path;

/// 讀取原始資料 -> 正規化 -> 寫出 `recipes.json`
pub struct RecipePipeline<S: Storage, C: ConfigProvider> {
    source: Box<dyn RecipeSource>,
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> RecipePipeline<S, C> {
    pub fn new(source: Box<dyn RecipeSource>, storage: S, config: C) -> Self {
        Self {
            source,
            storage,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for RecipePipeline<S, C> {
    async fn extract(&self) -> Result<serde_json::Value> {
        tracing::info!("📥 Fetching raw recipes from {}", self.source.describe());
        fetch_document(self.source.as_ref()).await
    }

    async fn transform(&self, raw: serde_json::Value) -> Result<TransformResult> {
        let mapping = self.config.field_mapping();
        if !mapping.is_empty() {
            tracing::debug!("Applying {} field mapping(s)", mapping.len());
        }

        let result = normalizer::normalize(&mapping.apply(raw))?;

        if !result.rejected.is_empty() {
            match self.config.invalid_record_policy() {
                InvalidRecordPolicy::Fail => {
                    return Err(EtlError::ValidationError {
                        failures: result.rejected,
                    });
                }
                InvalidRecordPolicy::Skip => {
                    for issue in &result.rejected {
                        tracing::warn!("⚠️ Skipping {}", issue);
                    }
                }
            }
        }

        tracing::info!(
            "🔧 Normalized {} recipe(s), {} rejected",
            result.collection.len(),
            result.rejected.len()
        );
        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let filename = self.config.output_filename();
        let output_path = Path::new(self.config.output_path())
            .join(filename)
            .to_string_lossy()
            .into_owned();

        let mut json = if self.config.pretty_output() {
            serde_json::to_string_pretty(&result.collection)?
        } else {
            serde_json::to_string(&result.collection)?
        };
        json.push('\n');

        self.storage.write_file(filename, json.as_bytes()).await?;

        tracing::info!("💾 Saved {} recipe(s) to {}", result.collection.len(), output_path);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mapping::FieldMapping;
    use crate::domain::model::RecipeCollection;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockSource {
        body: String,
    }

    #[async_trait::async_trait]
    impl RecipeSource for MockSource {
        fn describe(&self) -> String {
            "mock source".to_string()
        }

        async fn fetch(&self) -> Result<String> {
            Ok(self.body.clone())
        }
    }

    struct MockConfig {
        mapping: FieldMapping,
        policy: InvalidRecordPolicy,
        pretty: bool,
    }

    impl MockConfig {
        fn new(policy: InvalidRecordPolicy) -> Self {
            Self {
                mapping: FieldMapping::new(),
                policy,
                pretty: false,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn output_path(&self) -> &str {
            "assets"
        }

        fn output_filename(&self) -> &str {
            "recipes.json"
        }

        fn field_mapping(&self) -> &FieldMapping {
            &self.mapping
        }

        fn invalid_record_policy(&self) -> InvalidRecordPolicy {
            self.policy
        }

        fn pretty_output(&self) -> bool {
            self.pretty
        }
    }

    fn pipeline(
        body: &str,
        config: MockConfig,
    ) -> (RecipePipeline<MockStorage, MockConfig>, MockStorage) {
        let storage = MockStorage::new();
        let source = Box::new(MockSource {
            body: body.to_string(),
        });
        (RecipePipeline::new(source, storage.clone(), config), storage)
    }

    #[tokio::test]
    async fn test_extract_strips_markdown_fences() {
        let (pipeline, _) = pipeline(
            "```json\n{\"title\": \"Tea\"}\n```",
            MockConfig::new(InvalidRecordPolicy::Fail),
        );

        let raw = pipeline.extract().await.unwrap();
        assert_eq!(raw, json!({"title": "Tea"}));
    }

    #[tokio::test]
    async fn test_extract_invalid_json() {
        let (pipeline, _) = pipeline("not json", MockConfig::new(InvalidRecordPolicy::Fail));
        assert!(matches!(
            pipeline.extract().await,
            Err(EtlError::SerializationError(_))
        ));
    }

    #[tokio::test]
    async fn test_transform_applies_mapping() {
        let mut config = MockConfig::new(InvalidRecordPolicy::Fail);
        config.mapping = FieldMapping::new().with("items", "recipes").with("ings", "ingredients");
        let (pipeline, _) = pipeline("", config);

        let result = pipeline
            .transform(json!({"items": [{"title": "Tea", "ings": ["Water"]}]}))
            .await
            .unwrap();

        assert_eq!(result.collection.len(), 1);
        assert_eq!(result.collection.recipes[0].ingredients[0].name, "Water");
    }

    #[tokio::test]
    async fn test_transform_fail_policy_reports_all_records() {
        let (pipeline, _) = pipeline("", MockConfig::new(InvalidRecordPolicy::Fail));

        let result = pipeline
            .transform(json!([{"id": "a"}, {"title": "Ok"}, {"id": "c"}]))
            .await;

        match result {
            Err(EtlError::ValidationError { failures }) => {
                let ids: Vec<_> = failures.iter().map(|f| f.id.clone()).collect();
                assert_eq!(ids, vec![Some("a".to_string()), Some("c".to_string())]);
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transform_skip_policy_keeps_valid_records() {
        let (pipeline, _) = pipeline("", MockConfig::new(InvalidRecordPolicy::Skip));

        let result = pipeline
            .transform(json!([{"id": "a"}, {"title": "Ok"}]))
            .await
            .unwrap();

        assert_eq!(result.collection.len(), 1);
        assert_eq!(result.rejected.len(), 1);
    }

    #[tokio::test]
    async fn test_load_writes_recipes_json() {
        let (pipeline, storage) = pipeline("", MockConfig::new(InvalidRecordPolicy::Fail));
        let result = pipeline
            .transform(json!({"recipes": [{"title": "Tea", "steps": ["Boil water"]}]}))
            .await
            .unwrap();

        let output_path = pipeline.load(result).await.unwrap();
        assert_eq!(
            Path::new(&output_path),
            Path::new("assets").join("recipes.json")
        );

        let written = storage.get_file("recipes.json").await.unwrap();
        let collection =
            RecipeCollection::from_json_str(std::str::from_utf8(&written).unwrap()).unwrap();
        assert_eq!(collection.recipes[0].id, "tea");
        assert_eq!(collection.recipes[0].steps[0].instruction, "Boil water");
    }
}
