use crate::adapters::source::{FileSource, HttpSource};
use crate::core::mapping::FieldMapping;
use crate::domain::ports::{ConfigProvider, InvalidRecordPolicy, RecipeSource};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_OUTPUT_PATH: &str = "assets";
pub const DEFAULT_OUTPUT_FILENAME: &str = "recipes.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanerConfig {
    #[serde(default)]
    pub pipeline: PipelineInfo,
    pub source: SourceConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

impl Default for PipelineInfo {
    fn default() -> Self {
        Self {
            name: "recipe-cleaner".to_string(),
            description: None,
            version: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    File,
    Api,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: SourceKind,
    /// `type = "file"` 時的輸入檔
    pub path: Option<String>,
    /// `type = "api"` 時的端點
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
    pub parameters: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub field_mapping: FieldMapping,
    /// "fail" 或 "skip"
    pub on_invalid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub filename: Option<String>,
    pub pretty: Option<bool>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            filename: None,
            pretty: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: Option<String>,
    /// JSON 格式日誌
    pub json: Option<bool>,
}

impl CleanerConfig {
    /// 只指定輸入檔時使用的預設配置
    pub fn for_input(path: impl Into<String>) -> Self {
        Self {
            pipeline: PipelineInfo::default(),
            source: SourceConfig {
                r#type: SourceKind::File,
                path: Some(path.into()),
                endpoint: None,
                timeout_seconds: None,
                headers: None,
                parameters: None,
            },
            transform: TransformConfig::default(),
            load: LoadConfig::default(),
            monitoring: None,
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${API_KEY})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;

        match self.source.r#type {
            SourceKind::File => {
                let path = validation::validate_required_field("source.path", &self.source.path)?;
                validation::validate_path("source.path", path)?;
            }
            SourceKind::Api => {
                let endpoint =
                    validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
                validation::validate_url("source.endpoint", endpoint)?;
            }
        }

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", timeout, 1, 600)?;
        }

        if let Some(policy) = &self.transform.on_invalid {
            validation::validate_one_of("transform.on_invalid", policy, &["fail", "skip"])?;
        }

        for (from, to) in self.transform.field_mapping.iter() {
            validation::validate_non_empty_string("transform.field_mapping", from)?;
            validation::validate_non_empty_string("transform.field_mapping", to)?;
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_file_name("load.filename", self.output_filename(), "json")?;

        if let Some(level) = self.log_level() {
            validation::validate_one_of(
                "monitoring.log_level",
                level,
                &["trace", "debug", "info", "warn", "error"],
            )?;
        }

        Ok(())
    }

    /// 依 `[source]` 建立原始資料來源
    pub fn build_source(&self) -> Result<Box<dyn RecipeSource>> {
        match self.source.r#type {
            SourceKind::File => {
                let path = validation::validate_required_field("source.path", &self.source.path)?;
                Ok(Box::new(FileSource::new(path)))
            }
            SourceKind::Api => {
                let endpoint =
                    validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
                let mut source = HttpSource::new(endpoint.clone())
                    .with_headers(self.source.headers.clone().unwrap_or_default())
                    .with_parameters(self.source.parameters.clone().unwrap_or_default());
                if let Some(timeout) = self.source.timeout_seconds {
                    source = source.with_timeout(Duration::from_secs(timeout));
                }
                Ok(Box::new(source))
            }
        }
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json)
            .unwrap_or(false)
    }

    /// 完整輸出路徑，例如 `assets/recipes.json`
    pub fn output_file_path(&self) -> String {
        Path::new(&self.load.output_path)
            .join(self.output_filename())
            .to_string_lossy()
            .into_owned()
    }
}

impl ConfigProvider for CleanerConfig {
    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_filename(&self) -> &str {
        self.load.filename.as_deref().unwrap_or(DEFAULT_OUTPUT_FILENAME)
    }

    fn field_mapping(&self) -> &FieldMapping {
        &self.transform.field_mapping
    }

    fn invalid_record_policy(&self) -> InvalidRecordPolicy {
        match self.transform.on_invalid.as_deref() {
            Some("skip") => InvalidRecordPolicy::Skip,
            _ => InvalidRecordPolicy::Fail,
        }
    }

    fn pretty_output(&self) -> bool {
        self.load.pretty.unwrap_or(true)
    }
}

impl Validate for CleanerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
