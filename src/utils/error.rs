use crate::domain::model::RecordIssue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Source error: {message}")]
    SourceError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation failed for {} record(s): {}", .failures.len(), summarize(.failures))]
    ValidationError { failures: Vec<RecordIssue> },

    #[error("Output violates recipe schema: {message}")]
    SchemaViolation { message: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Io,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

fn summarize(failures: &[RecordIssue]) -> String {
    failures
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::SourceError { .. } => ErrorCategory::Network,
            EtlError::TomlError(_)
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) => ErrorCategory::Io,
            EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::ValidationError { .. }
            | EtlError::SchemaViolation { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 遠端服務暫時失敗，重跑即可
            EtlError::ApiError(_) | EtlError::SourceError { .. } => ErrorSeverity::Medium,
            EtlError::ValidationError { .. }
            | EtlError::ProcessingError { .. }
            | EtlError::SerializationError(_)
            | EtlError::TomlError(_)
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorSeverity::High,
            // 正規化後的輸出仍不符合 schema 代表程式本身有問題
            EtlError::IoError(_) | EtlError::SchemaViolation { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ApiError(_) | EtlError::SourceError { .. } => {
                "Check that the source endpoint is reachable and returns JSON".to_string()
            }
            EtlError::IoError(_) => {
                "Check that the input file exists and the output directory is writable".to_string()
            }
            EtlError::SerializationError(_) => {
                "Make sure the raw input is valid JSON (markdown code fences are stripped automatically)"
                    .to_string()
            }
            EtlError::TomlError(_) => {
                "Fix the TOML configuration file syntax".to_string()
            }
            EtlError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' in the configuration", field)
            }
            EtlError::MissingConfigError { field } => {
                format!("Add '{}' to the configuration", field)
            }
            EtlError::ProcessingError { .. } => {
                "The raw document must be a JSON object or array of recipes".to_string()
            }
            EtlError::ValidationError { .. } => {
                "Add a title to the listed records, map their title field via [transform.field_mapping], or set on_invalid = \"skip\""
                    .to_string()
            }
            EtlError::SchemaViolation { .. } => {
                "Report this as a bug together with the raw input".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ValidationError { failures } => {
                let mut message = format!("{} record(s) could not be cleaned:", failures.len());
                for issue in failures {
                    message.push_str("\n  - ");
                    message.push_str(&issue.to_string());
                }
                message
            }
            EtlError::ApiError(_) | EtlError::SourceError { .. } => {
                format!("Could not fetch raw recipes: {}", self)
            }
            EtlError::IoError(e) => format!("File access failed: {}", e),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_record() {
        let err = EtlError::ValidationError {
            failures: vec![
                RecordIssue::new(0, None, "missing usable title"),
                RecordIssue::new(3, Some("soup".to_string()), "missing usable title"),
            ],
        };

        let text = err.to_string();
        assert!(text.starts_with("Validation failed for 2 record(s)"));
        assert!(text.contains("record #0"));
        assert!(text.contains("record #3 (id \"soup\")"));

        let friendly = err.user_friendly_message();
        assert_eq!(friendly.lines().count(), 3);
    }

    #[test]
    fn test_severity_and_category() {
        let err = EtlError::SourceError {
            message: "HTTP 503".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = EtlError::ValidationError { failures: vec![] };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);

        let err = EtlError::MissingConfigError {
            field: "source.path".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.recovery_suggestion().contains("source.path"));
    }
}
