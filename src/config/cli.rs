use crate::config::toml_config::CleanerConfig;
use crate::core::mapping::FieldMapping;
use crate::utils::error::{EtlError, Result};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "recipe-etl")]
#[command(about = "Cleans messy raw recipe data into the App's recipes.json schema")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Raw JSON input file (overrides [source])
    #[arg(short, long)]
    pub input: Option<String>,

    /// Extra field mapping, e.g. --map items=recipes --map text=instruction
    #[arg(short, long = "map", value_name = "FROM=TO")]
    pub mappings: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Show what would be processed without reading or writing data
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// 合併配置檔與命令列參數
    pub fn resolve_config(&self) -> Result<CleanerConfig> {
        let mut config = match (&self.config, &self.input) {
            (Some(path), _) => CleanerConfig::from_file(path)?,
            (None, Some(input)) => CleanerConfig::for_input(input.clone()),
            (None, None) => {
                return Err(EtlError::MissingConfigError {
                    field: "--config or --input".to_string(),
                })
            }
        };

        if let (Some(_), Some(input)) = (&self.config, &self.input) {
            config = CleanerConfig {
                source: CleanerConfig::for_input(input.clone()).source,
                ..config
            };
        }

        for pair in &self.mappings {
            let (from, to) =
                FieldMapping::parse_pair(pair).ok_or_else(|| EtlError::InvalidConfigValueError {
                    field: "--map".to_string(),
                    value: pair.clone(),
                    reason: "Expected FROM=TO".to_string(),
                })?;
            config.transform.field_mapping.insert(from, to);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::SourceKind;
    use crate::domain::ports::ConfigProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_input_only_uses_defaults() {
        let args = CliArgs::parse_from([
            "recipe-etl",
            "--input",
            "raw.json",
            "--map",
            "items=recipes",
            "-m",
            "ings=ingredients",
        ]);
        let config = args.resolve_config().unwrap();

        assert_eq!(config.source.r#type, SourceKind::File);
        assert_eq!(config.source.path.as_deref(), Some("raw.json"));
        assert_eq!(config.field_mapping().len(), 2);
        assert_eq!(config.output_path(), "assets");
    }

    #[test]
    fn test_input_overrides_config_source() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[source]\ntype = \"api\"\nendpoint = \"https://example.com/raw\"\n\n[load]\noutput_path = \"out\"\n")
            .unwrap();

        let args = CliArgs::parse_from([
            "recipe-etl",
            "--config",
            temp_file.path().to_str().unwrap(),
            "--input",
            "local.json",
        ]);
        let config = args.resolve_config().unwrap();

        assert_eq!(config.source.r#type, SourceKind::File);
        assert_eq!(config.output_path(), "out");
    }

    #[test]
    fn test_requires_config_or_input() {
        let args = CliArgs::parse_from(["recipe-etl"]);
        assert!(matches!(
            args.resolve_config(),
            Err(EtlError::MissingConfigError { .. })
        ));

        let args = CliArgs::parse_from(["recipe-etl", "-i", "raw.json", "--map", "broken"]);
        assert!(matches!(
            args.resolve_config(),
            Err(EtlError::InvalidConfigValueError { .. })
        ));
    }
}
