use domain::services::{PipelineOptions, RunMode, DEFAULT_NESTED_GROUP_DEPTH};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::args::Cli;
use crate::services::report_writer::ReportFormat;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub azure: AzureConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// App registration used for the client-credentials grant.
#[derive(Debug, Clone, Deserialize)]
pub struct AzureConfig {
    /// Directory (tenant) ID or verified domain
    #[serde(default)]
    pub tenant_id: String,

    /// Application (client) ID
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_authority_host")]
    pub authority_host: String,

    #[serde(default = "default_scope")]
    pub scope: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_graph_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub run_mode: RunMode,

    /// How many levels of nested groups are expanded when counting assigned users
    #[serde(default = "default_nested_group_depth")]
    pub nested_group_depth: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_formats")]
    pub formats: Vec<ReportFormat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` or `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            authority_host: default_authority_host(),
            scope: default_scope(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: default_graph_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            run_mode: RunMode::default(),
            nested_group_depth: default_nested_group_depth(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            formats: default_formats(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_authority_host() -> String {
    "https://login.microsoftonline.com".to_string()
}
fn default_scope() -> String {
    "https://graph.microsoft.com/.default".to_string()
}
fn default_graph_base_url() -> String {
    "https://graph.microsoft.com/beta".to_string()
}
fn default_request_timeout() -> u64 {
    60
}
fn default_nested_group_depth() -> u32 {
    DEFAULT_NESTED_GROUP_DEPTH
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}
fn default_formats() -> Vec<ReportFormat> {
    vec![ReportFormat::Csv]
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration (optional)
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with DSR__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(Self::environment())
            .build()?;

        config.try_deserialize()
    }

    /// `DSR__SECTION__KEY` variables, e.g. `DSR__AZURE__TENANT_ID` for `azure.tenant_id`.
    fn environment() -> config::Environment {
        config::Environment::with_prefix("DSR").separator("__")
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds the config from embedded defaults and overrides, without
    /// touching config files or the environment.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [azure]
            tenant_id = ""
            client_id = ""
            client_secret = ""

            [graph]
            base_url = "https://graph.microsoft.com/beta"
            request_timeout_secs = 60

            [pipeline]
            run_mode = "useranddevice"
            nested_group_depth = 1

            [report]
            output_dir = "reports"
            formats = ["csv"]

            [logging]
            level = "info"
            format = "pretty"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Apply command-line overrides on top of file and environment values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(mode) = cli.mode {
            self.pipeline.run_mode = mode;
        }
        if let Some(depth) = cli.depth {
            self.pipeline.nested_group_depth = depth;
        }
        if let Some(output) = &cli.output {
            self.report.output_dir = output.clone();
        }
        if !cli.formats.is_empty() {
            self.report.formats = cli.formats.clone();
        }
        match cli.verbose {
            0 => {}
            1 => self.logging.level = "debug".to_string(),
            _ => self.logging.level = "trace".to_string(),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.azure.tenant_id.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "DSR__AZURE__TENANT_ID environment variable must be set".to_string(),
            ));
        }
        if self.azure.client_id.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "DSR__AZURE__CLIENT_ID environment variable must be set".to_string(),
            ));
        }
        if self.azure.client_secret.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "DSR__AZURE__CLIENT_SECRET environment variable must be set".to_string(),
            ));
        }

        let invalid = |e: validator::ValidationError| {
            ConfigValidationError::InvalidValue(
                e.message.map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()),
            )
        };
        shared::validation::validate_tenant_id(&self.azure.tenant_id).map_err(invalid)?;
        shared::validation::validate_client_id(&self.azure.client_id).map_err(invalid)?;
        shared::validation::validate_https_url(&self.graph.base_url).map_err(invalid)?;
        shared::validation::validate_nested_group_depth(self.pipeline.nested_group_depth)
            .map_err(invalid)?;

        if self.graph.request_timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Request timeout cannot be 0".to_string(),
            ));
        }

        if self.report.formats.is_empty() {
            return Err(ConfigValidationError::InvalidValue(
                "At least one report format is required".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.graph.request_timeout_secs)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            run_mode: self.pipeline.run_mode,
            nested_group_depth: self.pipeline.nested_group_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const TENANT: &str = "72f988bf-86f1-41af-91ab-2d7cd011db47";
    const CLIENT: &str = "9a3c5f0e-1b2d-4c6e-8f7a-0b1c2d3e4f50";

    fn valid_overrides() -> Vec<(&'static str, &'static str)> {
        vec![
            ("azure.tenant_id", TENANT),
            ("azure.client_id", CLIENT),
            ("azure.client_secret", "s3cret"),
        ]
    }

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&valid_overrides()).expect("Failed to load config");

        assert_eq!(config.graph.base_url, "https://graph.microsoft.com/beta");
        assert_eq!(config.pipeline.run_mode, RunMode::UserAndDevice);
        assert_eq!(config.pipeline.nested_group_depth, 1);
        assert_eq!(config.report.formats, vec![ReportFormat::Csv]);
        assert_eq!(config.azure.authority_host, "https://login.microsoftonline.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_file_with_environment_overrides() {
        let env: config::Map<String, String> = [
            ("DSR__AZURE__TENANT_ID", TENANT),
            ("DSR__AZURE__CLIENT_ID", CLIENT),
            ("DSR__AZURE__CLIENT_SECRET", "s3cret"),
            ("DSR__PIPELINE__RUN_MODE", "device"),
            ("DSR__PIPELINE__NESTED_GROUP_DEPTH", "2"),
            ("DSR__REPORT__OUTPUT_DIR", "out"),
            ("OTHER__AZURE__TENANT_ID", "ignored"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../../../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(Config::environment().source(Some(env)))
            .build()
            .expect("Failed to build config")
            .try_deserialize()
            .expect("Failed to deserialize config");

        assert_eq!(config.azure.tenant_id, TENANT);
        assert_eq!(config.azure.client_id, CLIENT);
        assert_eq!(config.azure.client_secret, "s3cret");
        assert_eq!(config.pipeline.run_mode, RunMode::Device);
        assert_eq!(config.pipeline.nested_group_depth, 2);
        assert_eq!(config.report.output_dir, PathBuf::from("out"));
        // Untouched keys keep the file defaults.
        assert_eq!(config.graph.base_url, "https://graph.microsoft.com/beta");
        assert_eq!(config.report.formats, vec![ReportFormat::Csv]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_override() {
        let mut overrides = valid_overrides();
        overrides.push(("pipeline.run_mode", "device"));
        overrides.push(("pipeline.nested_group_depth", "3"));
        overrides.push(("logging.level", "debug"));

        let config = Config::load_for_test(&overrides).expect("Failed to load config");

        assert_eq!(config.pipeline.run_mode, RunMode::Device);
        assert_eq!(config.pipeline.nested_group_depth, 3);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_config_validation_missing_tenant() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("DSR__AZURE__TENANT_ID"));
    }

    #[test]
    fn test_config_validation_bad_client_id() {
        let config = Config::load_for_test(&[
            ("azure.tenant_id", TENANT),
            ("azure.client_id", "my-app"),
            ("azure.client_secret", "s3cret"),
        ])
        .expect("Failed to load config");

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Client ID must be a GUID"));
    }

    #[test]
    fn test_config_validation_depth_out_of_range() {
        let mut overrides = valid_overrides();
        overrides.push(("pipeline.nested_group_depth", "0"));
        let config = Config::load_for_test(&overrides).expect("Failed to load config");

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Nested group depth"));
    }

    #[test]
    fn test_config_validation_rejects_plain_http() {
        let mut overrides = valid_overrides();
        overrides.push(("graph.base_url", "http://graph.microsoft.com/beta"));
        let config = Config::load_for_test(&overrides).expect("Failed to load config");

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_cli_overrides() {
        let mut config = Config::load_for_test(&valid_overrides()).expect("Failed to load config");
        let cli = Cli::parse_from([
            "deployment-report",
            "--mode",
            "user",
            "--depth",
            "2",
            "--output",
            "out",
            "--format",
            "html",
            "--format",
            "csv",
            "-v",
        ]);

        config.apply_cli(&cli);

        assert_eq!(config.pipeline.run_mode, RunMode::User);
        assert_eq!(config.pipeline.nested_group_depth, 2);
        assert_eq!(config.report.output_dir, PathBuf::from("out"));
        assert_eq!(
            config.report.formats,
            vec![ReportFormat::Html, ReportFormat::Csv]
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_pipeline_options_from_config() {
        let mut overrides = valid_overrides();
        overrides.push(("pipeline.run_mode", "user"));
        let config = Config::load_for_test(&overrides).expect("Failed to load config");

        let options = config.pipeline_options();
        assert_eq!(options.run_mode, RunMode::User);
        assert_eq!(options.nested_group_depth, 1);
    }
}
