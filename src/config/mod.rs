mod file_config;

pub use file_config::{FileConfig, MetadataConfig, ModelConfig, OfflineConfig};

use crate::llm::{
    CompletionOptions, GeminiProvider, LlmProvider, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
};
use crate::metadata::{MetadataFetcher, OEmbedClient, DEFAULT_OEMBED_ENDPOINT};
use crate::requester::{AnalysisRequester, RequesterSettings};
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variables checked, in order, for the model credential.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Reads the model credential from the environment, ignoring blank values.
pub fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub bind_address: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub request_timeout_sec: u64,
    pub no_metadata: bool,
    pub oembed_endpoint: String,
    pub oembed_timeout_sec: u64,
    pub offline_delay_ms: Option<u64>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3001,
            logging_level: RequestsLoggingLevel::Path,
            frontend_dir_path: None,
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout_sec: 120,
            no_metadata: false,
            oembed_endpoint: DEFAULT_OEMBED_ENDPOINT.to_string(),
            oembed_timeout_sec: 10,
            offline_delay_ms: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub bind_address: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    // Feature configs (with defaults)
    pub model: ModelSettings,
    pub metadata: MetadataSettings,
    pub offline: OfflineSettings,
}

#[derive(Clone)]
pub struct ModelSettings {
    /// Absent credential means offline mode.
    pub api_key: Option<String>,
    pub name: String,
    pub base_url: String,
    pub timeout: Duration,
    pub prompt_temperature: f32,
    pub prompt_top_p: f32,
}

impl std::fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("prompt_temperature", &self.prompt_temperature)
            .field("prompt_top_p", &self.prompt_top_p)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct MetadataSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct OfflineSettings {
    pub analysis_delay: Duration,
    pub prompt_delay: Duration,
}

impl Default for OfflineSettings {
    fn default() -> Self {
        let defaults = RequesterSettings::default();
        Self {
            analysis_delay: defaults.offline_analysis_delay,
            prompt_delay: defaults.offline_prompt_delay,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());
        let port = file.port.unwrap_or(cli.port);

        let logging_level = match file.logging_level {
            Some(level) => match parse_logging_level(&level) {
                Some(level) => level,
                None => bail!("Invalid logging_level in config file: {}", level),
            },
            None => cli.logging_level.clone(),
        };

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        // Model settings - merge file config with CLI values
        let model_file = file.model.unwrap_or_default();
        let prompt_defaults = RequesterSettings::default().prompt_options;
        let model = ModelSettings {
            api_key: model_file
                .api_key
                .or_else(|| cli.api_key.clone())
                .filter(|key| !key.trim().is_empty()),
            name: model_file.name.unwrap_or_else(|| cli.model.clone()),
            base_url: model_file
                .base_url
                .unwrap_or_else(|| cli.api_base_url.clone()),
            timeout: Duration::from_secs(
                model_file.timeout_sec.unwrap_or(cli.request_timeout_sec),
            ),
            prompt_temperature: model_file
                .prompt_temperature
                .or(prompt_defaults.temperature)
                .unwrap_or(0.8),
            prompt_top_p: model_file
                .prompt_top_p
                .or(prompt_defaults.top_p)
                .unwrap_or(0.9),
        };
        if model.timeout.is_zero() {
            bail!("Model request timeout must be greater than zero");
        }

        let metadata_file = file.metadata.unwrap_or_default();
        let metadata = MetadataSettings {
            enabled: metadata_file.enabled.unwrap_or(!cli.no_metadata),
            endpoint: metadata_file
                .endpoint
                .unwrap_or_else(|| cli.oembed_endpoint.clone()),
            timeout: Duration::from_secs(
                metadata_file.timeout_sec.unwrap_or(cli.oembed_timeout_sec),
            ),
        };

        let offline_file = file.offline.unwrap_or_default();
        let offline_defaults = OfflineSettings::default();
        let offline = OfflineSettings {
            analysis_delay: offline_file
                .analysis_delay_ms
                .or(cli.offline_delay_ms)
                .map(Duration::from_millis)
                .unwrap_or(offline_defaults.analysis_delay),
            prompt_delay: offline_file
                .prompt_delay_ms
                .or(cli.offline_delay_ms)
                .map(Duration::from_millis)
                .unwrap_or(offline_defaults.prompt_delay),
        };

        Ok(Self {
            bind_address,
            port,
            logging_level,
            frontend_dir_path,
            model,
            metadata,
            offline,
        })
    }

    pub fn is_offline(&self) -> bool {
        self.model.api_key.is_none()
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            bind_address: self.bind_address.clone(),
            port: self.port,
            frontend_dir_path: self.frontend_dir_path.clone(),
        }
    }

    pub fn requester_settings(&self) -> RequesterSettings {
        RequesterSettings {
            offline_analysis_delay: self.offline.analysis_delay,
            offline_prompt_delay: self.offline.prompt_delay,
            analysis_options: CompletionOptions {
                timeout: self.model.timeout,
                ..Default::default()
            },
            prompt_options: CompletionOptions {
                temperature: Some(self.model.prompt_temperature),
                top_p: Some(self.model.prompt_top_p),
                timeout: self.model.timeout,
                ..Default::default()
            },
        }
    }

    /// The model backend, or `None` when no credential is configured.
    pub fn build_provider(&self) -> Option<Arc<dyn LlmProvider>> {
        let api_key = self.model.api_key.as_ref()?;
        info!(model = %self.model.name, base_url = %self.model.base_url, "Using Gemini backend");
        Some(Arc::new(GeminiProvider::new(
            self.model.base_url.clone(),
            self.model.name.clone(),
            api_key.clone(),
        )))
    }

    pub fn build_requester(&self) -> AnalysisRequester {
        let provider = self.build_provider();
        if provider.is_none() {
            warn!("No API key configured. Using mock responses for analysis and prompts.");
        }
        AnalysisRequester::new(provider, self.requester_settings())
    }

    pub fn build_metadata_fetcher(&self) -> Result<Option<Arc<dyn MetadataFetcher>>> {
        if !self.metadata.enabled {
            info!("Video metadata enrichment disabled");
            return Ok(None);
        }
        let client = OEmbedClient::new(self.metadata.endpoint.clone(), self.metadata.timeout)?;
        Ok(Some(Arc::new(client)))
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("PATH"),
            Some(RequestsLoggingLevel::Path)
        ));
        assert!(matches!(
            parse_logging_level("body"),
            Some(RequestsLoggingLevel::Body)
        ));
        assert!(parse_logging_level("invalid").is_none());
    }

    #[test]
    fn test_resolve_cli_only() {
        let cli = CliConfig {
            port: 4001,
            logging_level: RequestsLoggingLevel::Headers,
            frontend_dir_path: Some("/frontend".to_string()),
            api_key: Some("cli-key".to_string()),
            offline_delay_ms: Some(0),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.port, 4001);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        assert_eq!(config.frontend_dir_path, Some("/frontend".to_string()));
        assert_eq!(config.model.api_key.as_deref(), Some("cli-key"));
        assert_eq!(config.model.name, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.model.timeout, Duration::from_secs(120));
        assert!((config.model.prompt_temperature - 0.8).abs() < 1e-6);
        assert!((config.model.prompt_top_p - 0.9).abs() < 1e-6);
        assert!(config.metadata.enabled);
        assert_eq!(config.metadata.endpoint, DEFAULT_OEMBED_ENDPOINT);
        assert_eq!(config.offline.analysis_delay, Duration::ZERO);
        assert_eq!(config.offline.prompt_delay, Duration::ZERO);
        assert!(!config.is_offline());
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let cli = CliConfig {
            port: 4001,
            api_key: Some("cli-key".to_string()),
            logging_level: RequestsLoggingLevel::Path,
            ..Default::default()
        };

        let file_config = FileConfig {
            port: Some(5000),
            logging_level: Some("body".to_string()),
            model: Some(ModelConfig {
                api_key: Some("file-key".to_string()),
                name: Some("gemini-2.5-pro".to_string()),
                ..Default::default()
            }),
            metadata: Some(MetadataConfig {
                enabled: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
        assert_eq!(config.model.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.model.name, "gemini-2.5-pro");
        assert!(!config.metadata.enabled);
        // CLI value used when TOML doesn't specify
        assert_eq!(config.bind_address, "127.0.0.1");
    }

    #[test]
    fn test_blank_api_key_means_offline() {
        let cli = CliConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, None).unwrap();
        assert!(config.is_offline());
        assert!(config.build_provider().is_none());
        assert!(config.build_requester().is_offline());
    }

    #[test]
    fn test_offline_delays_default_to_simulated_latency() {
        let config = AppConfig::resolve(&CliConfig::default(), None).unwrap();
        assert_eq!(config.offline.analysis_delay, Duration::from_millis(1500));
        assert_eq!(config.offline.prompt_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_invalid_logging_level_in_file_is_error() {
        let file_config = FileConfig {
            logging_level: Some("verbose".to_string()),
            ..Default::default()
        };
        let err = AppConfig::resolve(&CliConfig::default(), Some(file_config)).unwrap_err();
        assert!(err.to_string().contains("Invalid logging_level"));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let cli = CliConfig {
            request_timeout_sec: 0,
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let cli = CliConfig {
            api_key: Some("super-secret".to_string()),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, None).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
