use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sonifai_server::config;
use sonifai_server::llm::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use sonifai_server::metadata::DEFAULT_OEMBED_ENDPOINT;
use sonifai_server::server::{metrics, run_server, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(styles = sonifai_server::cli_style::get_styles())]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The address to bind to.
    #[clap(long, default_value = "127.0.0.1")]
    pub bind_address: String,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Gemini API key. Falls back to GEMINI_API_KEY, then API_KEY.
    /// Without a key the server runs in offline mode with fixed sample data.
    #[clap(long)]
    pub api_key: Option<String>,

    /// Name of the model used for analysis and prompt generation.
    #[clap(long, default_value = DEFAULT_GEMINI_MODEL)]
    pub model: String,

    /// Base URL of the Gemini API.
    #[clap(long, default_value = DEFAULT_GEMINI_BASE_URL)]
    pub api_base_url: String,

    /// Timeout in seconds for model requests.
    #[clap(long, default_value_t = 120)]
    pub request_timeout_sec: u64,

    /// Skip the oEmbed title/author lookup for YouTube links.
    #[clap(long)]
    pub no_metadata: bool,

    /// oEmbed endpoint used to look up video metadata.
    #[clap(long, default_value = DEFAULT_OEMBED_ENDPOINT)]
    pub oembed_endpoint: String,

    /// Timeout in seconds for oEmbed lookups.
    #[clap(long, default_value_t = 10)]
    pub oembed_timeout_sec: u64,

    /// Overrides the simulated latency of offline responses, in milliseconds.
    #[clap(long)]
    pub offline_delay_ms: Option<u64>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            bind_address: args.bind_address.clone(),
            port: args.port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            api_key: args.api_key.clone().or_else(config::api_key_from_env),
            model: args.model.clone(),
            api_base_url: args.api_base_url.clone(),
            request_timeout_sec: args.request_timeout_sec,
            no_metadata: args.no_metadata,
            oembed_endpoint: args.oembed_endpoint.clone(),
            oembed_timeout_sec: args.oembed_timeout_sec,
            offline_delay_ms: args.offline_delay_ms,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration:");
    info!("  bind_address: {}", app_config.bind_address);
    info!("  port: {}", app_config.port);
    info!("  logging_level: {}", app_config.logging_level);
    info!("  model: {}", app_config.model.name);
    info!("  metadata enrichment: {}", app_config.metadata.enabled);

    info!("Initializing metrics...");
    metrics::init_metrics();

    let requester = Arc::new(app_config.build_requester());
    if requester.is_offline() {
        warn!("Running in offline mode: analyses and prompts are fixed sample data.");
    }
    let metadata = app_config.build_metadata_fetcher()?;

    run_server(app_config.server_config(), requester, metadata).await
}
