use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sonifai_server::analysis::VariationParams;
use sonifai_server::cli_style::{self, get_styles};
use sonifai_server::config;
use sonifai_server::session::AnalysisSession;

/// Analyzes a song from the terminal, optionally applying a variation and
/// generating a music prompt.
#[derive(Parser, Debug)]
#[command(styles = get_styles())]
struct CliArgs {
    /// A YouTube link or a free-text song description.
    pub source: String,

    /// Path to TOML configuration file, same format as the server one.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Gemini API key. Falls back to GEMINI_API_KEY, then API_KEY.
    #[clap(long)]
    pub api_key: Option<String>,

    /// Tempo change in percent, within [-20, 20].
    #[clap(long, default_value_t = 0, allow_hyphen_values = true)]
    pub tempo: i32,

    /// Key change in semitones, within [-6, 6].
    #[clap(long, default_value_t = 0, allow_hyphen_values = true)]
    pub key: i32,

    /// Energy change in percentage points, within [-25, 25].
    #[clap(long, default_value_t = 0, allow_hyphen_values = true)]
    pub energy: i32,

    /// Also generate a music prompt for the (varied) analysis.
    #[clap(long)]
    pub prompt: bool,

    /// Print the session snapshot as JSON instead of the styled report.
    #[clap(long)]
    pub json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let params = match VariationParams::new(cli_args.tempo, cli_args.key, cli_args.energy) {
        Ok(params) => params,
        Err(e) => {
            cli_style::print_error(&e.to_string());
            std::process::exit(2);
        }
    };

    let file_config = match &cli_args.config {
        Some(path) => Some(config::FileConfig::load(path)?),
        None => None,
    };
    let cli_config = config::CliConfig {
        api_key: cli_args.api_key.clone().or_else(config::api_key_from_env),
        ..Default::default()
    };
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    let requester = Arc::new(app_config.build_requester());
    let session = AnalysisSession::new(requester.clone(), app_config.build_metadata_fetcher()?);

    if requester.is_offline() && !cli_args.json {
        cli_style::print_warning("No API key configured, showing sample data.");
    }

    if let Err(e) = session.analyze(&cli_args.source).await {
        cli_style::print_error(&e.to_string());
        std::process::exit(1);
    }
    let snapshot = session.set_variation(params)?;

    let prompt = if cli_args.prompt {
        match session.generate_prompt().await {
            Ok(prompt) => Some(prompt),
            Err(e) => {
                cli_style::print_error(&e.to_string());
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    if cli_args.json {
        let mut output = serde_json::to_value(&snapshot)?;
        if let Some(prompt) = prompt {
            output["prompt"] = serde_json::Value::String(prompt);
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if let Some(result) = &snapshot.result {
        cli_style::print_analysis(result, &snapshot.params);
    }
    if let Some(prompt) = prompt {
        cli_style::print_prompt(&prompt);
    }
    cli_style::print_success("Done");
    cli_style::flush();

    Ok(())
}
