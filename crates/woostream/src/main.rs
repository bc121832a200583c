/*
[INPUT]:  CLI arguments, optional YAML configuration file, OS shutdown signals
[OUTPUT]: Account event notifications until shutdown
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use woostream::{AppConfig, Broadcaster, CliOverrides, FileConfig, Runner, TelegramConfig};
use woostream_adapter::Network;

#[derive(Parser, Debug)]
#[command(name = "woostream", version, about = "WOO X account event notifier")]
struct Cli {
    #[arg(long, value_name = "NETWORK")]
    network: Option<Network>,
    #[arg(long = "application-id", value_name = "ID")]
    application_id: Option<String>,
    #[arg(long = "api-public-key", value_name = "KEY")]
    api_public_key: Option<String>,
    #[arg(long = "api-secret-key", value_name = "SECRET")]
    api_secret_key: Option<String>,
    /// Repeat for several topics; defaults to position and executionreport
    #[arg(long = "topic", value_name = "TOPIC")]
    topics: Vec<String>,
    #[arg(long = "telegram-token", value_name = "TOKEN", requires = "telegram_chat_id")]
    telegram_token: Option<String>,
    #[arg(long = "telegram-chat-id", value_name = "CHAT_ID", requires = "telegram_token")]
    telegram_chat_id: Option<String>,
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[arg(long = "dry-run")]
    dry_run: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let telegram = match (&self.telegram_token, &self.telegram_chat_id) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig {
                token: token.clone(),
                chat_id: chat_id.clone(),
            }),
            _ => None,
        };
        CliOverrides {
            network: self.network,
            application_id: self.application_id.clone(),
            api_public_key: self.api_public_key.clone(),
            api_secret_key: self.api_secret_key.clone(),
            topics: self.topics.clone(),
            telegram,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let _log_guard = init_tracing(&args.log_level, args.log_file.as_deref())?;

    info!(dry_run = args.dry_run, "starting woostream");

    let config = load_config(&args)?;
    info!(
        network = %config.network,
        topics = ?config.topics,
        telegram = config.telegram.is_some(),
        "configuration loaded"
    );

    let broadcaster =
        Broadcaster::from_config(config.telegram.as_ref()).context("build notifier")?;
    let runner = Runner::new(config, broadcaster);

    if args.dry_run {
        info!(
            sessions = runner.sessions().len(),
            rest = runner.endpoints().http_base(),
            "dry-run requested; configuration validated"
        );
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    runner.run(shutdown).await.context("run event stream")?;
    info!("shutdown complete");
    Ok(())
}

/// Logs go to stderr (or `log_file`), keeping stdout for notifications.
fn init_tracing(log_level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let Some(path) = log_file else {
        builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|err| anyhow!(err))
            .context("initialize tracing subscriber")?;
        return Ok(None);
    };

    let file_name = path.file_name().context("log file path must name a file")?;
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
    builder
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(Some(guard))
}

fn load_config(args: &Cli) -> Result<AppConfig> {
    let file = match &args.config_path {
        Some(path) => FileConfig::from_file(path).context("load config")?,
        None => FileConfig::default(),
    };
    AppConfig::resolve(file, args.overrides()).context("resolve configuration")
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
