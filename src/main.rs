use anyhow::{Context, Result};
use gcloud_backup::cli::{self, Invocation};
use gcloud_backup::config::{compute_endpoint, Action, Config, LogLevel};
use gcloud_backup::export::{run_export, Registry};
use gcloud_backup::gcp::client::GcpClient;
use gcloud_backup::gcp::http::format_gcp_error;
use gcloud_backup::VERSION;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout carries only the backup document.
fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return None;
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.to_string().to_lowercase()));

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    Some(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match cli::parse_from(std::env::args_os()) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Version) => {
            eprintln!("Version: {}", VERSION);
            return ExitCode::FAILURE;
        }
        Ok(Invocation::Help) => {
            eprint!("{}", cli::render_usage(None));
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprint!("{}", cli::render_usage(Some(&err)));
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = setup_logging(config.log_level);

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", format_gcp_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<()> {
    tracing::info!("Google cloud backup - {}", VERSION);

    match config.action {
        Action::Export => export(config).await,
        Action::Import => {
            tracing::info!("Starting import process of {:?}", config.services);
            anyhow::bail!("import action not implemented")
        }
    }
}

async fn export(config: &Config) -> Result<()> {
    tracing::info!("Starting export process of {:?}", config.services);

    let endpoint = compute_endpoint()?;
    let client = GcpClient::new(config.credential_source()?, &endpoint).await?;
    let registry = Registry::with_builtin();

    let backup = run_export(&registry, &client, &config.target(), &config.services).await?;
    let output = backup.to_json(config.readable)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&output)
        .context("Failed to write backup to stdout")?;
    stdout.flush().context("Failed to write backup to stdout")?;

    Ok(())
}
