//! Logging configuration using tracing

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_ENV: &str = "VITRINE_LOG";

fn env_filter() -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("vitrine=info,warn"))
}

/// Log to a daily rolling file. Used while the terminal UI owns the screen.
///
/// Logs are written to `~/.local/share/vitrine/logs/`.
/// Log level is controlled by the `VITRINE_LOG` environment variable.
pub fn init_file() -> Result<()> {
  let log_dir = log_directory()?;
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "vitrine.log");

  tracing_subscriber::registry()
    .with(env_filter())
    .with(
      fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true),
    )
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  tracing::info!("vitrine starting, logs in {}", log_dir.display());
  Ok(())
}

/// Log to stderr. Used by the non-interactive `offline` commands.
pub fn init_stderr() -> Result<()> {
  tracing_subscriber::registry()
    .with(env_filter())
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))
}

fn log_directory() -> Result<PathBuf> {
  dirs::data_local_dir()
    .map(|base| base.join("vitrine").join("logs"))
    .ok_or_else(|| eyre!("Could not determine data directory"))
}
