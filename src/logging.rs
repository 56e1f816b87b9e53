//! File logging. The TUI owns the terminal, so traces go to a daily rolling file in the
//! project data directory. Level comes from `RUST_LOG`, defaulting to `info`.

use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::project_dirs;
use crate::constants::constants;

pub fn log_dir() -> PathBuf {
  project_dirs().map(|d| d.data_local_dir().join("logs")).unwrap_or_else(|| std::env::temp_dir().join("reel-logs"))
}

/// Install the global subscriber. Keep the returned guard alive until exit so buffered
/// lines are flushed.
pub fn init() -> Result<WorkerGuard> {
  let dir = log_dir();
  std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create log dir {}", dir.display()))?;
  let appender = tracing_appender::rolling::daily(&dir, &constants().log_file_prefix);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;
  Ok(guard)
}
