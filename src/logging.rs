//! Tracing subscriber setup.
//!
//! Logs go to a file: the full-screen client owns stdout, and the plain
//! client's stdout is the story itself.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "STORYTELLER_LOG";

/// Install the global subscriber, appending to `log_file_path`.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global subscriber
/// is already set.
pub fn init_global(log_file_path: &Path) -> Result<()> {
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("failed to open log file {}", log_file_path.display()))?;

    build_subscriber(log_file, env_filter())
        .try_init()
        .context("failed to install tracing subscriber")
}

/// Filter from `STORYTELLER_LOG`, defaulting to `info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Build the subscriber writing to `log_file`.
pub fn build_subscriber(
    log_file: File,
    filter: EnvFilter,
) -> impl tracing::Subscriber + Send + Sync {
    let fmt_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .with_thread_names(true);

    tracing_subscriber::registry().with(fmt_layer).with(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_subscriber_respects_filter() {
        let log_file = NamedTempFile::new().unwrap();
        let subscriber = build_subscriber(log_file.reopen().unwrap(), EnvFilter::new("info"));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(session = "reveal#1", "story complete");
            tracing::debug!("chunk dropped");
        });

        let contents = fs::read_to_string(log_file.path()).unwrap();
        assert!(contents.contains("story complete"));
        assert!(contents.contains("reveal#1"));
        assert!(!contents.contains("chunk dropped"));
    }
}
