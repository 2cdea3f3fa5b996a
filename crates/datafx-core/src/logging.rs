//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

const LOG_FILE_NAME: &str = "datafx.log";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/datafx/logs/`.
/// Log level is controlled by the `DATAFX_LOG` environment variable.
///
/// The terminal host owns stdout, so nothing is logged to the console.
///
/// # Examples
/// ```bash
/// DATAFX_LOG=debug cargo test
/// DATAFX_LOG=datafx_flow=trace cargo test
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);

    let env_filter = EnvFilter::try_from_env("DATAFX_LOG").unwrap_or_else(|_| {
        EnvFilter::new("datafx=info,datafx_core=info,datafx_flow=info,datafx_featuretoggle=info,datafx_tui=info,warn")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .try_init()
        .map_err(|e| crate::error::Error::config(format!("logging already initialized: {e}")))?;

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("DataFX starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("datafx").join("logs"))
}

/// Get the log file path for the current day
pub fn get_current_log_file() -> Result<PathBuf> {
    let dir = get_log_directory()?;
    Ok(dir.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_lives_under_datafx_logs() {
        let path = get_current_log_file().unwrap();
        assert!(path.ends_with("datafx/logs/datafx.log"));
    }
}
