//! Logging initialization.
//!
//! Console output always, optional rolling file output under `logs/`.
//! Initialization is explicit; the library never installs a global
//! subscriber on its own.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use once_cell::sync::Lazy;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// Keeps non-blocking writers alive for the process lifetime.
static LOG_GUARDS: Lazy<Mutex<Vec<WorkerGuard>>> = Lazy::new(|| Mutex::new(Vec::new()));

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Fallback filter when RUST_LOG is unset.
    pub default_filter: String,
    pub log_to_file: bool,
    pub log_dir: PathBuf,
    /// Emit file output as JSON lines instead of plain text.
    pub json_file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "cartelera=info".to_string(),
            log_to_file: false,
            log_dir: PathBuf::from("logs"),
            json_file_output: false,
        }
    }
}

pub fn init_logging() -> Result<()> {
    init_logging_with_config(LoggingConfig::default())
}

pub fn init_logging_with_config(config: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let console_layer = fmt::layer().with_target(true);

    if config.log_to_file {
        let appender = rolling::daily(&config.log_dir, "cartelera.log");
        let (writer, guard) = non_blocking(appender);
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow::anyhow!("log guard mutex poisoned"))?
            .push(guard);

        if config.json_file_output {
            let file_layer = fmt::layer().json().with_writer(writer).with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .with(file_layer)
                .try_init()?;
        } else {
            let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .with(file_layer)
                .try_init()?;
        }
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_logs_to_console_only() {
        let config = LoggingConfig::default();
        assert!(!config.log_to_file);
        assert_eq!(config.default_filter, "cartelera=info");
    }
}
