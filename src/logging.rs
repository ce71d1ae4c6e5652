use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

use crate::config::Config;

/// Environment variable that overrides the configured log level
pub const LOG_ENV_VAR: &str = "TODO_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to install log subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Appended to a file, so the terminal UI stays clean
    File(PathBuf),
}

impl LogTarget {
    pub fn for_mode(config: &Config, interactive: bool) -> Self {
        if interactive {
            LogTarget::File(config.get_log_path())
        } else {
            LogTarget::Stderr
        }
    }
}

/// `TODO_LOG` if set and valid, otherwise `default_level`
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level))
}

pub fn init_logging(config: &Config, target: LogTarget) -> Result<(), LoggingError> {
    let filter = env_filter(&config.log_level);
    match target {
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr).with_target(false))
            .try_init()?,
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .try_init()?
        }
    }
    Ok(())
}
