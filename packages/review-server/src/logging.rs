use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_DIR: &str = "./logs";
const LOG_FILE_PREFIX: &str = "review.log";

/// Keeps the non-blocking file writer alive; dropping it flushes pending lines.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLogOptions {
    pub dir: PathBuf,
    pub prefix: String,
}

impl FileLogOptions {
    /// `ENABLE_FILE_LOGS=true|1` turns on daily rolling files under `LOG_DIR`.
    pub fn from_env() -> Option<Self> {
        let enabled = std::env::var("ENABLE_FILE_LOGS").ok();
        let dir = std::env::var("LOG_DIR").ok();
        Self::from_values(enabled.as_deref(), dir.as_deref())
    }

    fn from_values(enabled: Option<&str>, dir: Option<&str>) -> Option<Self> {
        let enabled = matches!(enabled.map(str::trim), Some("true") | Some("1"));
        if !enabled {
            return None;
        }
        let dir = dir
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_LOG_DIR);
        Some(Self {
            dir: PathBuf::from(dir),
            prefix: LOG_FILE_PREFIX.to_string(),
        })
    }
}

pub fn init_tracing(log_level: &str, file_logs: Option<FileLogOptions>) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true);

    if let Some(options) = file_logs {
        match std::fs::create_dir_all(&options.dir) {
            Ok(()) => {
                let file_appender =
                    RollingFileAppender::new(Rotation::DAILY, &options.dir, &options.prefix);
                let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
                let file_layer = fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_target(true);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(stdout_layer)
                    .with(file_layer)
                    .init();

                return Some(FileLogGuard { _guard: guard });
            }
            Err(err) => {
                eprintln!("failed to create log directory {}: {err}", options.dir.display());
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();

    None
}
