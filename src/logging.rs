use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::Result;

/// Install the global tracing subscriber.
///
/// Logs go to a daily-rolling file only. The terminal stays clean: stderr
/// carries the TUI and stdout carries one-shot output. Filtering is
/// controlled by `PRDGEN_LOG` (standard `EnvFilter` syntax), defaulting to
/// `prdgen=info`.
pub fn init() -> Result<PathBuf> {
    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "prdgen.log");

    let env_filter =
        EnvFilter::try_from_env("PRDGEN_LOG").unwrap_or_else(|_| EnvFilter::new("prdgen=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    Ok(log_dir)
}

fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("prdgen")
        .join("logs")
}
