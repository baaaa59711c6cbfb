use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants::{LOG_DIR, LOG_FILE_NAME};

/// Logs to stdout and appends to `logs/logs.txt`. Keep the guard alive until exit or buffered
/// file lines are lost.
pub fn init_default_logger() -> WorkerGuard {
    init_logger(LOG_DIR, LOG_FILE_NAME)
}

pub fn init_logger(dir: impl AsRef<Path>, file_name: impl AsRef<Path>) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    guard
}
