pub mod config;

pub use config::{ConsoleOutput, LoggingConfig};

use crate::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber: env-filtered console output plus an
/// optional daily-rolled file layer.
///
/// The returned guard must be kept alive for the process lifetime so buffered
/// file output is flushed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level.clone()));

    let (file_layer, guard) = match &config.log_dir {
        Some(log_dir) => {
            let appender = tracing_appender::rolling::daily(log_dir, "siteforge.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    match config.console_output {
        ConsoleOutput::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        ConsoleOutput::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    Ok(guard)
}
