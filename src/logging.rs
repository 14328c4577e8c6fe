//! Tracing setup for the CLI.
//!
//! Human-readable events go to stderr so stdout stays clean for generated
//! copy. When the project is initialized, a JSON log also rolls daily under
//! `.copysmith/logs/`.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "COPYSMITH_LOG";
pub const LOG_FILE_NAME: &str = "copysmith.log";

/// Filter from `COPYSMITH_LOG`, then `RUST_LOG`, then the given default.
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered file output is flushed.
pub fn init(log_dir: Option<&Path>, verbose: bool) -> Option<WorkerGuard> {
    let default = if verbose { "copysmith=debug" } else { "warn" };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(env_filter(default));

    let (file_layer, guard) = match log_dir.filter(|d| d.exists()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .json()
                .with_target(true)
                .with_filter(env_filter("copysmith=info"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }

    guard
}
