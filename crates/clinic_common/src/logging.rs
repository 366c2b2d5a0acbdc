//! Logging setup shared by the service binaries and tests.
//!
//! Everything logs through `tracing`. This module installs the global
//! subscriber: a console fmt layer, an optional daily rolling file, and an
//! `EnvFilter` that honours `RUST_LOG` before falling back to the configured
//! level.

use clinic_config::LoggingConfig;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILE_PREFIX: &str = "clinic.log";

/// Initialize logging from the `[logging]` configuration section.
///
/// When a directory is configured the returned guard must be kept alive for
/// the lifetime of the process, otherwise buffered file output is lost.
pub fn init_from_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = config.level.clone().unwrap_or_else(|| "info".to_string());

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let prefix = config
                .file_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_FILE_PREFIX.to_string());
            let appender = tracing_appender::rolling::daily(directory, prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(console_layer())
        .with(file_layer)
        .with(build_filter(&level))
        .try_init();

    if result.is_ok() {
        info!(
            "Logging initialized at level: {} (file output: {})",
            level,
            config.directory.as_deref().unwrap_or("disabled")
        );
    }
    guard
}

fn console_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
}

/// `RUST_LOG` wins; otherwise the service crates log at `level` and
/// dependencies at `warn`.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(format!("warn,clinic={level},tower_http={level}"))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let debug = LoggingConfig {
            level: Some("debug".to_string()),
            ..LoggingConfig::default()
        };
        assert!(init_from_config(&debug).is_none());
        assert!(init_from_config(&LoggingConfig::default()).is_none());
    }
}
