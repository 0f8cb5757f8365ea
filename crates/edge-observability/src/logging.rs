//! Structured logging setup.

use edge_core::DataCacheConfig;
pub use edge_core::LogFormat;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `filter` is an `EnvFilter` directive; `RUST_LOG` wins when set. Returns
/// false if a global subscriber was already installed.
pub fn init_logging(format: LogFormat, filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Human => builder.compact().try_init(),
    };
    result.is_ok()
}

/// Install the global subscriber described by a config file.
pub fn init_logging_from_config(config: &DataCacheConfig) -> bool {
    init_logging(config.log_format, &config.log_filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_display() {
        assert_eq!(LogFormat::default().to_string(), "json");
        assert_eq!(LogFormat::Human.to_string(), "human");
    }

    #[test]
    fn test_second_init_reports_false() {
        let _ = init_logging(LogFormat::Human, "debug");
        assert!(!init_logging(LogFormat::Json, "info"));
    }
}
