// Tracing log adapter - Structured logging setup using tracing-subscriber

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Installs the global tracing subscriber
pub struct TracingLogAdapter;

impl TracingLogAdapter {
    /// Initialize the subscriber from logging settings
    ///
    /// `RUST_LOG` wins over the configured level when it is set and valid.
    /// Logs go to stderr so JSON reports on stdout stay machine-readable.
    /// Safe to call more than once; later calls are no-ops.
    pub fn init(settings: &LoggingSettings) {
        let filter = Self::build_filter(&settings.level);

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false);

        if settings.json {
            let _ = subscriber.json().try_init();
        } else {
            let _ = subscriber.try_init();
        }
    }

    /// Env filter from `RUST_LOG`, else from `level`, else `info`
    pub fn build_filter(level: &str) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}
