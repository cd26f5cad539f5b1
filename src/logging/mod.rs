use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

use crate::cli::LogLevel;

/// Logging for one invocation; the subscriber is active while this value lives
pub struct LoggingContext {
    level: LogLevel,
    _guard: DefaultGuard,
}

impl LoggingContext {
    /// Install a stderr subscriber for the current thread.
    ///
    /// `RUST_LOG` takes precedence over `level` when it is set and valid.
    pub fn init(level: LogLevel) -> Self {
        let subscriber = Registry::default()
            .with(build_filter(level))
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            );

        let guard = tracing::subscriber::set_default(subscriber);
        tracing::debug!("Logging initialised at {}", level);

        Self {
            level,
            _guard: guard,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }
}

fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_level() {
        let context = LoggingContext::init(LogLevel::Error);
        assert_eq!(context.level(), LogLevel::Error);
        tracing::error!("visible only while the context lives");
    }

    #[test]
    fn test_filter_from_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(build_filter(LogLevel::Warning).to_string(), "warn");
        assert_eq!(build_filter(LogLevel::Critical).to_string(), "error");
    }
}
