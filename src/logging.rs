use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Parse a configured level, falling back to `warn` for anything unknown.
pub fn level_filter(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::WARN)
}

/// Configure `tracing` from the configured level, letting `RUST_LOG` override it.
///
/// Messages go to stderr without timestamps or targets so they read like the
/// rest of the CLI output and never mix with pip's stdout.
pub fn setup_logging(level: &str) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_filter(level).into())
        .from_env_lossy();

    // Ignore the error: a subscriber may already be installed (tests).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_filter_parses_known_levels() {
        assert_eq!(level_filter("off"), LevelFilter::OFF);
        assert_eq!(level_filter("debug"), LevelFilter::DEBUG);
        assert_eq!(level_filter("TRACE"), LevelFilter::TRACE);
    }

    #[test]
    fn level_filter_falls_back_to_warn() {
        assert_eq!(level_filter("loud"), LevelFilter::WARN);
    }

    #[test]
    fn setup_logging_can_be_called_twice() {
        setup_logging("info");
        setup_logging("debug");
    }
}
