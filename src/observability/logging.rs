//! Tracing subscriber wiring.
//!
//! Structured logs via `tracing`, filtered by `RUST_LOG`, with optional JSON
//! output for log-pipeline ingestion. Token material never reaches log
//! fields; verification failures log error codes only.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Emit JSON-formatted log lines.
    pub json: bool,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_directive: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: true,
            default_directive: "edge_auth=info,tower_http=info".to_string(),
        }
    }
}

/// Initializes the global tracing subscriber.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_json() {
        let config = LoggingConfig::default();
        assert!(config.json);
        assert!(config.default_directive.contains("edge_auth"));
    }
}
