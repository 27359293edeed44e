//! Tracing subscriber setup

use driverscope_domain::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `config.filter`. Returns `false` when a
/// subscriber was already installed, which is not treated as an error.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = build_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(tracing_subscriber::fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_target(false).compact()).try_init()
    };

    match installed {
        Ok(()) => {
            tracing::debug!(filter = %config.filter, json = config.json, "Tracing initialised");
            true
        }
        Err(_) => false,
    }
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new(driverscope_domain::constants::DEFAULT_LOG_FILTER))
}
