use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::GatewayConfig;

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// filter. Calling this twice is harmless; the second call is ignored.
pub fn init_logging(config: &GatewayConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let console = if config.json_logs {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(false).with_level(true).boxed()
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .try_init();
}
