use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{EnvFilter, fmt};

use crate::infrastructure::config::LogFormat;

const DEFAULT_FILTER: &str = "info,feed_server=debug,sqlx=warn";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339());

    let installed = match format {
        LogFormat::Json => builder
            .with_target(false)
            .json()
            .flatten_event(true)
            .try_init(),
        LogFormat::Pretty => builder.compact().try_init(),
    };

    if let Err(e) = installed {
        eprintln!("tracing subscriber not installed: {e}");
    }
}
