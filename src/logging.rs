use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

/// Filter used when `RUST_LOG` is unset: catalog and access logs at info,
/// sqlx statement logging only when something goes wrong.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Install the global subscriber for the `catalog` and `api_server` binaries.
///
/// `RUST_LOG` wins over `default_filter`. Call after the `.env` file has been
/// loaded so a `RUST_LOG` set there is honored.
pub fn init_tracing(default_filter: &str) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| anyhow::anyhow!("invalid log filter `{default_filter}`: {e}"))?;

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))
}
