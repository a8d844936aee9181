use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SIMPLEAI_LOG";

/// Install the global subscriber. `SIMPLEAI_LOG` wins over `RUST_LOG`.
pub fn init_tracing() {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info,simpleai=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .compact()
        .try_init();
}
