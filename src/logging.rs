use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `themekeeper=debug`.
pub const LOG_ENV: &str = "THEMEKEEPER_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the global fmt subscriber; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default_filter());
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!("logging initialised");
    }
}

fn default_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_DIRECTIVE)
}
