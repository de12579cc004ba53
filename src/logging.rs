use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "easel=info";

/// Installs the fmt subscriber for hosts that do not bring their own.
///
/// Honors `RUST_LOG`; calling it more than once is harmless.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
