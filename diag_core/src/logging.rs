//! Logging setup.
//!
//! Library code only emits `tracing` events; binaries call [`init`] once.

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Returns `false` if a subscriber
/// was already installed.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(default_filter: &str) -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Browser builds log through the console panic hook only.
#[cfg(target_arch = "wasm32")]
pub fn init(_default_filter: &str) -> bool {
    false
}
