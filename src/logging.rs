use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset: chatty in debug builds only.
fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "squarepool=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber, writing to stderr so stdout stays a
/// clean report.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter())),
        )
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .init();
}
