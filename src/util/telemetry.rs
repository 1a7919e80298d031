//! Telemetry helpers for structured logging and tracing.

use tracing_subscriber::EnvFilter;

/// Initialize tracing with filters taken from `RUST_LOG`.
///
/// Does nothing if the application already installed a global subscriber.
pub fn init_tracing() {
    install(EnvFilter::from_default_env());
}

/// Initialize tracing with explicit filter directives (e.g. `"prometheus_deadline_queue=debug"`).
///
/// Falls back to `RUST_LOG` when the directives do not parse.
pub fn init_tracing_with_filter(directives: &str) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::from_default_env());
    install(filter);
}

fn install(filter: EnvFilter) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}
