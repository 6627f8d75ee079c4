//! Telemetry helpers for structured logging in tests and benches.
//!
//! The reference types themselves never log - their whole point is that a
//! call through them costs one indirect jump - so tracing lives at the edges:
//! test harnesses and benchmarks install a subscriber once and emit events
//! around the bindings they exercise.

use tracing_subscriber::EnvFilter;

/// Initialize tracing for a test or bench process.
///
/// Installs an env-filtered formatting subscriber, honoring `RUST_LOG` and
/// defaulting to `warn` when it is unset. Callers that already installed
/// their own subscriber win; repeated calls are no-ops.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
