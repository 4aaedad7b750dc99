//! Structured logging setup for embedding daemons and tests.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "resilience_kit=info";

/// Install a global `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_directives`.
///
/// Returns `false` if a global subscriber was already installed, which makes it
/// safe to call from every test.
pub fn init(default_directives: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
