//! Diagnostics for `hypart`.
//!
//! Everything goes to stderr; stdout carries only the `result:` lines the
//! binary prints after a successful run.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DIRECTIVES: &str = "warn";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the `warn` default, e.g. `RUST_LOG=hypart=debug`.
/// Thread names are shown so events from the `checkpoint-signal` watcher
/// can be told apart from the partitioning thread.
pub fn init() {
    let directives = std::env::var("RUST_LOG").ok();
    tracing_subscriber::registry()
        .with(filter(directives.as_deref()))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_names(true)
                .compact(),
        )
        .init();
}

/// Blank or unparsable directives fall back to the default.
fn filter(directives: Option<&str>) -> EnvFilter {
    directives
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}
