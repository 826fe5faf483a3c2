//! Tracing setup for the CLI.

use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing to stderr, filtered by `RUST_LOG`.
///
/// Without `RUST_LOG` only `info` and above are shown, or `debug` for this
/// crate when `verbose` is set.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "info,unmedium=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .init();
}
