// Structured logging setup
use tracing_subscriber::EnvFilter;

use crate::cli::Verbosity;

/// Install the global subscriber, writing to stderr so answers on stdout
/// stay clean. `RUST_LOG` overrides the verbosity-derived filter.
///
/// Calling it again is a no-op.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Filter used when `RUST_LOG` is unset; only this crate gets the verbose levels
pub fn default_directive(verbosity: Verbosity) -> String {
    match verbosity {
        Verbosity::Quiet | Verbosity::Normal => verbosity.filter_directive().to_string(),
        _ => format!("warn,docchat={}", verbosity.filter_directive()),
    }
}
