//! Logging setup shared by the library and the CLI.
//!
//! Library modules log through the macros in [`prelude`]; only binaries
//! install a subscriber.

use tracing_subscriber::EnvFilter;

pub mod prelude {
    pub use ::tracing::{debug, error, info, trace, warn};
}

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Install a formatting subscriber on stderr, honoring `RUST_LOG`.
///
/// Stdout is left to the command output so it can be piped.
pub fn init_cli() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
