//! Log setup for binaries and tests.
//!
//! The library only emits `tracing` events. Binaries call [`init`] once to
//! print them to stderr, filtered by the `ISLET_LOG` variable.

use std::sync::Once;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter, in `EnvFilter` syntax.
pub const LOG_ENV: &str = "ISLET_LOG";

const DEFAULT_FILTER: &str = "info";

static INSTALLED: Once = Once::new();

/// Installs the stderr subscriber. Later calls do nothing.
pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// Installs the stderr subscriber, using `default` when `ISLET_LOG` is unset.
pub fn init_with_default(default: &str) {
    INSTALLED.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
        let result = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_filter(filter),
            )
            .try_init();

        if result.is_err() {
            eprintln!("islet: a global tracing subscriber is already installed");
        }
    });
}
