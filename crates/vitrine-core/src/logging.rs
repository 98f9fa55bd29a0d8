//! Log setup for terminal applications.
//!
//! A full-screen TUI owns stdout, so diagnostics go to a file. Widgets emit
//! through `tracing`; this module installs the subscriber that writes them.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "vitrine_core=info,vitrine_widgets=info";

/// Send `tracing` output to `path` (opened in append mode), filtered by
/// `RUST_LOG` or [`DEFAULT_FILTER`].
///
/// Returns `Ok(false)` when a global subscriber was already installed, in
/// which case the existing one keeps receiving events.
///
/// ```no_run
/// vitrine_core::logging::log_to_file("vitrine.log").unwrap();
/// tracing::info!("carousel demo starting");
/// ```
pub fn log_to_file(path: impl AsRef<Path>) -> Result<bool, std::io::Error> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_thread_ids(false)
                .compact(),
        )
        .try_init()
        .is_ok();
    Ok(installed)
}
