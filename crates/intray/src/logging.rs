//! Tracing and log-facade initialization.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceLock<()> = OnceLock::new();

/// Initializes the tracing subscriber and bridges `log` macros into it.
///
/// Filter level comes from `INTRAY_LOG` (falling back to `info`).
/// Safe to call more than once; only the first call installs anything.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env("INTRAY_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info"));

        // LogTracer forwards `log` records into tracing; both may already
        // be installed by the host application, which is fine.
        if tracing_log::LogTracer::init().is_err() {
            return;
        }
        let subscriber = fmt()
            .with_env_filter(filter)
            .with_target(true)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            log::debug!("Global tracing subscriber already set");
        }
    });
}
