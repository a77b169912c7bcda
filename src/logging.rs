//! Diagnostic tracing for the shell itself.
//!
//! Reads `RUST_LOG`; without it only warnings show, or everything down to
//! `debug` when the shell was started with `--debug`. Output goes to stderr
//! in compact format so it never mixes with pipeline stdout.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
