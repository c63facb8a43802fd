//! # reelestate-client
//!
//! Glue between the mobile shell and the feed/upload controllers: shared
//! state, configuration, the HTTP backend, the sampler runtime and the
//! command handlers the shell invokes.

pub mod api;
pub mod commands;
pub mod config;
pub mod engagement;
pub mod error;
pub mod preferences;
pub mod runtime;
pub mod state;

use tracing_subscriber::{fmt, EnvFilter};

pub use error::ClientError;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Calling it twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("reelestate_client=debug,reelestate_feed=info,reelestate_upload=info,warn")
    });

    let result = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    if result.is_ok() {
        tracing::info!("Starting {} client", reelestate_shared::constants::APP_NAME);
    }
}
