//! Tracing initialization.
//!
//! Everything is written to stderr: in `serve` mode stdout carries MCP frames,
//! and in `query`/`interactive` mode it carries results.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan, util::SubscriberInitExt};

static INIT: Once = Once::new();

fn running_under_test() -> bool {
    std::env::var("NEXTEST").is_ok() || std::env::var("CARGO_TARGET_TMPDIR").is_ok()
}

/// `RUST_LOG` directives on top of a default level.
fn filter(default: Level) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(default.into())
}

/// Install the global subscriber. Only the first call has any effect.
///
/// `json` emits one JSON object per event instead of the compact text format.
pub fn init(json: bool) {
    INIT.call_once(|| {
        if running_under_test() {
            tracing_subscriber::fmt()
                .with_env_filter(filter(Level::DEBUG))
                .with_test_writer()
                .compact()
                .finish()
                .set_default();
            return;
        }

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter(Level::INFO))
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_span_events(FmtSpan::NONE);

        let installed = if json {
            builder.json().with_current_span(false).try_init()
        } else {
            builder.compact().with_target(true).try_init()
        };
        if let Err(e) = installed {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });
}
