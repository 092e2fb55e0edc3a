//! Logging and tracing infrastructure for dsmwriter.
//!
//! The listing code only emits events and spans (`dsm_render` wraps each
//! render). Installing a subscriber is left to the embedding program, which
//! can use one of the initializers below.

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

/// Subscriber output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines on stderr
    #[default]
    Pretty,
    /// One JSON object per event on stderr
    Json,
}

/// Install the global subscriber once; later calls are ignored.
///
/// The filter comes from `RUST_LOG` and falls back to `default_filter`.
pub fn init_with(format: LogFormat, default_filter: &str) {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        let registry = tracing_subscriber::registry().with(env_filter);

        // Another subscriber may already be installed by the host program.
        let _ = match format {
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_span_events(FmtSpan::CLOSE)
                        .with_target(true)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_span_events(FmtSpan::CLOSE)
                        .with_current_span(true)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
        };

        info!(?format, "dsmwriter tracing initialized");
    });
}

/// Pretty output at `info` unless `RUST_LOG` says otherwise.
pub fn init_tracing() {
    init_with(LogFormat::Pretty, "info");
}

pub fn init_tracing_json() {
    init_with(LogFormat::Json, "info");
}

/// Span with optional fields, at info level.
#[macro_export]
macro_rules! span_trace {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Log an error at error level and hand it back.
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let e = $err;
        tracing::error!(error = %e, "operation failed");
        e
    }};
    ($err:expr, $context:expr) => {{
        let e = $err;
        tracing::error!(error = %e, context = $context, "operation failed");
        e
    }};
}
