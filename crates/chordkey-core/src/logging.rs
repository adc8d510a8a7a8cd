#![forbid(unsafe_code)]

//! Structured logging setup.
//!
//! The dispatcher emits `tracing` events under the `chordkey_core` target:
//!
//! | Level | Event |
//! |-------|-------|
//! | `debug` span | `dispatch.key` per key press, with the key name |
//! | `trace` | chord pending, no binding, stale timer, editable-field reset |
//! | `debug` | command executing, command disallowed, chord timeout, command error |
//! | `warn` | tiers that make bound chords unreachable (at build) |
//!
//! Unmatched chords and disallowed commands are normal outcomes and never log
//! above `debug`.
//!
//! With the `tracing-json` feature, [`init_json`] installs a JSON formatter
//! filtered by `RUST_LOG` (default `chordkey_core=info`).

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "chordkey_core=info";

/// Install a global JSON subscriber.
///
/// Returns an error if a global subscriber is already set.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
        .try_init()
}
