#![forbid(unsafe_code)]

//! Dispatcher timing configuration.
//!
//! # Timing Defaults
//!
//! | Setting | Default | Range | Description |
//! |---------|---------|-------|-------------|
//! | `chord_timeout` | 1000ms | 100-5000ms | Wait for a chord continuation |
//!
//! # Environment Variables
//!
//! | Variable | Type | Default | Description |
//! |----------|------|---------|-------------|
//! | `CHORDKEY_CHORD_TIMEOUT_MS` | u64 | 1000 | Chord continuation window |
//! | `CHORDKEY_DISABLE_CHORDS` | bool | false | Commit every key on its own |
//!
//! ```bash
//! # Slower typists: give chords two seconds
//! export CHORDKEY_CHORD_TIMEOUT_MS=2000
//! ```

use web_time::Duration;

/// Default wait for a chord continuation before committing the buffer.
pub const CHORD_TIMEOUT_MS: u64 = 1000;

/// Minimum allowed chord timeout.
pub const MIN_CHORD_TIMEOUT_MS: u64 = 100;

/// Maximum allowed chord timeout.
pub const MAX_CHORD_TIMEOUT_MS: u64 = 5000;

/// Environment variable overriding the chord timeout.
pub const ENV_CHORD_TIMEOUT_MS: &str = "CHORDKEY_CHORD_TIMEOUT_MS";

/// Environment variable disabling multi-key chords.
pub const ENV_DISABLE_CHORDS: &str = "CHORDKEY_DISABLE_CHORDS";

/// Configuration for a [`SequenceDispatcher`](crate::dispatcher::SequenceDispatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// How long an ambiguous prefix waits for the next key.
    /// Default: 1000ms.
    pub chord_timeout: Duration,

    /// When true, every keystroke commits as a single-key sequence and no
    /// timer is ever scheduled.
    /// Default: false.
    pub disable_chords: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            chord_timeout: Duration::from_millis(CHORD_TIMEOUT_MS),
            disable_chords: false,
        }
    }
}

impl DispatcherConfig {
    /// Set the chord timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.chord_timeout = timeout;
        self
    }

    /// Commit every key immediately.
    #[must_use]
    pub fn disable_chords(mut self) -> Self {
        self.disable_chords = true;
        self
    }

    /// Load config from environment variables.
    ///
    /// Unparseable values are ignored; the result is [`validated`](Self::validated).
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup(ENV_CHORD_TIMEOUT_MS)
            && let Ok(ms) = val.trim().parse::<u64>()
        {
            config.chord_timeout = Duration::from_millis(ms);
        }

        if let Some(val) = lookup(ENV_DISABLE_CHORDS) {
            let val = val.trim();
            config.disable_chords = val == "1" || val.eq_ignore_ascii_case("true");
        }

        config.validated()
    }

    /// Clamp the timeout to `MIN_CHORD_TIMEOUT_MS..=MAX_CHORD_TIMEOUT_MS`.
    ///
    /// ```
    /// use chordkey_core::config::DispatcherConfig;
    /// use std::time::Duration;
    ///
    /// let config = DispatcherConfig::default()
    ///     .with_timeout(Duration::from_millis(60_000))
    ///     .validated();
    /// assert_eq!(config.chord_timeout.as_millis(), 5000);
    /// ```
    #[must_use]
    pub fn validated(mut self) -> Self {
        let ms = u64::try_from(self.chord_timeout.as_millis()).unwrap_or(u64::MAX);
        let clamped = ms.clamp(MIN_CHORD_TIMEOUT_MS, MAX_CHORD_TIMEOUT_MS);
        self.chord_timeout = Duration::from_millis(clamped);
        self
    }

    /// Check if values are within valid ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let ms = u64::try_from(self.chord_timeout.as_millis()).unwrap_or(u64::MAX);
        (MIN_CHORD_TIMEOUT_MS..=MAX_CHORD_TIMEOUT_MS).contains(&ms)
    }
}
