#![forbid(unsafe_code)]

//! User shortcut configuration: timeout override and per-scope rebinding.
//!
//! # Loading
//!
//! ```toml
//! # shortcuts.toml
//! chord_timeout_ms = 1500
//!
//! [item]
//! unbind = ["z"]
//!
//! [item.bind]
//! gr = "mark-read"
//!
//! [conversation.bind]
//! ".x" = "ignore-conversation"
//! ```
//!
//! ```rust,ignore
//! let config = ShortcutConfig::from_toml_file("shortcuts.toml")?;
//! let dispatcher = ItemShortcuts::dispatcher(actions, &config);
//! ```
//!
//! # Defaults
//!
//! `ShortcutConfig::default()` changes nothing: the dispatcher timing comes
//! from [`DispatcherConfig::from_env`] and every scope keeps its built-in
//! bindings.

use std::collections::BTreeMap;
#[cfg(feature = "shortcut-config")]
use std::path::Path;

#[cfg(feature = "shortcut-config")]
use serde::{Deserialize, Serialize};

use chordkey_core::config::{MAX_CHORD_TIMEOUT_MS, MIN_CHORD_TIMEOUT_MS};
use chordkey_core::{DispatcherConfig, KeyToken};
use web_time::Duration;

use crate::action::MailAction;
use crate::keymap::ShortcutScope;

// ---------------------------------------------------------------------------
// ShortcutConfig
// ---------------------------------------------------------------------------

/// Shortcut overrides for every scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "shortcut-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "shortcut-config", serde(default))]
pub struct ShortcutConfig {
    /// Chord timeout override in milliseconds.
    pub chord_timeout_ms: Option<u64>,

    /// Commit every key on its own.
    pub disable_chords: Option<bool>,

    /// Item-scope overrides.
    pub item: ScopeBindings,

    /// Conversation-scope overrides.
    pub conversation: ScopeBindings,
}

/// Rebinding for one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "shortcut-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "shortcut-config", serde(default))]
pub struct ScopeBindings {
    /// Built-in chords to remove. Applied before `bind`.
    pub unbind: Vec<String>,

    /// Chords to add or rebind.
    pub bind: BTreeMap<String, MailAction>,
}

impl ShortcutConfig {
    /// Load from a TOML string and validate.
    #[cfg(feature = "shortcut-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ShortcutConfigError> {
        let config: Self = toml::from_str(s).map_err(ShortcutConfigError::Toml)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ShortcutConfigError::Validation(errors))
        }
    }

    /// Load from a TOML file on disk and validate.
    #[cfg(feature = "shortcut-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ShortcutConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ShortcutConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Overrides for `scope`.
    #[must_use]
    pub fn scope(&self, scope: ShortcutScope) -> &ScopeBindings {
        match scope {
            ShortcutScope::Item => &self.item,
            ShortcutScope::Conversation => &self.conversation,
        }
    }

    /// Apply the timing overrides on top of `base`, clamped.
    #[must_use]
    pub fn apply_to(&self, mut base: DispatcherConfig) -> DispatcherConfig {
        if let Some(ms) = self.chord_timeout_ms {
            base.chord_timeout = Duration::from_millis(ms);
        }
        if let Some(disable) = self.disable_chords {
            base.disable_chords = disable;
        }
        base.validated()
    }

    /// Dispatcher timing: environment first, then this config.
    #[must_use]
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        self.apply_to(DispatcherConfig::from_env())
    }

    /// Validate all values.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(ms) = self.chord_timeout_ms
            && !(MIN_CHORD_TIMEOUT_MS..=MAX_CHORD_TIMEOUT_MS).contains(&ms)
        {
            errors.push(format!(
                "chord_timeout_ms must be in {MIN_CHORD_TIMEOUT_MS}..={MAX_CHORD_TIMEOUT_MS}, got {ms}"
            ));
        }

        for scope in [ShortcutScope::Item, ShortcutScope::Conversation] {
            validate_scope(scope, self.scope(scope), &mut errors);
        }

        errors
    }
}

fn validate_scope(scope: ShortcutScope, bindings: &ScopeBindings, errors: &mut Vec<String>) {
    for chord in bindings.bind.keys() {
        if chord.is_empty() {
            errors.push(format!("{scope}.bind: empty chord"));
        } else if chord.chars().any(char::is_whitespace) {
            errors.push(format!("{scope}.bind: chord {chord:?} contains whitespace"));
        } else if let Some(pos) = named_key_position(chord) {
            errors.push(format!(
                "{scope}.bind: chord {chord:?} has a named key at position {pos}; named keys must stand alone"
            ));
        }
        if bindings.unbind.iter().any(|u| u == chord) {
            errors.push(format!("{scope}: chord {chord:?} is both bound and unbound"));
        }
    }

    let defaults = scope.default_bindings();
    for chord in &bindings.unbind {
        if !defaults.iter().any(|(bound, _)| *bound == chord.as_str()) {
            errors.push(format!("{scope}.unbind: {chord:?} is not a built-in chord"));
        }
    }
}

/// Char position of a named key inside a multi-key chord (`"mDelete"`).
fn named_key_position(chord: &str) -> Option<usize> {
    if KeyToken::parse_named(chord).is_some() {
        return None;
    }
    chord
        .char_indices()
        .skip(1)
        .position(|(idx, _)| KeyToken::parse_named(&chord[idx..]).is_some())
        .map(|pos| pos + 1)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a shortcut configuration.
#[derive(Debug)]
pub enum ShortcutConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "shortcut-config")]
    Toml(toml::de::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ShortcutConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "shortcut-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ShortcutConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "shortcut-config")]
            Self::Toml(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
