#![forbid(unsafe_code)]

//! Chord → [`MailAction`] keymaps per UI scope.
//!
//! A [`Keymap`] starts from a scope's default bindings, applies the
//! rebinding in a [`ShortcutConfig`], and produces the command table and
//! disambiguation tiers a [`SequenceDispatcher`] needs.
//!
//! # Tiers
//!
//! The scope's tier constants are used as long as they reach every bound
//! chord. A rebinding that introduces a chord they cannot reach (`"gr"`, or
//! a three-key chord) switches the keymap to tiers derived from its own
//! spellings.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use chordkey_core::{CommandTable, DisambiguationTiers, DispatcherConfig, SequenceDispatcher};
use tracing::debug;

use crate::action::{ActionCommand, MailAction, MailActions};
use crate::config::ShortcutConfig;
use crate::conversation::{CONVERSATION_BINDINGS, CONVERSATION_TIER1, CONVERSATION_TIER2};
use crate::item::{ITEM_BINDINGS, ITEM_TIER1, ITEM_TIER2};

/// Keys that commit at once past the last tier.
///
/// Empty: named keys (`Delete`, `ShiftDelete`) terminate a chord on their
/// own, so no printable character needs to.
pub const FINAL_TIER: &[char] = &[];

/// UI scope owning a dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutScope {
    /// A single message.
    Item,
    /// A whole conversation.
    Conversation,
}

impl ShortcutScope {
    /// Scope name as used in config files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Conversation => "conversation",
        }
    }

    /// Built-in bindings.
    #[must_use]
    pub const fn default_bindings(self) -> &'static [(&'static str, MailAction)] {
        match self {
            Self::Item => ITEM_BINDINGS,
            Self::Conversation => CONVERSATION_BINDINGS,
        }
    }

    /// Built-in disambiguation tiers.
    #[must_use]
    pub fn tiers(self) -> DisambiguationTiers {
        let (tier1, tier2) = match self {
            Self::Item => (ITEM_TIER1, ITEM_TIER2),
            Self::Conversation => (CONVERSATION_TIER1, CONVERSATION_TIER2),
        };
        DisambiguationTiers::from_chars(&[tier1, tier2]).with_final(FINAL_TIER.iter().copied())
    }
}

impl fmt::Display for ShortcutScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One line of a help overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    /// Chord spelling.
    pub chord: String,
    /// Bound action.
    pub action: MailAction,
}

impl fmt::Display for HelpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12} {}", self.chord, self.action.label())
    }
}

/// Bindings for one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    scope: ShortcutScope,
    bindings: BTreeMap<String, MailAction>,
}

impl Keymap {
    /// The scope's built-in bindings.
    #[must_use]
    pub fn defaults(scope: ShortcutScope) -> Self {
        Self {
            scope,
            bindings: scope
                .default_bindings()
                .iter()
                .map(|&(chord, action)| (chord.to_owned(), action))
                .collect(),
        }
    }

    /// Built-in bindings with `config`'s overrides for this scope: unbinds
    /// first, then binds.
    #[must_use]
    pub fn configured(scope: ShortcutScope, config: &ShortcutConfig) -> Self {
        let mut keymap = Self::defaults(scope);
        let overrides = config.scope(scope);
        for chord in &overrides.unbind {
            keymap.unbind(chord);
        }
        for (chord, &action) in &overrides.bind {
            keymap.bind(chord.clone(), action);
        }
        keymap
    }

    /// Scope this keymap belongs to.
    #[must_use]
    pub fn scope(&self) -> ShortcutScope {
        self.scope
    }

    /// Bind `chord`, returning the action it replaced.
    pub fn bind(&mut self, chord: impl Into<String>, action: MailAction) -> Option<MailAction> {
        self.bindings.insert(chord.into(), action)
    }

    /// Remove `chord`.
    pub fn unbind(&mut self, chord: &str) -> Option<MailAction> {
        self.bindings.remove(chord)
    }

    /// Action bound to `chord`.
    #[must_use]
    pub fn action(&self, chord: &str) -> Option<MailAction> {
        self.bindings.get(chord).copied()
    }

    /// Chords bound to `action`, sorted.
    #[must_use]
    pub fn chords_for(&self, action: MailAction) -> Vec<&str> {
        self.bindings
            .iter()
            .filter(|&(_, &bound)| bound == action)
            .map(|(chord, _)| chord.as_str())
            .collect()
    }

    /// Bound chords, sorted.
    pub fn chords(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Help listing ordered by action, then chord.
    #[must_use]
    pub fn describe(&self) -> Vec<HelpEntry> {
        let mut entries: Vec<HelpEntry> = self
            .bindings
            .iter()
            .map(|(chord, &action)| HelpEntry {
                chord: chord.clone(),
                action,
            })
            .collect();
        entries.sort_by(|a, b| a.action.cmp(&b.action).then_with(|| a.chord.cmp(&b.chord)));
        entries
    }

    /// Tiers for this keymap: the scope's constants when they reach every
    /// chord, otherwise tiers derived from the bound chords.
    #[must_use]
    pub fn tiers(&self) -> DisambiguationTiers {
        let scoped = self.scope.tiers();
        let unreachable = scoped.unreachable_sequences(self.chords());
        if unreachable.is_empty() {
            return scoped;
        }
        debug!(
            scope = self.scope.name(),
            unreachable = ?unreachable,
            "rebinding outgrows default tiers; deriving tiers from keymap"
        );
        DisambiguationTiers::derive(self.chords())
    }

    /// Command table forwarding every binding to `actions`.
    #[must_use]
    pub fn command_table<A: MailActions + 'static>(&self, actions: &Rc<A>) -> CommandTable {
        let mut table = CommandTable::new();
        for (chord, &action) in &self.bindings {
            table.bind(chord.clone(), ActionCommand::new(action, Rc::clone(actions)));
        }
        table
    }

    /// Dispatcher for one view of this scope.
    #[must_use]
    pub fn dispatcher<A: MailActions + 'static>(
        &self,
        actions: Rc<A>,
        config: DispatcherConfig,
    ) -> SequenceDispatcher {
        debug!(
            scope = self.scope.name(),
            bindings = self.len(),
            timeout_ms = u64::try_from(config.chord_timeout.as_millis()).unwrap_or(u64::MAX),
            "building shortcut dispatcher"
        );
        SequenceDispatcher::builder()
            .config(config)
            .tiers(self.tiers())
            .table(self.command_table(&actions))
            .build()
    }
}
