#![forbid(unsafe_code)]

//! Shortcuts for a single mail item (message list row or reading pane).

use std::rc::Rc;

use chordkey_core::SequenceDispatcher;

use crate::action::{MailAction, MailActions};
use crate::config::ShortcutConfig;
use crate::keymap::{Keymap, ShortcutScope};

/// First-key prefixes that may grow into an item chord.
pub const ITEM_TIER1: &[char] = &['m', '.'];

/// Second-key prefixes; empty, so every item chord ends at two keys.
pub const ITEM_TIER2: &[char] = &[];

/// Default item bindings.
pub const ITEM_BINDINGS: &[(&str, MailAction)] = &[
    ("mr", MailAction::MarkRead),
    ("mu", MailAction::MarkUnread),
    ("mf", MailAction::ToggleFlag),
    ("ms", MailAction::MarkJunk),
    (".t", MailAction::Trash),
    ("z", MailAction::MarkRead),
    ("Delete", MailAction::Trash),
    ("ShiftDelete", MailAction::DeletePermanently),
];

/// Factory for item-scope dispatchers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemShortcuts;

impl ItemShortcuts {
    /// Default bindings with `config`'s item overrides applied.
    #[must_use]
    pub fn keymap(config: &ShortcutConfig) -> Keymap {
        Keymap::configured(ShortcutScope::Item, config)
    }

    /// Dispatcher for one item view, wired to `actions`.
    #[must_use]
    pub fn dispatcher<A: MailActions + 'static>(
        actions: Rc<A>,
        config: &ShortcutConfig,
    ) -> SequenceDispatcher {
        Self::keymap(config).dispatcher(actions, config.dispatcher_config())
    }
}
