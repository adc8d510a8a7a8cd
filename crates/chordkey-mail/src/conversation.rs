#![forbid(unsafe_code)]

//! Shortcuts for a whole conversation (threaded reading view).

use std::rc::Rc;

use chordkey_core::SequenceDispatcher;

use crate::action::{MailAction, MailActions};
use crate::config::ShortcutConfig;
use crate::keymap::{Keymap, ShortcutScope};

/// First-key prefixes that may grow into a conversation chord.
pub const CONVERSATION_TIER1: &[char] = &['m', '.'];

/// Second-key prefixes; empty, so every conversation chord ends at two keys.
pub const CONVERSATION_TIER2: &[char] = &[];

/// Default conversation bindings.
pub const CONVERSATION_BINDINGS: &[(&str, MailAction)] = &[
    ("mr", MailAction::MarkRead),
    ("mu", MailAction::MarkUnread),
    ("mf", MailAction::ToggleFlag),
    (".t", MailAction::Trash),
    (".i", MailAction::IgnoreConversation),
    ("Delete", MailAction::Trash),
    ("ShiftDelete", MailAction::DeletePermanently),
];

/// Factory for conversation-scope dispatchers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversationShortcuts;

impl ConversationShortcuts {
    /// Default bindings with `config`'s conversation overrides applied.
    #[must_use]
    pub fn keymap(config: &ShortcutConfig) -> Keymap {
        Keymap::configured(ShortcutScope::Conversation, config)
    }

    /// Dispatcher for one conversation view, wired to `actions`.
    #[must_use]
    pub fn dispatcher<A: MailActions + 'static>(
        actions: Rc<A>,
        config: &ShortcutConfig,
    ) -> SequenceDispatcher {
        Self::keymap(config).dispatcher(actions, config.dispatcher_config())
    }
}
