#![forbid(unsafe_code)]

//! Mail keyboard shortcuts: the item and conversation call sites.
//!
//! Each mail view owns one [`SequenceDispatcher`](chordkey_core::SequenceDispatcher)
//! built by [`ItemShortcuts`] or [`ConversationShortcuts`]. Chords resolve
//! to [`MailAction`]s, which the host performs through its [`MailActions`]
//! implementation.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use std::time::Instant;
//! use chordkey_core::{CommandResult, EventTarget, KeyCode, KeyEvent};
//! use chordkey_mail::{ItemShortcuts, MailAction, MailActions, ShortcutConfig};
//!
//! #[derive(Default)]
//! struct Inbox(RefCell<Vec<MailAction>>);
//!
//! impl MailActions for Inbox {
//!     fn can_perform(&self, _action: MailAction) -> bool {
//!         true
//!     }
//!     fn perform(&self, action: MailAction) -> CommandResult {
//!         self.0.borrow_mut().push(action);
//!         Ok(())
//!     }
//! }
//!
//! let inbox = Rc::new(Inbox::default());
//! let mut shortcuts = ItemShortcuts::dispatcher(Rc::clone(&inbox), &ShortcutConfig::default());
//! let now = Instant::now();
//! for c in ['m', 'u'] {
//!     let mut key = KeyEvent::new(KeyCode::Char(c)).with_target(EventTarget::List);
//!     shortcuts.handle_key_event(&mut key, now).unwrap();
//! }
//! assert_eq!(*inbox.0.borrow(), vec![MailAction::MarkUnread]);
//! ```

pub mod action;
pub mod config;
pub mod conversation;
pub mod item;
pub mod keymap;

pub use action::{ActionCommand, MailAction, MailActions, UnknownAction};
pub use config::{ScopeBindings, ShortcutConfig, ShortcutConfigError};
pub use conversation::{
    CONVERSATION_BINDINGS, CONVERSATION_TIER1, CONVERSATION_TIER2, ConversationShortcuts,
};
pub use item::{ITEM_BINDINGS, ITEM_TIER1, ITEM_TIER2, ItemShortcuts};
pub use keymap::{FINAL_TIER, HelpEntry, Keymap, ShortcutScope};
