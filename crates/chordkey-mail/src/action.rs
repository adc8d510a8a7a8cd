#![forbid(unsafe_code)]

//! Mail actions and the capability a host grants to perform them.
//!
//! Shortcut tables never touch mailbox state directly. Each chord resolves to
//! a [`MailAction`], and an [`ActionCommand`] forwards it to the host's
//! [`MailActions`] implementation, which decides whether the action applies
//! to the current selection and carries it out.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

#[cfg(feature = "shortcut-config")]
use serde::{Deserialize, Serialize};

use chordkey_core::{Command, CommandResult, KeyEvent};

/// An action on the selected message(s) or conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "shortcut-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "shortcut-config", serde(rename_all = "kebab-case"))]
pub enum MailAction {
    /// Mark as read.
    MarkRead,
    /// Mark as unread.
    MarkUnread,
    /// Flag or unflag.
    ToggleFlag,
    /// Move to the junk folder.
    MarkJunk,
    /// Move to the deleted-items folder.
    Trash,
    /// Delete without moving to the deleted-items folder.
    DeletePermanently,
    /// Ignore the conversation: trash current and future messages in it.
    IgnoreConversation,
}

impl MailAction {
    /// Every action, in help-listing order.
    pub const ALL: [Self; 7] = [
        Self::MarkRead,
        Self::MarkUnread,
        Self::ToggleFlag,
        Self::MarkJunk,
        Self::Trash,
        Self::DeletePermanently,
        Self::IgnoreConversation,
    ];

    /// Config name (`"mark-read"`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MarkRead => "mark-read",
            Self::MarkUnread => "mark-unread",
            Self::ToggleFlag => "toggle-flag",
            Self::MarkJunk => "mark-junk",
            Self::Trash => "trash",
            Self::DeletePermanently => "delete-permanently",
            Self::IgnoreConversation => "ignore-conversation",
        }
    }

    /// Label for help overlays.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MarkRead => "Mark as read",
            Self::MarkUnread => "Mark as unread",
            Self::ToggleFlag => "Flag / unflag",
            Self::MarkJunk => "Mark as junk",
            Self::Trash => "Delete",
            Self::DeletePermanently => "Delete permanently",
            Self::IgnoreConversation => "Ignore conversation",
        }
    }

    /// Whether the action removes the selection from view.
    #[must_use]
    pub const fn is_destructive(self) -> bool {
        matches!(
            self,
            Self::MarkJunk | Self::Trash | Self::DeletePermanently | Self::IgnoreConversation
        )
    }
}

impl fmt::Display for MailAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error parsing a [`MailAction`] name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown mail action {:?}", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for MailAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| UnknownAction(s.to_owned()))
    }
}

/// Host capability for performing mail actions.
///
/// Methods take `&self`; hosts keep mutable state behind `Cell`/`RefCell`.
pub trait MailActions {
    /// Whether `action` applies to the current selection.
    fn can_perform(&self, action: MailAction) -> bool;

    /// Carry out `action` on the current selection.
    fn perform(&self, action: MailAction) -> CommandResult;
}

/// [`Command`] that forwards one [`MailAction`] to a [`MailActions`] host.
pub struct ActionCommand<A> {
    action: MailAction,
    actions: Rc<A>,
}

impl<A: MailActions> ActionCommand<A> {
    /// Bind `action` to the shared host.
    pub fn new(action: MailAction, actions: Rc<A>) -> Self {
        Self { action, actions }
    }

    /// The forwarded action.
    #[must_use]
    pub fn action(&self) -> MailAction {
        self.action
    }
}

impl<A: MailActions> Command for ActionCommand<A> {
    fn can_execute(&self) -> bool {
        self.actions.can_perform(self.action)
    }

    fn execute(&self, _event: &KeyEvent) -> CommandResult {
        self.actions.perform(self.action)
    }

    fn describe(&self) -> &str {
        self.action.label()
    }
}

impl<A> fmt::Debug for ActionCommand<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCommand")
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordkey_core::{CommandError, KeyCode};
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        allowed: bool,
        performed: RefCell<Vec<MailAction>>,
    }

    impl MailActions for Recorder {
        fn can_perform(&self, _action: MailAction) -> bool {
            self.allowed
        }

        fn perform(&self, action: MailAction) -> CommandResult {
            if action == MailAction::DeletePermanently {
                return Err(CommandError::Failed {
                    command: action.name().into(),
                    reason: "server rejected delete".into(),
                });
            }
            self.performed.borrow_mut().push(action);
            Ok(())
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for action in MailAction::ALL {
            assert_eq!(action.name().parse::<MailAction>(), Ok(action));
        }
        assert_eq!(
            "archive".parse::<MailAction>(),
            Err(UnknownAction("archive".into()))
        );
    }

    #[test]
    fn destructive_actions() {
        assert!(MailAction::Trash.is_destructive());
        assert!(!MailAction::MarkRead.is_destructive());
        assert!(!MailAction::ToggleFlag.is_destructive());
    }

    #[test]
    fn command_forwards_to_host() {
        let host = Rc::new(Recorder {
            allowed: true,
            ..Recorder::default()
        });
        let cmd = ActionCommand::new(MailAction::MarkUnread, Rc::clone(&host));
        assert!(cmd.can_execute());
        assert_eq!(cmd.describe(), "Mark as unread");
        cmd.execute(&KeyEvent::new(KeyCode::Char('u'))).unwrap();
        assert_eq!(*host.performed.borrow(), vec![MailAction::MarkUnread]);
    }

    #[test]
    fn command_gate_and_error() {
        let host = Rc::new(Recorder::default());
        let cmd = ActionCommand::new(MailAction::DeletePermanently, Rc::clone(&host));
        assert!(!cmd.can_execute());
        let err = cmd.execute(&KeyEvent::new(KeyCode::Delete)).unwrap_err();
        assert_eq!(err.to_string(), "delete-permanently failed: server rejected delete");
    }
}
