#![forbid(unsafe_code)]

//! Commands and the chord → command table.
//!
//! A [`Command`] is the capability the dispatcher invokes once a chord
//! resolves: a `can_execute` gate plus the `execute` body. Feature code owns
//! the business logic; the dispatcher only sees this trait.
//!
//! # Invariants
//!
//! - The dispatcher calls `execute` only after `can_execute` returned `true`
//!   for the same commit.
//! - Errors from `execute` reach the caller of the dispatcher unchanged.

use std::fmt;

use ahash::AHashMap;

use crate::event::KeyEvent;

/// Result of executing a command.
pub type CommandResult = Result<(), CommandError>;

/// Errors a command may report from [`Command::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The item the command operates on no longer exists.
    TargetNotFound(String),
    /// The command cannot run in the current state.
    InvalidState(String),
    /// The backing action failed.
    Failed {
        /// Command or action name.
        command: String,
        /// Human-readable reason.
        reason: String,
    },
    /// Generic error with message.
    Other(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound(target) => write!(f, "target {target} not found"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::Failed { command, reason } => write!(f, "{command} failed: {reason}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// A command bound to a chord.
pub trait Command {
    /// Whether the command may run right now.
    fn can_execute(&self) -> bool;

    /// Run the command for the keystroke that completed the chord.
    fn execute(&self, event: &KeyEvent) -> CommandResult;

    /// Short label for logs and help listings.
    fn describe(&self) -> &str {
        "command"
    }
}

/// A [`Command`] assembled from two closures.
///
/// ```
/// use chordkey_core::command::{Command, FnCommand};
/// use chordkey_core::event::{KeyCode, KeyEvent};
///
/// let cmd = FnCommand::new("noop", || true, |_event| Ok(()));
/// assert!(cmd.can_execute());
/// assert!(cmd.execute(&KeyEvent::new(KeyCode::Char('z'))).is_ok());
/// ```
pub struct FnCommand<C, E> {
    label: String,
    can_execute: C,
    execute: E,
}

impl<C, E> FnCommand<C, E>
where
    C: Fn() -> bool,
    E: Fn(&KeyEvent) -> CommandResult,
{
    /// Create a command from a gate and a body.
    pub fn new(label: impl Into<String>, can_execute: C, execute: E) -> Self {
        Self {
            label: label.into(),
            can_execute,
            execute,
        }
    }
}

impl<C, E> Command for FnCommand<C, E>
where
    C: Fn() -> bool,
    E: Fn(&KeyEvent) -> CommandResult,
{
    fn can_execute(&self) -> bool {
        (self.can_execute)()
    }

    fn execute(&self, event: &KeyEvent) -> CommandResult {
        (self.execute)(event)
    }

    fn describe(&self) -> &str {
        &self.label
    }
}

impl<C, E> fmt::Debug for FnCommand<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Mapping from chord spelling (`"mr"`, `".t"`, `"ShiftDelete"`) to command.
#[derive(Default)]
pub struct CommandTable {
    commands: AHashMap<String, Box<dyn Command>>,
}

impl CommandTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `command` to `sequence`, returning the command it replaced.
    pub fn bind(
        &mut self,
        sequence: impl Into<String>,
        command: impl Command + 'static,
    ) -> Option<Box<dyn Command>> {
        self.bind_boxed(sequence, Box::new(command))
    }

    /// Bind an already boxed command.
    pub fn bind_boxed(
        &mut self,
        sequence: impl Into<String>,
        command: Box<dyn Command>,
    ) -> Option<Box<dyn Command>> {
        self.commands.insert(sequence.into(), command)
    }

    /// Builder-style [`bind`](Self::bind).
    #[must_use]
    pub fn with(mut self, sequence: impl Into<String>, command: impl Command + 'static) -> Self {
        self.bind(sequence, command);
        self
    }

    /// Remove the binding for `sequence`.
    pub fn unbind(&mut self, sequence: &str) -> Option<Box<dyn Command>> {
        self.commands.remove(sequence)
    }

    /// Command bound to `sequence`.
    #[must_use]
    pub fn get(&self, sequence: &str) -> Option<&dyn Command> {
        self.commands.get(sequence).map(|cmd| &**cmd)
    }

    /// Whether `sequence` is bound.
    #[must_use]
    pub fn contains(&self, sequence: &str) -> bool {
        self.commands.contains_key(sequence)
    }

    /// Bound spellings, sorted.
    #[must_use]
    pub fn sequences(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the table has no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.sequences()
                    .into_iter()
                    .filter_map(|seq| self.get(seq).map(|cmd| (seq, cmd.describe()))),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyCode;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn fn_command_delegates() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let cmd = FnCommand::new(
            "count",
            || true,
            move |_| {
                counter.set(counter.get() + 1);
                Ok(())
            },
        );
        assert!(cmd.can_execute());
        cmd.execute(&KeyEvent::new(KeyCode::Char('z'))).unwrap();
        assert_eq!(hits.get(), 1);
        assert_eq!(cmd.describe(), "count");
    }

    #[test]
    fn table_bind_and_lookup() {
        let mut table = CommandTable::new()
            .with("mr", FnCommand::new("read", || true, |_| Ok(())))
            .with(".t", FnCommand::new("trash", || false, |_| Ok(())));
        assert_eq!(table.len(), 2);
        assert!(table.contains("mr"));
        assert!(!table.contains("m"));
        assert!(table.get(".t").is_some_and(|cmd| !cmd.can_execute()));
        assert_eq!(table.sequences(), vec![".t", "mr"]);

        let replaced = table.bind("mr", FnCommand::new("read2", || true, |_| Ok(())));
        assert_eq!(replaced.map(|cmd| cmd.describe().to_string()), Some("read".into()));
        assert!(table.unbind("mr").is_some());
        assert!(!table.contains("mr"));
    }

    #[test]
    fn command_error_display() {
        let err = CommandError::Failed {
            command: "trash".into(),
            reason: "offline".into(),
        };
        assert_eq!(err.to_string(), "trash failed: offline");
        assert_eq!(
            CommandError::TargetNotFound("msg-1".into()).to_string(),
            "target msg-1 not found"
        );
        assert_eq!(CommandError::InvalidState("x".into()).to_string(), "invalid state: x");
    }

    #[test]
    fn empty_table() {
        let table = CommandTable::new();
        assert!(table.is_empty());
        assert!(table.get("mr").is_none());
    }
}
