// Forbid unsafe in production; deny (with targeted allows) in tests.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: keystroke events, chord disambiguation, and command dispatch.
//!
//! # Role in chordkey
//! `chordkey-core` turns a host UI's key presses into named commands. Hosts
//! own focus and rendering; feature code owns the commands. This crate owns
//! only the chord buffer, the commit timer, and the rules that decide when a
//! chord is complete.
//!
//! # Primary responsibilities
//! - **KeyEvent**: canonical keystrokes with focus target and default-prevention.
//! - **DisambiguationTiers**: per-position prefix sets deciding early commits.
//! - **CommandTable**: chord spelling → [`Command`](command::Command).
//! - **SequenceDispatcher**: the buffer/timer state machine.
//!
//! # How it fits in the system
//! `chordkey-mail` builds the item and conversation command tables on top of
//! this crate and hands them to a [`SequenceDispatcher`](dispatcher::SequenceDispatcher)
//! per view.

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod event;
pub mod logging;
pub mod sequence;
pub mod tiers;

pub use command::{Command, CommandError, CommandResult, CommandTable, FnCommand};
pub use config::{CHORD_TIMEOUT_MS, DispatcherConfig};
pub use dispatcher::{Dispatch, DispatchStats, SequenceDispatcher, TimerId, is_global_context};
pub use event::{EventTarget, KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use sequence::{KeyToken, Sequence};
pub use tiers::DisambiguationTiers;
