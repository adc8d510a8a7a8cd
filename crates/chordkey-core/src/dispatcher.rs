#![forbid(unsafe_code)]

//! Keystroke-sequence command dispatcher.
//!
//! [`SequenceDispatcher`] turns a live stream of [`KeyEvent`]s into at most
//! one [`Command`](crate::command::Command) invocation per gesture. A gesture
//! is a single key, a chord the tiers prove complete, or whatever the buffer
//! holds when the chord timer expires.
//!
//! # State Machine
//!
//! ```text
//!                 key (global context)
//!   ┌──────────┐  ambiguous prefix     ┌──────────────────────┐
//!   │   Idle   │──────────────────────▶│ Pending(buffer,timer)│◀──┐
//!   └──────────┘                       └──────────────────────┘   │
//!     ▲   ▲  │ key, unambiguous               │  │  │  ambiguous  │
//!     │   │  ▼                                │  │  └─────────────┘
//!     │   │ ┌──────────┐   key, unambiguous   │  │
//!     │   └─│  Commit  │◀─────────────────────┘  │ timer fires
//!     │     └──────────┘◀────────────────────────┘
//!     │                                           │
//!     └──────── key in editable field (reset) ────┘
//! ```
//!
//! # Invariants
//!
//! 1. At most one timer is live; every keystroke cancels the previous one.
//! 2. A cancelled timer never commits: [`fire_timer`](SequenceDispatcher::fire_timer)
//!    ignores stale ids and [`poll_timeout`](SequenceDispatcher::poll_timeout)
//!    only sees the live one.
//! 3. A commit empties the buffer and clears the timer **before** the command
//!    runs, whatever the outcome.
//! 4. `execute` is only called when `can_execute` returned true in the same
//!    commit; its error propagates unchanged.
//! 5. The context predicate is consulted on every keystroke.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::{Duration, Instant};
//! use chordkey_core::command::{CommandTable, FnCommand};
//! use chordkey_core::dispatcher::{Dispatch, SequenceDispatcher};
//! use chordkey_core::event::{EventTarget, KeyCode, KeyEvent};
//!
//! let marked = Rc::new(Cell::new(0));
//! let hits = Rc::clone(&marked);
//! let table = CommandTable::new().with(
//!     "mr",
//!     FnCommand::new("mark read", || true, move |_| {
//!         hits.set(hits.get() + 1);
//!         Ok(())
//!     }),
//! );
//! let mut dispatcher = SequenceDispatcher::builder().table(table).build();
//! let now = Instant::now();
//!
//! let mut m = KeyEvent::new(KeyCode::Char('m')).with_target(EventTarget::List);
//! assert_eq!(dispatcher.handle_key_event(&mut m, now).unwrap(), Dispatch::Pending);
//!
//! let mut r = KeyEvent::new(KeyCode::Char('r')).with_target(EventTarget::List);
//! let outcome = dispatcher
//!     .handle_key_event(&mut r, now + Duration::from_millis(120))
//!     .unwrap();
//! assert!(outcome.consumes_event());
//! assert!(r.is_default_prevented());
//! assert_eq!(marked.get(), 1);
//! assert!(dispatcher.buffer().is_empty());
//! ```

use std::fmt;

use tracing::{debug, debug_span, trace, warn};
use web_time::Instant;

use crate::command::{CommandError, CommandTable};
use crate::config::DispatcherConfig;
use crate::event::{KeyEvent, KeyEventKind};
use crate::sequence::{KeyToken, Sequence};
use crate::tiers::DisambiguationTiers;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What a keystroke or timer fire resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a key press (repeat or release); nothing changed.
    Ignored,

    /// The keystroke came from an editable field; the buffer was reset and
    /// the event left for the field.
    OutOfContext,

    /// The buffer holds an ambiguous prefix and the chord timer is running.
    Pending,

    /// The chord resolved and its command ran.
    Executed {
        /// Committed spelling.
        sequence: String,
    },

    /// The chord resolved but the command declined via `can_execute`.
    Disallowed {
        /// Committed spelling.
        sequence: String,
    },

    /// The committed spelling has no binding.
    Unmatched {
        /// Committed spelling.
        sequence: String,
    },
}

impl Dispatch {
    /// Whether the host must suppress default handling of the keystroke.
    #[must_use]
    pub const fn consumes_event(&self) -> bool {
        matches!(self, Self::Executed { .. })
    }

    /// Whether this outcome ended a gesture (buffer now empty).
    #[must_use]
    pub const fn is_commit(&self) -> bool {
        matches!(
            self,
            Self::Executed { .. } | Self::Disallowed { .. } | Self::Unmatched { .. }
        )
    }

    /// The committed spelling, for commit outcomes.
    #[must_use]
    pub fn sequence(&self) -> Option<&str> {
        match self {
            Self::Executed { sequence }
            | Self::Disallowed { sequence }
            | Self::Unmatched { sequence } => Some(sequence),
            Self::Ignored | Self::OutOfContext | Self::Pending => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pending timer
// ---------------------------------------------------------------------------

/// Identifier of a scheduled chord timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// The single outstanding commit timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    id: TimerId,
    deadline: Instant,
    event: KeyEvent,
}

impl PendingTimer {
    /// Timer id; pass it back to [`SequenceDispatcher::fire_timer`].
    #[must_use]
    pub const fn id(&self) -> TimerId {
        self.id
    }

    /// When the buffer commits if no key arrives first.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Counters over the dispatcher's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Key presses received.
    pub keys_seen: u64,
    /// Presses rejected by the context predicate.
    pub out_of_context: u64,
    /// Gestures resolved (any commit outcome).
    pub commits: u64,
    /// Commits triggered by the timer rather than a keystroke.
    pub timeout_commits: u64,
    /// Commands invoked.
    pub executed: u64,
    /// Commands that declined via `can_execute`.
    pub disallowed: u64,
    /// Commits with no binding.
    pub unmatched: u64,
    /// Timers scheduled.
    pub timers_scheduled: u64,
    /// Timers cancelled before firing.
    pub timers_cancelled: u64,
    /// Timers that fired and committed.
    pub timers_fired: u64,
}

// ---------------------------------------------------------------------------
// Context predicate
// ---------------------------------------------------------------------------

/// Default context predicate: shortcuts apply unless focus is in a text
/// input, textarea, or content-editable element.
#[must_use]
pub fn is_global_context(event: &KeyEvent) -> bool {
    !event.target.is_editable()
}

type ContextPredicate = Box<dyn Fn(&KeyEvent) -> bool>;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`SequenceDispatcher`].
pub struct SequenceDispatcherBuilder {
    config: DispatcherConfig,
    tiers: Option<DisambiguationTiers>,
    table: CommandTable,
    context: ContextPredicate,
}

impl SequenceDispatcherBuilder {
    fn new() -> Self {
        Self {
            config: DispatcherConfig::default(),
            tiers: None,
            table: CommandTable::new(),
            context: Box::new(is_global_context),
        }
    }

    /// Timing configuration, clamped with [`DispatcherConfig::validated`].
    #[must_use]
    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config.validated();
        self
    }

    /// Explicit disambiguation tiers. When unset, tiers are derived from the
    /// table at [`build`](Self::build).
    #[must_use]
    pub fn tiers(mut self, tiers: DisambiguationTiers) -> Self {
        self.tiers = Some(tiers);
        self
    }

    /// The command table; owned by the dispatcher from here on.
    #[must_use]
    pub fn table(mut self, table: CommandTable) -> Self {
        self.table = table;
        self
    }

    /// Replace the global-context predicate.
    #[must_use]
    pub fn context(mut self, predicate: impl Fn(&KeyEvent) -> bool + 'static) -> Self {
        self.context = Box::new(predicate);
        self
    }

    /// Build the dispatcher.
    ///
    /// Chords the tiers make unreachable are logged at `warn`.
    #[must_use]
    pub fn build(self) -> SequenceDispatcher {
        let tiers = self
            .tiers
            .unwrap_or_else(|| DisambiguationTiers::derive(self.table.sequences()));

        let unreachable = tiers.unreachable_sequences(self.table.sequences());
        if !unreachable.is_empty() {
            warn!(
                unreachable = ?unreachable,
                "disambiguation tiers shadow bound chords"
            );
        }

        SequenceDispatcher {
            config: self.config,
            tiers,
            table: self.table,
            context: self.context,
            buffer: Sequence::new(),
            timer: None,
            next_timer_id: 0,
            stats: DispatchStats::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Stateful chord dispatcher; one instance per UI scope.
///
/// Feed every keystroke to [`handle_key_event`](Self::handle_key_event).
/// Drive the chord timer either by polling [`poll_timeout`](Self::poll_timeout)
/// on tick (use [`next_deadline`](Self::next_deadline) to schedule the wakeup)
/// or by arming a host timer for [`pending_timer`](Self::pending_timer) and
/// calling [`fire_timer`](Self::fire_timer) with its id.
pub struct SequenceDispatcher {
    config: DispatcherConfig,
    tiers: DisambiguationTiers,
    table: CommandTable,
    context: ContextPredicate,
    buffer: Sequence,
    timer: Option<PendingTimer>,
    next_timer_id: u64,
    stats: DispatchStats,
}

impl fmt::Debug for SequenceDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceDispatcher")
            .field("buffer", &self.buffer.as_str())
            .field("timer", &self.timer.map(|t| t.id))
            .field("bindings", &self.table.len())
            .field("tiers", &self.tiers.depth())
            .finish()
    }
}

impl SequenceDispatcher {
    /// Start building a dispatcher.
    #[must_use]
    pub fn builder() -> SequenceDispatcherBuilder {
        SequenceDispatcherBuilder::new()
    }

    /// Process one keystroke.
    ///
    /// Never panics. Returns the command's error unchanged if the chord
    /// resolved and `execute` failed; the dispatcher has already reset by then.
    pub fn handle_key_event(
        &mut self,
        event: &mut KeyEvent,
        now: Instant,
    ) -> Result<Dispatch, CommandError> {
        if event.kind != KeyEventKind::Press {
            return Ok(Dispatch::Ignored);
        }

        let span = debug_span!("dispatch.key", key = %event.key_name());
        let _guard = span.enter();
        self.stats.keys_seen += 1;

        if !(self.context)(&*event) {
            if !self.buffer.is_empty() {
                trace!(buffer = %self.buffer, "keystroke in editable field; chord dropped");
            }
            self.stats.out_of_context += 1;
            self.clear();
            return Ok(Dispatch::OutOfContext);
        }

        self.buffer.push(KeyToken::from_event(event));

        if self.config.disable_chords {
            self.cancel_timer();
            return self.commit(event);
        }

        self.schedule_timer(*event, now);

        if self.tiers.should_commit(&self.buffer) {
            self.cancel_timer();
            return self.commit(event);
        }

        trace!(buffer = %self.buffer, "chord pending");
        Ok(Dispatch::Pending)
    }

    /// Commit the buffer if the live timer's deadline has passed.
    ///
    /// The deadline is inclusive: at exactly `deadline` the timer fires.
    pub fn poll_timeout(&mut self, now: Instant) -> Result<Option<Dispatch>, CommandError> {
        match self.timer {
            Some(timer) if now >= timer.deadline => self.fire(timer).map(Some),
            _ => Ok(None),
        }
    }

    /// Fire the timer with the given id.
    ///
    /// Returns `Ok(None)` for stale ids (cancelled or already fired).
    pub fn fire_timer(&mut self, id: TimerId) -> Result<Option<Dispatch>, CommandError> {
        match self.timer {
            Some(timer) if timer.id == id => self.fire(timer).map(Some),
            _ => {
                trace!(timer = id.raw(), "stale chord timer ignored");
                Ok(None)
            }
        }
    }

    /// Deadline of the live timer, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.map(|t| t.deadline)
    }

    /// The live timer, if any.
    #[must_use]
    pub fn pending_timer(&self) -> Option<&PendingTimer> {
        self.timer.as_ref()
    }

    /// Whether an ambiguous prefix is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Keys buffered since the last commit.
    #[must_use]
    pub fn buffer(&self) -> &Sequence {
        &self.buffer
    }

    /// Discard the buffer and cancel the timer (scope teardown).
    pub fn reset(&mut self) {
        self.clear();
    }

    /// Lifetime counters.
    #[must_use]
    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    /// Timing configuration.
    #[must_use]
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Update the configuration, clamped like the builder's.
    ///
    /// Does not touch a pending chord; the new timeout applies from the next
    /// keystroke.
    pub fn set_config(&mut self, config: DispatcherConfig) {
        self.config = config.validated();
    }

    /// Active disambiguation tiers.
    #[must_use]
    pub fn tiers(&self) -> &DisambiguationTiers {
        &self.tiers
    }

    /// The command table.
    #[must_use]
    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    // -- internals ----------------------------------------------------------

    fn fire(&mut self, timer: PendingTimer) -> Result<Dispatch, CommandError> {
        debug!(
            timer = timer.id.raw(),
            buffer = %self.buffer,
            "chord timeout"
        );
        self.timer = None;
        self.stats.timers_fired += 1;
        self.stats.timeout_commits += 1;
        let mut event = timer.event;
        self.commit(&mut event)
    }

    fn schedule_timer(&mut self, event: KeyEvent, now: Instant) {
        self.cancel_timer();
        let id = TimerId(self.next_timer_id);
        self.next_timer_id += 1;
        // Host clocks near the end of `Instant`'s range expire immediately.
        let deadline = now.checked_add(self.config.chord_timeout).unwrap_or(now);
        self.timer = Some(PendingTimer {
            id,
            deadline,
            event,
        });
        self.stats.timers_scheduled += 1;
    }

    fn cancel_timer(&mut self) {
        if self.timer.take().is_some() {
            self.stats.timers_cancelled += 1;
        }
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.cancel_timer();
    }

    /// Resolve the buffer. State is reset before the command runs.
    fn commit(&mut self, event: &mut KeyEvent) -> Result<Dispatch, CommandError> {
        let sequence = self.buffer.take();
        self.cancel_timer();
        self.stats.commits += 1;
        let spelling = sequence.as_str().to_owned();

        // A binding spelled `"F5"` names the F5 key, not `F` then `5`.
        let binding = self
            .table
            .get(&spelling)
            .filter(|_| sequence.is_spelled_by(&spelling));
        let Some(command) = binding else {
            trace!(sequence = %spelling, "no binding");
            self.stats.unmatched += 1;
            return Ok(Dispatch::Unmatched { sequence: spelling });
        };

        if !command.can_execute() {
            debug!(sequence = %spelling, command = command.describe(), "command disallowed");
            self.stats.disallowed += 1;
            return Ok(Dispatch::Disallowed { sequence: spelling });
        }

        event.prevent_default();
        self.stats.executed += 1;
        debug!(sequence = %spelling, command = command.describe(), "executing command");
        if let Err(err) = command.execute(event) {
            debug!(sequence = %spelling, error = %err, "command returned an error");
            return Err(err);
        }
        Ok(Dispatch::Executed { sequence: spelling })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
