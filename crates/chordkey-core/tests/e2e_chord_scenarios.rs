#![forbid(unsafe_code)]

//! End-to-end chord scenarios against a mail-style command table.
//!
//! Each test drives a dispatcher the way a host UI would: key presses with a
//! focus target and explicit timestamps, plus timer polling.
//!
//! Run:
//!   cargo test -p chordkey-core --test e2e_chord_scenarios

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chordkey_core::{
    CommandTable, DisambiguationTiers, Dispatch, EventTarget, FnCommand, KeyCode, KeyEvent,
    SequenceDispatcher,
};
use web_time::{Duration, Instant};

// ============================================================================
// Harness
// ============================================================================

/// Shared counters the bound commands write to.
#[derive(Default)]
struct Mailbox {
    mark_read: Cell<u32>,
    mark_unread: Cell<u32>,
    trash: Cell<u32>,
    selection: Cell<bool>,
    executed_with: RefCell<Vec<String>>,
}

fn harness() -> (Rc<Mailbox>, SequenceDispatcher) {
    let mailbox = Rc::new(Mailbox {
        selection: Cell::new(true),
        ..Mailbox::default()
    });

    let mut table = CommandTable::new();
    for spelling in ["mr", "z"] {
        let gate = Rc::clone(&mailbox);
        let body = Rc::clone(&mailbox);
        table.bind(
            spelling,
            FnCommand::new(
                "mark read",
                move || gate.selection.get(),
                move |event| {
                    body.mark_read.set(body.mark_read.get() + 1);
                    body.executed_with.borrow_mut().push(event.key_name());
                    Ok(())
                },
            ),
        );
    }
    let body = Rc::clone(&mailbox);
    table.bind(
        "mu",
        FnCommand::new(
            "mark unread",
            || true,
            move |_| {
                body.mark_unread.set(body.mark_unread.get() + 1);
                Ok(())
            },
        ),
    );
    let body = Rc::clone(&mailbox);
    table.bind(
        ".t",
        FnCommand::new(
            "trash",
            || true,
            move |_| {
                body.trash.set(body.trash.get() + 1);
                Ok(())
            },
        ),
    );

    let dispatcher = SequenceDispatcher::builder()
        .table(table)
        .tiers(DisambiguationTiers::from_chars(&[&['m', '.'], &[]]))
        .build();
    (mailbox, dispatcher)
}

fn in_list(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c)).with_target(EventTarget::List)
}

fn in_field(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c)).with_target(EventTarget::TextInput)
}

fn feed(d: &mut SequenceDispatcher, mut event: KeyEvent, at: Instant) -> Dispatch {
    d.handle_key_event(&mut event, at)
        .expect("commands in this table never fail")
}

const TIMEOUT: Duration = Duration::from_millis(1000);

// ============================================================================
// Literal scenarios
// ============================================================================

#[test]
fn scenario_1_mr_within_timeout_marks_read_once() {
    let (mailbox, mut d) = harness();
    let t = Instant::now();

    assert_eq!(feed(&mut d, in_list('m'), t), Dispatch::Pending);
    let out = feed(&mut d, in_list('r'), t + Duration::from_millis(300));

    assert_eq!(out, Dispatch::Executed { sequence: "mr".into() });
    assert_eq!(mailbox.mark_read.get(), 1);
    assert_eq!(d.buffer().as_str(), "");

    // The timer scheduled by `m` is gone; nothing else fires later.
    assert!(d.poll_timeout(t + TIMEOUT * 3).unwrap().is_none());
    assert_eq!(mailbox.mark_read.get(), 1);
}

#[test]
fn scenario_2_single_z_marks_read_without_waiting() {
    let (mailbox, mut d) = harness();
    let t = Instant::now();

    let mut z = in_list('z');
    let out = d.handle_key_event(&mut z, t).unwrap();

    assert_eq!(out, Dispatch::Executed { sequence: "z".into() });
    assert!(z.is_default_prevented());
    assert_eq!(mailbox.mark_read.get(), 1);
    assert!(d.pending_timer().is_none());
    assert_eq!(*mailbox.executed_with.borrow(), vec!["z".to_string()]);
}

#[test]
fn scenario_3_focus_moves_into_text_field_mid_chord() {
    let (mailbox, mut d) = harness();
    let t = Instant::now();

    feed(&mut d, in_list('m'), t);
    let mut r = in_field('r');
    let out = d
        .handle_key_event(&mut r, t + Duration::from_millis(200))
        .unwrap();

    assert_eq!(out, Dispatch::OutOfContext);
    assert!(!r.is_default_prevented(), "the text field keeps the keystroke");
    assert_eq!(mailbox.mark_read.get(), 0);
    assert_eq!(d.buffer().as_str(), "");
    assert!(d.poll_timeout(t + TIMEOUT * 2).unwrap().is_none());
}

#[test]
fn scenario_4_lone_prefix_times_out_to_nothing() {
    let (mailbox, mut d) = harness();
    let t = Instant::now();

    feed(&mut d, in_list('m'), t);
    assert!(d.poll_timeout(t + Duration::from_millis(500)).unwrap().is_none());

    let out = d.poll_timeout(t + TIMEOUT).unwrap();
    assert_eq!(out, Some(Dispatch::Unmatched { sequence: "m".into() }));
    assert_eq!(mailbox.mark_read.get() + mailbox.mark_unread.get(), 0);
    assert_eq!(d.buffer().as_str(), "");
}

#[test]
fn scenario_5_unregistered_chord_commits_on_second_key() {
    let (mailbox, mut d) = harness();
    let t = Instant::now();

    feed(&mut d, in_list('m'), t);
    let out = feed(&mut d, in_list('x'), t + Duration::from_millis(50));

    assert_eq!(out, Dispatch::Unmatched { sequence: "mx".into() });
    assert!(d.pending_timer().is_none());
    assert_eq!(mailbox.mark_read.get(), 0);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn rapid_keystrokes_fire_exactly_one_timer() {
    let tiers = DisambiguationTiers::from_chars(&[&['g'], &['g'], &['g'], &['g']]);
    let mut d = SequenceDispatcher::builder()
        .table(CommandTable::new())
        .tiers(tiers)
        .build();
    let t = Instant::now();

    let mut last = t;
    for i in 0..4u32 {
        last = t + Duration::from_millis(u64::from(i) * 10);
        assert_eq!(feed(&mut d, in_list('g'), last), Dispatch::Pending);
    }

    let mut fired = 0;
    let mut now = t;
    while now <= last + TIMEOUT * 2 {
        if d.poll_timeout(now).unwrap().is_some() {
            fired += 1;
        }
        now += Duration::from_millis(5);
    }

    assert_eq!(fired, 1);
    assert_eq!(d.stats().timers_scheduled, 4);
    assert_eq!(d.stats().timers_cancelled, 3);
    assert_eq!(d.stats().timers_fired, 1);
}

#[test]
fn disallowed_chord_needs_a_fresh_gesture() {
    let (mailbox, mut d) = harness();
    let t = Instant::now();
    mailbox.selection.set(false);

    feed(&mut d, in_list('m'), t);
    let out = feed(&mut d, in_list('r'), t + Duration::from_millis(10));
    assert_eq!(out, Dispatch::Disallowed { sequence: "mr".into() });
    assert_eq!(d.buffer().as_str(), "");

    mailbox.selection.set(true);
    // `r` alone is not the chord; the user has to type `mr` again.
    let out = feed(&mut d, in_list('r'), t + Duration::from_millis(20));
    assert_eq!(out, Dispatch::Unmatched { sequence: "r".into() });
    feed(&mut d, in_list('m'), t + Duration::from_millis(30));
    let out = feed(&mut d, in_list('r'), t + Duration::from_millis(40));
    assert!(out.consumes_event());
    assert_eq!(mailbox.mark_read.get(), 1);
}

#[test]
fn independent_views_keep_independent_chords() {
    let (list_box, mut list) = harness();
    let (reader_box, mut reader) = harness();
    let t = Instant::now();

    feed(&mut list, in_list('m'), t);
    feed(&mut reader, in_list('.'), t + Duration::from_millis(10));
    feed(&mut list, in_list('u'), t + Duration::from_millis(20));
    feed(&mut reader, in_list('t'), t + Duration::from_millis(30));

    assert_eq!(list_box.mark_unread.get(), 1);
    assert_eq!(list_box.trash.get(), 0);
    assert_eq!(reader_box.trash.get(), 1);
    assert_eq!(reader_box.mark_unread.get(), 0);
}

#[test]
fn timer_commit_hands_the_scheduling_keystroke_to_the_command() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let table = CommandTable::new()
        .with(
            "g",
            FnCommand::new("top", || true, move |event: &KeyEvent| {
                log.borrow_mut().push((event.key_name(), event.target));
                Ok(())
            }),
        )
        .with("gg", FnCommand::new("bottom", || true, |_| Ok(())));
    let mut d = SequenceDispatcher::builder().table(table).build();
    let t = Instant::now();

    feed(&mut d, in_list('g'), t);
    let out = d.poll_timeout(t + TIMEOUT).unwrap();
    assert_eq!(out, Some(Dispatch::Executed { sequence: "g".into() }));
    assert_eq!(*seen.borrow(), vec![("g".to_string(), EventTarget::List)]);
}
