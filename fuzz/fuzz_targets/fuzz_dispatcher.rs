#![no_main]

use arbitrary::Arbitrary;
use chordkey_core::{
    CommandError, CommandTable, DisambiguationTiers, Dispatch, DispatcherConfig, EventTarget,
    FnCommand, KeyCode, KeyEvent, KeyEventKind, Modifiers, SequenceDispatcher,
};
use libfuzzer_sys::fuzz_target;
use web_time::{Duration, Instant};

#[derive(Debug, Arbitrary)]
enum Step {
    Key {
        code: u8,
        modifiers: u8,
        target: u8,
        kind: u8,
        gap_ms: u16,
    },
    Poll {
        gap_ms: u16,
    },
    FireLive,
    Reset,
}

#[derive(Debug, Arbitrary)]
struct Input {
    /// Table of chords spelled from the fuzzed alphabet.
    chords: Vec<Vec<u8>>,
    derive_tiers: bool,
    disable_chords: bool,
    timeout_ms: u16,
    steps: Vec<Step>,
}

const ALPHABET: [char; 8] = ['m', 'r', 'u', '.', 't', 'z', 'g', 'x'];

fn code(byte: u8) -> KeyCode {
    match byte % 12 {
        n @ 0..=7 => KeyCode::Char(ALPHABET[n as usize]),
        8 => KeyCode::Delete,
        9 => KeyCode::Enter,
        10 => KeyCode::F(1 + byte % 24),
        _ => KeyCode::Char(char::from(byte)),
    }
}

fn target(byte: u8) -> EventTarget {
    match byte % 6 {
        0 => EventTarget::Body,
        1 => EventTarget::List,
        2 => EventTarget::Detail,
        3 => EventTarget::TextInput,
        4 => EventTarget::TextArea,
        _ => EventTarget::ContentEditable,
    }
}

fn kind(byte: u8) -> KeyEventKind {
    match byte % 8 {
        0 => KeyEventKind::Repeat,
        1 => KeyEventKind::Release,
        _ => KeyEventKind::Press,
    }
}

fuzz_target!(|input: Input| {
    let mut table = CommandTable::new();
    for (i, chord) in input.chords.iter().take(32).enumerate() {
        let spelling: String = chord
            .iter()
            .take(4)
            .map(|b| ALPHABET[usize::from(*b) % ALPHABET.len()])
            .collect();
        let fails = i % 5 == 4;
        table.bind(
            spelling,
            FnCommand::new("fuzz", move || i % 3 != 2, move |_| {
                if fails {
                    Err(CommandError::Other("fuzz".into()))
                } else {
                    Ok(())
                }
            }),
        );
    }

    let mut config = DispatcherConfig::default()
        .with_timeout(Duration::from_millis(u64::from(input.timeout_ms)))
        .validated();
    if input.disable_chords {
        config = config.disable_chords();
    }
    let mut builder = SequenceDispatcher::builder().table(table).config(config);
    if !input.derive_tiers {
        builder = builder.tiers(DisambiguationTiers::from_chars(&[&['m', '.', 'g'], &['g']]));
    }
    let mut dispatcher = builder.build();

    let mut now = Instant::now();
    for step in input.steps.iter().take(512) {
        let outcome = match *step {
            Step::Key {
                code: c,
                modifiers,
                target: t,
                kind: k,
                gap_ms,
            } => {
                now += Duration::from_millis(u64::from(gap_ms));
                let mut event = KeyEvent::new(code(c))
                    .with_modifiers(Modifiers::from_bits_truncate(modifiers))
                    .with_target(target(t))
                    .with_kind(kind(k));
                dispatcher.handle_key_event(&mut event, now)
            }
            Step::Poll { gap_ms } => {
                now += Duration::from_millis(u64::from(gap_ms));
                dispatcher
                    .poll_timeout(now)
                    .map(|o| o.unwrap_or(Dispatch::Ignored))
            }
            Step::FireLive => match dispatcher.pending_timer().map(|t| t.id()) {
                Some(id) => dispatcher
                    .fire_timer(id)
                    .map(|o| o.unwrap_or(Dispatch::Ignored)),
                None => Ok(Dispatch::Ignored),
            },
            Step::Reset => {
                dispatcher.reset();
                Ok(Dispatch::Ignored)
            }
        };

        // Buffer and timer move together; commits and errors leave both empty.
        assert_eq!(dispatcher.is_pending(), dispatcher.pending_timer().is_some());
        if outcome.as_ref().map_or(true, Dispatch::is_commit) {
            assert!(!dispatcher.is_pending());
        }
    }

    let stats = dispatcher.stats();
    assert_eq!(stats.commits, stats.executed + stats.disallowed + stats.unmatched);
});
