//! Benchmark: per-keystroke dispatch cost.
//!
//! Run with: `cargo bench -p chordkey-core --bench dispatch_bench`
//!
//! Measures the hot path a host UI pays on every key press: immediate
//! single-key commits, two-key chords, out-of-context resets, and the
//! timer poll a render loop performs on each tick.

use std::hint::black_box;

use chordkey_core::{CommandTable, EventTarget, FnCommand, KeyCode, KeyEvent, SequenceDispatcher};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use web_time::{Duration, Instant};

fn mail_dispatcher(extra_bindings: usize) -> SequenceDispatcher {
    let mut table = CommandTable::new();
    for spelling in ["mr", "mu", "mf", "ms", ".t", "z", "Delete", "ShiftDelete"] {
        table.bind(spelling, FnCommand::new(spelling, || true, |_| Ok(())));
    }
    // Padding bindings to show lookup cost is flat in table size.
    for i in 0..extra_bindings {
        table.bind(format!("q{i}"), FnCommand::new("pad", || true, |_| Ok(())));
    }
    // Derived tiers: `m`, `.` and `q` wait, digits extend `q` chords.
    SequenceDispatcher::builder().table(table).build()
}

fn key(c: char, target: EventTarget) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c)).with_target(target)
}

// ===========================================================================
// Keystroke paths
// ===========================================================================

fn bench_keystrokes(c: &mut Criterion) {
    let mut group = c.benchmark_group("keystroke");
    let now = Instant::now();

    group.bench_function("single_key_commit", |b| {
        let mut d = mail_dispatcher(0);
        b.iter(|| {
            let mut z = key('z', EventTarget::List);
            black_box(d.handle_key_event(&mut z, now).ok());
        });
    });

    group.bench_function("two_key_chord", |b| {
        let mut d = mail_dispatcher(0);
        b.iter(|| {
            let mut m = key('m', EventTarget::List);
            let mut r = key('r', EventTarget::List);
            black_box(d.handle_key_event(&mut m, now).ok());
            black_box(d.handle_key_event(&mut r, now).ok());
        });
    });

    group.bench_function("editable_reset", |b| {
        let mut d = mail_dispatcher(0);
        b.iter(|| {
            let mut m = key('m', EventTarget::List);
            let mut typed = key('r', EventTarget::TextInput);
            black_box(d.handle_key_event(&mut m, now).ok());
            black_box(d.handle_key_event(&mut typed, now).ok());
        });
    });

    group.finish();
}

fn bench_table_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_size");
    let now = Instant::now();

    for size in [0usize, 64, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut d = mail_dispatcher(size);
            b.iter(|| {
                let mut m = key('m', EventTarget::List);
                let mut u = key('u', EventTarget::List);
                black_box(d.handle_key_event(&mut m, now).ok());
                black_box(d.handle_key_event(&mut u, now).ok());
            });
        });
    }

    group.finish();
}

// ===========================================================================
// Timer polling
// ===========================================================================

fn bench_poll(c: &mut Criterion) {
    let mut group = c.benchmark_group("poll_timeout");
    let now = Instant::now();

    group.bench_function("idle", |b| {
        let mut d = mail_dispatcher(0);
        b.iter(|| black_box(d.poll_timeout(now).ok()));
    });

    group.bench_function("pending_not_due", |b| {
        let mut d = mail_dispatcher(0);
        let mut m = key('m', EventTarget::List);
        let _ = d.handle_key_event(&mut m, now);
        let early = now + Duration::from_millis(10);
        b.iter(|| black_box(d.poll_timeout(early).ok()));
    });

    group.bench_function("prefix_then_fire", |b| {
        let mut d = mail_dispatcher(0);
        let late = now + Duration::from_secs(2);
        b.iter(|| {
            let mut m = key('m', EventTarget::List);
            black_box(d.handle_key_event(&mut m, now).ok());
            black_box(d.poll_timeout(late).ok());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_keystrokes, bench_table_size, bench_poll);
criterion_main!(benches);
