//! Count conservation under concurrent increments: no edge is lost or
//! double-counted across interleaved `on_edge` and `take_and_reset` calls.

use meterlink_core::PulseCounter;
use std::thread;

#[test]
fn concurrent_edges_are_conserved_across_drains() {
    const WRITERS: u32 = 4;
    const EDGES_PER_WRITER: u32 = 50_000;

    let counter = PulseCounter::new();
    let mut handles = Vec::new();
    for _ in 0..WRITERS {
        let c = counter.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..EDGES_PER_WRITER {
                c.on_edge();
            }
        }));
    }

    // Drain repeatedly while writers are running, like the window close does.
    let mut drained: u64 = 0;
    while handles.iter().any(|h| !h.is_finished()) {
        drained += u64::from(counter.take_and_reset());
        thread::yield_now();
    }
    for h in handles {
        h.join().expect("writer thread");
    }
    drained += u64::from(counter.take_and_reset());

    assert_eq!(drained, u64::from(WRITERS * EDGES_PER_WRITER));
    assert_eq!(counter.peek(), 0);
}

#[test]
fn peek_never_disturbs_the_count() {
    let counter = PulseCounter::new();
    let writer = {
        let c = counter.clone();
        thread::spawn(move || {
            for _ in 0..10_000 {
                c.on_edge();
            }
        })
    };
    // Concurrent peeks are read-only.
    while !writer.is_finished() {
        let _ = counter.peek();
    }
    writer.join().expect("writer thread");
    assert_eq!(counter.peek(), 10_000);
    assert_eq!(counter.take_and_reset(), 10_000);
}
