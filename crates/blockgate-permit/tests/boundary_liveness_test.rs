//! Integration test: blocking-call boundary liveness and balance.
//!
//! Validates that:
//! 1. A task parked in a native blocking call does not stall other tasks.
//! 2. Every release is matched by exactly one reacquire, whatever the outcome.
//! 3. The permit is never held by two threads at once.
//!
//! Run: cargo test -p blockgate-permit --test boundary_liveness_test

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Barrier, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use blockgate_permit::{ExecutionPermit, Managed};

/// A genuine OS-level block, the way a native socket wait would park the thread.
fn native_sleep(dur: Duration) -> i32 {
    let ts = libc::timespec {
        tv_sec: dur.as_secs() as libc::time_t,
        tv_nsec: dur.subsec_nanos() as libc::c_long,
    };
    // SAFETY: valid timespec, null remainder pointer is allowed.
    unsafe { libc::nanosleep(&ts, std::ptr::null_mut()) }
}

#[test]
fn fast_task_completes_while_slow_task_blocks() {
    let permit = Arc::new(ExecutionPermit::local());
    let order = Arc::new(AtomicU64::new(0));
    let (inside_tx, inside_rx) = mpsc::channel::<()>();

    let slow = {
        let permit = Arc::clone(&permit);
        let order = Arc::clone(&order);
        thread::spawn(move || {
            let mut held = permit.enter().unwrap();
            let rc = held.blocking(|| {
                inside_tx.send(()).unwrap();
                native_sleep(Duration::from_millis(200))
            });
            let seq = order.fetch_add(1, Ordering::SeqCst);
            (rc, seq)
        })
    };

    inside_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("slow task never entered its native call");

    let fast = {
        let permit = Arc::clone(&permit);
        let order = Arc::clone(&order);
        thread::spawn(move || {
            let started = Instant::now();
            let _held = permit.enter().unwrap();
            thread::sleep(Duration::from_millis(10));
            let seq = order.fetch_add(1, Ordering::SeqCst);
            (seq, started.elapsed())
        })
    };

    let (fast_seq, fast_elapsed) = fast.join().unwrap();
    let (slow_rc, slow_seq) = slow.join().unwrap();

    assert_eq!(slow_rc, 0, "nanosleep result must be forwarded");
    assert!(
        fast_seq < slow_seq,
        "fast task must finish before the blocked call returns (fast={fast_seq}, slow={slow_seq})"
    );
    assert!(
        fast_elapsed < Duration::from_millis(150),
        "fast task waited {fast_elapsed:?}, permit was not released"
    );
    assert!(permit.stats().is_balanced());
}

#[test]
fn releases_match_reacquires_for_every_outcome() {
    let permit = ExecutionPermit::local();
    let mut held = permit.enter().unwrap();

    let outcomes: [i32; 4] = [0, 17, -1, -11];
    for expected in outcomes {
        let before = permit.stats();
        let got = held.blocking(|| expected);
        let delta = permit.stats().since(&before);
        assert_eq!(got, expected);
        assert_eq!(delta.releases, 1);
        assert_eq!(delta.reacquires, 1);
    }

    let early = held.blocking(|| -> Result<i32, i32> {
        let rc = -1;
        if rc < 0 {
            return Err(11);
        }
        Ok(rc)
    });
    assert_eq!(early, Err(11));

    drop(held);
    let stats = permit.stats();
    assert_eq!(stats.blocking_calls, 5);
    assert_eq!(stats.releases, 5);
    assert!(stats.is_balanced());
}

#[test]
fn permit_is_never_held_twice() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 200;

    let permit = Arc::new(ExecutionPermit::local());
    let counter = Arc::new(Managed::new(&permit, 0_u64).unwrap());
    let occupied = Arc::new(AtomicBool::new(false));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let permit = Arc::clone(&permit);
            let counter = Arc::clone(&counter);
            let occupied = Arc::clone(&occupied);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ROUNDS {
                    let mut held = permit.enter().unwrap();
                    assert!(
                        !occupied.swap(true, Ordering::SeqCst),
                        "two threads inside the permit"
                    );
                    *counter.get_mut(&mut held).unwrap() += 1;
                    occupied.store(false, Ordering::SeqCst);
                    held.blocking(thread::yield_now);
                    assert!(!occupied.swap(true, Ordering::SeqCst));
                    occupied.store(false, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let held = permit.enter().unwrap();
    assert_eq!(*counter.get(&held).unwrap(), (THREADS * ROUNDS) as u64);
    drop(held);

    let stats = permit.stats();
    assert_eq!(stats.releases, (THREADS * ROUNDS) as u64);
    assert!(stats.is_balanced());
    assert!(stats.peak_in_flight >= 1);
}
