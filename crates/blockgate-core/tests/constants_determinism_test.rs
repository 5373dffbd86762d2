//! Integration test: constant lookups are pure and deterministic.
//!
//! Run: cargo test -p blockgate-core --test constants_determinism_test

use std::collections::BTreeMap;
use std::thread;

use blockgate_core::{CONSTANTS, lookup};

fn snapshot() -> BTreeMap<&'static str, Option<i32>> {
    CONSTANTS.iter().map(|c| (c.name, lookup(c.name))).collect()
}

#[test]
fn repeated_lookups_agree() {
    let first = snapshot();
    let second = snapshot();
    assert_eq!(first, second);
    for c in CONSTANTS {
        assert_eq!(first[c.name], Some(c.value));
    }
}

#[test]
fn lookups_agree_across_threads_in_any_order() {
    let reference = snapshot();
    let handles: Vec<_> = (0..8)
        .map(|shift| {
            thread::spawn(move || {
                let mut out = BTreeMap::new();
                let n = CONSTANTS.len();
                for i in 0..n {
                    let c = &CONSTANTS[(i * 7 + shift) % n];
                    out.insert(c.name, lookup(c.name));
                }
                out
            })
        })
        .collect();

    for h in handles {
        let got = h.join().unwrap();
        assert_eq!(got.len(), reference.len());
        assert_eq!(got, reference);
    }
}
