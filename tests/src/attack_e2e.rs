//! End-to-end attack scenarios.
//!
//! The full 2^16-entry dictionary takes long to build, so the fast tests
//! run the identical pipeline over a contiguous dictionary window that
//! contains the fixture's true hypothesis; the full-space run is kept as
//! an ignored test.

#![cfg(test)]

use rand::Rng;

use a52crack_attack::{recover_key, AttackOutcome, Dictionary};
use a52crack_code::{encoding_matrix, parity_check_matrix, ChannelCode};

use crate::fixtures::Fixture;

/// Builds an in-memory dictionary window of `len` entries containing the
/// fixture's true index, aligned so every tested worker count divides it.
fn window_around(index: u32, len: u32) -> Dictionary {
    let g = encoding_matrix();
    let h = parity_check_matrix(&g);
    let lo = index - index % len;
    Dictionary::build_range(lo..lo + len, &h)
}

#[test]
fn test_end_to_end_key_recovery() {
    crate::init_test_logging();
    let code = ChannelCode::new();
    let mut rng = rand::thread_rng();
    let fixture = Fixture::random(&code, &mut rng);
    let dictionary = window_around(fixture.index, 16);

    let outcome = recover_key(&fixture.bundle, &dictionary, 4).expect("attack run");
    assert_eq!(
        outcome,
        AttackOutcome::KeyFound {
            index: fixture.index,
            key: fixture.key,
        }
    );
}

#[test]
fn test_partition_independence() {
    // Splitting the scan across 1, 2, 4 or 8 workers must not change the
    // recovered key.
    let code = ChannelCode::new();
    let mut rng = rand::thread_rng();
    let fixture = Fixture::random(&code, &mut rng);
    let dictionary = window_around(fixture.index, 16);

    for workers in [1, 2, 4, 8] {
        let outcome = recover_key(&fixture.bundle, &dictionary, workers)
            .unwrap_or_else(|e| panic!("attack run with {workers} workers: {e}"));
        assert_eq!(
            outcome,
            AttackOutcome::KeyFound {
                index: fixture.index,
                key: fixture.key,
            },
            "worker count {workers}"
        );
    }
}

#[test]
fn test_uneven_worker_count_is_rejected() {
    let code = ChannelCode::new();
    let mut rng = rand::thread_rng();
    let fixture = Fixture::random(&code, &mut rng);
    let dictionary = window_around(fixture.index, 16);

    assert!(recover_key(&fixture.bundle, &dictionary, 3).is_err());
    assert!(recover_key(&fixture.bundle, &dictionary, 0).is_err());
}

#[test]
fn test_mixed_key_bundle_exhausts() {
    // Bursts encrypted under different keys have no common solution; the
    // attack must report exhaustion, never a fabricated key.
    let code = ChannelCode::new();
    let mut rng = rand::thread_rng();
    let a = Fixture::random(&code, &mut rng);
    let b = Fixture::random(&code, &mut rng);

    let mut bursts = a.bundle.bursts().clone();
    bursts[2] = b.bundle.bursts()[2].clone();
    let mixed = a52crack_attack::CipherTextBundle::new(bursts, a.bundle.frame_id())
        .expect("mixed bundle");

    let dictionary = window_around(a.index, 16);
    let outcome = recover_key(&mixed, &dictionary, 4).expect("attack run");
    assert_eq!(outcome, AttackOutcome::Exhausted);
}

#[test]
fn test_window_without_true_index_exhausts() {
    // Scanning a window that misses the true hypothesis must reject every
    // entry rather than produce some other key.
    let code = ChannelCode::new();
    let mut rng = rand::thread_rng();
    let fixture = Fixture::random(&code, &mut rng);

    let g = encoding_matrix();
    let h = parity_check_matrix(&g);
    let lo = if fixture.index >= 16 { fixture.index - 16 } else { fixture.index + 16 };
    let lo = lo - lo % 8;
    let range = lo..lo + 8;
    assert!(!range.contains(&fixture.index));
    let dictionary = Dictionary::build_range(range, &h);

    let outcome = recover_key(&fixture.bundle, &dictionary, 2).expect("attack run");
    assert_eq!(outcome, AttackOutcome::Exhausted);
}

#[test]
#[ignore = "builds the full 2^16-entry dictionary; takes a long time"]
fn test_full_space_key_recovery() {
    crate::init_test_logging();
    let code = ChannelCode::new();
    let mut rng = rand::thread_rng();
    let fixture = Fixture::random(&code, &mut rng);

    let path = std::env::temp_dir().join(format!(
        "a52crack-full-dict-{}.bin",
        std::process::id()
    ));
    a52crack_attack::build_to_file(&path, 4).expect("dictionary build");
    let dictionary = Dictionary::load(&path).expect("dictionary load");
    std::fs::remove_file(&path).ok();

    let outcome = recover_key(&fixture.bundle, &dictionary, 4).expect("attack run");
    assert_eq!(
        outcome,
        AttackOutcome::KeyFound {
            index: fixture.index,
            key: fixture.key,
        }
    );
}
