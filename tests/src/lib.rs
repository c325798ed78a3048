//! Integration test framework for a52crack
//!
//! Cross-crate scenarios for the A5/2 key recovery pipeline: encryption
//! fixtures, end-to-end attacks over dictionary windows, partition
//! independence, and dictionary store properties.

use std::sync::Once;

pub mod fixtures;

mod attack_e2e;
mod dictionary_store;

pub use fixtures::{encrypt_bundle, random_frame_id, random_key, true_hypothesis_index, Fixture};

static INIT_LOGGING: Once = Once::new();

/// Initializes logging for test output; safe to call from every test.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        a52crack_common::init_logging(a52crack_common::LogLevel::Debug);
    });
}
