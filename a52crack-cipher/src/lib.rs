//! A5/2 stream cipher implementation
//!
//! A5/2 is the export-weakened GSM over-the-air encryption algorithm.
//! Four LFSRs R1..R4 are mutually clocked: R4 alone drives the stop/go
//! clocking of R1..R3 through a majority rule, and the output bit combines
//! the top bits of R1..R3 with one majority term per register.
//!
//! The generator here is a caller-owned state object; fixtures, self-tests
//! and the symbolic attack machinery each construct their own instance.

pub mod consts;

mod a52;

pub use a52::{majority, RegisterState, A52};
