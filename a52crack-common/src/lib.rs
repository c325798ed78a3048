//! Common types and utilities for a52crack
//!
//! This crate provides the shared foundation used across all a52crack
//! crates: the workspace error type, logging setup, bit-level packing
//! helpers, the GF(2) matrix type, and tool configuration.

pub mod bits;
pub mod config;
pub mod error;
pub mod gf2;
pub mod logging;

pub use bits::{bits_to_bytes, bytes_to_bits, format_bits, get_bit, parse_bit_string, set_bit, xor_in_place};
pub use config::ToolConfig;
pub use error::Error;
pub use gf2::BinMatrix;
pub use logging::{init_logging, LogLevel};
