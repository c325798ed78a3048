//! The GSM Fire code (SACCH).
//!
//! Systematic block code with generator polynomial
//! (D²³ + 1)(D¹⁷ + D³ + 1) = D⁴⁰ + D²⁶ + D²³ + D¹⁷ + D³ + 1,
//! appending a 40-bit CRC to the 184-bit source word.

use a52crack_common::BinMatrix;
use tracing::warn;

/// Fire code input length in bits.
pub const FIRE_SOURCE_BITS: usize = 184;
/// Fire code output length in bits.
pub const FIRE_CODE_BITS: usize = 224;
/// Fire code CRC length in bits.
pub const FIRE_CRC_BITS: usize = FIRE_CODE_BITS - FIRE_SOURCE_BITS;

/// Bit-mirrored generator polynomial, constant term first.
const POLYNOMIAL_MIRRORED: [u8; 41] = [
    1, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
];

/// Builds the 184×224 generator matrix in standard (systematic) form.
pub fn generator_matrix() -> BinMatrix {
    let mut g = BinMatrix::new(FIRE_SOURCE_BITS, FIRE_CODE_BITS);
    for i in 0..FIRE_SOURCE_BITS {
        for (j, &p) in POLYNOMIAL_MIRRORED.iter().enumerate() {
            g.set(i, i + j, p);
        }
    }

    // The staircase of shifted polynomials already has an all-ones
    // diagonal; eliminate above it to reach [I | CRC].
    for col in 0..FIRE_SOURCE_BITS {
        for line in (0..col).rev() {
            if g.get(line, col) == 1 {
                g.xor_row(line, col);
            }
        }
    }
    g
}

/// Derives the 40×224 parity-check matrix from a systematic generator.
pub fn parity_check_matrix(g: &BinMatrix) -> BinMatrix {
    let mut h = BinMatrix::new(FIRE_CRC_BITS, FIRE_CODE_BITS);
    for i in 0..FIRE_CRC_BITS {
        for j in 0..FIRE_SOURCE_BITS {
            h.set(i, j, g.get(j, i + FIRE_SOURCE_BITS));
        }
        h.set(i, FIRE_SOURCE_BITS + i, 1);
    }
    h
}

/// Decodes a 224-bit Fire codeword back to its 184-bit source word.
///
/// The code is systematic, so decoding is truncation; the CRC syndrome is
/// still checked and a mismatch is logged, since a non-codeword input
/// means upstream corruption.
pub fn decode(input: &[u8]) -> Vec<u8> {
    assert_eq!(input.len(), FIRE_CODE_BITS);

    let g = generator_matrix();
    let h = parity_check_matrix(&g);
    if h.mul_vec(input).iter().any(|&b| b != 0) {
        warn!("Fire CRC check failed, decoding anyway");
    }
    input[..FIRE_SOURCE_BITS].to_vec()
}
