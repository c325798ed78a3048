//! The GSM rate-1/2 convolutional code.
//!
//! Polynomials G0 = 1 + D³ + D⁴ and G1 = 1 + D + D³ + D⁴:
//! c(2k) = u(k) ⊕ u(k−3) ⊕ u(k−4) and c(2k+1) = u(k) ⊕ u(k−1) ⊕ u(k−3) ⊕ u(k−4).

use a52crack_common::BinMatrix;

/// Convolution input length in bits (Fire codeword plus four zero tail bits).
pub const CONV_SOURCE_BITS: usize = 228;
/// Convolution output length in bits.
pub const CONV_CODE_BITS: usize = CONV_SOURCE_BITS * 2;

/// Coefficients of u(k) in c(2k)..c(2k+9), the window it influences.
const PATTERN: [u8; 10] = [1, 1, 0, 1, 0, 0, 1, 1, 1, 1];

/// Builds the 228×456 generator matrix.
pub fn generator_matrix() -> BinMatrix {
    let mut g = BinMatrix::new(CONV_SOURCE_BITS, CONV_CODE_BITS);
    for i in 0..CONV_SOURCE_BITS {
        let len = if i < CONV_SOURCE_BITS - 4 {
            PATTERN.len()
        } else {
            CONV_CODE_BITS - 2 * i
        };
        for (j, &p) in PATTERN[..len].iter().enumerate() {
            g.set(i, 2 * i + j, p);
        }
    }
    g
}

/// Decodes a valid 456-bit codeword back to its 228-bit input.
///
/// XOR-ing the two halves of an output pair cancels everything but the
/// previous input bit: u(k−1) = c(2k) ⊕ c(2k+1). The final input bit is
/// recovered from the even-bit relation instead.
pub fn decode(input: &[u8]) -> Vec<u8> {
    assert_eq!(input.len(), CONV_CODE_BITS);

    let mut out = vec![0u8; CONV_SOURCE_BITS];
    for k in 1..CONV_SOURCE_BITS {
        out[k - 1] = input[2 * k] ^ input[2 * k + 1];
    }
    let last = CONV_SOURCE_BITS - 1;
    out[last] = input[2 * last] ^ out[last - 3] ^ out[last - 4];
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let g = generator_matrix();
        let source: Vec<u8> = (0..CONV_SOURCE_BITS).map(|i| ((i * 13) % 5 < 2) as u8).collect();
        let codeword = g.vec_mul(&source);
        assert_eq!(decode(&codeword), source);
    }

    #[test]
    fn test_generator_encodes_shift_relation() {
        // A single one at input position k must appear in exactly the
        // window c(2k)..c(2k+9) with the polynomial pattern.
        let g = generator_matrix();
        let mut source = vec![0u8; CONV_SOURCE_BITS];
        source[10] = 1;
        let codeword = g.vec_mul(&source);
        for (c, &bit) in codeword.iter().enumerate() {
            let expected = (20..30).contains(&c) && PATTERN[c - 20] == 1;
            assert_eq!(bit == 1, expected, "codeword bit {c}");
        }
    }
}
