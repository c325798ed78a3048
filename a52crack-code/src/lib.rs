//! GSM SACCH channel code for a52crack
//!
//! The full code maps a 184-bit source word through the Fire code (CRC),
//! the rate-1/2 convolutional code and the inter-burst interleaving to a
//! 456-bit codeword. The attack consumes the code only through its
//! generator matrix G (184×456), its parity-check matrix H (272×456) and
//! the syndrome map.

pub mod convolution;
pub mod fire;
pub mod interleaving;

use a52crack_common::{BinMatrix, Error};

pub use fire::{FIRE_CODE_BITS, FIRE_SOURCE_BITS};

/// Length of a source word in bits.
pub const SOURCEWORD_BITS: usize = 184;
/// Length of a codeword in bits.
pub const CODEWORD_BITS: usize = 456;
/// Length of a syndrome in bits.
pub const SYNDROME_BITS: usize = CODEWORD_BITS - SOURCEWORD_BITS;

/// Builds the full 184×456 encoding matrix G = Fire ∘ convolution ∘ interleaving.
pub fn encoding_matrix() -> BinMatrix {
    let fire_g = fire::generator_matrix();
    let conv_g = convolution::generator_matrix();
    let interleave_g = interleaving::permutation_matrix();

    // The convolution input is the Fire codeword followed by four zero
    // tail bits, so the Fire generator embeds into the first 224 of the
    // 228 convolution input columns.
    let mut padded = BinMatrix::new(SOURCEWORD_BITS, convolution::CONV_SOURCE_BITS);
    for r in 0..SOURCEWORD_BITS {
        for c in 0..FIRE_CODE_BITS {
            padded.set(r, c, fire_g.get(r, c));
        }
    }
    padded.mul(&conv_g).mul(&interleave_g)
}

/// Derives the 272×456 parity-check matrix of G.
///
/// G is not systematic, so it is first brought to systematic form with
/// column permutations tracked in P; the parity part then yields H in the
/// permuted coordinates, and multiplying by P⁻¹ = Pᵀ maps it back.
pub fn parity_check_matrix(g: &BinMatrix) -> BinMatrix {
    let mut work = g.clone();
    let mut perm = BinMatrix::identity(CODEWORD_BITS);

    for line in 0..SOURCEWORD_BITS {
        for col in line..CODEWORD_BITS {
            if work.get(line, col) == 1 {
                work.swap_cols(line, col);
                perm.swap_cols(line, col);
                for l in line + 1..SOURCEWORD_BITS {
                    if work.get(l, line) == 1 {
                        work.xor_row(l, line);
                    }
                }
                break;
            }
        }
    }
    // Back-elimination to reduced form [I | A].
    for line in 0..SOURCEWORD_BITS {
        for col in line + 1..SOURCEWORD_BITS {
            if work.get(line, col) == 1 {
                work.xor_row(line, col);
            }
        }
    }

    let mut h = BinMatrix::new(SYNDROME_BITS, CODEWORD_BITS);
    for i in 0..SYNDROME_BITS {
        for j in 0..SOURCEWORD_BITS {
            h.set(i, j, work.get(j, i + SOURCEWORD_BITS));
        }
        h.set(i, SOURCEWORD_BITS + i, 1);
    }
    h.mul(&perm.transpose())
}

/// The assembled channel code with its precomputed matrices.
pub struct ChannelCode {
    g: BinMatrix,
    h: BinMatrix,
}

impl ChannelCode {
    /// Builds the code matrices.
    pub fn new() -> Self {
        let g = encoding_matrix();
        let h = parity_check_matrix(&g);
        Self { g, h }
    }

    /// The 184×456 generator matrix.
    pub fn generator(&self) -> &BinMatrix {
        &self.g
    }

    /// The 272×456 parity-check matrix.
    pub fn parity_check(&self) -> &BinMatrix {
        &self.h
    }

    /// Encodes a 184-bit source word into a 456-bit codeword.
    pub fn encode(&self, sourceword: &[u8]) -> Result<Vec<u8>, Error> {
        if sourceword.len() != SOURCEWORD_BITS {
            return Err(Error::InvalidInput(format!(
                "source word must be {SOURCEWORD_BITS} bits, got {}",
                sourceword.len()
            )));
        }
        Ok(self.g.vec_mul(sourceword))
    }

    /// Computes the 272-bit syndrome of a 456-bit word.
    ///
    /// The syndrome is zero exactly for valid codewords.
    pub fn syndrome(&self, word: &[u8]) -> Result<Vec<u8>, Error> {
        if word.len() != CODEWORD_BITS {
            return Err(Error::InvalidInput(format!(
                "codeword must be {CODEWORD_BITS} bits, got {}",
                word.len()
            )));
        }
        Ok(self.h.mul_vec(word))
    }

    /// Decodes a 456-bit codeword back to its 184-bit source word.
    pub fn decode(&self, codeword: &[u8]) -> Result<Vec<u8>, Error> {
        if codeword.len() != CODEWORD_BITS {
            return Err(Error::InvalidInput(format!(
                "codeword must be {CODEWORD_BITS} bits, got {}",
                codeword.len()
            )));
        }
        let deinterleaved = interleaving::deinterleave(codeword);
        let deconvoluted = convolution::decode(&deinterleaved);
        // Drop the four zero tail bits appended before convolution.
        Ok(fire::decode(&deconvoluted[..FIRE_CODE_BITS]))
    }
}

impl Default for ChannelCode {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn random_sourceword(rng: &mut impl Rng) -> Vec<u8> {
        (0..SOURCEWORD_BITS).map(|_| rng.gen_range(0..=1u8)).collect()
    }

    #[test]
    fn test_matrix_dimensions() {
        let code = ChannelCode::new();
        assert_eq!(code.generator().rows(), SOURCEWORD_BITS);
        assert_eq!(code.generator().cols(), CODEWORD_BITS);
        assert_eq!(code.parity_check().rows(), SYNDROME_BITS);
        assert_eq!(code.parity_check().cols(), CODEWORD_BITS);
    }

    #[test]
    fn test_parity_check_annihilates_generator() {
        let code = ChannelCode::new();
        for r in 0..SOURCEWORD_BITS {
            let syndrome = code.h.mul_vec(code.g.row(r));
            assert!(syndrome.iter().all(|&b| b == 0), "generator row {r} has nonzero syndrome");
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let code = ChannelCode::new();
        let mut rng = rand::thread_rng();
        for _ in 0..4 {
            let source = random_sourceword(&mut rng);
            let codeword = code.encode(&source).unwrap();
            assert_eq!(code.decode(&codeword).unwrap(), source);
        }
    }

    #[test]
    fn test_codeword_syndrome_is_zero() {
        let code = ChannelCode::new();
        let mut rng = rand::thread_rng();
        let source = random_sourceword(&mut rng);
        let mut codeword = code.encode(&source).unwrap();
        assert!(code.syndrome(&codeword).unwrap().iter().all(|&b| b == 0));

        // A single flipped bit must be visible in the syndrome.
        codeword[123] ^= 1;
        assert!(code.syndrome(&codeword).unwrap().iter().any(|&b| b != 0));
    }

    #[test]
    fn test_rejects_wrong_lengths() {
        let code = ChannelCode::new();
        assert!(code.encode(&[0u8; 100]).is_err());
        assert!(code.decode(&[0u8; 100]).is_err());
        assert!(code.syndrome(&[0u8; 100]).is_err());
    }
}
