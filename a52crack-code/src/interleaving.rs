//! GSM inter-burst interleaving.
//!
//! The 456 coded bits are spread over eight half-bursts of 57 bits; the
//! permutation here is the composition of that spreading with the burst
//! read-out order, expressed as a 456×456 permutation matrix.

use a52crack_common::BinMatrix;

/// Interleaver block length in bits.
pub const INTERLEAVE_BITS: usize = 456;

/// Burst layout table: `table[b][p]` is the pre-interleaving index of the
/// bit at position `p` of half-burst pair `b`.
fn burst_table() -> [[usize; 114]; 8] {
    let mut table = [[0usize; 114]; 8];
    for k in 0..INTERLEAVE_BITS {
        table[k % 8][2 * ((49 * k) % 57) + (k % 8) / 4] = k;
    }
    table
}

/// Builds the interleaving permutation matrix.
pub fn permutation_matrix() -> BinMatrix {
    let table = burst_table();
    let mut g = BinMatrix::new(INTERLEAVE_BITS, INTERLEAVE_BITS);
    let mut i = 0;
    for k in 0..4 {
        for j in 0..57 {
            g.set(table[k][2 * j], i, 1);
            i += 1;
            g.set(table[k + 4][2 * j + 1], i, 1);
            i += 1;
        }
    }
    g
}

/// Undoes the interleaving of a 456-bit block.
pub fn deinterleave(input: &[u8]) -> Vec<u8> {
    assert_eq!(input.len(), INTERLEAVE_BITS);

    let table = burst_table();
    let mut out = vec![0u8; INTERLEAVE_BITS];
    let mut i = 0;
    for k in 0..4 {
        for j in 0..57 {
            out[table[k][2 * j]] = input[i];
            i += 1;
            out[table[k + 4][2 * j + 1]] = input[i];
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_is_a_permutation() {
        let g = permutation_matrix();
        for r in 0..INTERLEAVE_BITS {
            assert_eq!(g.row(r).iter().filter(|&&b| b == 1).count(), 1, "row {r}");
        }
        let t = g.transpose();
        for c in 0..INTERLEAVE_BITS {
            assert_eq!(t.row(c).iter().filter(|&&b| b == 1).count(), 1, "column {c}");
        }
    }

    #[test]
    fn test_deinterleave_inverts_matrix() {
        let g = permutation_matrix();
        let source: Vec<u8> = (0..INTERLEAVE_BITS).map(|i| ((i * 17) % 11 < 5) as u8).collect();
        let interleaved = g.vec_mul(&source);
        assert_eq!(deinterleave(&interleaved), source);
    }
}
