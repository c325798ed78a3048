//! Key-setup reversal.
//!
//! Key loading ignores the clocking unit, so every register cell after
//! loading is an affine function of the 64 key bits and the public frame
//! id. Replaying the loading symbolically and equating the result with a
//! recovered register state gives 81 affine equations over the 64 key
//! bits; solving them yields the key, and an unsolvable system proves the
//! candidate state is not reachable from any key.

use a52crack_cipher::consts::*;
use a52crack_common::bits::xor_in_place;

use crate::equations::SymbolicRegister;

/// Affine vector width: the key unknowns plus one constant slot (last).
const AFFINE_WIDTH: usize = SECRET_KEY_BITS + 1;
/// Equations available: one per register cell.
const SYSTEM_ROWS: usize = REGS_BITS;

/// Recovers the secret key from a candidate pre-diffusion register state
/// and the public frame id.
///
/// Returns `None` when the candidate state is not produced by any key
/// (the system is not of full rank); this is the expected outcome for
/// wrong register-state hypotheses and must not abort the caller's scan.
pub fn reverse_key_setup(
    r1: &[u8; R1_BITS],
    r2: &[u8; R2_BITS],
    r3: &[u8; R3_BITS],
    r4: &[u8; R4_BITS],
    frame_id: &[u8; FRAME_ID_BITS],
) -> Option<[u8; SECRET_KEY_BITS]> {
    let mut regs = [
        SymbolicRegister::new(R1_BITS, AFFINE_WIDTH, &R1_FEEDBACK_TAPS),
        SymbolicRegister::new(R2_BITS, AFFINE_WIDTH, &R2_FEEDBACK_TAPS),
        SymbolicRegister::new(R3_BITS, AFFINE_WIDTH, &R3_FEEDBACK_TAPS),
        SymbolicRegister::new(R4_BITS, AFFINE_WIDTH, &R4_FEEDBACK_TAPS),
    ];

    // Mirror key loading: clocking is forced throughout, each key bit
    // enters every register as its own unknown, each frame bit as a
    // known constant.
    for i in 0..SECRET_KEY_BITS {
        for reg in &mut regs {
            reg.clock();
            reg.cells[0][i] ^= 1;
        }
    }
    for &bit in frame_id {
        for reg in &mut regs {
            reg.clock();
            reg.cells[0][SECRET_KEY_BITS] ^= bit;
        }
    }

    // The forced cells are the constant 1 regardless of the key.
    for (reg, pos) in regs
        .iter_mut()
        .zip([R1_CONST_POS, R2_CONST_POS, R3_CONST_POS, R4_CONST_POS])
    {
        reg.cells[pos].fill(0);
        reg.cells[pos][SECRET_KEY_BITS] = 1;
    }

    // One equation per register cell: coefficients over the key bits,
    // right-hand side the recovered cell value with the affine constant
    // folded in.
    let state = r1
        .iter()
        .chain(r2.iter())
        .chain(r3.iter())
        .chain(r4.iter());
    let mut rows: Vec<[u8; SECRET_KEY_BITS]> = Vec::with_capacity(SYSTEM_ROWS);
    let mut rhs = Vec::with_capacity(SYSTEM_ROWS);
    for (cell, &value) in regs.iter().flat_map(|reg| reg.cells.iter()).zip(state) {
        let mut row = [0u8; SECRET_KEY_BITS];
        row.copy_from_slice(&cell[..SECRET_KEY_BITS]);
        rows.push(row);
        rhs.push(value ^ cell[SECRET_KEY_BITS]);
    }

    // Top-down Gaussian elimination over the overdetermined system.
    for col in 0..SECRET_KEY_BITS {
        let pivot = (col..SYSTEM_ROWS).find(|&r| rows[r][col] == 1)?;
        rows.swap(col, pivot);
        rhs.swap(col, pivot);
        let pivot_rhs = rhs[col];
        for r in col + 1..SYSTEM_ROWS {
            if rows[r][col] == 1 {
                let (head, tail) = rows.split_at_mut(col + 1);
                xor_in_place(&mut tail[r - col - 1], &head[col]);
                rhs[r] ^= pivot_rhs;
            }
        }
    }

    // Back-substitution on the triangular top of the system.
    let mut key = [0u8; SECRET_KEY_BITS];
    for line in (0..SECRET_KEY_BITS).rev() {
        key[line] = rhs[line];
        if key[line] == 1 {
            for l in 0..line {
                rhs[l] ^= rows[l][line];
            }
        }
    }
    Some(key)
}
