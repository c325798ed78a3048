//! The attack itself.
//!
//! For each R4 hypothesis the precomputed resolution matrix equates the
//! unknown variable space with the syndrome of the three ciphertext
//! bursts: wrong hypotheses make the system unsolvable or inconsistent,
//! the right one yields the pre-diffusion register state and, through
//! key-setup reversal, the session key.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, trace};

use a52crack_cipher::consts::{FRAME_ID_BITS, SECRET_KEY_BITS};
use a52crack_code::{ChannelCode, CODEWORD_BITS};
use a52crack_common::bits::{get_bit, xor_in_place};
use a52crack_common::Error;

use crate::dictionary::{
    partition, r4_from_index, Dictionary, ResolutionMatrix, NEEDED_BURSTS, ROW_BYTES, SYSTEM_ROWS,
};
use crate::reverse::reverse_key_setup;
use crate::vars::{double_vars_consistent, expand_registers, CONST_SLOT};

/// Rows left without a pivot once every variable column is eliminated;
/// their right-hand sides must vanish for a hypothesis to be consistent.
const REDUNDANT_ROWS: usize = SYSTEM_ROWS - CONST_SLOT;

/// Three ciphertext codewords encrypted under one session key, plus the
/// public frame id of the first.
#[derive(Debug, Clone)]
pub struct CipherTextBundle {
    bursts: [Vec<u8>; NEEDED_BURSTS],
    frame_id: [u8; FRAME_ID_BITS],
}

impl CipherTextBundle {
    /// Validates and wraps the attack input.
    pub fn new(bursts: [Vec<u8>; NEEDED_BURSTS], frame_id: &[u8]) -> Result<Self, Error> {
        for (i, burst) in bursts.iter().enumerate() {
            if burst.len() != CODEWORD_BITS {
                return Err(Error::InvalidInput(format!(
                    "ciphertext burst {i} must be {CODEWORD_BITS} bits, got {}",
                    burst.len()
                )));
            }
        }
        let frame_id: [u8; FRAME_ID_BITS] = frame_id.try_into().map_err(|_| {
            Error::InvalidInput(format!(
                "frame id must be {FRAME_ID_BITS} bits, got {}",
                frame_id.len()
            ))
        })?;
        Ok(Self { bursts, frame_id })
    }

    /// The three ciphertext bursts.
    pub fn bursts(&self) -> &[Vec<u8>; NEEDED_BURSTS] {
        &self.bursts
    }

    /// The public frame id.
    pub fn frame_id(&self) -> &[u8; FRAME_ID_BITS] {
        &self.frame_id
    }
}

/// Result of an attack run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackOutcome {
    /// The key was recovered; `index` is the winning R4 hypothesis.
    KeyFound {
        /// Winning hypothesis index.
        index: u32,
        /// The recovered 64-bit session key.
        key: [u8; SECRET_KEY_BITS],
    },
    /// Every hypothesis in the dictionary was rejected.
    Exhausted,
}

/// Runs the attack over all hypotheses covered by the dictionary.
///
/// The index range is split into equal contiguous partitions, one per
/// worker. Workers share the dictionary read-only and a single
/// cancellation flag: the first worker to verify a hypothesis wins the
/// flag and publishes its key, the others stop at the next hypothesis
/// boundary.
pub fn recover_key(
    bundle: &CipherTextBundle,
    dictionary: &Dictionary,
    workers: usize,
) -> Result<AttackOutcome, Error> {
    let ranges = partition(dictionary.len(), workers)?;

    let code = ChannelCode::new();
    let mut syndrome = Vec::with_capacity(SYSTEM_ROWS);
    for burst in bundle.bursts() {
        syndrome.extend(code.syndrome(burst)?);
    }

    info!(
        workers,
        hypotheses = dictionary.len(),
        "starting attack scan"
    );
    let found = AtomicBool::new(false);

    let winner = std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for range in ranges {
            let lo = dictionary.first_index() + range.start;
            let hi = dictionary.first_index() + range.end;
            let syndrome = &syndrome;
            let found = &found;
            handles.push(
                scope.spawn(move || scan_range(dictionary, lo..hi, syndrome, bundle.frame_id(), found)),
            );
        }
        handles
            .into_iter()
            .filter_map(|h| h.join().expect("attack worker panicked"))
            .next()
    });

    Ok(match winner {
        Some((index, key)) => AttackOutcome::KeyFound { index, key },
        None => AttackOutcome::Exhausted,
    })
}

/// Scans one worker's partition of the hypothesis space.
fn scan_range(
    dictionary: &Dictionary,
    range: std::ops::Range<u32>,
    syndrome: &[u8],
    frame_id: &[u8; FRAME_ID_BITS],
    found: &AtomicBool,
) -> Option<(u32, [u8; SECRET_KEY_BITS])> {
    debug!("worker scanning hypotheses {}..{}", range.start, range.end);
    for index in range {
        if found.load(Ordering::SeqCst) {
            return None;
        }

        let Some(assignment) = solve_hypothesis(dictionary.get(index), syndrome) else {
            continue;
        };
        if !double_vars_consistent(&assignment) {
            trace!(index, "rejected: product variables inconsistent");
            continue;
        }
        let (r1, r2, r3) = expand_registers(&assignment);
        let r4 = r4_from_index(index);
        let Some(key) = reverse_key_setup(&r1, &r2, &r3, &r4, frame_id) else {
            trace!(index, "rejected: state not reachable from any key");
            continue;
        };

        // Elect exactly one winner; a concurrent verification on another
        // worker keeps its result only if it set the flag first.
        if found
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!(index, "hypothesis verified, key recovered");
            return Some((index, key));
        }
        return None;
    }
    None
}

/// Solves the linear system of one hypothesis.
///
/// Returns the 655-bit extended variable assignment, or `None` when the
/// hypothesis is rejected: either the equations are not independent
/// enough to pivot every variable column, or a redundant equation
/// reduces to 0 = 1.
fn solve_hypothesis(matrix: &ResolutionMatrix, syndrome: &[u8]) -> Option<Vec<u8>> {
    // Working copy of the packed rows; the right-hand side folds the
    // matrix's constant column into the ciphertext syndrome.
    let mut rows: Vec<[u8; ROW_BYTES]> = (0..SYSTEM_ROWS)
        .map(|r| matrix.row(r).try_into().expect("row width"))
        .collect();
    let mut rhs: Vec<u8> = (0..SYSTEM_ROWS)
        .map(|r| syndrome[r] ^ matrix.row_bit(r, CONST_SLOT))
        .collect();

    // Eliminate from the highest variable column down, packing pivots
    // toward the bottom of the matrix: pivot rows keep only lower
    // columns, so the surviving system is lower triangular.
    let mut pivot_row = SYSTEM_ROWS - 1;
    for col in (0..CONST_SLOT).rev() {
        let pivot = (0..=pivot_row).rev().find(|&r| get_bit(&rows[r], col) == 1)?;
        rows.swap(pivot, pivot_row);
        rhs.swap(pivot, pivot_row);
        let pivot_rhs = rhs[pivot_row];
        for r in 0..pivot_row {
            if get_bit(&rows[r], col) == 1 {
                let (head, tail) = rows.split_at_mut(pivot_row);
                xor_in_place(&mut head[r], &tail[0]);
                rhs[r] ^= pivot_rhs;
            }
        }
        pivot_row -= 1;
    }

    // The redundant rows carry no variables any more; a nonzero
    // right-hand side there is a 0 = 1 contradiction.
    debug_assert_eq!(pivot_row + 1, REDUNDANT_ROWS);
    if rhs[..REDUNDANT_ROWS].iter().any(|&b| b != 0) {
        return None;
    }

    // Forward substitution on the lower-triangular remainder: row
    // REDUNDANT_ROWS + v holds the pivot of variable v.
    let mut assignment = vec![0u8; CONST_SLOT];
    for i in REDUNDANT_ROWS..SYSTEM_ROWS {
        let var = i - REDUNDANT_ROWS;
        assignment[var] = rhs[i];
        if assignment[var] == 1 {
            for l in i + 1..SYSTEM_ROWS {
                rhs[l] ^= get_bit(&rows[l], var);
            }
        }
    }
    Some(assignment)
}
