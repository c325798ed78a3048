//! A5/2 register geometry.
//!
//! Tap positions index register cells with 0 as the entry cell (the cell
//! fed by the feedback); a register shifts from cell 0 toward its top
//! cell, and the top cell feeds the output combiner.

/// Width of LFSR R1 in bits.
pub const R1_BITS: usize = 19;
/// Width of LFSR R2 in bits.
pub const R2_BITS: usize = 22;
/// Width of LFSR R3 in bits.
pub const R3_BITS: usize = 23;
/// Width of LFSR R4 (the clocking register) in bits.
pub const R4_BITS: usize = 17;
/// Total register state width.
pub const REGS_BITS: usize = R1_BITS + R2_BITS + R3_BITS + R4_BITS;

/// Secret key length in bits.
pub const SECRET_KEY_BITS: usize = 64;
/// Frame id length in bits.
pub const FRAME_ID_BITS: usize = 22;

/// Rounds of discarded output between key setup and the first keystream bit.
pub const DIFFUSION_ROUNDS: usize = 100;

/// Feedback taps of R1.
pub const R1_FEEDBACK_TAPS: [usize; 4] = [13, 16, 17, 18];
/// Feedback taps of R2.
pub const R2_FEEDBACK_TAPS: [usize; 2] = [20, 21];
/// Feedback taps of R3.
pub const R3_FEEDBACK_TAPS: [usize; 4] = [7, 20, 21, 22];
/// Feedback taps of R4.
pub const R4_FEEDBACK_TAPS: [usize; 2] = [11, 16];

/// R4 cell controlling the clocking of R1.
pub const R4_CLOCK_TAP_R1: usize = 10;
/// R4 cell controlling the clocking of R2.
pub const R4_CLOCK_TAP_R2: usize = 3;
/// R4 cell controlling the clocking of R3.
pub const R4_CLOCK_TAP_R3: usize = 7;

/// Output majority taps of R1 as (cell, complement) pairs.
pub const R1_OUT_TAPS: [(usize, u8); 3] = [(12, 0), (14, 1), (15, 0)];
/// Output majority taps of R2 as (cell, complement) pairs.
pub const R2_OUT_TAPS: [(usize, u8); 3] = [(9, 0), (13, 0), (16, 1)];
/// Output majority taps of R3 as (cell, complement) pairs.
pub const R3_OUT_TAPS: [(usize, u8); 3] = [(13, 1), (16, 0), (18, 0)];

/// Cell of R1 forced to 1 at the end of key loading.
pub const R1_CONST_POS: usize = 15;
/// Cell of R2 forced to 1 at the end of key loading.
pub const R2_CONST_POS: usize = 16;
/// Cell of R3 forced to 1 at the end of key loading.
pub const R3_CONST_POS: usize = 18;
/// Cell of R4 forced to 1 at the end of key loading.
pub const R4_CONST_POS: usize = 10;
