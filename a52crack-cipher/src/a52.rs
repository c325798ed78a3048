//! The A5/2 keystream generator.

use crate::consts::*;

/// Majority vote of three bits.
#[inline]
pub fn majority(a: u8, b: u8, c: u8) -> u8 {
    ((a & b) | (a & c) | (b & c)) & 1
}

/// Concrete contents of the four LFSRs, one byte per bit.
///
/// Index 0 of each array is the entry cell (the cell fed by the register's
/// feedback); the highest index is the output cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterState {
    /// R1 contents (19 bits).
    pub r1: [u8; R1_BITS],
    /// R2 contents (22 bits).
    pub r2: [u8; R2_BITS],
    /// R3 contents (23 bits).
    pub r3: [u8; R3_BITS],
    /// R4 contents (17 bits).
    pub r4: [u8; R4_BITS],
}

/// A5/2 cipher state.
#[derive(Debug, Clone)]
pub struct A52 {
    r1: [u8; R1_BITS],
    r2: [u8; R2_BITS],
    r3: [u8; R3_BITS],
    r4: [u8; R4_BITS],
}

fn clock_register(reg: &mut [u8], taps: &[usize]) {
    let mut carry = 0u8;
    for &t in taps {
        carry ^= reg[t];
    }
    for i in (1..reg.len()).rev() {
        reg[i] = reg[i - 1];
    }
    reg[0] = carry;
}

impl A52 {
    /// Creates a generator with all registers zeroed.
    pub fn new() -> Self {
        Self {
            r1: [0; R1_BITS],
            r2: [0; R2_BITS],
            r3: [0; R3_BITS],
            r4: [0; R4_BITS],
        }
    }

    /// Creates a generator from an explicit register state.
    pub fn from_registers(state: &RegisterState) -> Self {
        Self {
            r1: state.r1,
            r2: state.r2,
            r3: state.r3,
            r4: state.r4,
        }
    }

    /// Returns a copy of the current register contents.
    pub fn registers(&self) -> RegisterState {
        RegisterState {
            r1: self.r1,
            r2: self.r2,
            r3: self.r3,
            r4: self.r4,
        }
    }

    /// One round of the clocking unit.
    ///
    /// When `force` is set the majority decision is bypassed and every
    /// register shifts (key loading ignores the clocking unit).
    fn clock(&mut self, force: bool) {
        let maj = majority(
            self.r4[R4_CLOCK_TAP_R1],
            self.r4[R4_CLOCK_TAP_R2],
            self.r4[R4_CLOCK_TAP_R3],
        );
        if force || maj == self.r4[R4_CLOCK_TAP_R1] {
            clock_register(&mut self.r1, &R1_FEEDBACK_TAPS);
        }
        if force || maj == self.r4[R4_CLOCK_TAP_R2] {
            clock_register(&mut self.r2, &R2_FEEDBACK_TAPS);
        }
        if force || maj == self.r4[R4_CLOCK_TAP_R3] {
            clock_register(&mut self.r3, &R3_FEEDBACK_TAPS);
        }
        clock_register(&mut self.r4, &R4_FEEDBACK_TAPS);
    }

    /// Loads key and frame id into the registers.
    ///
    /// Zeroes the state, clocks in the 64 key bits then the 22 frame bits
    /// with forced clocking, and forces the per-register constant cells
    /// to 1. The resulting state is the pre-diffusion state the attack
    /// recovers.
    pub fn load(&mut self, key: &[u8; SECRET_KEY_BITS], frame_id: &[u8; FRAME_ID_BITS]) {
        self.r1 = [0; R1_BITS];
        self.r2 = [0; R2_BITS];
        self.r3 = [0; R3_BITS];
        self.r4 = [0; R4_BITS];

        for &bit in key {
            self.clock(true);
            self.r1[0] ^= bit;
            self.r2[0] ^= bit;
            self.r3[0] ^= bit;
            self.r4[0] ^= bit;
        }
        for &bit in frame_id {
            self.clock(true);
            self.r1[0] ^= bit;
            self.r2[0] ^= bit;
            self.r3[0] ^= bit;
            self.r4[0] ^= bit;
        }

        self.r1[R1_CONST_POS] = 1;
        self.r2[R2_CONST_POS] = 1;
        self.r3[R3_CONST_POS] = 1;
        self.r4[R4_CONST_POS] = 1;
    }

    /// Runs the diffusion rounds whose output is discarded.
    pub fn diffuse(&mut self) {
        for _ in 0..DIFFUSION_ROUNDS {
            self.clock(false);
        }
    }

    /// Full key setup: load plus diffusion.
    pub fn key_setup(&mut self, key: &[u8; SECRET_KEY_BITS], frame_id: &[u8; FRAME_ID_BITS]) {
        self.load(key, frame_id);
        self.diffuse();
    }

    /// The current output bit.
    fn out_bit(&self) -> u8 {
        let maj_of = |reg: &[u8], taps: &[(usize, u8); 3]| {
            majority(
                reg[taps[0].0] ^ taps[0].1,
                reg[taps[1].0] ^ taps[1].1,
                reg[taps[2].0] ^ taps[2].1,
            )
        };
        self.r1[R1_BITS - 1]
            ^ self.r2[R2_BITS - 1]
            ^ self.r3[R3_BITS - 1]
            ^ maj_of(&self.r1, &R1_OUT_TAPS)
            ^ maj_of(&self.r2, &R2_OUT_TAPS)
            ^ maj_of(&self.r3, &R3_OUT_TAPS)
    }

    /// Produces the next `len` keystream bits, one byte per bit.
    pub fn keystream(&mut self, len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.out_bit());
            self.clock(false);
        }
        out
    }
}

impl Default for A52 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verified key setup and keystream vectors for A5/2: key of ten zero
    // bits followed by 54 one bits, frame id 1000010...0.
    const TEST_KEY: [u8; SECRET_KEY_BITS] = [
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
        1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
        1, 1, 1, 1,
    ];
    const TEST_FRAME_ID: [u8; FRAME_ID_BITS] = [
        1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ];
    const TEST_KEYSTREAM: [u8; 228] = [
        1, 1, 1, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0, 0, 0, 1, 0, 0, 1, 0, 1, 1, 0, 0, 1, 0, 1, 0, 1, 1,
        0, 0, 0, 0, 0, 1, 0, 0, 1, 1, 0, 1, 0, 1, 1, 0, 0, 1, 0, 0, 1, 1, 0, 1, 1, 1, 0, 1, 1, 0,
        0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 1, 0, 1, 1, 0, 1, 1, 1, 0, 0, 1, 0, 0, 0,
        1, 0, 1, 1, 0, 1, 1, 0, 1, 0, 1, 1, 0, 1, 1, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0, 0, 1, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 1, 0, 1, 0, 0, 0, 0, 1, 1, 0, 0, 1, 0, 1, 0, 0, 0,
        1, 1, 1, 0, 0, 0, 0, 1, 0, 1, 1, 0, 1, 0, 1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 1, 1, 0, 1, 1, 1,
        0, 0, 1, 1, 0, 1, 0, 1, 1, 1, 1, 0, 1, 1, 1, 0, 0, 1, 0, 1, 1, 1, 0, 0, 1, 0, 0, 0, 1, 0,
        0, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 0, 0, 0, 1, 0, 0,
    ];

    #[test]
    fn test_keystream_vector() {
        let mut cipher = A52::new();
        cipher.key_setup(&TEST_KEY, &TEST_FRAME_ID);
        assert_eq!(cipher.keystream(228), TEST_KEYSTREAM.to_vec());
    }

    #[test]
    fn test_state_after_loading() {
        // Register contents right after key loading, before diffusion.
        let mut cipher = A52::new();
        cipher.load(&TEST_KEY, &TEST_FRAME_ID);
        let state = cipher.registers();
        assert_eq!(
            state.r1,
            [1, 0, 1, 0, 0, 0, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1]
        );
        assert_eq!(
            state.r2,
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 1]
        );
        assert_eq!(
            state.r3,
            [0, 1, 0, 0, 1, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 1, 1, 1]
        );
        assert_eq!(
            state.r4,
            [1, 1, 1, 1, 0, 1, 1, 1, 0, 1, 1, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_constant_cells_forced() {
        let mut cipher = A52::new();
        cipher.load(&TEST_KEY, &TEST_FRAME_ID);
        let state = cipher.registers();
        assert_eq!(state.r1[R1_CONST_POS], 1);
        assert_eq!(state.r2[R2_CONST_POS], 1);
        assert_eq!(state.r3[R3_CONST_POS], 1);
        assert_eq!(state.r4[R4_CONST_POS], 1);
    }

    #[test]
    fn test_resume_from_registers() {
        // A generator restarted from a captured state continues the
        // same keystream.
        let mut cipher = A52::new();
        cipher.key_setup(&TEST_KEY, &TEST_FRAME_ID);
        let head = cipher.keystream(100);
        let state = cipher.registers();

        let mut resumed = A52::from_registers(&state);
        let tail = resumed.keystream(128);
        assert_eq!(&TEST_KEYSTREAM[..100], head.as_slice());
        assert_eq!(&TEST_KEYSTREAM[100..], tail.as_slice());
    }

    #[test]
    fn test_majority() {
        assert_eq!(majority(0, 0, 0), 0);
        assert_eq!(majority(1, 0, 0), 0);
        assert_eq!(majority(1, 1, 0), 1);
        assert_eq!(majority(1, 1, 1), 1);
    }
}
