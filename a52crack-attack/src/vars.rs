//! The linearized variable space.
//!
//! The unknowns of the attack are the pre-diffusion contents of R1, R2 and
//! R3. One cell per register is forced to 1 at key loading and carries no
//! information, leaving 18 + 21 + 22 = 61 "simple" variables. The
//! quadratic majority terms of the output function are linearized by
//! introducing one "product" variable for every unordered pair of simple
//! variables within the same register (153 + 210 + 231 = 594), and a final
//! slot stands for the constant 1.
//!
//! Slot layout: `[R1 simple | R2 simple | R3 simple | R1 products |
//! R2 products | R3 products | constant]`, products ordered by first then
//! second operand. Both the equation generator and the solver depend on
//! this exact layout.

use a52crack_cipher::consts::{
    R1_BITS, R1_CONST_POS, R2_BITS, R2_CONST_POS, R3_BITS, R3_CONST_POS,
};

/// Simple variables of R1.
pub const R1_SIMPLE_VARS: usize = R1_BITS - 1;
/// Simple variables of R2.
pub const R2_SIMPLE_VARS: usize = R2_BITS - 1;
/// Simple variables of R3.
pub const R3_SIMPLE_VARS: usize = R3_BITS - 1;
/// Simple variables of all three registers.
pub const SIMPLE_VARS: usize = R1_SIMPLE_VARS + R2_SIMPLE_VARS + R3_SIMPLE_VARS;

/// Product variables of R1.
pub const R1_PROD_VARS: usize = R1_SIMPLE_VARS * (R1_SIMPLE_VARS - 1) / 2;
/// Product variables of R2.
pub const R2_PROD_VARS: usize = R2_SIMPLE_VARS * (R2_SIMPLE_VARS - 1) / 2;
/// Product variables of R3.
pub const R3_PROD_VARS: usize = R3_SIMPLE_VARS * (R3_SIMPLE_VARS - 1) / 2;
/// Product variables of all three registers.
pub const PROD_VARS: usize = R1_PROD_VARS + R2_PROD_VARS + R3_PROD_VARS;

/// Total slot count, including the trailing constant slot.
pub const TOTAL_VARS: usize = SIMPLE_VARS + PROD_VARS + 1;
/// Slot representing the constant value 1.
pub const CONST_SLOT: usize = TOTAL_VARS - 1;

/// One of the three linearized registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    /// First LFSR (19 bits).
    R1,
    /// Second LFSR (22 bits).
    R2,
    /// Third LFSR (23 bits).
    R3,
}

impl Reg {
    /// All three registers in slot order.
    pub const ALL: [Reg; 3] = [Reg::R1, Reg::R2, Reg::R3];

    /// Register width in bits.
    pub fn bits(self) -> usize {
        match self {
            Reg::R1 => R1_BITS,
            Reg::R2 => R2_BITS,
            Reg::R3 => R3_BITS,
        }
    }

    /// Cell forced to 1 at key loading.
    pub fn const_pos(self) -> usize {
        match self {
            Reg::R1 => R1_CONST_POS,
            Reg::R2 => R2_CONST_POS,
            Reg::R3 => R3_CONST_POS,
        }
    }

    /// Number of simple variables of this register.
    pub fn simple_vars(self) -> usize {
        self.bits() - 1
    }

    /// First global slot of this register's simple variables.
    pub fn simple_base(self) -> usize {
        match self {
            Reg::R1 => 0,
            Reg::R2 => R1_SIMPLE_VARS,
            Reg::R3 => R1_SIMPLE_VARS + R2_SIMPLE_VARS,
        }
    }

    /// First global slot of this register's product variables.
    pub fn prod_base(self) -> usize {
        match self {
            Reg::R1 => SIMPLE_VARS,
            Reg::R2 => SIMPLE_VARS + R1_PROD_VARS,
            Reg::R3 => SIMPLE_VARS + R1_PROD_VARS + R2_PROD_VARS,
        }
    }

    /// The register owning the given global simple-variable slot.
    pub fn of_simple(slot: usize) -> Reg {
        debug_assert!(slot < SIMPLE_VARS);
        if slot < R1_SIMPLE_VARS {
            Reg::R1
        } else if slot < R1_SIMPLE_VARS + R2_SIMPLE_VARS {
            Reg::R2
        } else {
            Reg::R3
        }
    }
}

/// Register cell holding local simple variable `var`.
///
/// The constant cell holds no variable, so cells at or above it map one
/// position higher.
pub fn register_bit(reg: Reg, var: usize) -> usize {
    debug_assert!(var < reg.simple_vars());
    if var < reg.const_pos() {
        var
    } else {
        var + 1
    }
}

/// Global slot of the product of two distinct local simple variables of
/// `reg`, with `v1 < v2`.
pub fn product_slot(reg: Reg, v1: usize, v2: usize) -> usize {
    debug_assert!(v1 < v2 && v2 < reg.simple_vars());
    let n = reg.simple_vars();
    reg.prod_base() + v1 * (2 * n - v1 - 1) / 2 + (v2 - v1 - 1)
}

/// A linear combination over the variable space: one indicator bit per
/// slot, XOR as addition.
///
/// Kept distinct from concrete bit vectors: a `VarVec` names unknowns, it
/// does not hold cipher state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarVec {
    bits: Vec<u8>,
}

impl VarVec {
    /// The zero combination.
    pub fn zero() -> Self {
        Self {
            bits: vec![0u8; TOTAL_VARS],
        }
    }

    /// The combination holding only the constant 1.
    pub fn constant() -> Self {
        let mut v = Self::zero();
        v.bits[CONST_SLOT] = 1;
        v
    }

    /// The combination holding the single slot `slot`.
    pub fn single(slot: usize) -> Self {
        let mut v = Self::zero();
        v.bits[slot] = 1;
        v
    }

    /// Indicator bit of `slot`.
    #[inline]
    pub fn get(&self, slot: usize) -> u8 {
        self.bits[slot]
    }

    /// Sets the indicator bit of `slot`.
    #[inline]
    pub fn set(&mut self, slot: usize, bit: u8) {
        self.bits[slot] = bit & 1;
    }

    /// The raw indicator bits.
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// Adds (XORs) another combination into this one.
    pub fn xor_assign(&mut self, other: &VarVec) {
        for (d, s) in self.bits.iter_mut().zip(&other.bits) {
            *d ^= s;
        }
    }

    /// Multiplies two combinations over the extended variable space.
    ///
    /// Both operands must only involve simple variables of a single
    /// register plus the constant slot; this holds for every register
    /// cell by construction, since clocking is linear. Products map
    /// simple×simple to the pair's product slot, simple×constant to the
    /// simple slot, constant×constant to the constant slot, and x·x
    /// collapses to x since x² = x over GF(2).
    pub fn double_product(&self, other: &VarVec) -> VarVec {
        let mut out = VarVec::zero();
        for i in 0..TOTAL_VARS {
            if self.bits[i] == 0 {
                continue;
            }
            debug_assert!(
                i < SIMPLE_VARS || i == CONST_SLOT,
                "product operand contains a product slot"
            );
            for j in 0..TOTAL_VARS {
                if other.bits[j] == 0 {
                    continue;
                }
                debug_assert!(j < SIMPLE_VARS || j == CONST_SLOT);
                out.bits[product_term_slot(i, j)] ^= 1;
            }
        }
        out
    }

    /// Evaluates the combination against concrete register contents.
    pub fn evaluate(&self, r1: &[u8], r2: &[u8], r3: &[u8]) -> u8 {
        let mut acc = self.bits[CONST_SLOT];
        for reg in Reg::ALL {
            let cells: &[u8] = match reg {
                Reg::R1 => r1,
                Reg::R2 => r2,
                Reg::R3 => r3,
            };
            for v in 0..reg.simple_vars() {
                if self.bits[reg.simple_base() + v] == 1 {
                    acc ^= cells[register_bit(reg, v)];
                }
            }
            for v1 in 0..reg.simple_vars() {
                for v2 in v1 + 1..reg.simple_vars() {
                    if self.bits[product_slot(reg, v1, v2)] == 1 {
                        acc ^= cells[register_bit(reg, v1)] & cells[register_bit(reg, v2)];
                    }
                }
            }
        }
        acc & 1
    }

    /// Packs the indicator bits MSB-first into 82 bytes.
    pub fn to_packed(&self) -> Vec<u8> {
        a52crack_common::bits_to_bytes(&self.bits)
    }

    /// Unpacks 82 MSB-first bytes into a combination.
    pub fn from_packed(packed: &[u8]) -> Self {
        Self {
            bits: a52crack_common::bytes_to_bits(packed, TOTAL_VARS),
        }
    }
}

/// Slot of the product of two single slots (simple variables or the
/// constant).
fn product_term_slot(i: usize, j: usize) -> usize {
    if i == j {
        // x·x = x, and 1·1 = 1.
        return i;
    }
    let (lo, hi) = if i < j { (i, j) } else { (j, i) };
    if hi == CONST_SLOT {
        return lo;
    }
    let reg = Reg::of_simple(lo);
    debug_assert!(
        Reg::of_simple(hi) == reg,
        "product of variables from different registers"
    );
    let base = reg.simple_base();
    product_slot(reg, lo - base, hi - base)
}

/// Checks that every product slot of a full assignment equals the AND of
/// its two simple operands.
///
/// `assignment` holds all slots except the constant, in slot order.
pub fn double_vars_consistent(assignment: &[u8]) -> bool {
    debug_assert_eq!(assignment.len(), TOTAL_VARS - 1);
    for reg in Reg::ALL {
        let base = reg.simple_base();
        for v1 in 0..reg.simple_vars() {
            for v2 in v1 + 1..reg.simple_vars() {
                if assignment[product_slot(reg, v1, v2)]
                    != (assignment[base + v1] & assignment[base + v2])
                {
                    return false;
                }
            }
        }
    }
    true
}

/// Expands the simple variables of an assignment into full register
/// contents, re-inserting the forced constant cells.
pub fn expand_registers(assignment: &[u8]) -> ([u8; R1_BITS], [u8; R2_BITS], [u8; R3_BITS]) {
    let mut r1 = [0u8; R1_BITS];
    let mut r2 = [0u8; R2_BITS];
    let mut r3 = [0u8; R3_BITS];
    {
        let regs: [(&mut [u8], Reg); 3] = [(&mut r1, Reg::R1), (&mut r2, Reg::R2), (&mut r3, Reg::R3)];
        for (cells, reg) in regs {
            for v in 0..reg.simple_vars() {
                cells[register_bit(reg, v)] = assignment[reg.simple_base() + v];
            }
            cells[reg.const_pos()] = 1;
        }
    }
    (r1, r2, r3)
}
