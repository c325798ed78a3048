//! Symbolic keystream equations.
//!
//! For a fixed R4 hypothesis the clocking of R1..R3 is fully determined,
//! so every cell of those registers stays a linear function of their
//! pre-diffusion contents. Clocking the registers symbolically (each cell
//! holding an indicator vector instead of a bit) and expanding the output
//! majority through the double product yields, per keystream position, one
//! linear equation over the extended variable space.

use a52crack_cipher::consts::*;
use a52crack_cipher::majority;
use a52crack_common::bits::xor_in_place;

use crate::vars::{Reg, VarVec, CONST_SLOT};

/// A register whose cells hold linear combinations instead of bits.
///
/// Each cell is a local coefficient vector; slot 0 is the constant term
/// and the remaining slots are the register's own unknowns. Shifting and
/// feedback are linear, so clocking works on the vectors unchanged.
pub(crate) struct SymbolicRegister {
    pub(crate) cells: Vec<Vec<u8>>,
    taps: &'static [usize],
}

impl SymbolicRegister {
    /// Creates a register of `bits` cells of `width` coefficients, all zero.
    pub(crate) fn new(bits: usize, width: usize, taps: &'static [usize]) -> Self {
        Self {
            cells: vec![vec![0u8; width]; bits],
            taps,
        }
    }

    /// Shifts the register, feeding back the XOR of the tapped cells.
    pub(crate) fn clock(&mut self) {
        let mut carry = vec![0u8; self.cells[0].len()];
        for &t in self.taps {
            xor_in_place(&mut carry, &self.cells[t]);
        }
        self.cells.rotate_right(1);
        self.cells[0] = carry;
    }
}

/// Generates keystream equations for one R4 hypothesis.
pub struct EquationGenerator {
    r1: SymbolicRegister,
    r2: SymbolicRegister,
    r3: SymbolicRegister,
    r4: [u8; R4_BITS],
}

impl EquationGenerator {
    /// Starts a generator at the pre-diffusion state for the given
    /// concrete R4 contents.
    ///
    /// # Panics
    /// Panics if the hypothesis does not have R4's constant cell set;
    /// such a value cannot result from key loading.
    pub fn new(r4: [u8; R4_BITS]) -> Self {
        assert_eq!(
            r4[R4_CONST_POS], 1,
            "R4 hypothesis must have its constant cell set"
        );

        let mut r1 = SymbolicRegister::new(R1_BITS, 1 + Reg::R1.simple_vars(), &R1_FEEDBACK_TAPS);
        let mut r2 = SymbolicRegister::new(R2_BITS, 1 + Reg::R2.simple_vars(), &R2_FEEDBACK_TAPS);
        let mut r3 = SymbolicRegister::new(R3_BITS, 1 + Reg::R3.simple_vars(), &R3_FEEDBACK_TAPS);

        // Cell i holds its own unknown, except the forced constant cell.
        for (reg, sym) in [(Reg::R1, &mut r1), (Reg::R2, &mut r2), (Reg::R3, &mut r3)] {
            for i in 0..reg.bits() {
                let slot = match i.cmp(&reg.const_pos()) {
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Less => i + 1,
                    std::cmp::Ordering::Greater => i,
                };
                sym.cells[i][slot] = 1;
            }
        }

        Self { r1, r2, r3, r4 }
    }

    /// One round of the clocking unit, with the majority decision taken
    /// on the concrete R4 contents.
    fn clock(&mut self) {
        let maj = majority(
            self.r4[R4_CLOCK_TAP_R1],
            self.r4[R4_CLOCK_TAP_R2],
            self.r4[R4_CLOCK_TAP_R3],
        );
        if maj == self.r4[R4_CLOCK_TAP_R1] {
            self.r1.clock();
        }
        if maj == self.r4[R4_CLOCK_TAP_R2] {
            self.r2.clock();
        }
        if maj == self.r4[R4_CLOCK_TAP_R3] {
            self.r3.clock();
        }
        let mut carry = 0u8;
        for &t in &R4_FEEDBACK_TAPS {
            carry ^= self.r4[t];
        }
        for i in (1..R4_BITS).rev() {
            self.r4[i] = self.r4[i - 1];
        }
        self.r4[0] = carry;
    }

    /// Runs the diffusion rounds whose output the cipher discards.
    pub fn diffuse(&mut self) {
        for _ in 0..DIFFUSION_ROUNDS {
            self.clock();
        }
    }

    /// Lifts a register cell into the global variable space, optionally
    /// complementing its constant term.
    fn lift(&self, reg: Reg, cell: usize, complement: u8) -> VarVec {
        let sym = match reg {
            Reg::R1 => &self.r1,
            Reg::R2 => &self.r2,
            Reg::R3 => &self.r3,
        };
        let local = &sym.cells[cell];
        let mut out = VarVec::zero();
        for (v, &coeff) in local[1..].iter().enumerate() {
            out.set(reg.simple_base() + v, coeff);
        }
        out.set(CONST_SLOT, local[0] ^ complement);
        out
    }

    /// Expands one register's output majority:
    /// maj(a, b, c) = a·b ⊕ b·c ⊕ a·c.
    fn majority_terms(&self, reg: Reg, taps: &[(usize, u8); 3]) -> VarVec {
        let a = self.lift(reg, taps[0].0, taps[0].1);
        let b = self.lift(reg, taps[1].0, taps[1].1);
        let c = self.lift(reg, taps[2].0, taps[2].1);

        let mut sum = a.double_product(&b);
        sum.xor_assign(&b.double_product(&c));
        sum.xor_assign(&a.double_product(&c));
        sum
    }

    /// The equation of the current output bit.
    pub fn output_equation(&self) -> VarVec {
        let mut eq = self.majority_terms(Reg::R1, &R1_OUT_TAPS);
        eq.xor_assign(&self.majority_terms(Reg::R2, &R2_OUT_TAPS));
        eq.xor_assign(&self.majority_terms(Reg::R3, &R3_OUT_TAPS));
        eq.xor_assign(&self.lift(Reg::R1, R1_BITS - 1, 0));
        eq.xor_assign(&self.lift(Reg::R2, R2_BITS - 1, 0));
        eq.xor_assign(&self.lift(Reg::R3, R3_BITS - 1, 0));
        eq
    }

    /// Emits the equation of the current position and advances one round.
    pub fn next_equation(&mut self) -> VarVec {
        let eq = self.output_equation();
        self.clock();
        eq
    }

    /// Generates the first `len` keystream equations for a hypothesis,
    /// diffusion included.
    pub fn equations(r4: [u8; R4_BITS], len: usize) -> Vec<VarVec> {
        let mut gen = Self::new(r4);
        gen.diffuse();
        (0..len).map(|_| gen.next_equation()).collect()
    }
}
