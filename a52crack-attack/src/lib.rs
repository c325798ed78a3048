//! Barkan–Biham–Keller key recovery attack on A5/2
//!
//! A ciphertext-only attack: because the clocking of R1..R3 depends only
//! on R4, fixing an R4 hypothesis makes every keystream bit a known
//! degree-2 polynomial over the pre-diffusion register bits. Linearized
//! over an extended variable space and folded through the channel code's
//! parity-check matrix, each hypothesis becomes a linear system that
//! three ciphertext bursts either contradict or solve; the solving
//! hypothesis yields the register state, and reversing key loading yields
//! the 64-bit session key.
//!
//! - [`vars`]: the 656-slot extended variable space
//! - [`equations`]: symbolic keystream equations per R4 hypothesis
//! - [`dictionary`]: precomputed resolution matrices (build/persist/load)
//! - [`solver`]: the per-hypothesis solver and the parallel scan
//! - [`reverse`]: key-setup reversal

pub mod dictionary;
pub mod equations;
pub mod reverse;
pub mod solver;
pub mod vars;

pub use dictionary::{build_to_file, index_of_r4, r4_from_index, Dictionary, ResolutionMatrix};
pub use equations::EquationGenerator;
pub use reverse::reverse_key_setup;
pub use solver::{recover_key, AttackOutcome, CipherTextBundle};
