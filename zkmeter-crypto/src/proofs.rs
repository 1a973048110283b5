//! Zero-knowledge proofs over commitments and ciphertexts: Fiat-Shamir challenges, the
//! ciphertext/commitment equivalence proof, and the batched Bulletproof range-proof engine.

mod challenge;
mod equivalence;
mod range;

pub use self::{challenge::*, equivalence::*, range::*};
