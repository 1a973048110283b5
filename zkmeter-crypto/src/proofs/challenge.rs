//! Functionality for building challenge scalars.
//!
//! Supports challenges on equivalence proofs between ciphertexts and commitments, individually
//! and in conjunctions. There is also support for incorporating other public information into
//! the challenge, such as the parameters and keys the statement is made over, or a session nonce.

use crate::common::*;
use sha3::{Digest, Sha3_512};

/// A trait implemented by types which can feed their public components into a [`ChallengeBuilder`].
pub trait ChallengeInput {
    /// Incorporate public components of this type into a [`ChallengeBuilder`].
    fn consume(&self, builder: &mut ChallengeBuilder);
}

impl<'a, T: ChallengeInput> ChallengeInput for &'a T {
    fn consume(&self, builder: &mut ChallengeBuilder) {
        (**self).consume(builder);
    }
}

/// A challenge scalar for use in a Schnorr-style proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge<S>(S);

impl<S: Copy> Challenge<S> {
    /// Retrieve the internal scalar value.
    pub fn to_scalar(self) -> S {
        self.0
    }
}

/// Holds state used when building a [`Challenge`] using the Fiat-Shamir heuristic, as in a
/// non-interactive Schnorr proof.
#[derive(Debug, Clone)]
#[allow(missing_copy_implementations)]
pub struct ChallengeBuilder {
    hasher: Sha3_512,
}

impl Default for ChallengeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeBuilder {
    /// Initialize a new, empty challenge.
    pub fn new() -> Self {
        Self {
            hasher: Sha3_512::new(),
        }
    }

    /// Incorporate public data from some given type into the challenge.
    pub fn consume<T: ChallengeInput>(&mut self, object: &T) {
        object.consume(self);
    }

    /// A conveniently chainable variant of [`ChallengeBuilder::consume`].
    pub fn with<T: ChallengeInput>(mut self, object: &T) -> Self {
        object.consume(&mut self);
        self
    }

    /// Incorporate arbitrary bytes into the challenge.
    ///
    /// Each call is length-prefixed, so consecutive calls cannot be confused with one call on the
    /// concatenated bytes.
    pub fn consume_bytes(&mut self, bytes: impl AsRef<[u8]>) {
        let bytes = bytes.as_ref();
        self.hasher.update((bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
    }

    /// A conveniently chainable variant of [`ChallengeBuilder::consume_bytes`].
    pub fn with_bytes(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.consume_bytes(bytes);
        self
    }

    /// Incorporate the canonical encoding of a group element into the challenge.
    pub fn consume_element<G: GroupEncoding>(&mut self, element: &G) {
        self.consume_bytes(element.to_bytes());
    }

    /// Consume the builder and generate a [`Challenge`] from the accumulated data.
    ///
    /// The 512-bit digest is reduced into the scalar field, so the challenge is statistically
    /// close to uniform.
    pub fn finish<S: FromUniformBytes<64>>(self) -> Challenge<S> {
        let mut digested = [0; 64];
        digested.copy_from_slice(self.hasher.finalize().as_ref());
        Challenge(S::from_uniform_bytes(&digested))
    }
}
