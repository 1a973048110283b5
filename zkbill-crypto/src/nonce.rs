//! Cryptographically random nonces.
use crate::{types::*, Rng};
use serde::*;

/// A random nonce that makes the proofs of one report unusable in any other report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce(Scalar);

impl Nonce {
    /// Generate a new cryptographically random nonce with the given random number generator. This
    /// is not part of the public API and may change between major releases.
    #[doc(hidden)]
    pub fn new(rng: &mut impl Rng) -> Self {
        Self(Scalar::random(rng))
    }

    /// Convert a nonce to its canonical `Scalar` representation.
    pub(crate) fn to_scalar(self) -> Scalar {
        self.0
    }
}

impl ChallengeInput for Nonce {
    fn consume(&self, builder: &mut ChallengeBuilder) {
        builder.consume_bytes(self.to_scalar().to_bytes());
    }
}
