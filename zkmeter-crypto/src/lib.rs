//! This crate includes the cryptographic primitives behind privacy-preserving meter billing,
//! generic over any prime-order group implementing the `group` traits (BLS12-381 G1 and
//! Ristretto are both supported):
//! - EC ElGamal encryption with homomorphic aggregation and bounded decryption.
//! - Pedersen commitments to single values.
//! - Batched Bulletproof range proofs over Pedersen commitments (Ristretto only).
//! - Schnorr-style proofs that an ElGamal ciphertext and a Pedersen commitment hide the same
//!   value.

#![warn(missing_docs)]
#![warn(missing_copy_implementations, missing_debug_implementations)]
#![warn(unused_qualifications, unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod elgamal;
pub mod pedersen;
pub mod proofs;

mod serde;

pub use crate::common::Rng;
pub use crate::config::RangeProofConfig;

use crate::common::*;
use ::serde::*;
use thiserror::*;
use zeroize::DefaultIsZeroes;

/// Error types that may arise from the group-generic primitives.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Caused by a failure in the underlying curve arithmetic or by an invalid element encoding.
    #[error("curve backend failure: {0}")]
    CryptoBackend(&'static str),
    /// Caused by decrypting a ciphertext whose plaintext is not in the searched domain.
    #[error("no plaintext in [0, {max_plaintext}] matches the decrypted point")]
    PlaintextNotFound {
        /// Inclusive upper bound of the domain that was searched.
        max_plaintext: u64,
    },
    /// Caused by combining an ElGamal key and Pedersen parameters (or a discrete log table)
    /// built on different generators.
    #[error("the value generators of the operands do not match")]
    GeneratorMismatch,
}

/// The result of a verification of some property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the result of a verification should always be checked"]
pub enum Verification {
    /// A verification succeeded.
    Verified,
    /// A verification failed.
    Failed,
}

impl Verification {
    /// Whether this is [`Verification::Verified`].
    pub fn is_verified(self) -> bool {
        self == Verification::Verified
    }
}

impl From<bool> for Verification {
    fn from(verified: bool) -> Self {
        if verified {
            Verification::Verified
        } else {
            Verification::Failed
        }
    }
}

/// Blinding factor for a commitment.
///
/// Never zero: a zero blinding factor would turn a commitment into a deterministic function of
/// the committed value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "S: PrimeField")]
pub struct BlindingFactor<S: PrimeField>(#[serde(with = "crate::serde::field_element")] S);

impl<S: PrimeField> BlindingFactor<S> {
    /// Generate a new blinding factor uniformly at random from the non-zero scalars.
    pub fn new(rng: &mut impl Rng) -> Self {
        Self(random_nonzero_scalar(rng))
    }

    /// Construct a blinding factor from the scalar representing it.
    ///
    /// **warning:** this should never be used unless reconstructing a known opening!
    pub fn from_scalar(scalar: S) -> Self {
        Self(scalar)
    }

    /// Convert to the inner scalar representing this blinding factor.
    pub fn as_scalar(&self) -> S {
        self.0
    }
}

impl<S: PrimeField> DefaultIsZeroes for BlindingFactor<S> {}

mod common {
    //! Common types used internally.

    pub use crate::{BlindingFactor, Verification};
    pub use ff::{Field, FromUniformBytes, PrimeField};
    pub use group::{Group, GroupEncoding};

    /// A trait synonym for a cryptographically secure random number generator. This trait is
    /// blanket-implemented for all valid types and will never need to be implemented by-hand.
    pub trait Rng: rand::CryptoRng + rand::RngCore {}
    impl<T: rand::CryptoRng + rand::RngCore> Rng for T {}

    /// Select a non-zero scalar uniformly at random.
    pub fn random_nonzero_scalar<S: Field>(rng: &mut impl Rng) -> S {
        loop {
            let s = S::random(&mut *rng);
            if !bool::from(s.is_zero()) {
                return s;
            }
        }
    }

    /// Select a non-identity element from the group uniformly at random.
    pub fn random_non_identity<G: Group>(rng: &mut impl Rng) -> G {
        loop {
            let g = G::random(&mut *rng);
            if !bool::from(g.is_identity()) {
                return g;
            }
        }
    }

    /// A scalar that is wiped when the owning secret is dropped.
    #[derive(Clone, Copy, Default)]
    pub struct SecretScalar<S: Field>(pub S);

    impl<S: Field> zeroize::DefaultIsZeroes for SecretScalar<S> {}
}
