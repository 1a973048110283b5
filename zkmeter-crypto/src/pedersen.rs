//! Pedersen commitments \[1\] to single values over any prime-order group.
//!
//! Commitments may be formed using the [`commit`] method on [`PedersenParameters`] and verified
//! with the [`verify_opening`] method on a [`Commitment`]. [`PedersenParameters`] may be
//! constructed by uniform random sampling from an [`Rng`], using the [`PedersenParameters::new`]
//! method, or from known generators (for instance the generators of a range-proof context).
//! ```
//! # use zkmeter_crypto::{BlindingFactor, pedersen::PedersenParameters};
//! # use curve25519_dalek::RistrettoPoint;
//! # let mut rng = rand::thread_rng();
//! let params = PedersenParameters::<RistrettoPoint>::new(&mut rng);
//! let bf = BlindingFactor::new(&mut rng);
//! let commitment = params.commit(42, bf);
//! assert!(commitment.verify_opening(&params, bf, 42));
//! ```
//!
//! ## References
//!
//! 1. Torben Pyrds Pedersen. "Non-interactive and information-theoretic secure verifiable secret
//!    sharing". 1992. URL: <https://www.cs.cornell.edu/courses/cs754/2001fa/129.PDF>
//!
//! [`commit`]: PedersenParameters::commit
//! [`verify_opening`]: Commitment::verify_opening
//! [`Rng`]: crate::Rng

use crate::{
    common::*,
    proofs::{ChallengeBuilder, ChallengeInput},
    serde::{element_from_slice, element_len},
    Error,
};
use serde::{Deserialize, Serialize};

/// A Pedersen commitment to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "G: GroupEncoding")]
pub struct Commitment<G: Group>(#[serde(with = "crate::serde::group_element")] pub(crate) G);

impl<G: Group> Commitment<G> {
    /// Verify a provided opening of the commitment.
    pub fn verify_opening(
        &self,
        pedersen_params: &PedersenParameters<G>,
        bf: BlindingFactor<G::Scalar>,
        value: u64,
    ) -> bool {
        pedersen_params.commit(value, bf) == *self
    }

    /// Get the inner group element representing the commitment.
    pub fn to_element(self) -> G {
        self.0
    }

    /// Wrap a group element that is already known to be a commitment.
    pub fn from_element(element: G) -> Self {
        Self(element)
    }
}

impl<G: Group + GroupEncoding> Commitment<G> {
    /// Encode the commitment as one compressed point.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().as_ref().to_vec()
    }

    /// Decode a commitment from the output of [`Commitment::to_bytes()`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != element_len::<G>() {
            return Err(Error::CryptoBackend("commitment has the wrong length"));
        }
        element_from_slice(bytes)
            .map(Self)
            .ok_or(Error::CryptoBackend("commitment is not a valid group element"))
    }
}

impl<G: Group + GroupEncoding> ChallengeInput for Commitment<G> {
    fn consume(&self, builder: &mut ChallengeBuilder) {
        builder.consume_element(&self.0);
    }
}

/// Parameters for Pedersen commitments: a value generator `g` and a blinding generator `h`.
///
/// No discrete logarithm relationship between `g` and `h` may be known to the committer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(bound = "G: GroupEncoding")]
pub struct PedersenParameters<G: Group> {
    #[serde(with = "crate::serde::group_element")]
    g: G,
    #[serde(with = "crate::serde::group_element")]
    h: G,
}

impl<G: Group> PedersenParameters<G> {
    /// Generate a new, random set of Pedersen parameters.
    ///
    /// These are chosen uniformly at random, such that no discrete logarithm relationships
    /// are known among the generators.
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            g: random_non_identity(&mut *rng),
            h: random_non_identity(&mut *rng),
        }
    }

    /// Produce Pedersen parameters from a set of known generators.
    pub fn from_generators(g: G, h: G) -> Self {
        Self { g, h }
    }

    /// Form a commitment to `value` with the given blinding factor.
    pub fn commit(&self, value: u64, bf: BlindingFactor<G::Scalar>) -> Commitment<G> {
        self.commit_scalar(G::Scalar::from(value), bf)
    }

    /// Form a commitment to an arbitrary scalar with the given blinding factor.
    pub fn commit_scalar(&self, value: G::Scalar, bf: BlindingFactor<G::Scalar>) -> Commitment<G> {
        Commitment(self.g * value + self.h * bf.as_scalar())
    }

    /// The generator multiplying the committed value.
    pub fn value_generator(&self) -> G {
        self.g
    }

    /// The generator multiplying the blinding factor.
    pub fn blinding_generator(&self) -> G {
        self.h
    }
}

impl<G: Group + GroupEncoding> ChallengeInput for PedersenParameters<G> {
    fn consume(&self, builder: &mut ChallengeBuilder) {
        builder.consume_element(&self.g);
        builder.consume_element(&self.h);
    }
}
