//! Schnorr-style proofs that an ElGamal ciphertext and a Pedersen commitment hide the same value.
//!
//! The statement is made over Pedersen parameters `(g, h)`, an ElGamal public key `B` on the
//! generator `g`, a ciphertext `(c1, c2)` and a commitment `C`. The prover knows the value `m`,
//! the encryption randomness `k` and the blinding factor `r` such that
//!
//! ```text
//! c1 = k * g,    c2 = m * g + k * B,    C = m * g + r * h.
//! ```
//!
//! Both schemes must encode the value on the **same** generator `g`; this is checked explicitly
//! when building and when verifying a proof. Keys meant to be bound to commitments are therefore
//! generated with [`KeyPair::with_generator`](crate::elgamal::KeyPair::with_generator) on the
//! value generator of the commitment parameters.
//!
//! ## Expected use
//!
//! 1. *Initiate the proof.* Call [`EquivalenceProofBuilder::generate_proof_commitments()`] with
//!    the openings of the ciphertext and the commitment.
//!
//! 2. *Generate a challenge*. In an interactive proof, the prover obtains a random challenge from
//!    the verifier. Here the Fiat-Shamir heuristic is used instead: feed the parameters, the
//!    public key, any session data and the builder into a [`ChallengeBuilder`].
//!
//! 3. *Complete the proof*. Call [`EquivalenceProofBuilder::generate_proof_response()`].
//!
//! To verify, reconstruct the challenge from the same public data and the [`EquivalenceProof`]
//! and call [`EquivalenceProof::verify_equivalence()`].
//!
//! ```
//! # use zkmeter_crypto::{BlindingFactor, elgamal::KeyPair, pedersen::PedersenParameters};
//! # use zkmeter_crypto::proofs::{ChallengeBuilder, EquivalenceProofBuilder};
//! # use curve25519_dalek::RistrettoPoint;
//! # let mut rng = rand::thread_rng();
//! let params = PedersenParameters::<RistrettoPoint>::new(&mut rng);
//! let keypair = KeyPair::with_generator(&mut rng, params.value_generator()).unwrap();
//!
//! let (ciphertext, randomness) = keypair.public_key().encrypt_with_randomness(&mut rng, 42);
//! let bf = BlindingFactor::new(&mut rng);
//! let commitment = params.commit(42, bf);
//!
//! let builder = EquivalenceProofBuilder::generate_proof_commitments(
//!     &mut rng, 42, ciphertext, &randomness, commitment, bf, keypair.public_key(), &params,
//! ).unwrap();
//! let challenge = ChallengeBuilder::new()
//!     .with(&params)
//!     .with(keypair.public_key())
//!     .with(&builder)
//!     .finish();
//! let proof = builder.generate_proof_response(challenge);
//!
//! let verif_challenge = ChallengeBuilder::new()
//!     .with(&params)
//!     .with(keypair.public_key())
//!     .with(&proof)
//!     .finish();
//! assert!(proof.verify_equivalence(&params, keypair.public_key(), verif_challenge));
//! ```

use crate::{
    common::*,
    elgamal::{Ciphertext, EncryptionRandomness, PublicKey},
    pedersen::{Commitment, PedersenParameters},
    proofs::{Challenge, ChallengeBuilder, ChallengeInput},
    Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// Fully constructed proof that a ciphertext and a commitment hide the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "G: GroupEncoding")]
pub struct EquivalenceProof<G: Group> {
    /// The ciphertext the statement is about.
    ciphertext: Ciphertext<G>,
    /// The commitment the statement is about.
    commitment: Commitment<G>,
    /// Commitment to the randomness mask: `a_k * g`.
    #[serde(with = "crate::serde::group_element")]
    randomness_commitment: G,
    /// Commitment to the masks in ciphertext form: `a_m * g + a_k * B`.
    #[serde(with = "crate::serde::group_element")]
    ciphertext_commitment: G,
    /// Commitment to the masks in commitment form: `a_m * g + a_r * h`.
    #[serde(with = "crate::serde::group_element")]
    opening_commitment: G,
    #[serde(with = "crate::serde::field_element")]
    value_response: G::Scalar,
    #[serde(with = "crate::serde::field_element")]
    randomness_response: G::Scalar,
    #[serde(with = "crate::serde::field_element")]
    blinding_response: G::Scalar,
}

impl<G: Group> EquivalenceProof<G> {
    /// Verify that the ciphertext and the commitment of this proof hide the same value.
    ///
    /// Returns `false` if `public_key` was not generated on the value generator of
    /// `pedersen_params`.
    pub fn verify_equivalence(
        &self,
        pedersen_params: &PedersenParameters<G>,
        public_key: &PublicKey<G>,
        challenge: Challenge<G::Scalar>,
    ) -> bool {
        let g = pedersen_params.value_generator();
        if public_key.generator() != g {
            return false;
        }
        let h = pedersen_params.blinding_generator();
        let c = challenge.to_scalar();

        let randomness_holds =
            g * self.randomness_response == self.randomness_commitment + self.ciphertext.c1() * c;
        let ciphertext_holds = g * self.value_response
            + public_key.to_element() * self.randomness_response
            == self.ciphertext_commitment + self.ciphertext.c2() * c;
        let commitment_holds = g * self.value_response + h * self.blinding_response
            == self.opening_commitment + self.commitment.to_element() * c;

        randomness_holds && ciphertext_holds && commitment_holds
    }

    /// The ciphertext this proof is about.
    pub fn ciphertext(&self) -> Ciphertext<G> {
        self.ciphertext
    }

    /// The commitment this proof is about.
    pub fn commitment(&self) -> Commitment<G> {
        self.commitment
    }
}

impl<G: Group + GroupEncoding> ChallengeInput for EquivalenceProof<G> {
    fn consume(&self, builder: &mut ChallengeBuilder) {
        builder.consume(&self.ciphertext);
        builder.consume(&self.commitment);
        builder.consume_element(&self.randomness_commitment);
        builder.consume_element(&self.ciphertext_commitment);
        builder.consume_element(&self.opening_commitment);
    }
}

/// A partially-built [`EquivalenceProof`].
///
/// Built up to (but not including) the challenge phase of a Schnorr proof. Holds the witness,
/// which is wiped when the builder is dropped.
pub struct EquivalenceProofBuilder<G: Group> {
    ciphertext: Ciphertext<G>,
    commitment: Commitment<G>,
    randomness_commitment: G,
    ciphertext_commitment: G,
    opening_commitment: G,
    value: SecretScalar<G::Scalar>,
    randomness: SecretScalar<G::Scalar>,
    blinding: SecretScalar<G::Scalar>,
    value_mask: SecretScalar<G::Scalar>,
    randomness_mask: SecretScalar<G::Scalar>,
    blinding_mask: SecretScalar<G::Scalar>,
}

impl<G: Group> EquivalenceProofBuilder<G> {
    /// Run the commitment phase of a Schnorr-style equivalence proof.
    ///
    /// `value`, `randomness` and `blinding_factor` must open `ciphertext` (under `public_key`) and
    /// `commitment` (under `pedersen_params`); otherwise the resulting proof will not verify.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_proof_commitments(
        rng: &mut impl Rng,
        value: u64,
        ciphertext: Ciphertext<G>,
        randomness: &EncryptionRandomness<G>,
        commitment: Commitment<G>,
        blinding_factor: BlindingFactor<G::Scalar>,
        public_key: &PublicKey<G>,
        pedersen_params: &PedersenParameters<G>,
    ) -> Result<Self, Error> {
        let g = pedersen_params.value_generator();
        if public_key.generator() != g {
            return Err(Error::GeneratorMismatch);
        }
        let h = pedersen_params.blinding_generator();

        let value_mask = G::Scalar::random(&mut *rng);
        let randomness_mask = G::Scalar::random(&mut *rng);
        let blinding_mask = G::Scalar::random(&mut *rng);

        Ok(Self {
            ciphertext,
            commitment,
            randomness_commitment: g * randomness_mask,
            ciphertext_commitment: g * value_mask + public_key.to_element() * randomness_mask,
            opening_commitment: g * value_mask + h * blinding_mask,
            value: SecretScalar(G::Scalar::from(value)),
            randomness: SecretScalar(randomness.as_scalar()),
            blinding: SecretScalar(blinding_factor.as_scalar()),
            value_mask: SecretScalar(value_mask),
            randomness_mask: SecretScalar(randomness_mask),
            blinding_mask: SecretScalar(blinding_mask),
        })
    }

    /// Run the response phase of the Schnorr-style equivalence proof to complete the proof.
    pub fn generate_proof_response(self, challenge: Challenge<G::Scalar>) -> EquivalenceProof<G> {
        let c = challenge.to_scalar();
        EquivalenceProof {
            ciphertext: self.ciphertext,
            commitment: self.commitment,
            randomness_commitment: self.randomness_commitment,
            ciphertext_commitment: self.ciphertext_commitment,
            opening_commitment: self.opening_commitment,
            value_response: self.value_mask.0 + c * self.value.0,
            randomness_response: self.randomness_mask.0 + c * self.randomness.0,
            blinding_response: self.blinding_mask.0 + c * self.blinding.0,
        }
    }
}

impl<G: Group + GroupEncoding> ChallengeInput for EquivalenceProofBuilder<G> {
    fn consume(&self, builder: &mut ChallengeBuilder) {
        builder.consume(&self.ciphertext);
        builder.consume(&self.commitment);
        builder.consume_element(&self.randomness_commitment);
        builder.consume_element(&self.ciphertext_commitment);
        builder.consume_element(&self.opening_commitment);
    }
}

impl<G: Group> Drop for EquivalenceProofBuilder<G> {
    fn drop(&mut self) {
        self.value.zeroize();
        self.randomness.zeroize();
        self.blinding.zeroize();
        self.value_mask.zeroize();
        self.randomness_mask.zeroize();
        self.blinding_mask.zeroize();
    }
}

impl<G: Group> fmt::Debug for EquivalenceProofBuilder<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EquivalenceProofBuilder")
            .field("ciphertext", &self.ciphertext)
            .field("commitment", &self.commitment)
            .finish_non_exhaustive()
    }
}
