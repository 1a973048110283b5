//! Batched Bulletproof range proofs \[1\] over Pedersen commitments on Ristretto.
//!
//! A [`ProofContext`] owns everything one proving or verifying party needs: the Bulletproof
//! generator tables, one value generator per proof slot, the blinding generator, a fresh nonce and
//! the resource limits of a [`RangeProofConfig`]. The lifecycle is
//!
//! ```text
//! setup -> Configured -> commit -> Committed -> prove -> Proved -> verify -> Verified
//! ```
//!
//! and ends with [`ProofContext::teardown()`], which consumes the context.
//!
//! Each proof slot commits to the same batch of values (with the same blinding factors) under its
//! own value generator, and carries one aggregated range proof over the whole batch. The backend
//! aggregates a power-of-two number of commitments, so the context pads every proof with public
//! commitments to zero under a zero blinding factor; these never appear in a [`CommitmentBatch`].
//! A verifier
//! rebuilds an identical context from the public [`RangeProofParameters`] with
//! [`ProofContext::from_parameters()`].
//!
//! ```
//! # use zkmeter_crypto::{RangeProofConfig, proofs::ProofContext};
//! # let mut rng = rand::thread_rng();
//! let config = RangeProofConfig::default();
//! let mut context = ProofContext::setup(&mut rng, &config, 1, 2, 8).unwrap();
//! let (batch, opening) = context.commit(&mut rng, &[10, 200]).unwrap();
//! let proofs = context.prove(&mut rng, &batch, &opening).unwrap();
//!
//! let mut verifier = ProofContext::from_parameters(&config, *context.parameters()).unwrap();
//! assert!(verifier.verify(&mut rng, &proofs, &batch).unwrap().is_verified());
//! context.teardown();
//! ```
//!
//! ## References
//!
//! 1. Benedikt Bünz, Jonathan Bootle, Dan Boneh, Andrew Poelstra, Pieter Wuille, and Greg Maxwell.
//!    Bulletproofs: Short Proofs for Confidential Transactions and More. In IEEE Symposium on
//!    Security and Privacy, 2018.

use crate::{
    common::*,
    pedersen::{Commitment, PedersenParameters},
    RangeProofConfig,
};
use bulletproofs::{BulletproofGens, PedersenGens, ProofError, RangeProof as Bulletproof};
use curve25519_dalek::{
    ristretto::CompressedRistretto, traits::Identity, RistrettoPoint, Scalar,
};
use merlin::Transcript;
use serde::{Deserialize, Serialize};
use sha3::Sha3_512;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};
use zeroize::Zeroize;

const TRANSCRIPT_LABEL: &[u8] = b"zkmeter range proof";
const GENERATOR_DOMAIN: &[u8] = b"zkmeter value generator";

/// Bit widths supported by the Bulletproof backend.
pub const SUPPORTED_BIT_WIDTHS: [usize; 4] = [8, 16, 32, 64];

/// Number of bytes in the little-endian length prefix of an encoded [`RangeProof`].
const LENGTH_PREFIX_BYTES: usize = size_of::<u32>();

/// Failures while setting up a [`ProofContext`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// A context must hold at least one proof slot.
    #[error("a proof context needs at least one proof")]
    NoProofs,
    /// A proof aggregates at least one commitment, and no more than the backend can address.
    #[error("{0} commitments per proof is not supported")]
    InvalidCommitmentCount(usize),
    /// The requested range is not supported by the backend.
    #[error("range proofs over {0} bits are not supported")]
    UnsupportedBitWidth(usize),
    /// The generator tables and proof buffers do not fit the scratch budget.
    #[error("context needs {required} bytes of scratch space but only {available} are available")]
    ScratchSpaceExhausted {
        /// Estimated bytes needed.
        required: usize,
        /// Configured budget.
        available: usize,
    },
    /// Proofs of this shape would exceed the configured maximum proof size.
    #[error("proofs of {expected} bytes exceed the maximum proof size of {max} bytes")]
    ProofSizeLimit {
        /// Length of one proof of the requested shape.
        expected: usize,
        /// Configured maximum.
        max: usize,
    },
    /// The random number generator failed to produce the nonce or the generator seed.
    #[error("failed to draw context randomness: {0}")]
    Randomness(String),
    /// The value generator of a proof slot hashed to the identity.
    #[error("value generator of proof slot {0} is degenerate")]
    DegenerateGenerator(usize),
}

/// Failures while committing to a batch of values.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentError {
    /// The batch does not have exactly one value per commitment slot.
    #[error("expected {expected} values to commit to, got {got}")]
    ValueCountMismatch {
        /// Commitments per proof of the context.
        expected: usize,
        /// Values supplied.
        got: usize,
    },
}

/// Failures while generating range proofs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofGenerationError {
    /// Proving requires a committed batch.
    #[error("cannot prove from state {0:?}")]
    InvalidState(ContextState),
    /// A committed value does not lie in `[0, 2^n_bits)`.
    #[error("value at index {index} does not fit in {n_bits} bits")]
    ValueOutOfRange {
        /// Position of the offending value in the batch.
        index: usize,
        /// Bit width of the context.
        n_bits: usize,
    },
    /// The batch or the opening does not have the shape of the context.
    #[error("commitment batch or opening does not match the context shape")]
    BatchShapeMismatch,
    /// The opening does not open the commitments of a proof slot.
    #[error("opening does not match the commitments of proof slot {slot}")]
    CommitmentMismatch {
        /// The offending proof slot.
        slot: usize,
    },
    /// The Bulletproof backend failed.
    #[error("range proof backend failed: {0}")]
    Backend(ProofError),
    /// A generated proof is longer than the configured maximum.
    #[error("range proof of {len} bytes exceeds the maximum of {max} bytes")]
    ProofTooLarge {
        /// Length of the generated proof.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// Verification inputs that do not line up with the context.
///
/// These indicate a programming error on the caller's side. An invalid proof is not an error: it
/// is reported as [`Verification::Failed`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VerifyError {
    /// There is not exactly one proof per proof slot.
    #[error("expected {expected} range proofs, got {got}")]
    ProofCountMismatch {
        /// Proof slots of the context.
        expected: usize,
        /// Proofs supplied.
        got: usize,
    },
    /// The commitment batch does not have the shape of the context.
    #[error("commitment batch does not match the context shape")]
    CommitmentShapeMismatch,
}

/// Lifecycle state of a [`ProofContext`].
///
/// There is no uninitialized state: a context only exists once setup has succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Generators and nonce are in place.
    Configured,
    /// A batch has been committed.
    Committed,
    /// Range proofs have been produced for the committed batch.
    Proved,
    /// A batch of proofs has verified.
    Verified,
}

/// The public description of a [`ProofContext`].
///
/// A prover sends these to the verifier alongside the proofs, so that both sides derive the same
/// generators and transcripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeProofParameters {
    /// Number of proof slots.
    pub n_proofs: usize,
    /// Number of commitments aggregated into each proof.
    pub n_commits: usize,
    /// Every committed value lies in `[0, 2^n_bits)`.
    pub n_bits: usize,
    /// Seed from which the per-slot value generators are derived.
    pub generator_seed: [u8; 32],
    /// Nonce bound into every proof transcript.
    pub nonce: [u8; 32],
}

/// Commitments to one batch of values, replicated across all proof slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentBatch {
    commitments: Vec<Vec<Commitment<RistrettoPoint>>>,
}

impl CommitmentBatch {
    /// The commitments of one proof slot, in the order of the committed values.
    pub fn slot(&self, slot: usize) -> Option<&[Commitment<RistrettoPoint>]> {
        self.commitments.get(slot).map(Vec::as_slice)
    }

    /// Number of proof slots in this batch.
    pub fn n_slots(&self) -> usize {
        self.commitments.len()
    }

    fn has_shape(&self, n_proofs: usize, n_commits: usize) -> bool {
        self.commitments.len() == n_proofs
            && self.commitments.iter().all(|slot| slot.len() == n_commits)
    }
}

/// The secret opening of a [`CommitmentBatch`]: the values and their blinding factors.
///
/// Wiped when dropped.
pub struct BatchOpening {
    values: Vec<u64>,
    blindings: Vec<BlindingFactor<Scalar>>,
}

impl BatchOpening {
    /// The committed values.
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// The blinding factor used for each value; identical across proof slots.
    pub fn blinding_factors(&self) -> &[BlindingFactor<Scalar>] {
        &self.blindings
    }
}

impl Drop for BatchOpening {
    fn drop(&mut self) {
        self.values.zeroize();
        self.blindings.zeroize();
    }
}

impl fmt::Debug for BatchOpening {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchOpening")
            .field("len", &self.values.len())
            .finish_non_exhaustive()
    }
}

/// An opaque, serialized range proof for one proof slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeProof(Vec<u8>);

impl RangeProof {
    /// The raw proof bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Encode as a little-endian `u32` length prefix followed by the proof bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(LENGTH_PREFIX_BYTES + self.0.len());
        bytes.extend_from_slice(&(self.0.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&self.0);
        bytes
    }

    /// Decode the output of [`RangeProof::to_bytes()`], rejecting proofs longer than
    /// `max_proof_size`.
    ///
    /// Only the framing is checked here; the proof itself is checked by
    /// [`ProofContext::verify()`].
    pub fn from_bytes(bytes: &[u8], max_proof_size: usize) -> Result<Self, crate::Error> {
        if bytes.len() < LENGTH_PREFIX_BYTES {
            return Err(crate::Error::CryptoBackend("range proof is missing its length prefix"));
        }
        let (prefix, body) = bytes.split_at(LENGTH_PREFIX_BYTES);
        let mut len = [0; LENGTH_PREFIX_BYTES];
        len.copy_from_slice(prefix);
        let len = u32::from_le_bytes(len) as usize;
        if len > max_proof_size {
            return Err(crate::Error::CryptoBackend("range proof exceeds the maximum proof size"));
        }
        if body.len() != len {
            return Err(crate::Error::CryptoBackend("range proof length prefix does not match"));
        }
        Ok(Self(body.to_vec()))
    }
}

/// Owned state for producing and verifying batched range proofs.
pub struct ProofContext {
    parameters: RangeProofParameters,
    config: RangeProofConfig,
    bp_gens: BulletproofGens,
    pedersen_gens: Vec<PedersenGens>,
    aggregation_size: usize,
    state: ContextState,
}

impl fmt::Debug for ProofContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofContext")
            .field("parameters", &self.parameters)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ProofContext {
    /// Set up a fresh context for `n_proofs` proof slots, each aggregating `n_commits` commitments
    /// to values in `[0, 2^n_bits)`.
    ///
    /// Draws a fresh nonce and generator seed from `rng`.
    pub fn setup(
        rng: &mut impl Rng,
        config: &RangeProofConfig,
        n_proofs: usize,
        n_commits: usize,
        n_bits: usize,
    ) -> Result<Self, SetupError> {
        let mut generator_seed = [0; 32];
        let mut nonce = [0; 32];
        rng.try_fill_bytes(&mut generator_seed)
            .and_then(|()| rng.try_fill_bytes(&mut nonce))
            .map_err(|err| SetupError::Randomness(err.to_string()))?;

        Self::from_parameters(
            config,
            RangeProofParameters {
                n_proofs,
                n_commits,
                n_bits,
                generator_seed,
                nonce,
            },
        )
    }

    /// Rebuild a context from its public parameters, as a verifier does.
    pub fn from_parameters(
        config: &RangeProofConfig,
        parameters: RangeProofParameters,
    ) -> Result<Self, SetupError> {
        let RangeProofParameters {
            n_proofs,
            n_commits,
            n_bits,
            ..
        } = parameters;

        if n_proofs == 0 {
            return Err(SetupError::NoProofs);
        }
        let aggregation_size = match n_commits.checked_next_power_of_two() {
            Some(size) if n_commits > 0 => size,
            _ => return Err(SetupError::InvalidCommitmentCount(n_commits)),
        };
        if !SUPPORTED_BIT_WIDTHS.contains(&n_bits) {
            return Err(SetupError::UnsupportedBitWidth(n_bits));
        }

        let required = scratch_estimate(n_proofs, aggregation_size, n_bits, config.max_proof_size);
        if required > config.scratch_space_bytes {
            return Err(SetupError::ScratchSpaceExhausted {
                required,
                available: config.scratch_space_bytes,
            });
        }

        let expected = expected_proof_size(n_bits, aggregation_size).unwrap_or(usize::MAX);
        if expected > config.max_proof_size {
            return Err(SetupError::ProofSizeLimit {
                expected,
                max: config.max_proof_size,
            });
        }

        let blinding_generator = PedersenGens::default().B_blinding;
        let pedersen_gens = (0..n_proofs)
            .map(|slot| {
                let value_generator = derive_value_generator(&parameters.generator_seed, slot);
                if bool::from(Group::is_identity(&value_generator)) {
                    return Err(SetupError::DegenerateGenerator(slot));
                }
                Ok(PedersenGens {
                    B: value_generator,
                    B_blinding: blinding_generator,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            n_proofs,
            n_commits,
            aggregation_size,
            n_bits,
            scratch_bytes = required,
            "range proof context configured"
        );

        Ok(Self {
            parameters,
            config: *config,
            bp_gens: BulletproofGens::new(n_bits, aggregation_size),
            pedersen_gens,
            aggregation_size,
            state: ContextState::Configured,
        })
    }

    /// Commit to a batch of exactly `n_commits` values.
    ///
    /// Every value gets an independently drawn blinding factor. The batch is committed once per
    /// proof slot, under that slot's value generator. Committing again replaces the batch the
    /// context is ready to prove.
    pub fn commit(
        &mut self,
        rng: &mut impl Rng,
        values: &[u64],
    ) -> Result<(CommitmentBatch, BatchOpening), CommitmentError> {
        if values.len() != self.parameters.n_commits {
            return Err(CommitmentError::ValueCountMismatch {
                expected: self.parameters.n_commits,
                got: values.len(),
            });
        }

        let blindings: Vec<BlindingFactor<Scalar>> =
            values.iter().map(|_| BlindingFactor::new(&mut *rng)).collect();
        let commitments = self
            .slot_parameters()
            .map(|params| {
                values
                    .iter()
                    .zip(&blindings)
                    .map(|(&value, &bf)| params.commit(value, bf))
                    .collect()
            })
            .collect();

        self.state = ContextState::Committed;
        debug!(n_values = values.len(), "committed range proof batch");

        Ok((
            CommitmentBatch { commitments },
            BatchOpening {
                values: values.to_vec(),
                blindings,
            },
        ))
    }

    /// Produce one aggregated range proof per proof slot for a committed batch.
    pub fn prove(
        &mut self,
        rng: &mut impl Rng,
        batch: &CommitmentBatch,
        opening: &BatchOpening,
    ) -> Result<Vec<RangeProof>, ProofGenerationError> {
        if self.state == ContextState::Configured {
            return Err(ProofGenerationError::InvalidState(self.state));
        }

        let RangeProofParameters {
            n_proofs,
            n_commits,
            n_bits,
            ..
        } = self.parameters;
        if !batch.has_shape(n_proofs, n_commits)
            || opening.values.len() != n_commits
            || opening.blindings.len() != n_commits
        {
            return Err(ProofGenerationError::BatchShapeMismatch);
        }
        if let Some(index) = opening.values.iter().position(|&v| !fits_in_bits(v, n_bits)) {
            return Err(ProofGenerationError::ValueOutOfRange { index, n_bits });
        }

        let mut values = opening.values.clone();
        values.resize(self.aggregation_size, 0);
        let mut blindings: Vec<Scalar> = opening
            .blindings
            .iter()
            .map(BlindingFactor::as_scalar)
            .collect();
        blindings.resize(self.aggregation_size, Scalar::ZERO);

        let proofs = (0..n_proofs)
            .map(|slot| {
                let expected = self.padded_commitments(batch, slot);

                let (proof, committed) = Bulletproof::prove_multiple_with_rng(
                    &self.bp_gens,
                    &self.pedersen_gens[slot],
                    &mut self.transcript(slot),
                    &values,
                    &blindings,
                    n_bits,
                    &mut *rng,
                )
                .map_err(ProofGenerationError::Backend)?;

                if committed != expected {
                    return Err(ProofGenerationError::CommitmentMismatch { slot });
                }

                let bytes = proof.to_bytes();
                if bytes.len() > self.config.max_proof_size {
                    return Err(ProofGenerationError::ProofTooLarge {
                        len: bytes.len(),
                        max: self.config.max_proof_size,
                    });
                }
                Ok(RangeProof(bytes))
            })
            .collect::<Result<Vec<_>, _>>();
        values.zeroize();
        blindings.zeroize();

        let proofs = proofs?;
        self.state = ContextState::Proved;
        debug!(n_proofs, n_commits, n_bits, "generated range proofs");
        Ok(proofs)
    }

    /// Verify one proof per proof slot against a commitment batch.
    ///
    /// The whole batch passes or fails together. Malformed proof bytes count as a failed
    /// verification; inputs of the wrong shape are a [`VerifyError`].
    pub fn verify(
        &mut self,
        rng: &mut impl Rng,
        proofs: &[RangeProof],
        batch: &CommitmentBatch,
    ) -> Result<Verification, VerifyError> {
        let RangeProofParameters {
            n_proofs,
            n_commits,
            n_bits,
            ..
        } = self.parameters;
        if proofs.len() != n_proofs {
            return Err(VerifyError::ProofCountMismatch {
                expected: n_proofs,
                got: proofs.len(),
            });
        }
        if !batch.has_shape(n_proofs, n_commits) {
            return Err(VerifyError::CommitmentShapeMismatch);
        }

        for (slot, proof) in proofs.iter().enumerate() {
            if proof.0.len() > self.config.max_proof_size {
                warn!(slot, len = proof.0.len(), "range proof exceeds the maximum size");
                return Ok(Verification::Failed);
            }
            let bulletproof = match Bulletproof::from_bytes(&proof.0) {
                Ok(bulletproof) => bulletproof,
                Err(err) => {
                    warn!(slot, %err, "range proof could not be decoded");
                    return Ok(Verification::Failed);
                }
            };
            let commitments = self.padded_commitments(batch, slot);

            if let Err(err) = bulletproof.verify_multiple_with_rng(
                &self.bp_gens,
                &self.pedersen_gens[slot],
                &mut self.transcript(slot),
                &commitments,
                n_bits,
                &mut *rng,
            ) {
                warn!(slot, %err, "range proof failed to verify");
                return Ok(Verification::Failed);
            }
        }

        self.state = ContextState::Verified;
        debug!(n_proofs, "verified range proofs");
        Ok(Verification::Verified)
    }

    /// The Pedersen parameters (value generator and blinding generator) of one proof slot.
    ///
    /// ElGamal keys that must be bound to the commitments of this slot are generated on its value
    /// generator.
    pub fn pedersen_parameters(&self, slot: usize) -> Option<PedersenParameters<RistrettoPoint>> {
        self.pedersen_gens
            .get(slot)
            .map(|gens| PedersenParameters::from_generators(gens.B, gens.B_blinding))
    }

    /// The public parameters from which a verifier can rebuild this context.
    pub fn parameters(&self) -> &RangeProofParameters {
        &self.parameters
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Release the context and everything it owns.
    pub fn teardown(self) {
        debug!(state = ?self.state, "range proof context torn down");
    }

    fn slot_parameters(&self) -> impl Iterator<Item = PedersenParameters<RistrettoPoint>> + '_ {
        self.pedersen_gens
            .iter()
            .map(|gens| PedersenParameters::from_generators(gens.B, gens.B_blinding))
    }

    /// The commitments of one slot followed by the zero commitments that pad the proof.
    fn padded_commitments(
        &self,
        batch: &CommitmentBatch,
        slot: usize,
    ) -> Vec<CompressedRistretto> {
        let mut commitments: Vec<CompressedRistretto> = batch.commitments[slot]
            .iter()
            .map(|com| com.to_element().compress())
            .collect();
        commitments.resize(self.aggregation_size, CompressedRistretto::identity());
        commitments
    }

    fn transcript(&self, slot: usize) -> Transcript {
        let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
        transcript.append_message(b"nonce", &self.parameters.nonce);
        transcript.append_u64(b"slot", slot as u64);
        transcript
    }
}

fn fits_in_bits(value: u64, n_bits: usize) -> bool {
    n_bits >= 64 || value < (1 << n_bits)
}

/// Hash `domain || seed || slot` to a Ristretto point.
fn derive_value_generator(seed: &[u8; 32], slot: usize) -> RistrettoPoint {
    let mut input = Vec::with_capacity(GENERATOR_DOMAIN.len() + seed.len() + 8);
    input.extend_from_slice(GENERATOR_DOMAIN);
    input.extend_from_slice(seed);
    input.extend_from_slice(&(slot as u64).to_le_bytes());
    RistrettoPoint::hash_from_bytes::<Sha3_512>(&input)
}

/// Serialized length of one aggregated Bulletproof: four points, three scalars and an inner
/// product argument with two scalars and two points per round.
///
/// `None` if the aggregated bit count overflows.
fn expected_proof_size(n_bits: usize, aggregation_size: usize) -> Option<usize> {
    let rounds = n_bits.checked_mul(aggregation_size)?.trailing_zeros() as usize;
    Some(32 * (9 + 2 * rounds))
}

/// Generator tables plus per-slot proof buffers and commitments.
fn scratch_estimate(
    n_proofs: usize,
    aggregation_size: usize,
    n_bits: usize,
    max_proof_size: usize,
) -> usize {
    let point = size_of::<RistrettoPoint>();
    let tables = 2usize
        .saturating_mul(n_bits)
        .saturating_mul(aggregation_size)
        .saturating_mul(point);
    let per_slot = max_proof_size.saturating_add(aggregation_size.saturating_mul(point));
    tables.saturating_add(n_proofs.saturating_mul(per_slot))
}
