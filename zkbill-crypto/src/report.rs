//! What a meter sends to the utility for one billing period.

use crate::{types::*, Nonce};
use serde::*;
use std::fmt;

/// Identifies a meter to its utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeterId(u64);

impl MeterId {
    /// Wrap a meter's serial number.
    pub fn new(serial: u64) -> Self {
        Self(serial)
    }

    /// The meter's serial number.
    pub fn serial(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MeterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "meter-{}", self.0)
    }
}

impl ChallengeInput for MeterId {
    fn consume(&self, builder: &mut ChallengeBuilder) {
        builder.consume_bytes(self.0.to_le_bytes());
    }
}

/// A billing period's readings: encrypted, range-proved and bound together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterReport {
    pub(crate) meter_id: MeterId,
    pub(crate) nonce: Nonce,
    /// Commitments to the readings, one set per proof slot.
    pub(crate) commitments: CommitmentBatch,
    /// One aggregated range proof per proof slot.
    pub(crate) range_proofs: Vec<RangeProof>,
    /// One ciphertext per reading, under the utility's key.
    pub(crate) ciphertexts: Vec<Ciphertext<RistrettoPoint>>,
    /// Binds each ciphertext to the reading's commitment in the first proof slot.
    pub(crate) equivalence_proofs: Vec<EquivalenceProof<RistrettoPoint>>,
}

impl MeterReport {
    /// The meter that produced this report.
    pub fn meter_id(&self) -> MeterId {
        self.meter_id
    }

    /// The nonce that binds the proofs of this report together.
    pub fn nonce(&self) -> Nonce {
        self.nonce
    }

    /// The encrypted readings.
    pub fn ciphertexts(&self) -> &[Ciphertext<RistrettoPoint>] {
        &self.ciphertexts
    }

    /// The commitments to the readings.
    pub fn commitments(&self) -> &CommitmentBatch {
        &self.commitments
    }

    /// The homomorphic sum of the readings in this report.
    pub fn total(&self) -> Ciphertext<RistrettoPoint> {
        self.ciphertexts.iter().copied().sum()
    }
}

/// The meter's secret opening of the commitments in a [`MeterReport`].
///
/// Lets the meter reveal individual readings later, for example to settle a dispute.
#[derive(Debug)]
pub struct MeterReportOpening(pub(crate) BatchOpening);

impl MeterReportOpening {
    /// The readings.
    pub fn readings(&self) -> &[u64] {
        self.0.values()
    }

    /// The blinding factor of each reading's commitments.
    pub fn blinding_factors(&self) -> &[BlindingFactor<Scalar>] {
        self.0.blinding_factors()
    }
}

/// The Fiat-Shamir challenge for the equivalence proof of one reading.
pub(crate) fn binding_challenge(
    meter_id: MeterId,
    nonce: Nonce,
    params: &PedersenParameters<RistrettoPoint>,
    utility_key: &PublicKey<RistrettoPoint>,
    proof: &impl ChallengeInput,
) -> Challenge<Scalar> {
    ChallengeBuilder::new()
        .with(&meter_id)
        .with(&nonce)
        .with(params)
        .with(utility_key)
        .with(proof)
        .finish()
}
