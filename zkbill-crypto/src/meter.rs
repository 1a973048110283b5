/*!
Cryptographic routines for a meter reporting a billing period to its utility.

A meter is configured with the utility's public key. At the end of each billing period it calls
[`Meter::report()`] on a [`ProofContext`] rebuilt from the utility's public
[`RangeProofParameters`](zkmeter_crypto::proofs::RangeProofParameters). This commits to the
readings, proves every reading lies in range, encrypts every reading under the utility's key and
binds each ciphertext to its commitment.

The resulting [`MeterReport`] is sent to the utility; the [`MeterReportOpening`] stays with the
meter.
*/

use crate::{
    report::{binding_challenge, MeterId, MeterReport, MeterReportOpening},
    types::*,
    Error, Nonce, Rng,
};
use tracing::debug;

/// A meter that reports encrypted readings to one utility.
#[derive(Debug, Clone, Copy)]
pub struct Meter {
    id: MeterId,
    utility_key: PublicKey<RistrettoPoint>,
}

impl Meter {
    /// Set up a meter that reports to the holder of `utility_key`.
    pub fn new(id: MeterId, utility_key: PublicKey<RistrettoPoint>) -> Self {
        Self { id, utility_key }
    }

    /// The identity of this meter.
    pub fn id(&self) -> MeterId {
        self.id
    }

    /**
    Report the readings of one billing period.

    `context` must have one commitment slot per reading, and the utility key must have been
    generated on the value generator of its first proof slot.

    Fails if a reading does not fit the bit width of `context`; no report is produced for
    out-of-range readings.
    */
    pub fn report(
        &self,
        rng: &mut impl Rng,
        context: &mut ProofContext,
        readings: &[u64],
    ) -> Result<(MeterReport, MeterReportOpening), Error> {
        let params = context
            .pedersen_parameters(0)
            .ok_or(SetupError::NoProofs)?;

        let (commitments, opening) = context.commit(rng, readings)?;
        let range_proofs = context.prove(rng, &commitments, &opening)?;

        let nonce = Nonce::new(rng);
        let slot = commitments.slot(0).ok_or(ProofGenerationError::BatchShapeMismatch)?;

        let mut ciphertexts = Vec::with_capacity(readings.len());
        let mut equivalence_proofs = Vec::with_capacity(readings.len());
        for ((&reading, &blinding_factor), &commitment) in readings
            .iter()
            .zip(opening.blinding_factors())
            .zip(slot)
        {
            let (ciphertext, randomness) =
                self.utility_key.encrypt_with_randomness(rng, reading);
            let builder = EquivalenceProofBuilder::generate_proof_commitments(
                rng,
                reading,
                ciphertext,
                &randomness,
                commitment,
                blinding_factor,
                &self.utility_key,
                &params,
            )?;
            let challenge =
                binding_challenge(self.id, nonce, &params, &self.utility_key, &builder);

            ciphertexts.push(ciphertext);
            equivalence_proofs.push(builder.generate_proof_response(challenge));
        }

        debug!(meter = %self.id, readings = readings.len(), "meter report generated");

        Ok((
            MeterReport {
                meter_id: self.id,
                nonce,
                commitments,
                range_proofs,
                ciphertexts,
                equivalence_proofs,
            },
            MeterReportOpening(opening),
        ))
    }
}
