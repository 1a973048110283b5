//! Cryptographic routines for a utility to check meter reports and compute bills.

use crate::{
    report::{binding_challenge, MeterReport},
    types::*,
    BillingConfig, Error, Rng, Verification,
};
use tracing::{debug, warn};

/// A utility that verifies meter reports and decrypts aggregated bills.
///
/// Holds the decryption key, generated on the value generator of the first proof slot of the
/// utility's range-proof context.
#[derive(Debug)]
pub struct Utility {
    config: BillingConfig,
    keypair: KeyPair<RistrettoPoint>,
    params: PedersenParameters<RistrettoPoint>,
}

impl Utility {
    /// Instantiate a new utility for an existing range-proof context.
    pub fn new(
        rng: &mut impl Rng,
        config: &BillingConfig,
        context: &ProofContext,
    ) -> Result<Self, Error> {
        let params = context
            .pedersen_parameters(0)
            .ok_or(SetupError::NoProofs)?;
        let keypair = KeyPair::with_generator(rng, params.value_generator())?;
        Ok(Self {
            config: *config,
            keypair,
            params,
        })
    }

    /// Set up a fresh range-proof context for reports of `n_readings` readings of `n_bits` bits
    /// each, and a utility bound to it.
    ///
    /// Meters rebuild the context from [`ProofContext::parameters()`].
    pub fn setup(
        rng: &mut impl Rng,
        config: &BillingConfig,
        n_readings: usize,
        n_bits: usize,
    ) -> Result<(Self, ProofContext), Error> {
        let context = ProofContext::setup(rng, &config.range_proof, 1, n_readings, n_bits)?;
        let utility = Self::new(rng, config, &context)?;
        Ok((utility, context))
    }

    /// The key meters encrypt their readings under.
    pub fn public_key(&self) -> &PublicKey<RistrettoPoint> {
        self.keypair.public_key()
    }

    /**
    Check a meter report against `context`.

    The report verifies when every range proof verifies and every ciphertext is bound to the
    commitment of its reading. Reports of the wrong shape fail.

    This should only be called if the report's [`Nonce`](crate::Nonce) has never been seen before.
    */
    pub fn verify_report(
        &self,
        rng: &mut impl Rng,
        context: &mut ProofContext,
        report: &MeterReport,
    ) -> Verification {
        let meter = report.meter_id;
        let n_readings = context.parameters().n_commits;
        if report.ciphertexts.len() != n_readings || report.equivalence_proofs.len() != n_readings
        {
            warn!(%meter, "meter report has the wrong number of readings");
            return Verification::Failed;
        }

        match context.verify(rng, &report.range_proofs, &report.commitments) {
            Ok(Verification::Verified) => {}
            Ok(Verification::Failed) => {
                warn!(%meter, "meter report range proofs failed");
                return Verification::Failed;
            }
            Err(err) => {
                warn!(%meter, %err, "meter report does not match the proof context");
                return Verification::Failed;
            }
        }

        let commitments = match report.commitments.slot(0) {
            Some(commitments) => commitments,
            None => return Verification::Failed,
        };
        for (index, ((proof, ciphertext), commitment)) in report
            .equivalence_proofs
            .iter()
            .zip(&report.ciphertexts)
            .zip(commitments)
            .enumerate()
        {
            let challenge =
                binding_challenge(meter, report.nonce, &self.params, self.public_key(), proof);
            if proof.ciphertext() != *ciphertext
                || proof.commitment() != *commitment
                || !proof.verify_equivalence(&self.params, self.public_key(), challenge)
            {
                warn!(%meter, index, "reading is not bound to its commitment");
                return Verification::Failed;
            }
        }

        debug!(%meter, "meter report verified");
        Verification::Verified
    }

    /// Precompute the discrete logarithms of every bill up to the configured maximum.
    pub fn discrete_log_table(&self) -> DiscreteLogTable<RistrettoPoint> {
        DiscreteLogTable::new(self.params.value_generator(), self.config.max_bill)
    }

    /**
    Compute the total bill over a set of verified reports.

    The readings are added homomorphically; only the total is decrypted. Fails with
    [`PlaintextNotFound`](zkmeter_crypto::Error::PlaintextNotFound) if the total exceeds the
    range of `table`.
    */
    pub fn bill<'a>(
        &self,
        reports: impl IntoIterator<Item = &'a MeterReport>,
        table: &DiscreteLogTable<RistrettoPoint>,
    ) -> Result<u64, Error> {
        let total: Ciphertext<RistrettoPoint> = reports.into_iter().map(MeterReport::total).sum();
        let bill = self.keypair.secret_key().decrypt_with_table(&total, table)?;
        debug!("bill decrypted");
        Ok(bill)
    }
}
