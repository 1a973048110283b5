use {curve25519_dalek::RistrettoPoint, thiserror::Error};

use rand::thread_rng;
use zkmeter_crypto::{
    elgamal::{Ciphertext, KeyPair, PublicKey},
    pedersen::PedersenParameters,
    proofs::{
        ChallengeBuilder, CommitmentBatch, EquivalenceProof, EquivalenceProofBuilder,
        ProofContext, ProofGenerationError, RangeProof, VerifyError,
    },
    Error, RangeProofConfig, Rng, Verification,
};

/// An encrypted reading that provably lies in `[0, 2^16)`, without revealing the reading to
/// anyone but the holder of the decryption key.
fn main() {
    let mut rng = thread_rng();
    let config = RangeProofConfig::default();

    // The utility sets up a context and a key on the context's value generator.
    let context = ProofContext::setup(&mut rng, &config, 1, 1, 16)
        .unwrap_or_else(|e| unreachable!("Impossible error while setting up: {}", e));
    let params = context
        .pedersen_parameters(0)
        .unwrap_or_else(|| unreachable!("Context has one proof slot"));
    let utility = KeyPair::with_generator(&mut rng, params.value_generator())
        .unwrap_or_else(|e| unreachable!("Value generators are never the identity: {}", e));

    // The meter rebuilds the context from its public parameters and proves a reading.
    let mut meter_context = ProofContext::from_parameters(&config, *context.parameters())
        .unwrap_or_else(|e| unreachable!("Parameters came from a valid context: {}", e));
    let reading = EncryptedReading::new(&mut rng, &mut meter_context, utility.public_key(), 12345);
    let proof = match reading {
        Ok(proof) => proof,
        Err(e) => unreachable!("Impossible error while generating proof: {}", e),
    };

    // The utility verifies without learning the reading...
    let mut utility_context = context;
    match proof.verify(&mut rng, &mut utility_context, utility.public_key()) {
        Ok(()) => println!("Yay! Proof verified!"),
        Err(e) => eprintln!("Invalid zk proof! {}", e),
    };

    // ...and only the key holder can decrypt it.
    assert_eq!(utility.decrypt(&proof.ciphertext, 20000), Ok(12345));

    // You can't make a proof on a reading that isn't in the range.
    match EncryptedReading::new(&mut rng, &mut meter_context, utility.public_key(), 70000) {
        Ok(_proof) => unreachable!("Impossible error generating range proof on an invalid value!"),
        Err(e) => println!("Got expected error: {}", e),
    };

    meter_context.teardown();
    utility_context.teardown();
}

#[derive(Debug, Error)]
pub enum ReadingError {
    #[error(transparent)]
    Crypto(#[from] Error),
    #[error(transparent)]
    Proof(#[from] ProofGenerationError),
    #[error(transparent)]
    Shape(#[from] VerifyError),
    #[error("Reading must be committed exactly once")]
    Commit,
    #[error("Range proof is not valid")]
    OutOfRange,
    #[error("Ciphertext is not bound to the commitment")]
    Unbound,
}

/// Encryption of a reading, a range proof on a commitment to it, and the proof binding the two.
pub struct EncryptedReading {
    ciphertext: Ciphertext<RistrettoPoint>,
    batch: CommitmentBatch,
    range_proofs: Vec<RangeProof>,
    binding: EquivalenceProof<RistrettoPoint>,
}

impl EncryptedReading {
    pub fn new(
        rng: &mut impl Rng,
        context: &mut ProofContext,
        utility: &PublicKey<RistrettoPoint>,
        reading: u64,
    ) -> Result<Self, ReadingError> {
        let params = pedersen_parameters(context);
        let (batch, opening) = context
            .commit(rng, &[reading])
            .map_err(|_| ReadingError::Commit)?;
        let range_proofs = context.prove(rng, &batch, &opening)?;

        let commitment = batch.slot(0).ok_or(ReadingError::Commit)?[0];
        let (ciphertext, randomness) = utility.encrypt_with_randomness(rng, reading);
        let builder = EquivalenceProofBuilder::generate_proof_commitments(
            rng,
            reading,
            ciphertext,
            &randomness,
            commitment,
            opening.blinding_factors()[0],
            utility,
            &params,
        )?;

        // Generate challenge with all public components of the binding proof
        let challenge = ChallengeBuilder::new()
            .with(&params)
            .with(utility)
            .with(&builder)
            .finish();

        Ok(Self {
            ciphertext,
            batch,
            range_proofs,
            binding: builder.generate_proof_response(challenge),
        })
    }

    pub fn verify(
        &self,
        rng: &mut impl Rng,
        context: &mut ProofContext,
        utility: &PublicKey<RistrettoPoint>,
    ) -> Result<(), ReadingError> {
        // Verify the committed reading is in range
        if context.verify(rng, &self.range_proofs, &self.batch)? == Verification::Failed {
            return Err(ReadingError::OutOfRange);
        }

        // Verify the binding is about this ciphertext and the range-proved commitment
        let params = pedersen_parameters(context);
        let commitment = self.batch.slot(0).ok_or(ReadingError::Unbound)?[0];
        if self.binding.ciphertext() != self.ciphertext || self.binding.commitment() != commitment {
            return Err(ReadingError::Unbound);
        }

        let challenge = ChallengeBuilder::new()
            .with(&params)
            .with(utility)
            .with(&self.binding)
            .finish();
        if !self.binding.verify_equivalence(&params, utility, challenge) {
            return Err(ReadingError::Unbound);
        }

        Ok(())
    }
}

fn pedersen_parameters(context: &ProofContext) -> PedersenParameters<RistrettoPoint> {
    context
        .pedersen_parameters(0)
        .unwrap_or_else(|| unreachable!("Context has one proof slot"))
}
