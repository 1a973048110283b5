#![allow(dead_code)]

use rand::{rngs::StdRng, SeedableRng};
use zkmeter_crypto::{proofs::ProofContext, RangeProofConfig};

/// Seeded rng for replicable tests.
pub fn seeded_rng() -> StdRng {
    const TEST_RNG_SEED: [u8; 32] = *b"NEVER USE THIS FOR ANYTHING REAL";
    StdRng::from_seed(TEST_RNG_SEED)
}

/// A freshly configured range-proof context with the default resource limits.
pub fn context(
    rng: &mut StdRng,
    n_proofs: usize,
    n_commits: usize,
    n_bits: usize,
) -> ProofContext {
    ProofContext::setup(rng, &RangeProofConfig::default(), n_proofs, n_commits, n_bits)
        .expect("default limits fit small contexts")
}
