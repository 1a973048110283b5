use rand::{rngs::StdRng, SeedableRng};

// Seeded rng for replicable tests.
pub fn seeded_rng() -> StdRng {
    const TEST_RNG_SEED: [u8; 32] = *b"NEVER USE THIS FOR ANYTHING REAL";
    StdRng::from_seed(TEST_RNG_SEED)
}
