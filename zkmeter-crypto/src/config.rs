//! Tunable resource limits for the range-proof engine.
//!
//! ```
//! # use zkmeter_crypto::RangeProofConfig;
//! let config: RangeProofConfig = serde_json::from_str(r#"{ "max_proof_size": 4096 }"#).unwrap();
//! assert_eq!(config.max_proof_size, 4096);
//! assert_eq!(config.scratch_space_bytes, RangeProofConfig::default().scratch_space_bytes);
//! ```

use serde::{Deserialize, Serialize};

/// Default scratch budget: 1 GiB.
pub const DEFAULT_SCRATCH_SPACE_BYTES: usize = 1024 * 1024 * 1024;

/// Default upper bound on the length of a single serialized range proof.
pub const DEFAULT_MAX_PROOF_SIZE: usize = 2000;

/// Resource limits applied when setting up a [`ProofContext`](crate::proofs::ProofContext).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeProofConfig {
    /// Memory budget for the generator tables and proof buffers of one context.
    pub scratch_space_bytes: usize,
    /// Maximum length in bytes of one range proof.
    pub max_proof_size: usize,
}

impl Default for RangeProofConfig {
    fn default() -> Self {
        Self {
            scratch_space_bytes: DEFAULT_SCRATCH_SPACE_BYTES,
            max_proof_size: DEFAULT_MAX_PROOF_SIZE,
        }
    }
}
