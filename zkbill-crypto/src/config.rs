//! Settings shared by the utility and its meters.

use serde::{Deserialize, Serialize};
use zkmeter_crypto::RangeProofConfig;

/// Default upper bound on a decryptable bill.
pub const DEFAULT_MAX_BILL: u64 = 1_000_000;

/// Settings for one billing deployment.
///
/// Missing fields take their defaults, so a deployment only needs to spell out what it changes:
///
/// ```
/// # use zkbill_crypto::BillingConfig;
/// let config: BillingConfig = serde_json::from_str(r#"{ "max_bill": 5000 }"#).unwrap();
/// assert_eq!(config.max_bill, 5000);
/// assert_eq!(config.range_proof, Default::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Largest total the utility will decrypt; the size of its discrete log table.
    pub max_bill: u64,
    /// Resource limits for range-proof contexts.
    pub range_proof: RangeProofConfig,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            max_bill: DEFAULT_MAX_BILL,
            range_proof: RangeProofConfig::default(),
        }
    }
}
