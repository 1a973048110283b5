/*!
This crate describes a privacy-preserving smart-meter billing protocol built on the primitives in
`zkmeter-crypto`.

A [`Meter`](meter::Meter) reports a billing period's readings as ElGamal ciphertexts under the
utility's key, together with Bulletproof range proofs on Pedersen commitments to the readings and
one equivalence proof per reading binding its ciphertext to its commitment. The
[`Utility`](utility::Utility) checks a [`MeterReport`] without learning any reading, then adds
the ciphertexts of all reports homomorphically and decrypts only the total bill.

Everything runs on Ristretto: the range-proof backend requires it.
*/
#![warn(missing_docs)]
#![warn(missing_copy_implementations, missing_debug_implementations)]
#![warn(unused_qualifications, unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod meter;
pub mod utility;

pub use config::BillingConfig;
pub use nonce::Nonce;
pub use report::{MeterId, MeterReport, MeterReportOpening};
pub use zkmeter_crypto::{Rng, Verification};

mod nonce;
mod report;

use thiserror::Error;
use zkmeter_crypto::proofs::{CommitmentError, ProofGenerationError, SetupError};

#[allow(unused)]
mod types {
    pub use curve25519_dalek::{RistrettoPoint, Scalar};
    pub use zkmeter_crypto::{
        elgamal::{Ciphertext, DiscreteLogTable, KeyPair, PublicKey},
        pedersen::{Commitment, PedersenParameters},
        proofs::*,
        BlindingFactor,
    };
}

/// Failures of the billing protocol.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A primitive failed: a bad encoding, a generator mismatch or an undecryptable bill.
    #[error(transparent)]
    Crypto(#[from] zkmeter_crypto::Error),
    /// The range-proof context could not be set up.
    #[error(transparent)]
    Setup(#[from] SetupError),
    /// The readings could not be committed.
    #[error(transparent)]
    Commitment(#[from] CommitmentError),
    /// The range proofs could not be generated.
    #[error(transparent)]
    Proof(#[from] ProofGenerationError),
}
