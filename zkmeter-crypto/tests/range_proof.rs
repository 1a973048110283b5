mod test_utils;

use zkmeter_crypto::{
    proofs::{
        CommitmentError, ContextState, ProofContext, ProofGenerationError, RangeProof,
        RangeProofParameters, SetupError, VerifyError,
    },
    RangeProofConfig, Verification,
};

#[test_log::test]
fn range_proof_verifies() {
    let mut rng = test_utils::seeded_rng();

    for (n_proofs, values, n_bits) in [
        (1, vec![10, 200], 8),
        (2, vec![0, 255], 8),
        (1, vec![65535], 16),
        (3, vec![1, 2, 3, 4], 32),
        (1, vec![u64::MAX, 0], 64),
        (1, vec![10, 200, 255], 8),
        (2, vec![7, 0, 65535, 3, 9], 16),
    ] {
        let mut context = test_utils::context(&mut rng, n_proofs, values.len(), n_bits);
        let (batch, opening) = context.commit(&mut rng, &values).unwrap();
        let proofs = context.prove(&mut rng, &batch, &opening).unwrap();
        assert_eq!(proofs.len(), n_proofs);

        assert_eq!(
            context.verify(&mut rng, &proofs, &batch),
            Ok(Verification::Verified),
            "{} proofs over {:?} in {} bits",
            n_proofs,
            values,
            n_bits
        );
        context.teardown();
    }
}

#[test]
fn out_of_range_value_is_not_proved() {
    let mut rng = test_utils::seeded_rng();
    let mut context = test_utils::context(&mut rng, 1, 2, 8);

    let (batch, opening) = context.commit(&mut rng, &[10, 300]).unwrap();
    assert_eq!(
        context.prove(&mut rng, &batch, &opening),
        Err(ProofGenerationError::ValueOutOfRange {
            index: 1,
            n_bits: 8
        })
    );
    assert_eq!(context.state(), ContextState::Committed);
}

#[test]
fn corrupting_one_proof_fails_the_batch() {
    let mut rng = test_utils::seeded_rng();
    let mut context = test_utils::context(&mut rng, 3, 2, 16);
    let (batch, opening) = context.commit(&mut rng, &[1234, 4321]).unwrap();
    let proofs = context.prove(&mut rng, &batch, &opening).unwrap();

    for slot in 0..proofs.len() {
        for position in [0, 100, proofs[slot].as_bytes().len() - 1] {
            let mut tampered = proofs.clone();
            let mut bytes = tampered[slot].to_bytes();
            bytes[4 + position] ^= 0x01;
            tampered[slot] = RangeProof::from_bytes(&bytes, 2000).unwrap();

            assert_eq!(
                context.verify(&mut rng, &tampered, &batch),
                Ok(Verification::Failed),
                "byte {} of proof {} was flipped",
                position,
                slot
            );
        }
    }

    assert_eq!(
        context.verify(&mut rng, &proofs, &batch),
        Ok(Verification::Verified)
    );
}

#[test]
fn proofs_do_not_verify_against_other_commitments() {
    let mut rng = test_utils::seeded_rng();
    let mut context = test_utils::context(&mut rng, 1, 2, 8);
    let (batch, opening) = context.commit(&mut rng, &[10, 20]).unwrap();
    let proofs = context.prove(&mut rng, &batch, &opening).unwrap();

    let (other_batch, _) = context.commit(&mut rng, &[10, 20]).unwrap();
    assert_eq!(
        context.verify(&mut rng, &proofs, &other_batch),
        Ok(Verification::Failed)
    );
}

#[test]
fn verifier_rebuilds_context_from_parameters() {
    let mut rng = test_utils::seeded_rng();
    let config = RangeProofConfig::default();
    let mut prover = ProofContext::setup(&mut rng, &config, 2, 2, 8).unwrap();
    let (batch, opening) = prover.commit(&mut rng, &[10, 200]).unwrap();
    let proofs = prover.prove(&mut rng, &batch, &opening).unwrap();

    // The verifier only sees public data, sent over the wire.
    let parameters = serde_json::to_string(prover.parameters()).unwrap();
    let batch: zkmeter_crypto::proofs::CommitmentBatch =
        bincode::deserialize(&bincode::serialize(&batch).unwrap()).unwrap();
    let proofs: Vec<RangeProof> = proofs
        .iter()
        .map(|proof| RangeProof::from_bytes(&proof.to_bytes(), config.max_proof_size).unwrap())
        .collect();

    let mut verifier =
        ProofContext::from_parameters(&config, serde_json::from_str(&parameters).unwrap())
            .unwrap();
    assert_eq!(verifier.state(), ContextState::Configured);
    assert_eq!(
        verifier.verify(&mut rng, &proofs, &batch),
        Ok(Verification::Verified)
    );
    assert_eq!(verifier.state(), ContextState::Verified);

    // A context with a different nonce does not accept the proofs.
    let mut stranger = ProofContext::setup(&mut rng, &config, 2, 2, 8).unwrap();
    assert_eq!(
        stranger.verify(&mut rng, &proofs, &batch),
        Ok(Verification::Failed)
    );
}

#[test]
fn lifecycle_states() {
    let mut rng = test_utils::seeded_rng();
    let mut context = test_utils::context(&mut rng, 1, 1, 8);
    assert_eq!(context.state(), ContextState::Configured);

    let (batch, opening) = context.commit(&mut rng, &[7]).unwrap();
    assert_eq!(context.state(), ContextState::Committed);

    let proofs = context.prove(&mut rng, &batch, &opening).unwrap();
    assert_eq!(context.state(), ContextState::Proved);

    assert!(context.verify(&mut rng, &proofs, &batch).unwrap().is_verified());
    assert_eq!(context.state(), ContextState::Verified);

    // Verifying again is allowed.
    assert!(context.verify(&mut rng, &proofs, &batch).unwrap().is_verified());
    context.teardown();
}

#[test]
fn prove_requires_commit() {
    let mut rng = test_utils::seeded_rng();
    let mut committer = test_utils::context(&mut rng, 1, 1, 8);
    let (batch, opening) = committer.commit(&mut rng, &[7]).unwrap();

    let mut fresh = test_utils::context(&mut rng, 1, 1, 8);
    assert_eq!(
        fresh.prove(&mut rng, &batch, &opening),
        Err(ProofGenerationError::InvalidState(ContextState::Configured))
    );
}

#[test]
fn prove_rejects_foreign_batch() {
    let mut rng = test_utils::seeded_rng();
    let mut first = test_utils::context(&mut rng, 1, 2, 8);
    let mut second = test_utils::context(&mut rng, 1, 2, 8);
    let (batch, _) = first.commit(&mut rng, &[1, 2]).unwrap();
    let (_, opening) = second.commit(&mut rng, &[1, 2]).unwrap();

    assert_eq!(
        second.prove(&mut rng, &batch, &opening),
        Err(ProofGenerationError::CommitmentMismatch { slot: 0 })
    );

    let mut wide = test_utils::context(&mut rng, 2, 2, 8);
    let (_, wide_opening) = wide.commit(&mut rng, &[1, 2]).unwrap();
    assert_eq!(
        wide.prove(&mut rng, &batch, &wide_opening),
        Err(ProofGenerationError::BatchShapeMismatch)
    );
}

#[test]
fn commit_checks_value_count() {
    let mut rng = test_utils::seeded_rng();
    let mut context = test_utils::context(&mut rng, 1, 2, 8);
    assert_eq!(
        context.commit(&mut rng, &[1, 2, 3]).unwrap_err(),
        CommitmentError::ValueCountMismatch {
            expected: 2,
            got: 3
        }
    );
    assert_eq!(context.state(), ContextState::Configured);
}

#[test]
fn verify_checks_input_shape() {
    let mut rng = test_utils::seeded_rng();
    let mut context = test_utils::context(&mut rng, 2, 1, 8);
    let (batch, opening) = context.commit(&mut rng, &[5]).unwrap();
    let proofs = context.prove(&mut rng, &batch, &opening).unwrap();

    assert_eq!(
        context.verify(&mut rng, &proofs[..1], &batch),
        Err(VerifyError::ProofCountMismatch {
            expected: 2,
            got: 1
        })
    );

    let mut narrow = test_utils::context(&mut rng, 1, 1, 8);
    let (narrow_batch, _) = narrow.commit(&mut rng, &[5]).unwrap();
    assert_eq!(
        context.verify(&mut rng, &proofs, &narrow_batch),
        Err(VerifyError::CommitmentShapeMismatch)
    );
}

#[test]
fn garbage_proof_bytes_fail_verification() {
    let mut rng = test_utils::seeded_rng();
    let mut context = test_utils::context(&mut rng, 1, 1, 8);
    let (batch, _) = context.commit(&mut rng, &[5]).unwrap();

    let mut garbage = 17u32.to_le_bytes().to_vec();
    garbage.extend_from_slice(&[0xab; 17]);
    let proofs = vec![RangeProof::from_bytes(&garbage, 2000).unwrap()];
    assert_eq!(
        context.verify(&mut rng, &proofs, &batch),
        Ok(Verification::Failed)
    );
}

#[test]
fn setup_validates_shape_and_limits() {
    let mut rng = test_utils::seeded_rng();
    let config = RangeProofConfig::default();

    assert_eq!(
        ProofContext::setup(&mut rng, &config, 0, 1, 8).unwrap_err(),
        SetupError::NoProofs
    );
    assert_eq!(
        ProofContext::setup(&mut rng, &config, 1, usize::MAX, 8).unwrap_err(),
        SetupError::InvalidCommitmentCount(usize::MAX)
    );
    assert_eq!(
        ProofContext::setup(&mut rng, &config, 1, 0, 8).unwrap_err(),
        SetupError::InvalidCommitmentCount(0)
    );
    assert_eq!(
        ProofContext::setup(&mut rng, &config, 1, 1, 12).unwrap_err(),
        SetupError::UnsupportedBitWidth(12)
    );

    let tiny_scratch = RangeProofConfig {
        scratch_space_bytes: 1024,
        ..config
    };
    assert!(matches!(
        ProofContext::setup(&mut rng, &tiny_scratch, 1, 2, 8),
        Err(SetupError::ScratchSpaceExhausted {
            available: 1024,
            ..
        })
    ));

    let tiny_proofs = RangeProofConfig {
        max_proof_size: 100,
        ..config
    };
    assert!(matches!(
        ProofContext::setup(&mut rng, &tiny_proofs, 1, 2, 8),
        Err(SetupError::ProofSizeLimit { max: 100, .. })
    ));
}

#[test]
fn slot_parameters_open_batch_commitments() {
    let mut rng = test_utils::seeded_rng();
    let mut context = test_utils::context(&mut rng, 2, 2, 8);
    let (batch, opening) = context.commit(&mut rng, &[33, 44]).unwrap();

    for slot in 0..2 {
        let params = context.pedersen_parameters(slot).unwrap();
        let commitments = batch.slot(slot).unwrap();
        for ((com, &value), &bf) in commitments
            .iter()
            .zip(opening.values())
            .zip(opening.blinding_factors())
        {
            assert!(com.verify_opening(&params, bf, value));
        }
    }
    assert_ne!(batch.slot(0), batch.slot(1));
}

#[test]
fn batch_of_three_values_verifies() {
    let mut rng = test_utils::seeded_rng();
    let mut context = test_utils::context(&mut rng, 1, 3, 16);
    let (batch, opening) = context.commit(&mut rng, &[1000, 0, 42]).unwrap();
    assert_eq!(batch.slot(0).unwrap().len(), 3);
    assert_eq!(opening.values(), &[1000, 0, 42]);
    let proofs = context.prove(&mut rng, &batch, &opening).unwrap();

    let mut verifier =
        ProofContext::from_parameters(&RangeProofConfig::default(), *context.parameters())
            .unwrap();
    assert_eq!(
        verifier.verify(&mut rng, &proofs, &batch),
        Ok(Verification::Verified)
    );

    // The padding is internal: a batch of three must not be verified as a batch of four.
    let (other, _) = context.commit(&mut rng, &[1000, 0, 43]).unwrap();
    assert_eq!(
        verifier.verify(&mut rng, &proofs, &other),
        Ok(Verification::Failed)
    );
    assert_eq!(
        context.commit(&mut rng, &[1, 2, 3, 4]).unwrap_err(),
        CommitmentError::ValueCountMismatch {
            expected: 3,
            got: 4
        }
    );
}

#[test]
fn out_of_range_value_in_padded_batch_is_not_proved() {
    let mut rng = test_utils::seeded_rng();
    let mut context = test_utils::context(&mut rng, 1, 3, 8);
    let (batch, opening) = context.commit(&mut rng, &[10, 300, 20]).unwrap();
    assert_eq!(
        context.prove(&mut rng, &batch, &opening).unwrap_err(),
        ProofGenerationError::ValueOutOfRange {
            index: 1,
            n_bits: 8
        }
    );
}

#[test]
fn oversized_parameters_are_rejected() {
    let mut rng = test_utils::seeded_rng();
    let context = test_utils::context(&mut rng, 1, 1, 64);
    let huge = RangeProofParameters {
        n_commits: 1 << 60,
        ..*context.parameters()
    };

    assert!(matches!(
        ProofContext::from_parameters(&RangeProofConfig::default(), huge),
        Err(SetupError::ScratchSpaceExhausted { .. })
    ));

    let unbounded_scratch = RangeProofConfig {
        scratch_space_bytes: usize::MAX,
        ..RangeProofConfig::default()
    };
    assert!(matches!(
        ProofContext::from_parameters(&unbounded_scratch, huge),
        Err(SetupError::ProofSizeLimit { .. })
    ));
}
