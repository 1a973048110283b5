mod test_utils;

use zkbill_crypto::{
    meter::Meter, utility::Utility, BillingConfig, Error, MeterId, MeterReport, Verification,
};
use zkmeter_crypto::proofs::{ProofContext, ProofGenerationError};

const N_READINGS: usize = 4;

fn small_config() -> BillingConfig {
    BillingConfig {
        max_bill: 4 * 255 * 3,
        ..BillingConfig::default()
    }
}

#[test_log::test]
fn billing_period_end_to_end() {
    let mut rng = test_utils::seeded_rng();
    let config = small_config();
    let (utility, mut context) = Utility::setup(&mut rng, &config, N_READINGS, 8).unwrap();

    let readings = [[12, 0, 255, 31], [1, 2, 3, 4], [200, 100, 50, 25]];
    let mut reports = Vec::new();
    for (serial, readings) in readings.iter().enumerate() {
        let meter = Meter::new(MeterId::new(serial as u64), *utility.public_key());
        let mut meter_context =
            ProofContext::from_parameters(&config.range_proof, *context.parameters()).unwrap();
        let (report, opening) = meter.report(&mut rng, &mut meter_context, readings).unwrap();
        assert_eq!(opening.readings(), readings);
        assert_eq!(report.meter_id(), meter.id());
        meter_context.teardown();

        assert_eq!(
            utility.verify_report(&mut rng, &mut context, &report),
            Verification::Verified
        );
        reports.push(report);
    }

    let table = utility.discrete_log_table();
    let expected: u64 = readings.iter().flatten().sum();
    assert_eq!(utility.bill(&reports, &table), Ok(expected));
    assert_eq!(utility.bill(&reports[1..2], &table), Ok(10));
    context.teardown();
}

#[test]
fn out_of_range_reading_is_not_reported() {
    let mut rng = test_utils::seeded_rng();
    let (utility, mut context) = Utility::setup(&mut rng, &small_config(), 2, 8).unwrap();
    let meter = Meter::new(MeterId::new(7), *utility.public_key());

    assert_eq!(
        meter.report(&mut rng, &mut context, &[10, 300]).unwrap_err(),
        Error::Proof(ProofGenerationError::ValueOutOfRange {
            index: 1,
            n_bits: 8
        })
    );
}

#[test]
fn report_survives_the_wire() {
    let mut rng = test_utils::seeded_rng();
    let config = small_config();
    let (utility, mut context) = Utility::setup(&mut rng, &config, 2, 16).unwrap();
    let meter = Meter::new(MeterId::new(1), *utility.public_key());
    let (report, _) = meter.report(&mut rng, &mut context, &[1000, 2000]).unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let from_json: MeterReport = serde_json::from_str(&json).unwrap();
    let from_bincode: MeterReport =
        bincode::deserialize(&bincode::serialize(&report).unwrap()).unwrap();
    assert_eq!(from_json, report);
    assert_eq!(from_bincode, report);

    assert!(utility
        .verify_report(&mut rng, &mut context, &from_bincode)
        .is_verified());
}

#[test]
fn report_from_another_meter_id_fails() {
    let mut rng = test_utils::seeded_rng();
    let (utility, mut context) = Utility::setup(&mut rng, &small_config(), 2, 8).unwrap();
    let meter = Meter::new(MeterId::new(1), *utility.public_key());
    let (report, _) = meter.report(&mut rng, &mut context, &[5, 6]).unwrap();

    // Claim the report came from another meter: the binding proofs no longer verify.
    let mut json: serde_json::Value = serde_json::to_value(&report).unwrap();
    json["meter_id"] = serde_json::json!(2);
    let forged: MeterReport = serde_json::from_value(json).unwrap();
    assert_eq!(forged.meter_id(), MeterId::new(2));
    assert_eq!(
        utility.verify_report(&mut rng, &mut context, &forged),
        Verification::Failed
    );
}

#[test]
fn swapped_ciphertexts_fail() {
    let mut rng = test_utils::seeded_rng();
    let (utility, mut context) = Utility::setup(&mut rng, &small_config(), 2, 8).unwrap();
    let meter = Meter::new(MeterId::new(3), *utility.public_key());
    let (report, _) = meter.report(&mut rng, &mut context, &[5, 250]).unwrap();

    let mut json: serde_json::Value = serde_json::to_value(&report).unwrap();
    let ciphertexts = json["ciphertexts"].as_array_mut().unwrap();
    ciphertexts.swap(0, 1);
    let forged: MeterReport = serde_json::from_value(json).unwrap();
    assert_eq!(
        utility.verify_report(&mut rng, &mut context, &forged),
        Verification::Failed
    );
}

#[test]
fn report_for_another_utility_fails() {
    let mut rng = test_utils::seeded_rng();
    let config = small_config();
    let (utility, mut context) = Utility::setup(&mut rng, &config, 2, 8).unwrap();
    let other = Utility::new(&mut rng, &config, &context).unwrap();

    let meter = Meter::new(MeterId::new(4), *other.public_key());
    let (report, _) = meter.report(&mut rng, &mut context, &[8, 9]).unwrap();
    assert!(other
        .verify_report(&mut rng, &mut context, &report)
        .is_verified());
    assert_eq!(
        utility.verify_report(&mut rng, &mut context, &report),
        Verification::Failed
    );
}

#[test]
fn meter_needs_key_on_context_generator() {
    let mut rng = test_utils::seeded_rng();
    let config = small_config();
    let (utility, _) = Utility::setup(&mut rng, &config, 2, 8).unwrap();

    // A context with a different generator seed.
    let mut foreign = ProofContext::setup(&mut rng, &config.range_proof, 1, 2, 8).unwrap();
    let meter = Meter::new(MeterId::new(5), *utility.public_key());
    assert_eq!(
        meter.report(&mut rng, &mut foreign, &[1, 2]).unwrap_err(),
        Error::Crypto(zkmeter_crypto::Error::GeneratorMismatch)
    );
}

#[test]
fn bill_over_table_range_is_an_error() {
    let mut rng = test_utils::seeded_rng();
    let config = BillingConfig {
        max_bill: 100,
        ..small_config()
    };
    let (utility, mut context) = Utility::setup(&mut rng, &config, 2, 8).unwrap();
    let meter = Meter::new(MeterId::new(6), *utility.public_key());
    let (report, _) = meter.report(&mut rng, &mut context, &[60, 50]).unwrap();

    let table = utility.discrete_log_table();
    assert_eq!(
        utility.bill([&report], &table),
        Err(Error::Crypto(zkmeter_crypto::Error::PlaintextNotFound {
            max_plaintext: 100
        }))
    );
}

#[test]
fn three_readings_per_period_are_billed() {
    let mut rng = test_utils::seeded_rng();
    let config = small_config();
    let (utility, mut context) = Utility::setup(&mut rng, &config, 3, 16).unwrap();
    assert_eq!(context.parameters().n_commits, 3);

    let meter = Meter::new(MeterId::new(8), *utility.public_key());
    let (report, opening) = meter.report(&mut rng, &mut context, &[300, 0, 700]).unwrap();
    assert_eq!(opening.readings(), &[300, 0, 700]);
    assert_eq!(
        utility.verify_report(&mut rng, &mut context, &report),
        Verification::Verified
    );
    assert_eq!(utility.bill([&report], &utility.discrete_log_table()), Ok(1000));
}
