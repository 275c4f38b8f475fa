//! Example: Fairness Audit
//!
//! Trains on a synthetic population and prints group approval rates and the
//! disparity gap for each protected attribute. The audit is monitoring only:
//! group rates never influence individual decisions.

use riesgo::data::LabeledRecord;
use riesgo::encode::ApplicantRecord;
use riesgo::fairness::{audit, ProtectedAttribute, APPROVAL_THRESHOLD};
use riesgo::schema::FeatureSchema;
use riesgo::train::{train, TrainConfig};

fn reference_population(n: usize) -> Vec<LabeledRecord> {
    (0..n)
        .map(|i| {
            let pay_0 = (i % 5) as i32 - 1;
            let avg_pay = 500.0 + (i % 7) as f64 * 4_000.0;
            LabeledRecord {
                record: ApplicantRecord::new(
                    40_000.0 + (i % 11) as f64 * 15_000.0,
                    25.0 + (i % 30) as f64,
                    pay_0,
                    20_000.0 + (i % 13) as f64 * 3_000.0,
                    avg_pay,
                )
                .with_demographics(1 + (i % 2) as u8, 1 + (i % 3) as u8, 1 + (i % 4) as u8),
                default: pay_0 > 0 && avg_pay < 15_000.0,
            }
        })
        .collect()
}

fn main() -> riesgo::Result<()> {
    println!("=== Fairness Audit Example ===\n");

    let population = reference_population(600);
    let schema = FeatureSchema::credit_default();
    let (artifacts, _) = train(&population, &schema, &TrainConfig::default())?;

    println!(
        "Auditing {} rows, approval means p(default) < {}\n",
        population.len(),
        APPROVAL_THRESHOLD
    );

    for attribute in [
        ProtectedAttribute::Sex,
        ProtectedAttribute::Marriage,
        ProtectedAttribute::Education,
    ] {
        let snapshot = audit(&population, &artifacts, attribute)?;
        println!("{attribute:?}:");
        for (group, rate) in &snapshot.group_rates {
            println!("  {group:>16}: {:.2}% approved", rate * 100.0);
        }
        println!("  Disparity gap: {:.2}%\n", snapshot.disparity * 100.0);
    }

    Ok(())
}
