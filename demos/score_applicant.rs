//! Example: Score an Applicant
//!
//! Trains a small model on a synthetic reference population, then scores
//! two applicants and prints the decision, reason codes and attributions.

use riesgo::data::LabeledRecord;
use riesgo::encode::ApplicantRecord;
use riesgo::pipeline::{PipelineOptions, ScoringContext};
use riesgo::schema::FeatureSchema;
use riesgo::train::{train, TrainConfig};

/// Synthetic applicants: delayed payers with weak repayment default.
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

fn print_response(label: &str, response: &riesgo::ScoreResponse) {
    println!("{label}");
    println!("  Probability of default: {:.2}%", response.probability * 100.0);
    println!("  Decision: {}", response.band);
    if response.reason_codes.is_empty() {
        println!("  Reason codes: none (favorable decision)");
    } else {
        println!("  Reason codes:");
        for code in &response.reason_codes {
            println!("    - {code}");
        }
        println!("  Top contributions:");
        for attribution in &response.attributions {
            println!("    {:>24}: {:+.4}", attribution.feature, attribution.value);
        }
    }
    println!();
}

fn main() -> riesgo::Result<()> {
    println!("=== Applicant Scoring Example ===\n");

    let population = reference_population(400);
    println!("Reference population: {} labeled rows", population.len());

    let schema = FeatureSchema::credit_default();
    let (artifacts, report) = train(&population, &schema, &TrainConfig::default())?;
    println!(
        "Trained model: holdout accuracy {:.3}, ROC-AUC {:.3}\n",
        report.accuracy, report.roc_auc
    );

    let options = PipelineOptions {
        background_size: 100,
        background_seed: Some(42),
        ..PipelineOptions::default()
    };
    let context = ScoringContext::build(artifacts, &population, options)?;

    // Clean history, healthy repayment.
    let good =
        ApplicantRecord::new(200_000.0, 45.0, -1, 10_000.0, 30_000.0).with_demographics(2, 1, 1);
    print_response("Applicant A (no delays, strong repayment):", &context.score(&good)?);

    // Two months delinquent, heavily utilized, barely repaying.
    let risky =
        ApplicantRecord::new(50_000.0, 29.0, 2, 45_000.0, 800.0).with_demographics(1, 2, 3);
    print_response("Applicant B (delinquent, high utilization):", &context.score(&risky)?);

    Ok(())
}
