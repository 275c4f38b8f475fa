//! Fairness Monitor
//!
//! Computes group-wise approval rates over a static reference population
//! for governance reporting. The audit re-encodes and re-scores the whole
//! population with the live encoder, scaler and model; any divergence
//! between monitor-time and live-time encoding is a correctness bug.
//!
//! The snapshot is informational only. Nothing here feeds back into the
//! decision policy or the explanation engine, and the audit is pure:
//! the same population and model always produce the same rates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::LabeledRecord;
use crate::encode::ApplicantRecord;
use crate::model::ModelArtifacts;
use crate::{Error, Result};

/// The monitor's own approval cutoff for its binary approve/deny view
///
/// Intentionally distinct from the three-band decision thresholds; the
/// asymmetry is preserved from the governing business rules, not an
/// oversight to reconcile.
pub const APPROVAL_THRESHOLD: f64 = 0.65;

/// Which protected attribute an audit groups by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProtectedAttribute {
    /// Group by the sex code
    Sex,
    /// Group by the marital status code
    Marriage,
    /// Group by the education code
    Education,
}

impl Default for ProtectedAttribute {
    fn default() -> Self {
        ProtectedAttribute::Sex
    }
}

impl ProtectedAttribute {
    /// Human-readable group label for a record, using the UCI code maps
    pub fn group_label(&self, record: &ApplicantRecord) -> &'static str {
        match self {
            ProtectedAttribute::Sex => match record.sex {
                1 => "Male",
                2 => "Female",
                _ => "Unknown",
            },
            ProtectedAttribute::Marriage => match record.marriage {
                1 => "Married",
                2 => "Single",
                3 => "Others",
                _ => "Unknown",
            },
            ProtectedAttribute::Education => match record.education {
                1 => "Graduate school",
                2 => "University",
                3 => "High school",
                4 => "Others",
                _ => "Unknown",
            },
        }
    }
}

/// Group approval rates plus the max-min disparity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessSnapshot {
    /// Approval rate per group label, in stable label order
    pub group_rates: BTreeMap<String, f64>,
    /// Highest minus lowest group approval rate (0 for a single group)
    pub disparity: f64,
    /// Number of audited rows
    pub population_size: usize,
    /// When the snapshot was computed
    pub generated_at: DateTime<Utc>,
}

/// Audit the reference population grouped by a protected attribute
///
/// Approval here means the scored probability falls below the monitor's
/// [`APPROVAL_THRESHOLD`]. Idempotent and side-effect-free.
pub fn audit(
    population: &[LabeledRecord],
    artifacts: &ModelArtifacts,
    attribute: ProtectedAttribute,
) -> Result<FairnessSnapshot> {
    if population.is_empty() {
        return Err(Error::Dataset(
            "cannot audit an empty reference population".to_string(),
        ));
    }

    let mut approved: BTreeMap<&str, usize> = BTreeMap::new();
    let mut totals: BTreeMap<&str, usize> = BTreeMap::new();

    for labeled in population {
        let probability = artifacts.predict_probability(&labeled.record)?;
        let label = attribute.group_label(&labeled.record);
        *totals.entry(label).or_insert(0) += 1;
        if probability < APPROVAL_THRESHOLD {
            *approved.entry(label).or_insert(0) += 1;
        }
    }

    let group_rates: BTreeMap<String, f64> = totals
        .iter()
        .map(|(label, total)| {
            let rate = approved.get(label).copied().unwrap_or(0) as f64 / *total as f64;
            (label.to_string(), rate)
        })
        .collect();

    let max = group_rates.values().cloned().fold(f64::MIN, f64::max);
    let min = group_rates.values().cloned().fold(f64::MAX, f64::min);
    let disparity = if group_rates.len() > 1 { max - min } else { 0.0 };

    Ok(FairnessSnapshot {
        group_rates,
        disparity,
        population_size: population.len(),
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LogisticModel, StandardScaler};
    use crate::schema::{names, FeatureSchema};
    use ndarray::Array1;
    use proptest::prelude::*;

    /// Artifacts where only `has_delay` drives the score, strongly.
    fn delay_driven_artifacts() -> ModelArtifacts {
        let schema = FeatureSchema::credit_default();
        let n = schema.len();
        let scaler = StandardScaler::new(Array1::zeros(n), Array1::ones(n)).unwrap();

        let mut coefs = Array1::zeros(n);
        coefs[schema.index_of(names::HAS_DELAY).unwrap()] = 10.0;
        let model = LogisticModel::new(coefs, -5.0).unwrap();
        ModelArtifacts::new(schema, scaler, model).unwrap()
    }

    fn row(sex: u8, pay_0: i32) -> LabeledRecord {
        LabeledRecord {
            record: ApplicantRecord::new(50_000.0, 30.0, pay_0, 1_000.0, 1_000.0)
                .with_demographics(sex, 1, 2),
            default: pay_0 > 0,
        }
    }

    #[test]
    fn test_group_rates_and_disparity() {
        // Males: 2 of 2 approved. Females: 1 of 2 approved.
        let population = vec![row(1, 0), row(1, 0), row(2, 0), row(2, 3)];
        let artifacts = delay_driven_artifacts();

        let snapshot = audit(&population, &artifacts, ProtectedAttribute::Sex).unwrap();
        assert_eq!(snapshot.population_size, 4);
        assert_eq!(snapshot.group_rates["Male"], 1.0);
        assert_eq!(snapshot.group_rates["Female"], 0.5);
        assert!((snapshot.disparity - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_group_has_zero_disparity() {
        let population = vec![row(1, 0), row(1, 4)];
        let artifacts = delay_driven_artifacts();

        let snapshot = audit(&population, &artifacts, ProtectedAttribute::Sex).unwrap();
        assert_eq!(snapshot.group_rates.len(), 1);
        assert_eq!(snapshot.disparity, 0.0);
    }

    #[test]
    fn test_audit_is_idempotent() {
        let population = vec![row(1, 0), row(2, 2), row(2, 0), row(1, 5)];
        let artifacts = delay_driven_artifacts();

        let a = audit(&population, &artifacts, ProtectedAttribute::Sex).unwrap();
        let b = audit(&population, &artifacts, ProtectedAttribute::Sex).unwrap();
        assert_eq!(a.group_rates, b.group_rates);
        assert_eq!(a.disparity, b.disparity);
    }

    #[test]
    fn test_empty_population_rejected() {
        let artifacts = delay_driven_artifacts();
        assert!(audit(&[], &artifacts, ProtectedAttribute::Sex).is_err());
    }

    #[test]
    fn test_group_labels() {
        let record = ApplicantRecord::new(1.0, 1.0, 0, 1.0, 1.0).with_demographics(2, 3, 1);
        assert_eq!(ProtectedAttribute::Sex.group_label(&record), "Female");
        assert_eq!(ProtectedAttribute::Marriage.group_label(&record), "Others");
        assert_eq!(
            ProtectedAttribute::Education.group_label(&record),
            "Graduate school"
        );

        let unknown = ApplicantRecord::new(1.0, 1.0, 0, 1.0, 1.0);
        assert_eq!(ProtectedAttribute::Sex.group_label(&unknown), "Unknown");
    }

    proptest! {
        #[test]
        fn prop_disparity_non_negative_and_rates_in_range(
            delays in proptest::collection::vec(-1i32..6, 2..40),
            sexes in proptest::collection::vec(1u8..3, 2..40),
        ) {
            let population: Vec<LabeledRecord> = delays
                .iter()
                .zip(sexes.iter().cycle())
                .map(|(&pay_0, &sex)| row(sex, pay_0))
                .collect();
            let artifacts = delay_driven_artifacts();

            let snapshot = audit(&population, &artifacts, ProtectedAttribute::Sex).unwrap();
            prop_assert!(snapshot.disparity >= 0.0);
            prop_assert!(snapshot
                .group_rates
                .values()
                .all(|r| (0.0..=1.0).contains(r)));
        }
    }
}
