//! Pipeline Orchestrator
//!
//! Composes encoder, model, policy, explanation engine and fairness
//! monitor into one request -> response call. All shared state lives in a
//! [`ScoringContext`] constructed once at process start and passed by
//! reference into every call; nothing mutates it afterwards, so it is
//! safe for concurrent read-only access behind a multi-worker server.
//!
//! Scoring is not best-effort: an encode or predict failure rejects the
//! request. Explanation is: if attribution fails, the response still
//! carries the probability and band, and the failure is logged.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::data::{encode_population, LabeledRecord};
use crate::encode::ApplicantRecord;
use crate::explain::{
    derive_reason_codes, Attribution, BackgroundSample, LinearExplainer, ReasonCode,
    DEFAULT_BACKGROUND_SIZE, DEFAULT_TOP_K,
};
use crate::fairness::{audit, FairnessSnapshot, ProtectedAttribute};
use crate::model::ModelArtifacts;
use crate::policy::{DecisionBand, DecisionPolicy};
use crate::schema::names;
use crate::Result;

/// Options for building a scoring context
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Decision thresholds
    pub policy: DecisionPolicy,
    /// Feature names excluded from explanations
    pub protected_features: HashSet<String>,
    /// Background sample size for attributions
    pub background_size: usize,
    /// Number of top attributions returned
    pub top_k: usize,
    /// Seed for the background draw; `None` draws from entropy
    pub background_seed: Option<u64>,
    /// Protected attribute the startup fairness audit groups by
    pub audit_attribute: ProtectedAttribute,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            policy: DecisionPolicy::default(),
            protected_features: default_protected_features(),
            background_size: DEFAULT_BACKGROUND_SIZE,
            top_k: DEFAULT_TOP_K,
            background_seed: None,
            audit_attribute: ProtectedAttribute::default(),
        }
    }
}

/// The default explanation exclusion set
pub fn default_protected_features() -> HashSet<String> {
    [names::SEX, names::MARRIAGE, names::EDUCATION]
        .into_iter()
        .map(String::from)
        .collect()
}

/// One scored request's response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    /// Probability of default in [0, 1]
    pub probability: f64,
    /// Decision band
    pub band: DecisionBand,
    /// Adverse-action labels; always empty for Approved
    pub reason_codes: Vec<ReasonCode>,
    /// Ranked top attributions behind the reason codes; empty for Approved
    pub attributions: Vec<Attribution>,
    /// Monitoring snapshot, independent of this request
    pub fairness: FairnessSnapshot,
}

/// Immutable, load-once scoring state
#[derive(Debug, Clone)]
pub struct ScoringContext {
    artifacts: ModelArtifacts,
    policy: DecisionPolicy,
    protected_features: HashSet<String>,
    top_k: usize,
    explainer: LinearExplainer,
    fairness: FairnessSnapshot,
}

impl ScoringContext {
    /// Build the context from loaded artifacts and the reference population
    ///
    /// Encodes and standardizes the population once, draws the background
    /// sample, and computes the startup fairness snapshot. Any failure
    /// here is fatal: the process must not serve without a complete
    /// context.
    pub fn build(
        artifacts: ModelArtifacts,
        population: &[LabeledRecord],
        options: PipelineOptions,
    ) -> Result<Self> {
        artifacts.validate()?;

        let encoded = encode_population(population, &artifacts.schema)?;
        let scaled = artifacts.scaler.transform_matrix(&encoded)?;

        let background = match options.background_seed {
            Some(seed) => BackgroundSample::draw(
                &scaled,
                options.background_size,
                &mut StdRng::seed_from_u64(seed),
            )?,
            None => {
                BackgroundSample::draw(&scaled, options.background_size, &mut rand::thread_rng())?
            }
        };

        let explainer = LinearExplainer::new(&artifacts.model, &artifacts.schema, &background)?;
        let fairness = audit(population, &artifacts, options.audit_attribute)?;

        Ok(Self {
            artifacts,
            policy: options.policy,
            protected_features: options.protected_features,
            top_k: options.top_k,
            explainer,
            fairness,
        })
    }

    /// Score one applicant: probability, band, reasons, attributions
    pub fn score(&self, record: &ApplicantRecord) -> Result<ScoreResponse> {
        let scaled = self.artifacts.scaled_vector(record)?;
        let probability = self.artifacts.model.predict_probability(&scaled)?;
        let band = self.policy.classify(probability);

        // Favorable outcomes are never explained; that contract is here,
        // not in the explainer.
        let (reason_codes, attributions) = if band.is_unfavorable() {
            match self
                .explainer
                .explain(&scaled, &self.protected_features, self.top_k)
            {
                Ok(ranked) => (derive_reason_codes(band, &ranked), ranked),
                Err(e) => {
                    tracing::warn!(error = %e, "explanation failed; returning score only");
                    (Vec::new(), Vec::new())
                }
            }
        } else {
            (Vec::new(), Vec::new())
        };

        Ok(ScoreResponse {
            probability,
            band,
            reason_codes,
            attributions,
            fairness: self.fairness.clone(),
        })
    }

    /// The startup fairness snapshot
    pub fn fairness(&self) -> &FairnessSnapshot {
        &self.fairness
    }

    /// The loaded artifacts
    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// The configured decision policy
    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LogisticModel, StandardScaler};
    use crate::schema::FeatureSchema;
    use ndarray::Array1;

    /// Artifacts where delay and utilization drive the score.
    fn risk_artifacts() -> ModelArtifacts {
        let schema = FeatureSchema::credit_default();
        let n = schema.len();
        let scaler = StandardScaler::new(Array1::zeros(n), Array1::ones(n) * 1.0e5).unwrap();

        let mut coefs = Array1::zeros(n);
        coefs[schema.index_of(names::HAS_DELAY).unwrap()] = 3.0e5;
        coefs[schema.index_of(names::HIGH_UTILIZATION).unwrap()] = 2.0e5;
        coefs[schema.index_of(names::SEX).unwrap()] = 1.0e5;
        let model = LogisticModel::new(coefs, -1.5).unwrap();
        ModelArtifacts::new(schema, scaler, model).unwrap()
    }

    fn population(n: usize) -> Vec<LabeledRecord> {
        (0..n)
            .map(|i| {
                let pay_0 = if i % 3 == 0 { 2 } else { 0 };
                LabeledRecord {
                    record: ApplicantRecord::new(
                        100_000.0,
                        30.0 + (i % 20) as f64,
                        pay_0,
                        10_000.0 + (i % 9) as f64 * 9_000.0,
                        5_000.0,
                    )
                    .with_demographics(1 + (i % 2) as u8, 1, 2),
                    default: pay_0 > 0,
                }
            })
            .collect()
    }

    fn context() -> ScoringContext {
        let options = PipelineOptions {
            background_size: 20,
            background_seed: Some(9),
            ..PipelineOptions::default()
        };
        ScoringContext::build(risk_artifacts(), &population(60), options).unwrap()
    }

    #[test]
    fn test_score_is_deterministic() {
        let ctx = context();
        let record = ApplicantRecord::new(120_000.0, 35.0, 2, 100_000.0, 500_000.0)
            .with_demographics(1, 2, 2);

        let a = ctx.score(&record).unwrap();
        let b = ctx.score(&record).unwrap();
        assert_eq!(a.probability.to_bits(), b.probability.to_bits());
        assert_eq!(a.band, b.band);
        assert_eq!(a.reason_codes, b.reason_codes);
    }

    #[test]
    fn test_unfavorable_decision_carries_reasons() {
        let ctx = context();
        // Delayed and highly utilized: pushed well past the reject cutoff.
        let record = ApplicantRecord::new(100_000.0, 40.0, 3, 95_000.0, 1_000.0)
            .with_demographics(2, 1, 2);

        let response = ctx.score(&record).unwrap();
        assert!(response.band.is_unfavorable());
        assert!(!response.reason_codes.is_empty());
        assert!(!response.attributions.is_empty());
    }

    #[test]
    fn test_approved_decision_is_not_explained() {
        let ctx = context();
        let record = ApplicantRecord::new(500_000.0, 40.0, 0, 1_000.0, 50_000.0)
            .with_demographics(1, 1, 2);

        let response = ctx.score(&record).unwrap();
        assert_eq!(response.band, DecisionBand::Approved);
        assert!(response.reason_codes.is_empty());
        assert!(response.attributions.is_empty());
    }

    #[test]
    fn test_protected_features_absent_from_response() {
        let ctx = context();
        // SEX carries a deliberately large coefficient; it must never
        // surface in the returned attributions.
        let record = ApplicantRecord::new(100_000.0, 40.0, 3, 95_000.0, 1_000.0)
            .with_demographics(2, 3, 3);

        let response = ctx.score(&record).unwrap();
        assert!(response
            .attributions
            .iter()
            .all(|a| a.feature != names::SEX
                && a.feature != names::MARRIAGE
                && a.feature != names::EDUCATION));
    }

    #[test]
    fn test_fairness_snapshot_attached_and_stable() {
        let ctx = context();
        let record = ApplicantRecord::new(100_000.0, 40.0, 0, 1_000.0, 1_000.0)
            .with_demographics(1, 1, 2);

        let a = ctx.score(&record).unwrap();
        let b = ctx.score(&record).unwrap();
        assert_eq!(a.fairness.group_rates, b.fairness.group_rates);
        assert!(a.fairness.disparity >= 0.0);
        assert_eq!(a.fairness.group_rates, ctx.fairness().group_rates);
    }

    #[test]
    fn test_build_fails_on_small_population() {
        let options = PipelineOptions {
            background_size: 100,
            ..PipelineOptions::default()
        };
        let err = ScoringContext::build(risk_artifacts(), &population(10), options).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::InsufficientBackground { .. }
        ));
    }
}
