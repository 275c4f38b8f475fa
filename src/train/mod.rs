//! Offline artifact training
//!
//! Produces the three serving artifacts (frozen schema, fitted scaler,
//! trained model) from a labeled reference dataset. The contract with the
//! serving side is feature ordering: the schema frozen here is the one
//! every inference call encodes against.
//!
//! The classifier is plain logistic regression fit by batch gradient
//! descent, with optional L2 regularization and balanced class weighting.
//! A seeded holdout split gives the evaluation report; the artifacts are
//! always fit on the training split only.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::data::{encode_population, LabeledRecord};
use crate::model::{sigmoid, LogisticModel, ModelArtifacts, StandardScaler};
use crate::schema::FeatureSchema;
use crate::{Error, Result};

/// Training hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Gradient descent iterations
    pub max_iter: usize,
    /// Learning rate
    pub learning_rate: f64,
    /// L2 regularization strength (0 disables)
    pub l2: f64,
    /// Reweight classes inversely to their frequency
    pub balanced: bool,
    /// Fraction of rows held out for evaluation
    pub holdout_fraction: f64,
    /// Seed for the holdout shuffle
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            learning_rate: 0.1,
            l2: 0.0,
            balanced: true,
            holdout_fraction: 0.2,
            seed: 42,
        }
    }
}

impl TrainConfig {
    fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter(
                "max_iter must be positive".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(Error::InvalidParameter(
                "learning rate must be positive and finite".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.holdout_fraction) {
            return Err(Error::InvalidParameter(
                "holdout fraction must be in [0, 1)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Binary confusion counts on the holdout split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

/// Holdout evaluation of freshly trained artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    /// Accuracy at the 0.5 cutoff
    pub accuracy: f64,
    /// Area under the ROC curve
    pub roc_auc: f64,
    /// Confusion counts at the 0.5 cutoff
    pub confusion: ConfusionCounts,
    /// Rows used for fitting
    pub n_train: usize,
    /// Rows held out for evaluation
    pub n_holdout: usize,
}

/// Fit artifacts on a labeled population
pub fn train(
    population: &[LabeledRecord],
    schema: &FeatureSchema,
    config: &TrainConfig,
) -> Result<(ModelArtifacts, TrainReport)> {
    config.validate()?;

    if population.len() < 10 {
        return Err(Error::Dataset(format!(
            "training needs at least 10 rows, got {}",
            population.len()
        )));
    }

    let matrix = encode_population(population, schema)?;
    let labels: Vec<bool> = population.iter().map(|r| r.default).collect();

    // Seeded shuffle, then split holdout off the tail.
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(config.seed));
    let n_holdout = (population.len() as f64 * config.holdout_fraction).round() as usize;
    let n_train = population.len() - n_holdout;
    if n_train < 2 {
        return Err(Error::Dataset(
            "holdout fraction leaves too few training rows".to_string(),
        ));
    }

    let (train_idx, holdout_idx) = order.split_at(n_train);
    let (x_train, y_train) = select_rows(&matrix, &labels, train_idx);
    if y_train.iter().all(|&y| y) || y_train.iter().all(|&y| !y) {
        return Err(Error::Dataset(
            "training split contains a single class".to_string(),
        ));
    }

    let scaler = StandardScaler::fit(&x_train)?;
    let x_train_scaled = scaler.transform_matrix(&x_train)?;
    let model = fit_logistic(&x_train_scaled, &y_train, config)?;

    let artifacts = ModelArtifacts::new(schema.clone(), scaler, model)?;

    let report = if n_holdout > 0 {
        let (x_hold, y_hold) = select_rows(&matrix, &labels, holdout_idx);
        let x_hold_scaled = artifacts.scaler.transform_matrix(&x_hold)?;
        evaluate(&artifacts.model, &x_hold_scaled, &y_hold, n_train)?
    } else {
        evaluate(&artifacts.model, &x_train_scaled, &y_train, n_train)?
    };

    tracing::info!(
        accuracy = report.accuracy,
        roc_auc = report.roc_auc,
        n_train = report.n_train,
        "training complete"
    );

    Ok((artifacts, report))
}

fn select_rows(matrix: &Array2<f64>, labels: &[bool], idx: &[usize]) -> (Array2<f64>, Vec<bool>) {
    let mut rows = Array2::zeros((idx.len(), matrix.ncols()));
    let mut selected = Vec::with_capacity(idx.len());
    for (out, &i) in idx.iter().enumerate() {
        rows.row_mut(out).assign(&matrix.row(i));
        selected.push(labels[i]);
    }
    (rows, selected)
}

/// Batch gradient descent on weighted logistic loss
fn fit_logistic(x: &Array2<f64>, y: &[bool], config: &TrainConfig) -> Result<LogisticModel> {
    let n = x.nrows();
    let d = x.ncols();
    let n_pos = y.iter().filter(|&&v| v).count();
    let n_neg = n - n_pos;

    let (w_pos, w_neg) = if config.balanced {
        (n as f64 / (2.0 * n_pos as f64), n as f64 / (2.0 * n_neg as f64))
    } else {
        (1.0, 1.0)
    };

    let targets = Array1::from_iter(y.iter().map(|&v| f64::from(v)));
    let weights = Array1::from_iter(y.iter().map(|&v| if v { w_pos } else { w_neg }));
    let weight_sum = weights.sum();

    let mut coefficients = Array1::zeros(d);
    let mut intercept = 0.0;

    for _ in 0..config.max_iter {
        let z = x.dot(&coefficients) + intercept;
        let probs = z.mapv(sigmoid);
        let residuals = (&probs - &targets) * &weights;

        let grad_coef = x.t().dot(&residuals) / weight_sum + &(&coefficients * config.l2);
        let grad_intercept = residuals.sum() / weight_sum;

        coefficients = coefficients - &(grad_coef * config.learning_rate);
        intercept -= grad_intercept * config.learning_rate;
    }

    LogisticModel::new(coefficients, intercept)
}

fn evaluate(
    model: &LogisticModel,
    x_scaled: &Array2<f64>,
    labels: &[bool],
    n_train: usize,
) -> Result<TrainReport> {
    let mut probs = Vec::with_capacity(x_scaled.nrows());
    for row in x_scaled.axis_iter(Axis(0)) {
        probs.push(model.predict_probability(&row.to_owned())?);
    }

    let mut confusion = ConfusionCounts {
        true_positive: 0,
        false_positive: 0,
        true_negative: 0,
        false_negative: 0,
    };
    for (&p, &actual) in probs.iter().zip(labels) {
        let predicted = p >= 0.5;
        match (predicted, actual) {
            (true, true) => confusion.true_positive += 1,
            (true, false) => confusion.false_positive += 1,
            (false, false) => confusion.true_negative += 1,
            (false, true) => confusion.false_negative += 1,
        }
    }

    let correct = confusion.true_positive + confusion.true_negative;
    Ok(TrainReport {
        accuracy: correct as f64 / labels.len() as f64,
        roc_auc: roc_auc(&probs, labels),
        confusion,
        n_train,
        n_holdout: labels.len(),
    })
}

/// Rank-based ROC-AUC (Mann-Whitney), with average ranks for ties
fn roc_auc(probs: &[f64], labels: &[bool]) -> f64 {
    let n_pos = labels.iter().filter(|&&l| l).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..probs.len()).collect();
    order.sort_by(|&a, &b| probs[a].total_cmp(&probs[b]));

    let mut ranks = vec![0.0; probs.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && probs[order[j + 1]] == probs[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            ranks[k] = avg_rank;
        }
        i = j + 1;
    }

    let rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|(&l, _)| l)
        .map(|(_, &r)| r)
        .sum();

    (rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0) / (n_pos * n_neg) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::ApplicantRecord;

    /// A population where delayed payers with weak repayment default.
    fn synthetic_population(n: usize) -> Vec<LabeledRecord> {
        (0..n)
            .map(|i| {
                let pay_0 = (i % 5) as i32 - 1;
                let avg_pay = 500.0 + (i % 7) as f64 * 4_000.0;
                let record = ApplicantRecord::new(
                    40_000.0 + (i % 11) as f64 * 15_000.0,
                    25.0 + (i % 30) as f64,
                    pay_0,
                    20_000.0 + (i % 13) as f64 * 3_000.0,
                    avg_pay,
                )
                .with_demographics(1 + (i % 2) as u8, 1 + (i % 3) as u8, 1 + (i % 4) as u8);
                LabeledRecord {
                    record,
                    default: pay_0 > 0 && avg_pay < 15_000.0,
                }
            })
            .collect()
    }

    #[test]
    fn test_train_produces_consistent_artifacts() {
        let population = synthetic_population(200);
        let schema = FeatureSchema::credit_default();
        let (artifacts, report) = train(&population, &schema, &TrainConfig::default()).unwrap();

        assert_eq!(artifacts.model.n_features(), schema.len());
        assert_eq!(artifacts.scaler.len(), schema.len());
        assert_eq!(report.n_train + report.n_holdout, 200);
        assert!(report.accuracy > 0.7, "accuracy was {}", report.accuracy);
        assert!(report.roc_auc > 0.7, "auc was {}", report.roc_auc);
    }

    #[test]
    fn test_training_is_deterministic() {
        let population = synthetic_population(100);
        let schema = FeatureSchema::credit_default();
        let config = TrainConfig::default();

        let (a, _) = train(&population, &schema, &config).unwrap();
        let (b, _) = train(&population, &schema, &config).unwrap();
        assert_eq!(a.model, b.model);
        assert_eq!(a.scaler, b.scaler);
    }

    #[test]
    fn test_single_class_rejected() {
        let mut population = synthetic_population(50);
        for labeled in &mut population {
            labeled.default = false;
        }
        let schema = FeatureSchema::credit_default();
        assert!(train(&population, &schema, &TrainConfig::default()).is_err());
    }

    #[test]
    fn test_tiny_population_rejected() {
        let population = synthetic_population(5);
        let schema = FeatureSchema::credit_default();
        assert!(train(&population, &schema, &TrainConfig::default()).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let population = synthetic_population(50);
        let schema = FeatureSchema::credit_default();

        let zero_iter = TrainConfig {
            max_iter: 0,
            ..TrainConfig::default()
        };
        assert!(train(&population, &schema, &zero_iter).is_err());

        let bad_holdout = TrainConfig {
            holdout_fraction: 1.0,
            ..TrainConfig::default()
        };
        assert!(train(&population, &schema, &bad_holdout).is_err());
    }

    #[test]
    fn test_roc_auc_perfect_and_reversed() {
        let probs = [0.1, 0.2, 0.8, 0.9];
        let labels = [false, false, true, true];
        assert!((roc_auc(&probs, &labels) - 1.0).abs() < 1e-12);

        let reversed = [true, true, false, false];
        assert!(roc_auc(&probs, &reversed).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_ties_average() {
        let probs = [0.5, 0.5];
        let labels = [true, false];
        assert!((roc_auc(&probs, &labels) - 0.5).abs() < 1e-12);
    }
}
