//! Explanation Engine
//!
//! Computes per-feature attributions for one scored instance against a
//! background distribution, filters protected attributes, and derives
//! human-readable reason codes for unfavorable decisions.
//!
//! For a linear model the attribution is exact, not an approximation:
//! each feature contributes its standardized value minus the background
//! mean, times its coefficient. Summing every attribution (protected
//! features included) plus the base value reproduces the model's raw
//! decision score to floating-point tolerance.
//!
//! Protected attributes are filtered *after* computation, by exact name
//! match. They stay in the model input, so filtering protects the
//! explanation without touching model accuracy.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::LogisticModel;
use crate::schema::FeatureSchema;
use crate::{Error, Result};

pub mod background;
pub mod reason;

pub use background::{BackgroundSample, DEFAULT_BACKGROUND_SIZE};
pub use reason::{derive_reason_codes, ReasonCode};


/// Default number of top attributions returned to callers
pub const DEFAULT_TOP_K: usize = 5;

/// Signed contribution of one feature to one decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    /// Feature name from the frozen schema
    pub feature: String,
    /// Signed contribution; positive pushes toward default
    pub value: f64,
}

/// Exact attribution engine for the linear risk model
#[derive(Debug, Clone)]
pub struct LinearExplainer {
    coefficients: Array1<f64>,
    feature_names: Vec<String>,
    background_mean: Array1<f64>,
    base_value: f64,
}

impl LinearExplainer {
    /// Build an explainer for a model over a drawn background sample
    pub fn new(
        model: &LogisticModel,
        schema: &FeatureSchema,
        background: &BackgroundSample,
    ) -> Result<Self> {
        schema.validate_width(model.n_features(), "explainer model")?;
        schema.validate_width(background.width(), "explainer background")?;

        let coefficients = model.coefficients().clone();
        let base_value = coefficients.dot(background.mean()) + model.intercept();

        Ok(Self {
            coefficients,
            feature_names: schema.iter().map(|s| s.name.clone()).collect(),
            background_mean: background.mean().clone(),
            base_value,
        })
    }

    /// Expected raw score over the background distribution
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    /// Full, unfiltered attributions for a standardized vector
    ///
    /// `sum(attributions) + base_value == decision_function(x)` holds
    /// exactly (up to floating point); this is the additivity identity
    /// callers can audit against.
    pub fn attributions(&self, scaled: &Array1<f64>) -> Result<Vec<Attribution>> {
        if scaled.len() != self.coefficients.len() {
            return Err(Error::SchemaMismatch {
                slot: "explainer".to_string(),
                detail: format!(
                    "vector has {} features, explainer expects {}",
                    scaled.len(),
                    self.coefficients.len()
                ),
            });
        }

        Ok(self
            .feature_names
            .iter()
            .enumerate()
            .map(|(i, name)| Attribution {
                feature: name.clone(),
                value: self.coefficients[i] * (scaled[i] - self.background_mean[i]),
            })
            .collect())
    }

    /// Filtered, ranked top-K attributions
    ///
    /// Protected names are removed after computation, then the rest are
    /// ranked by absolute contribution descending. Ties break on feature
    /// name so the ranking is reproducible.
    pub fn explain(
        &self,
        scaled: &Array1<f64>,
        protected: &HashSet<String>,
        top_k: usize,
    ) -> Result<Vec<Attribution>> {
        let mut ranked: Vec<Attribution> = self
            .attributions(scaled)?
            .into_iter()
            .filter(|a| !protected.contains(&a.feature))
            .collect();

        ranked.sort_by(|a, b| {
            b.value
                .abs()
                .total_cmp(&a.value.abs())
                .then_with(|| a.feature.cmp(&b.feature))
        });
        ranked.truncate(top_k);
        Ok(ranked)
    }
}
