//! Risk Model: standardizer + logistic classifier
//!
//! Both halves are fitted offline and frozen. At inference time the scaler
//! applies stored means and scales (never refit per request) and the
//! logistic model maps the standardized vector to a default probability.
//! Same vector in, same probability out: there is no internal randomness.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::encode::FeatureVector;
use crate::{Error, Result};

pub mod artifacts;

pub use artifacts::{ModelArtifacts, ARTIFACT_VERSION};

/// Zero-mean/unit-variance standardizer with frozen parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Build a scaler from stored parameters
    pub fn new(mean: Array1<f64>, scale: Array1<f64>) -> Result<Self> {
        if mean.len() != scale.len() {
            return Err(Error::InvalidParameter(format!(
                "scaler mean/scale length mismatch: {} vs {}",
                mean.len(),
                scale.len()
            )));
        }
        if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(Error::InvalidParameter(
                "scaler parameters must be finite".to_string(),
            ));
        }
        Ok(Self { mean, scale })
    }

    /// Fit column means and standard deviations on a training matrix
    ///
    /// Constant columns get scale 1 so transforming them is the identity
    /// shift rather than a division by zero.
    pub fn fit(matrix: &Array2<f64>) -> Result<Self> {
        let n = matrix.nrows();
        if n == 0 {
            return Err(Error::InvalidParameter(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }

        let mean = matrix.mean_axis(Axis(0)).ok_or_else(|| {
            Error::InvalidParameter("cannot fit scaler on an empty matrix".to_string())
        })?;

        let mut scale = Array1::zeros(matrix.ncols());
        for (j, col) in matrix.columns().into_iter().enumerate() {
            let var = col.iter().map(|v| (v - mean[j]).powi(2)).sum::<f64>() / n as f64;
            let std = var.sqrt();
            scale[j] = if std > 0.0 { std } else { 1.0 };
        }

        Self::new(mean, scale)
    }

    /// Standardize one encoded vector
    pub fn transform(&self, vector: &FeatureVector) -> Result<Array1<f64>> {
        if vector.len() != self.mean.len() {
            return Err(Error::SchemaMismatch {
                slot: "scaler".to_string(),
                detail: format!(
                    "vector has {} features, scaler expects {}",
                    vector.len(),
                    self.mean.len()
                ),
            });
        }
        Ok((vector.values() - &self.mean) / &self.scale)
    }

    /// Standardize a whole matrix, row-wise
    pub fn transform_matrix(&self, matrix: &Array2<f64>) -> Result<Array2<f64>> {
        if matrix.ncols() != self.mean.len() {
            return Err(Error::SchemaMismatch {
                slot: "scaler".to_string(),
                detail: format!(
                    "matrix has {} columns, scaler expects {}",
                    matrix.ncols(),
                    self.mean.len()
                ),
            });
        }
        Ok((matrix - &self.mean) / &self.scale)
    }

    /// Number of features the scaler was fitted on
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Whether the scaler covers no features
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// Trained binary logistic classifier over standardized features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl LogisticModel {
    /// Build a model from stored parameters
    pub fn new(coefficients: Array1<f64>, intercept: f64) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(Error::InvalidParameter(
                "model must have at least one coefficient".to_string(),
            ));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(Error::InvalidParameter(
                "model parameters must be finite".to_string(),
            ));
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }

    /// Raw decision score `coef . x + intercept` for a standardized vector
    pub fn decision_function(&self, scaled: &Array1<f64>) -> Result<f64> {
        if scaled.len() != self.coefficients.len() {
            return Err(Error::SchemaMismatch {
                slot: "model".to_string(),
                detail: format!(
                    "vector has {} features, model expects {}",
                    scaled.len(),
                    self.coefficients.len()
                ),
            });
        }
        Ok(self.coefficients.dot(scaled) + self.intercept)
    }

    /// Probability of default in [0, 1]
    pub fn predict_probability(&self, scaled: &Array1<f64>) -> Result<f64> {
        Ok(sigmoid(self.decision_function(scaled)?))
    }

    /// Model coefficients in frozen schema order
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// Model intercept
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Number of input features
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

/// Numerically stable logistic sigmoid
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
