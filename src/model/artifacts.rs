//! Model artifact loading and saving
//!
//! The offline trainer emits three artifacts that must stay in lockstep:
//! the frozen feature schema, the fitted scaler, and the trained model.
//! They are stored together in one versioned JSON file so a partial or
//! mixed-version deployment cannot happen. Loading validates the cross
//! dimensions and refuses to serve on any mismatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::encode::{encode, ApplicantRecord};
use crate::model::{LogisticModel, StandardScaler};
use crate::schema::FeatureSchema;
use crate::{Error, Result};

/// Current artifact file version
pub const ARTIFACT_VERSION: u32 = 1;

/// The read-only bundle loaded once at process start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifacts {
    /// Artifact format version
    pub version: u32,
    /// When the artifacts were produced
    pub created_at: DateTime<Utc>,
    /// Frozen feature layout
    pub schema: FeatureSchema,
    /// Fitted standardizer
    pub scaler: StandardScaler,
    /// Trained classifier
    pub model: LogisticModel,
}

impl ModelArtifacts {
    /// Bundle freshly trained artifacts, validating their dimensions
    pub fn new(schema: FeatureSchema, scaler: StandardScaler, model: LogisticModel) -> Result<Self> {
        let artifacts = Self {
            version: ARTIFACT_VERSION,
            created_at: Utc::now(),
            schema,
            scaler,
            model,
        };
        artifacts.validate()?;
        Ok(artifacts)
    }

    /// Check schema/scaler/model dimensional consistency
    pub fn validate(&self) -> Result<()> {
        self.schema.validate_width(self.scaler.len(), "scaler")?;
        self.schema.validate_width(self.model.n_features(), "model")?;
        if self.version != ARTIFACT_VERSION {
            return Err(Error::ArtifactLoad(format!(
                "unsupported artifact version {} (expected {ARTIFACT_VERSION})",
                self.version
            )));
        }
        Ok(())
    }

    /// Load and validate artifacts from a JSON file
    ///
    /// Any failure here is fatal at startup; the process must not serve
    /// requests with missing or inconsistent artifacts.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::ArtifactLoad(format!("cannot read {}: {e}", path.display()))
        })?;

        let artifacts: ModelArtifacts = serde_json::from_str(&content).map_err(|e| {
            Error::ArtifactLoad(format!("cannot parse {}: {e}", path.display()))
        })?;

        artifacts.validate()?;
        Ok(artifacts)
    }

    /// Save artifacts as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Encode and standardize a record against this bundle
    pub fn scaled_vector(&self, record: &ApplicantRecord) -> Result<ndarray::Array1<f64>> {
        let vector = encode(record, &self.schema)?;
        self.scaler.transform(&vector)
    }

    /// Full inference path: record -> probability of default
    pub fn predict_probability(&self, record: &ApplicantRecord) -> Result<f64> {
        let scaled = self.scaled_vector(record)?;
        self.model.predict_probability(&scaled)
    }
}
