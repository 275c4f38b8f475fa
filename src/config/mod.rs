//! Pipeline configuration
//!
//! YAML configuration for the serving pipeline plus the clap CLI surface.
//! The config names the artifact and dataset files and the business
//! constants (thresholds, protected set, background size); everything
//! model-related lives in the artifacts, never here.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::load_reference_population;
use crate::fairness::ProtectedAttribute;
use crate::model::ModelArtifacts;
use crate::pipeline::{PipelineOptions, ScoringContext};
use crate::policy::{DecisionPolicy, DEFAULT_REJECT_THRESHOLD, DEFAULT_REVIEW_THRESHOLD};
use crate::schema::names;
use crate::{Error, Result};

pub mod cli;

pub use cli::{AuditArgs, Cli, Command, OutputFormat, ScoreArgs, ServeArgs, TrainArgs};

/// Decision threshold configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Below this the application is approved
    #[serde(default = "default_review")]
    pub review: f64,
    /// At or above this the application is rejected
    #[serde(default = "default_reject")]
    pub reject: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            review: default_review(),
            reject: default_reject(),
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Path to the trained artifact bundle
    pub artifacts: PathBuf,

    /// Path to the reference population CSV
    pub reference_data: PathBuf,

    /// Decision thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Feature names excluded from explanations
    #[serde(default = "default_protected")]
    pub protected_features: Vec<String>,

    /// Background sample size for attributions
    #[serde(default = "default_background_size")]
    pub background_size: usize,

    /// Number of top attributions returned per decision
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Optional seed for the background draw
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_seed: Option<u64>,

    /// Protected attribute the startup fairness audit groups by
    #[serde(default)]
    pub audit_attribute: ProtectedAttribute,
}

fn default_review() -> f64 {
    DEFAULT_REVIEW_THRESHOLD
}

fn default_reject() -> f64 {
    DEFAULT_REJECT_THRESHOLD
}

fn default_protected() -> Vec<String> {
    vec![
        names::SEX.to_string(),
        names::MARRIAGE.to_string(),
        names::EDUCATION.to_string(),
    ]
}

fn default_background_size() -> usize {
    crate::explain::DEFAULT_BACKGROUND_SIZE
}

fn default_top_k() -> usize {
    crate::explain::DEFAULT_TOP_K
}

/// Load a pipeline configuration from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| Error::ArtifactLoad(format!("cannot read {}: {e}", path.display())))?;
    let config: PipelineConfig = serde_yaml::from_str(&content)
        .map_err(|e| Error::Serialization(format!("cannot parse {}: {e}", path.display())))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration constants
pub fn validate_config(config: &PipelineConfig) -> Result<()> {
    DecisionPolicy::new(config.thresholds.review, config.thresholds.reject)?;
    if config.background_size == 0 {
        return Err(Error::InvalidParameter(
            "background_size must be positive".to_string(),
        ));
    }
    if config.top_k == 0 {
        return Err(Error::InvalidParameter(
            "top_k must be positive".to_string(),
        ));
    }
    Ok(())
}

impl PipelineConfig {
    /// Translate config values into pipeline options
    pub fn pipeline_options(&self) -> Result<PipelineOptions> {
        Ok(PipelineOptions {
            policy: DecisionPolicy::new(self.thresholds.review, self.thresholds.reject)?,
            protected_features: self
                .protected_features
                .iter()
                .cloned()
                .collect::<HashSet<String>>(),
            background_size: self.background_size,
            top_k: self.top_k,
            background_seed: self.background_seed,
            audit_attribute: self.audit_attribute,
        })
    }

    /// Load artifacts and reference data, then build the scoring context
    pub fn build_context(&self) -> Result<ScoringContext> {
        let artifacts = ModelArtifacts::load(&self.artifacts)?;
        let population = load_reference_population(&self.reference_data)?;
        ScoringContext::build(artifacts, &population, self.pipeline_options()?)
    }
}
