//! # Riesgo: Credit-Default Risk Scoring
//!
//! Riesgo scores loan applicants with a trained linear classifier and
//! attaches exact per-feature explanations and group-fairness metrics to
//! each decision.
//!
//! ## Architecture
//!
//! - **schema**: frozen, ordered feature layout shared by training and serving
//! - **encode**: applicant record -> fixed-width feature vector
//! - **model**: standardizer + logistic classifier + artifact bundle
//! - **policy**: probability -> Approved / ManualReview / Rejected
//! - **explain**: closed-form linear attributions and reason codes
//! - **fairness**: group approval-rate auditing over a reference population
//! - **train**: offline artifact production (gradient-descent logistic fit)
//! - **pipeline**: one immutable context composing everything per request
//! - **server**: axum HTTP surface over the pipeline
//!
//! ## Example
//!
//! ```no_run
//! use riesgo::config::load_config;
//! use riesgo::encode::ApplicantRecord;
//!
//! let config = load_config("pipeline.yaml").unwrap();
//! let context = config.build_context().unwrap();
//!
//! let record = ApplicantRecord::new(120_000.0, 35.0, 2, 100_000.0, 500_000.0);
//! let response = context.score(&record).unwrap();
//! println!("{}: p(default) = {:.2}", response.band, response.probability);
//! ```

pub mod config;
pub mod data;
pub mod encode;
pub mod error;
pub mod explain;
pub mod fairness;
pub mod model;
pub mod pipeline;
pub mod policy;
pub mod schema;
pub mod server;
pub mod train;

// Re-export commonly used types
pub use encode::{encode, ApplicantRecord, FeatureVector};
pub use error::{Error, Result};
pub use explain::{Attribution, BackgroundSample, LinearExplainer, ReasonCode};
pub use fairness::{audit, FairnessSnapshot, ProtectedAttribute};
pub use model::{LogisticModel, ModelArtifacts, StandardScaler};
pub use pipeline::{PipelineOptions, ScoreResponse, ScoringContext};
pub use policy::{DecisionBand, DecisionPolicy, ScoredDecision};
pub use schema::{FeatureSchema, FeatureSlot, SlotKind};
