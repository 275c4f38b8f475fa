//! Error types for Riesgo

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema mismatch at slot '{slot}': {detail}")]
    SchemaMismatch { slot: String, detail: String },

    #[error("Artifact load failure: {0}")]
    ArtifactLoad(String),

    #[error("Reference dataset error: {0}")]
    Dataset(String),

    #[error("Insufficient background sample: requested {requested}, population has {available}")]
    InsufficientBackground { requested: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;
