//! Shared server state

use std::sync::Arc;

use crate::pipeline::ScoringContext;

/// Read-only state shared across request handlers
///
/// The context is built once before the server starts and never mutated,
/// so cloning the state per request is an `Arc` bump.
#[derive(Clone)]
pub struct AppState {
    /// The loaded scoring pipeline
    pub context: Arc<ScoringContext>,
}

impl AppState {
    /// Wrap a built scoring context
    pub fn new(context: ScoringContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }
}
