//! Request handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::encode::ApplicantRecord;
use crate::server::state::AppState;
use crate::Error;

/// `GET /health`
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// `POST /api/v1/score`
///
/// Accepts an applicant record and returns the scored decision. Schema
/// mismatches are the caller's fault (422); anything else is a 500.
pub async fn score_applicant(
    State(state): State<AppState>,
    Json(record): Json<ApplicantRecord>,
) -> Response {
    match state.context.score(&record) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e @ Error::SchemaMismatch { .. }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "scoring request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// `GET /api/v1/fairness`
///
/// Returns the startup fairness snapshot. Monitoring only: the values
/// never influence individual decisions.
pub async fn fairness_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.context.fairness().clone())
}
