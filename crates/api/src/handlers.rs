//! API request handlers

use crate::{ApiError, CallerIdentity, SharedState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use repovitals_analyzer::{AnalysisRequest, AnalysisStore, CodeAnalysis, Orchestrator};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct CreateAnalysis {
    pub repo_url: String,
    pub service_id: String,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Analyze a repository and return the completed record
pub async fn create_analysis(
    State(state): State<SharedState>,
    CallerIdentity(user_id): CallerIdentity,
    Json(body): Json<CreateAnalysis>,
) -> Result<impl IntoResponse, ApiError> {
    if body.service_id.trim().is_empty() {
        return Err(ApiError::bad_request("service_id is required"));
    }

    let orchestrator = Orchestrator::new(state.source.as_ref(), &state.db, &state.rules)
        .with_config(state.pipeline.clone());

    let record = orchestrator
        .run_analysis(AnalysisRequest {
            repo_url: body.repo_url,
            service_id: body.service_id,
            user_id,
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "Analysis request failed");
            ApiError::from(e)
        })?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// List the caller's analyses of a service, newest first
pub async fn list_analyses(
    State(state): State<SharedState>,
    CallerIdentity(user_id): CallerIdentity,
    Path(service_id): Path<String>,
) -> Result<Json<Vec<CodeAnalysis>>, ApiError> {
    let analyses = state
        .db
        .list_by_service(&service_id)
        .await?
        .into_iter()
        .filter(|a| a.user_id == user_id)
        .collect();

    Ok(Json(analyses))
}

/// Get one of the caller's analyses
pub async fn get_analysis(
    State(state): State<SharedState>,
    CallerIdentity(user_id): CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<CodeAnalysis>, ApiError> {
    owned_analysis(&state, &id, &user_id).await.map(Json)
}

/// Delete one of the caller's analyses
pub async fn delete_analysis(
    State(state): State<SharedState>,
    CallerIdentity(user_id): CallerIdentity,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    owned_analysis(&state, &id, &user_id).await?;
    state.db.delete(&id).await?;

    info!(analysis_id = %id, "Deleted analysis");
    Ok(StatusCode::NO_CONTENT)
}

/// Records of other users are reported as missing
async fn owned_analysis(
    state: &SharedState,
    id: &str,
    user_id: &str,
) -> Result<CodeAnalysis, ApiError> {
    state
        .db
        .get_by_id(id)
        .await?
        .filter(|a| a.user_id == user_id)
        .ok_or_else(|| ApiError::not_found(format!("Analysis not found: {}", id)))
}
