use super::AppState;
use super::error::ApiError;
use crate::clients::{CenterSearch, GatewayError};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use ecosort_core::classification::UnknownCategory;
use ecosort_core::education::{self, EducationContent};
use ecosort_core::{
    Category, Classification, ImageUpload, ImpactReport, LedgerError, RecycledItem,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Upper bound on `limit` for `/centers`.
const MAX_LIMIT: usize = 50;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// CLASSIFY
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub classification: Classification,
}

pub async fn classify(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let image = ImageUpload::from_data_url(&request.image)?;
    state.limiter.check().map_err(|_| ApiError::RateLimited)?;

    let gateway = state
        .gateway
        .as_ref()
        .ok_or(ApiError::Gateway(GatewayError::NotConfigured))?;

    let classification = gateway.classify(&image).await?;
    Ok(Json(ClassifyResponse { classification }))
}

// =============================================================================
// CENTERS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CentersQuery {
    #[serde(default)]
    pub location: String,
    pub radius_m: Option<u32>,
    pub limit: Option<usize>,
}

pub async fn centers(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CentersQuery>, QueryRejection>,
) -> Result<Json<CenterSearch>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let radius_m = query.radius_m.unwrap_or(state.search.radius_m);
    let limit = query
        .limit
        .unwrap_or(state.search.max_results)
        .min(MAX_LIMIT);

    let search = state.finder.search(&query.location, radius_m, limit).await?;
    Ok(Json(search))
}

// =============================================================================
// IMPACT
// =============================================================================

pub async fn impact(State(state): State<Arc<AppState>>) -> Result<Json<ImpactReport>, ApiError> {
    let ledger = Arc::clone(&state.ledger);
    let report = tokio::task::spawn_blocking(move || ledger.report())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub category: String,
    pub item: String,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: u64,
    pub report: ImpactReport,
}

pub async fn record_item(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RecordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordResponse>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let category: Category = request
        .category
        .parse()
        .map_err(|e: UnknownCategory| ApiError::BadRequest(e.to_string()))?;
    let name = request.item.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("item must not be empty".to_string()));
    }

    let item = RecycledItem::new(category, name, unix_now());
    let ledger = Arc::clone(&state.ledger);
    let (id, report) = tokio::task::spawn_blocking(move || {
        let id = ledger.record(&item)?;
        Ok::<_, LedgerError>((id, ledger.report()?))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    info!(id, %category, "recycled item recorded");
    Ok((StatusCode::CREATED, Json(RecordResponse { id, report })))
}

pub async fn impact_demo() -> Json<ImpactReport> {
    Json(ImpactReport::demo())
}

// =============================================================================
// EDUCATION
// =============================================================================

pub async fn education() -> Json<EducationContent> {
    Json(education::content())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
