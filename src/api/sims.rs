use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
};
use std::sync::Arc;

use super::types::{
    SearchQuery, SimDto, SimStatusDto, StatusChangeRequest, UsageDto, UsageQuery,
};
use super::validation::{validate_iccid, validate_search_criteria};
use super::{ApiError, ApiResponse, AppState};
use crate::services::CurrentUser;

/// GET /sims/search?iccid=&imsi=&msisdn=
pub async fn search_sim(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<SimDto>>, ApiError> {
    let Query(query) = query?;
    let criteria = validate_search_criteria(query)?;

    let sim = state.sim_service.search(&user, criteria).await?;
    Ok(Json(ApiResponse::success(sim)))
}

/// GET /sims/{iccid}/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(iccid): Path<String>,
) -> Result<Json<ApiResponse<SimStatusDto>>, ApiError> {
    let iccid = validate_iccid(&iccid)?;

    let status = state.sim_service.get_status(&user, iccid).await?;
    Ok(Json(ApiResponse::success(status)))
}

/// PATCH /sims/{iccid}/status
pub async fn change_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(iccid): Path<String>,
    payload: Result<Json<StatusChangeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SimStatusDto>>, ApiError> {
    let iccid = validate_iccid(&iccid)?;
    let Json(payload) = payload?;

    let status = state
        .sim_service
        .change_status(&user, iccid, &payload.action)
        .await?;
    Ok(Json(ApiResponse::success(status)))
}

/// GET /sims/{iccid}/usage?month=YYYY-MM
pub async fn get_usage(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(iccid): Path<String>,
    query: Result<Query<UsageQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<UsageDto>>, ApiError> {
    let iccid = validate_iccid(&iccid)?;
    let Query(query) = query?;

    let usage = state
        .sim_service
        .get_usage(&user, iccid, query.month.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(ApiResponse::success(usage)))
}
