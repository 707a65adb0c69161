use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    response::IntoResponse,
};
use std::sync::Arc;

use super::trace::{TRANSID_HEADER, TraceContext};
use super::types::{PurchasePageDto, PurchaseRequest, PurchasesQuery};
use super::validation::{validate_iccid, validate_limit, validate_offset};
use super::{ApiError, ApiResponse, AppState};
use crate::db::PurchaseOrder;
use crate::services::CurrentUser;

/// POST /sims/{iccid}/purchase
///
/// `X-TransId` is the idempotency key. The envelope's `trace.transid` is the
/// order's transid, generated when the header is absent.
pub async fn purchase(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    trace: TraceContext,
    Path(iccid): Path<String>,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let iccid = validate_iccid(&iccid)?;
    let Json(payload) = payload?;

    let receipt = state
        .purchase_service
        .purchase(&user, iccid, payload, trace.client_transid())
        .await?;

    let transid = receipt.order.transid.clone();
    Ok((
        [(TRANSID_HEADER, transid.clone())],
        Json(ApiResponse::<PurchaseOrder>::success_with_transid(
            receipt.order,
            transid,
        )),
    ))
}

/// GET /sims/{iccid}/purchases?month=&limit=&offset=
pub async fn list_purchases(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(iccid): Path<String>,
    query: Result<Query<PurchasesQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<PurchasePageDto>>, ApiError> {
    let iccid = validate_iccid(&iccid)?;
    let Query(query) = query?;
    let limit = validate_limit(query.limit)?;
    let offset = validate_offset(query.offset)?;

    let page = state
        .purchase_service
        .list(&user, iccid, query.month.as_deref(), limit, offset)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}
