//! Unauthenticated liveness endpoint.

use axum::Json;

use super::ApiResponse;
use super::types::AliveDto;

pub const SERVICE_NAME: &str = "iot-sim-ops";

/// `GET /alive`
///
/// Answers as long as the process is serving requests; does not touch the
/// database.
pub async fn alive() -> Json<ApiResponse<AliveDto>> {
    Json(ApiResponse::success(AliveDto {
        ok: true,
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    }))
}
