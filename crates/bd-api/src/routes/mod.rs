//! API routes

pub mod assist;
pub mod auth;
pub mod centers;
pub mod donations;
pub mod donors;
pub mod inventory;
pub mod notify;
pub mod requests;
pub mod slots;

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
