//! Donation-center discovery routes

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

pub async fn nearby(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearbyQuery>,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    let (lat, lng) = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => {
            return Err(ApiError::Validation(
                "Latitude and longitude are required".to_string(),
            ))
        }
    };

    let centers = state.places.nearby(lat, lng).await?;
    Ok(Json(centers))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    let place = query
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Query is required".to_string()))?;

    let centers = state.places.search_near(&place).await?;
    Ok(Json(centers))
}
