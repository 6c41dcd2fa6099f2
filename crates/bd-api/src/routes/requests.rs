//! Donation request routes

use crate::error::{ApiError, ApiResult};
use crate::models::{CreateDonationRequest, DonationRequest};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use bd_core::{BloodType, RequestStatus, Urgency};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

pub async fn create_request(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateDonationRequest>,
) -> ApiResult<(StatusCode, Json<DonationRequest>)> {
    let blood_type = BloodType::from_str(&payload.blood_type)?;

    if payload.units_needed <= 0 {
        return Err(ApiError::Validation(
            "unitsNeeded must be a positive number".to_string(),
        ));
    }

    let urgency = match &payload.urgency {
        Some(u) => Urgency::from_str(u)?,
        None => Urgency::Medium,
    };

    let request = sqlx::query_as::<_, DonationRequest>(
        r#"
        INSERT INTO donation_requests
            (id, patient_name, blood_type, units_needed, hospital, urgency, request_date, status)
        VALUES ($1, $2, $3, $4, $5, $6, now(), $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.patient_name)
    .bind(blood_type.as_str())
    .bind(payload.units_needed)
    .bind(&payload.hospital)
    .bind(urgency.to_string())
    .bind(RequestStatus::Pending.to_string())
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_requests(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<DonationRequest>>> {
    let requests = sqlx::query_as::<_, DonationRequest>(
        "SELECT * FROM donation_requests ORDER BY request_date DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(requests))
}
