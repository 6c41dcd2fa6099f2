//! Appointment slot routes
//!
//! Booking rejects an already-taken center/date/time; confirmation and
//! per-user listing are restricted to the booking owner.

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{available_times, BookSlotRequest, Slot};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub async fn book(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<BookSlotRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    if payload.center_id.trim().is_empty()
        || payload.date.trim().is_empty()
        || payload.time.trim().is_empty()
    {
        return Err(ApiError::Validation(
            "Center, date, and time are required".to_string(),
        ));
    }

    let taken = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM slots WHERE center_id = $1 AND slot_date = $2 AND slot_time = $3",
    )
    .bind(&payload.center_id)
    .bind(&payload.date)
    .bind(&payload.time)
    .fetch_one(&state.db)
    .await?;

    if taken > 0 {
        return Err(ApiError::Validation(
            "This time slot is already booked. Please select another time.".to_string(),
        ));
    }

    let slot = sqlx::query_as::<_, Slot>(
        r#"
        INSERT INTO slots (id, user_id, center_id, slot_date, slot_time, confirmed, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(&payload.center_id)
    .bind(&payload.date)
    .bind(&payload.time)
    .bind(payload.user_confirmed_eligibility.unwrap_or(true))
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Slot booked successfully",
            "slot": slot,
        })),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub user_confirmed_eligibility: bool,
}

pub async fn confirm(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(slot_id): Path<Uuid>,
    Json(payload): Json<ConfirmRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let slot = sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE id = $1")
        .bind(slot_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    if slot.user_id != user.id {
        return Err(ApiError::Forbidden(
            "Unauthorized to confirm this booking".to_string(),
        ));
    }

    let slot = sqlx::query_as::<_, Slot>(
        "UPDATE slots SET confirmed = $2 WHERE id = $1 RETURNING *",
    )
    .bind(slot_id)
    .bind(payload.user_confirmed_eligibility)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Booking confirmed successfully",
        "slot": slot,
    })))
}

pub async fn user_slots(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    if user.id != user_id {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    let slots = sqlx::query_as::<_, Slot>(
        "SELECT * FROM slots WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "slots": slots })))
}

pub async fn center_slots(
    State(state): State<Arc<AppState>>,
    Path(center_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let slots = sqlx::query_as::<_, Slot>(
        "SELECT * FROM slots WHERE center_id = $1 ORDER BY slot_date, slot_time",
    )
    .bind(&center_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "slots": slots })))
}

pub async fn available(
    State(state): State<Arc<AppState>>,
    Path((center_id, date)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let booked = sqlx::query_scalar::<_, String>(
        "SELECT slot_time FROM slots WHERE center_id = $1 AND slot_date = $2",
    )
    .bind(&center_id)
    .bind(&date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({
        "success": true,
        "availableSlots": available_times(&booked),
    })))
}
