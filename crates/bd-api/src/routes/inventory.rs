//! Inventory forecasting and seeding routes

use crate::error::ApiResult;
use crate::models::BloodInventory;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use bd_core::{daily_usage, project, BloodType, InventoryForecast, InventoryRow, UsageSample};
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

const DEFAULT_HORIZON_DAYS: i64 = 30;

/// Units per type inserted by the seed operation.
const SEED_UNITS: [(BloodType, i32); 8] = [
    (BloodType::APositive, 12),
    (BloodType::ANegative, 7),
    (BloodType::BPositive, 10),
    (BloodType::BNegative, 5),
    (BloodType::AbPositive, 3),
    (BloodType::AbNegative, 2),
    (BloodType::OPositive, 15),
    (BloodType::ONegative, 8),
];

#[derive(Deserialize)]
pub struct PredictQuery {
    pub days: Option<i64>,
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PredictQuery>,
) -> ApiResult<Json<InventoryForecast>> {
    let days = query.days.unwrap_or(DEFAULT_HORIZON_DAYS).max(1);

    let inventory =
        sqlx::query_as::<_, BloodInventory>("SELECT * FROM blood_inventory ORDER BY blood_type")
            .fetch_all(&state.db)
            .await?;

    let window_start = Utc::now() - Duration::days(bd_core::forecast::USAGE_WINDOW_DAYS);
    let requests = sqlx::query_as::<_, (String, i32)>(
        "SELECT blood_type, units_needed FROM donation_requests WHERE request_date >= $1",
    )
    .bind(window_start)
    .fetch_all(&state.db)
    .await?;

    let samples: Vec<UsageSample> = requests
        .into_iter()
        .filter_map(|(blood_type, units)| match BloodType::from_str(&blood_type) {
            Ok(bt) => Some(UsageSample {
                blood_type: bt,
                units_needed: units as i64,
            }),
            Err(_) => {
                warn!("Skipping request row with unknown blood type: {:?}", blood_type);
                None
            }
        })
        .collect();

    let rows: Vec<InventoryRow> = inventory
        .into_iter()
        .map(|item| InventoryRow {
            blood_type: item.blood_type,
            units: Some(item.units as f64),
        })
        .collect();

    let forecast = project(&rows, &daily_usage(&samples), days);
    Ok(Json(forecast))
}

pub async fn seed(
    State(state): State<Arc<AppState>>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    // Replace whatever is there; seeding is a reset, not a merge.
    let mut tx = state.db.begin().await?;

    sqlx::query("DELETE FROM blood_inventory")
        .execute(&mut *tx)
        .await?;

    for (blood_type, units) in SEED_UNITS {
        sqlx::query(
            "INSERT INTO blood_inventory (blood_type, units, last_updated) VALUES ($1, $2, now())",
        )
        .bind(blood_type.as_str())
        .bind(units)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Inventory seeded successfully" })),
    ))
}
