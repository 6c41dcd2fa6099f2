//! Blood inventory records

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodInventory {
    pub blood_type: String,
    pub units: i32,
    pub last_updated: DateTime<Utc>,
}
