//! Donation request records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    pub id: Uuid,
    pub patient_name: Option<String>,
    pub blood_type: String,
    pub units_needed: i32,
    pub hospital: Option<String>,
    pub urgency: String,
    pub request_date: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationRequest {
    #[serde(default)]
    pub patient_name: Option<String>,
    pub blood_type: String,
    pub units_needed: i32,
    #[serde(default)]
    pub hospital: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
}
