//! Donor records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub blood_type: String,
    pub address: Option<serde_json::Value>,
    pub last_donation: Option<DateTime<Utc>>,
    pub donation_history: Vec<DateTime<Utc>>,
    pub eligible_from: DateTime<Utc>,
    pub medical_conditions: Vec<String>,
}

/// Contact-level projection returned by compatibility lookups.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorContact {
    pub id: Uuid,
    pub name: String,
    pub blood_type: String,
    pub phone: String,
    pub email: String,
    pub last_donation: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonorRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub blood_type: String,
    #[serde(default)]
    pub address: Option<serde_json::Value>,
    #[serde(default)]
    pub last_donation: Option<DateTime<Utc>>,
    #[serde(default)]
    pub donation_history: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub medical_conditions: Vec<String>,
}
