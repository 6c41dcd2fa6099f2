//! Appointment slot records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub center_id: String,
    pub slot_date: String,
    pub slot_time: String,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSlotRequest {
    pub center_id: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub user_confirmed_eligibility: Option<bool>,
}

/// Bookable times offered by every center.
pub const TIME_GRID: [&str; 9] = [
    "09:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "01:00 PM", "02:00 PM", "03:00 PM",
    "04:00 PM", "05:00 PM",
];

/// Times still open given the already-booked ones.
pub fn available_times(booked: &[String]) -> Vec<&'static str> {
    TIME_GRID
        .iter()
        .copied()
        .filter(|t| !booked.iter().any(|b| b == t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_times_available_when_none_booked() {
        assert_eq!(available_times(&[]).len(), TIME_GRID.len());
    }

    #[test]
    fn test_booked_times_removed() {
        let booked = vec!["09:00 AM".to_string(), "01:00 PM".to_string()];
        let open = available_times(&booked);
        assert_eq!(open.len(), 7);
        assert!(!open.contains(&"09:00 AM"));
        assert!(!open.contains(&"01:00 PM"));
    }
}
