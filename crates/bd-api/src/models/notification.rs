//! Notification records
//!
//! Responses are an append-only JSONB array; a notification is "active"
//! exactly while `expires_at` lies in the future.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Default lifetime of an emergency notification, in hours.
pub const EMERGENCY_TTL_HOURS: i64 = 8;

/// Default lifetime of every other notification category, in hours.
pub const DEFAULT_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub category: String,
    pub additional_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub responses: serde_json::Value,
}

/// One donor response to an interactive notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub response: String,
    pub contact_info: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Known notification categories; anything else is rejected at the edge.
pub const CATEGORIES: [&str; 4] = ["general", "emergency", "announcement", "reminder"];

/// Default expiry for a notification created at `now`.
pub fn default_expiry(category: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let hours = if category == "emergency" {
        EMERGENCY_TTL_HOURS
    } else {
        DEFAULT_TTL_HOURS
    };
    now + chrono::Duration::hours(hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emergency_expires_in_8_hours() {
        let now = Utc::now();
        assert_eq!(
            default_expiry("emergency", now),
            now + chrono::Duration::hours(8)
        );
    }

    #[test]
    fn test_other_categories_expire_in_24_hours() {
        let now = Utc::now();
        for category in ["general", "announcement", "reminder"] {
            assert_eq!(
                default_expiry(category, now),
                now + chrono::Duration::hours(24)
            );
        }
    }
}
