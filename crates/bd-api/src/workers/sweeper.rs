//! Notification expiry sweeper
//!
//! Deletes notifications whose expiry has passed. A daily pass runs at
//! midnight UTC and an hourly pass backstops it; both issue the same
//! unconditional delete, so overlapping runs are idempotent and need no
//! mutual exclusion.

use crate::AppState;
use chrono::{Timelike, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const SECS_PER_DAY: u64 = 24 * 60 * 60;
const SECS_PER_HOUR: u64 = 60 * 60;

/// Spawn both sweep schedules against the shared state.
pub fn spawn(state: Arc<AppState>) {
    tokio::spawn(daily_pass(state.clone()));
    tokio::spawn(hourly_pass(state));
    info!("Notification cleanup jobs scheduled");
}

/// Delete every expired notification; returns how many went away.
pub async fn purge_expired(db: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM notifications WHERE expires_at <= now()")
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

async fn daily_pass(state: Arc<AppState>) {
    loop {
        tokio::time::sleep(Duration::from_secs(seconds_until_midnight_utc())).await;
        info!("Running daily notification cleanup");
        run_once(&state).await;
    }
}

async fn hourly_pass(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(SECS_PER_HOUR));
    loop {
        interval.tick().await;
        run_once(&state).await;
    }
}

async fn run_once(state: &AppState) {
    match purge_expired(&state.db).await {
        Ok(deleted) => {
            if deleted > 0 {
                info!("Cleaned up {} expired notification(s)", deleted);
            }
        }
        Err(e) => error!("Notification cleanup failed: {}", e),
    }
}

fn seconds_until_midnight_utc() -> u64 {
    let elapsed_today = u64::from(Utc::now().num_seconds_from_midnight());
    SECS_PER_DAY - elapsed_today.min(SECS_PER_DAY - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midnight_wait_is_within_a_day() {
        let wait = seconds_until_midnight_utc();
        assert!(wait >= 1);
        assert!(wait <= SECS_PER_DAY);
    }
}
