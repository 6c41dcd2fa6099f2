//! Inventory forecasting
//!
//! Two-stage projection: average daily usage per blood type over a 90-day
//! window, then stock depletion over a requested horizon. Output always
//! covers all eight blood types so the response shape is stable regardless
//! of how sparse the inputs are.

use crate::BloodType;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::warn;

/// Length of the historical window daily usage is averaged over, in days.
pub const USAGE_WINDOW_DAYS: i64 = 90;

/// Safety buffer applied to recommended replenishment.
const REPLENISH_BUFFER: f64 = 1.2;

/// One historical donation request, reduced to what the forecaster needs.
#[derive(Debug, Clone)]
pub struct UsageSample {
    pub blood_type: BloodType,
    pub units_needed: i64,
}

/// A raw inventory row as fetched from storage.
///
/// Kept stringly-typed on purpose: rows with an unrecognized type or a
/// missing unit count are skipped with a warning rather than failing the
/// whole projection.
#[derive(Debug, Clone)]
pub struct InventoryRow {
    pub blood_type: String,
    pub units: Option<f64>,
}

/// Complete projection over the forecast horizon.
///
/// Every map contains all eight blood types, zero-defaulted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryForecast {
    pub current_inventory: BTreeMap<BloodType, i64>,
    pub predicted_usage: BTreeMap<BloodType, i64>,
    pub predicted_shortage: BTreeMap<BloodType, i64>,
    pub recommended_donations: BTreeMap<BloodType, i64>,
}

/// Stage A: average daily usage per blood type over the request window.
///
/// Callers pre-filter `samples` to the most recent [`USAGE_WINDOW_DAYS`];
/// types with no requests come back as 0.0.
pub fn daily_usage(samples: &[UsageSample]) -> BTreeMap<BloodType, f64> {
    let mut totals: BTreeMap<BloodType, i64> = BloodType::ALL.iter().map(|bt| (*bt, 0)).collect();

    for sample in samples {
        *totals.entry(sample.blood_type).or_insert(0) += sample.units_needed;
    }

    totals
        .into_iter()
        .map(|(bt, total)| (bt, total as f64 / USAGE_WINDOW_DAYS as f64))
        .collect()
}

/// Stage B: project stock depletion over `days` and derive shortages.
///
/// Predicted usage is rounded up; a negative projected remainder becomes
/// the shortage, and the replenishment recommendation adds a 20% buffer on
/// top of it. Malformed rows are skipped, never fatal.
pub fn project(
    rows: &[InventoryRow],
    usage: &BTreeMap<BloodType, f64>,
    days: i64,
) -> InventoryForecast {
    let zeroed: BTreeMap<BloodType, i64> = BloodType::ALL.iter().map(|bt| (*bt, 0)).collect();
    let mut forecast = InventoryForecast {
        current_inventory: zeroed.clone(),
        predicted_usage: zeroed.clone(),
        predicted_shortage: zeroed.clone(),
        recommended_donations: zeroed,
    };

    for row in rows {
        let blood_type = match BloodType::from_str(&row.blood_type) {
            Ok(bt) => bt,
            Err(_) => {
                warn!("Skipping inventory row with unknown blood type: {:?}", row.blood_type);
                continue;
            }
        };
        let units = match row.units {
            Some(u) if u.is_finite() => u,
            _ => {
                warn!("Skipping inventory row for {} with missing unit count", blood_type);
                continue;
            }
        };

        let rate = usage.get(&blood_type).copied().unwrap_or(0.0);
        let predicted = (rate * days as f64).ceil() as i64;

        forecast.current_inventory.insert(blood_type, units as i64);
        forecast.predicted_usage.insert(blood_type, predicted);

        let remaining = units as i64 - predicted;
        if remaining < 0 {
            let shortage = remaining.abs();
            forecast.predicted_shortage.insert(blood_type, shortage);
            forecast
                .recommended_donations
                .insert(blood_type, (shortage as f64 * REPLENISH_BUFFER).ceil() as i64);
        }
    }

    forecast
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_usage_averages_over_window() {
        let samples = vec![
            UsageSample {
                blood_type: BloodType::APositive,
                units_needed: 45,
            },
            UsageSample {
                blood_type: BloodType::APositive,
                units_needed: 45,
            },
        ];
        let usage = daily_usage(&samples);
        assert_eq!(usage[&BloodType::APositive], 1.0);
        assert_eq!(usage[&BloodType::ONegative], 0.0);
    }

    #[test]
    fn test_shortage_with_buffer() {
        // 10 units on hand, 1/day for 30 days: usage 30, shortage 20,
        // recommendation ceil(20 * 1.2) = 24.
        let rows = vec![InventoryRow {
            blood_type: "O-".to_string(),
            units: Some(10.0),
        }];
        let mut usage = BTreeMap::new();
        usage.insert(BloodType::ONegative, 1.0);

        let forecast = project(&rows, &usage, 30);
        assert_eq!(forecast.predicted_usage[&BloodType::ONegative], 30);
        assert_eq!(forecast.predicted_shortage[&BloodType::ONegative], 20);
        assert_eq!(forecast.recommended_donations[&BloodType::ONegative], 24);
    }

    #[test]
    fn test_surplus_means_zero_shortage() {
        let rows = vec![InventoryRow {
            blood_type: "A+".to_string(),
            units: Some(100.0),
        }];
        let mut usage = BTreeMap::new();
        usage.insert(BloodType::APositive, 1.0);

        let forecast = project(&rows, &usage, 30);
        assert_eq!(forecast.predicted_shortage[&BloodType::APositive], 0);
        assert_eq!(forecast.recommended_donations[&BloodType::APositive], 0);
    }

    #[test]
    fn test_empty_inventory_yields_complete_shape() {
        let forecast = project(&[], &daily_usage(&[]), 30);
        for map in [
            &forecast.current_inventory,
            &forecast.predicted_usage,
            &forecast.predicted_shortage,
            &forecast.recommended_donations,
        ] {
            assert_eq!(map.len(), 8);
            assert!(map.values().all(|v| *v == 0));
        }
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let rows = vec![
            InventoryRow {
                blood_type: "X?".to_string(),
                units: Some(50.0),
            },
            InventoryRow {
                blood_type: "B+".to_string(),
                units: None,
            },
            InventoryRow {
                blood_type: "B-".to_string(),
                units: Some(4.0),
            },
        ];
        let forecast = project(&rows, &daily_usage(&[]), 30);
        assert_eq!(forecast.current_inventory[&BloodType::BNegative], 4);
        assert_eq!(forecast.current_inventory[&BloodType::BPositive], 0);
        assert_eq!(forecast.current_inventory.len(), 8);
    }

    #[test]
    fn test_fractional_usage_rounds_up() {
        let rows = vec![InventoryRow {
            blood_type: "AB-".to_string(),
            units: Some(2.0),
        }];
        let mut usage = BTreeMap::new();
        usage.insert(BloodType::AbNegative, 0.1);

        let forecast = project(&rows, &usage, 25);
        // 0.1 * 25 = 2.5, rounded up to 3.
        assert_eq!(forecast.predicted_usage[&BloodType::AbNegative], 3);
        assert_eq!(forecast.predicted_shortage[&BloodType::AbNegative], 1);
        assert_eq!(forecast.recommended_donations[&BloodType::AbNegative], 2);
    }
}
