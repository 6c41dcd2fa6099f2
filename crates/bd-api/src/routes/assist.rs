//! Generative-assistant routes
//!
//! Each handler composes a prompt from stored records, calls the configured
//! text backend, and parses the reply. The pure computations these routes
//! lean on (compatibility, scoring, forecasting) live in bd-core; nothing
//! here feeds model output back into them.

use crate::error::{ApiError, ApiResult};
use crate::generate::{strip_code_fences, TextGenerator};
use crate::models::{BloodInventory, DonationRequest, Donor, DonorContact};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use bd_core::{compatible_donor_types, daily_usage, project, BloodType, InventoryRow, UsageSample};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Donors offered to the model per matching request.
const MATCH_CANDIDATE_LIMIT: i64 = 50;

fn require_generator(state: &AppState) -> ApiResult<&Arc<dyn TextGenerator>> {
    state
        .generator
        .as_ref()
        .ok_or_else(|| ApiError::Upstream("Text backend is not configured".to_string()))
}

// ---------------------------------------------------------------------------
// Donor matching

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorRecommendation {
    pub donor_id: String,
    pub priority_score: f64,
    pub reason_for_selection: String,
    pub contact_strategy: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedRecommendation {
    #[serde(flatten)]
    pub recommendation: DonorRecommendation,
    pub donor: Option<DonorContact>,
}

pub async fn donor_match(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let generator = require_generator(&state)?.clone();

    let request =
        sqlx::query_as::<_, DonationRequest>("SELECT * FROM donation_requests WHERE id = $1")
            .bind(request_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or(ApiError::NotFound("Donation request"))?;

    let requested = BloodType::from_str(&request.blood_type)?;
    let type_strings: Vec<String> = compatible_donor_types(requested)
        .iter()
        .map(|t| t.to_string())
        .collect();

    let donors = sqlx::query_as::<_, Donor>(
        r#"
        SELECT * FROM donors
        WHERE blood_type = ANY($1) AND eligible_from <= now()
        LIMIT $2
        "#,
    )
    .bind(&type_strings)
    .bind(MATCH_CANDIDATE_LIMIT)
    .fetch_all(&state.db)
    .await?;

    if donors.is_empty() {
        return Ok(Json(json!({
            "message": "No eligible donors found",
            "recommendations": [],
        })));
    }

    let now = Utc::now();
    let donor_details: String = donors
        .iter()
        .map(|d| {
            let days_since = d
                .last_donation
                .map(|last| (now - last).num_days().to_string())
                .unwrap_or_else(|| "Never donated".to_string());
            format!(
                "Donor ID: {}\nName: {}\nBlood Type: {}\nPrevious Donations: {}\nDays Since Last Donation: {}\n",
                d.id,
                d.name,
                d.blood_type,
                d.donation_history.len(),
                days_since
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        r#"You are an assistant for a blood donation center.

PATIENT NEED:
- Blood type needed: {}
- Units needed: {}
- Urgency level: {}

ELIGIBLE DONORS:
{}

Based on the above information, recommend the top 5 donors to contact in priority order.
Consider blood type compatibility, donation history, time since last donation, and the urgency level.
For donors with exact blood type matches, prioritize them higher.
For urgent/critical requests, prioritize donors who have donated frequently and reliably in the past.

Respond ONLY with a JSON array of objects with exactly these fields:
"donorId" (string), "priorityScore" (number), "reasonForSelection" (string), "contactStrategy" (string)."#,
        request.blood_type, request.units_needed, request.urgency, donor_details
    );

    let reply = generator
        .generate(&prompt)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let recommendations: Vec<DonorRecommendation> =
        serde_json::from_str(strip_code_fences(&reply)).map_err(|e| {
            ApiError::Upstream(format!("Unparseable recommendation output: {}", e))
        })?;

    // Hydrate each recommendation with the stored donor record.
    let mut hydrated = Vec::with_capacity(recommendations.len());
    for rec in recommendations {
        let donor = Uuid::parse_str(&rec.donor_id)
            .ok()
            .and_then(|id| donors.iter().find(|d| d.id == id))
            .map(|d| DonorContact {
                id: d.id,
                name: d.name.clone(),
                blood_type: d.blood_type.clone(),
                phone: d.phone.clone(),
                email: d.email.clone(),
                last_donation: d.last_donation,
            });
        if donor.is_none() {
            warn!("Recommendation names unknown donor {:?}", rec.donor_id);
        }
        hydrated.push(HydratedRecommendation {
            recommendation: rec,
            donor,
        });
    }

    Ok(Json(json!({
        "requestDetails": request,
        "recommendations": hydrated,
    })))
}

// ---------------------------------------------------------------------------
// Appeal generation

/// Stock criticality relative to the requested units.
pub fn criticality_level(current_stock: i64, units_needed: i64) -> &'static str {
    if units_needed <= 0 {
        return "Sufficient";
    }
    let ratio = current_stock as f64 / units_needed as f64;
    if ratio < 0.5 {
        "Critical"
    } else if ratio < 1.0 {
        "High"
    } else if ratio < 2.0 {
        "Moderate"
    } else {
        "Sufficient"
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Appeal {
    pub sms: String,
    pub email: AppealEmail,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct AppealEmail {
    pub subject: String,
    pub body: String,
}

/// Split a generated appeal into its SMS / subject / body sections.
pub fn parse_appeal(text: &str) -> Appeal {
    let sms_start = text.find("SMS:");
    let subject_start = text.find("EMAIL SUBJECT:");
    let body_start = text.find("EMAIL BODY:");

    let sms = sms_start
        .map(|start| {
            let tail = &text[start + "SMS:".len()..];
            let end = subject_start
                .map(|s| s.saturating_sub(start + "SMS:".len()))
                .unwrap_or(tail.len());
            tail[..end.min(tail.len())].trim().to_string()
        })
        .unwrap_or_default();

    let subject = subject_start
        .map(|start| {
            let tail = &text[start + "EMAIL SUBJECT:".len()..];
            let end = body_start
                .map(|s| s.saturating_sub(start + "EMAIL SUBJECT:".len()))
                .unwrap_or(tail.len());
            tail[..end.min(tail.len())].trim().to_string()
        })
        .unwrap_or_default();

    let body = body_start
        .map(|start| text[start + "EMAIL BODY:".len()..].trim().to_string())
        .unwrap_or_default();

    Appeal {
        sms,
        email: AppealEmail { subject, body },
    }
}

pub async fn appeal(
    State(state): State<Arc<AppState>>,
    Path((donor_id, request_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    let generator = require_generator(&state)?.clone();

    let donor = sqlx::query_as::<_, Donor>("SELECT * FROM donors WHERE id = $1")
        .bind(donor_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Donor"))?;

    let request =
        sqlx::query_as::<_, DonationRequest>("SELECT * FROM donation_requests WHERE id = $1")
            .bind(request_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or(ApiError::NotFound("Donation request"))?;

    let current_stock = sqlx::query_as::<_, BloodInventory>(
        "SELECT * FROM blood_inventory WHERE blood_type = $1",
    )
    .bind(&request.blood_type)
    .fetch_optional(&state.db)
    .await?
    .map(|i| i.units as i64)
    .unwrap_or(0);

    let criticality = criticality_level(current_stock, request.units_needed as i64);
    let last_donation = donor
        .last_donation
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Never".to_string());

    let prompt = format!(
        r#"Generate a personalized donation appeal message for a blood donor.

DONOR INFORMATION:
Name: {}
Blood Type: {}
Previous Donations: {}
Last Donation Date: {}

REQUEST DETAILS:
Patient Blood Type Needed: {}
Units Needed: {}
Urgency: {}
Current Blood Bank Stock: {} units
Stock Criticality: {}

Write a personalized SMS and email appeal to this donor that:
1. Addresses them by name
2. Mentions their specific blood type compatibility
3. Conveys the appropriate level of urgency without causing alarm
4. Includes a clear call to action
5. Expresses gratitude for past donations if they've donated before
6. Keeps the message concise, warm, and motivating

FORMAT YOUR RESPONSE AS:

SMS: [SMS text limited to 160 characters]

EMAIL SUBJECT: [Email subject line]

EMAIL BODY:
[Email content]"#,
        donor.name,
        donor.blood_type,
        donor.donation_history.len(),
        last_donation,
        request.blood_type,
        request.units_needed,
        request.urgency,
        current_stock,
        criticality
    );

    let reply = generator
        .generate(&prompt)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(json!({
        "donorId": donor.id,
        "donorName": donor.name,
        "requestId": request.id,
        "appeal": parse_appeal(&reply),
    })))
}

// ---------------------------------------------------------------------------
// Explainable forecast

#[derive(Deserialize)]
pub struct ForecastQuery {
    pub days: Option<i64>,
}

pub async fn forecast_explain(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let generator = require_generator(&state)?.clone();
    let days = query.days.unwrap_or(30).max(1);

    let inventory =
        sqlx::query_as::<_, BloodInventory>("SELECT * FROM blood_inventory ORDER BY blood_type")
            .fetch_all(&state.db)
            .await?;

    let window_start = Utc::now() - Duration::days(bd_core::forecast::USAGE_WINDOW_DAYS);
    let request_rows = sqlx::query_as::<_, (String, i32)>(
        "SELECT blood_type, units_needed FROM donation_requests WHERE request_date >= $1",
    )
    .bind(window_start)
    .fetch_all(&state.db)
    .await?;

    let samples: Vec<UsageSample> = request_rows
        .into_iter()
        .filter_map(|(blood_type, units)| {
            BloodType::from_str(&blood_type).ok().map(|bt| UsageSample {
                blood_type: bt,
                units_needed: units as i64,
            })
        })
        .collect();

    let usage = daily_usage(&samples);

    let inventory_text: String = inventory
        .iter()
        .map(|i| format!("{}: {} units", i.blood_type, i.units))
        .collect::<Vec<_>>()
        .join("\n");
    let usage_text: String = usage
        .iter()
        .map(|(bt, rate)| format!("{}: Average daily usage of {:.2} units", bt, rate))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        r#"You are an assistant for a blood bank. Analyze the current blood inventory and historical usage data to provide a {days}-day forecast with clear explanations.

CURRENT INVENTORY:
{inventory_text}

HISTORICAL USAGE DATA (LAST 90 DAYS):
{usage_text}

Please provide:
1. A forecast of expected blood usage for each blood type over the next {days} days
2. Clear explanations of your reasoning for each blood type
3. Identification of potential shortages
4. Specific, actionable recommendations for the blood bank

Format your analysis to be easily understood by blood bank staff."#
    );

    let explanation = generator
        .generate(&prompt)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let rows: Vec<InventoryRow> = inventory
        .into_iter()
        .map(|i| InventoryRow {
            blood_type: i.blood_type,
            units: Some(i.units as f64),
        })
        .collect();
    let quantitative = project(&rows, &usage, days);

    Ok(Json(json!({
        "quantitativeForecast": quantitative,
        "explainableForecast": explanation,
        "daysForecasted": days,
        "analysisDate": Utc::now(),
    })))
}

// ---------------------------------------------------------------------------
// Engagement strategy

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementStrategy {
    pub donor_profile: String,
    pub recommended_approach: String,
    pub communication_channels: Vec<CommunicationChannel>,
    pub key_messages: Vec<String>,
    pub potential_barriers: Vec<String>,
    pub long_term_engagement: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommunicationChannel {
    pub channel: String,
    pub rationale: String,
    pub timing: String,
}

pub async fn engagement(
    State(state): State<Arc<AppState>>,
    Path(donor_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let generator = require_generator(&state)?.clone();

    let donor = sqlx::query_as::<_, Donor>("SELECT * FROM donors WHERE id = $1")
        .bind(donor_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Donor"))?;

    let days_since = donor
        .last_donation
        .map(|last| (Utc::now() - last).num_days().to_string())
        .unwrap_or_else(|| "Never donated".to_string());
    let conditions = if donor.medical_conditions.is_empty() {
        "None".to_string()
    } else {
        donor.medical_conditions.join(", ")
    };

    let prompt = format!(
        r#"You are a consultant for a blood donation center. Create a personalized donor engagement strategy.

DONOR INFORMATION:
Name: {}
Blood Type: {}
Total Donations: {}
Last Donation: {} days ago
Medical Conditions: {}

Based on this donor's profile, develop a personalized engagement strategy to encourage regular donations.
Consider their donation history, the rarity of their blood type, and any patterns in their donation behavior.

Respond ONLY with a JSON object with exactly these fields:
"donorProfile" (string), "recommendedApproach" (string),
"communicationChannels" (array of {{"channel", "rationale", "timing"}} objects),
"keyMessages" (array of strings), "potentialBarriers" (array of strings),
"longTermEngagement" (string)."#,
        donor.name,
        donor.blood_type,
        donor.donation_history.len(),
        days_since,
        conditions
    );

    let reply = generator
        .generate(&prompt)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let strategy: EngagementStrategy = serde_json::from_str(strip_code_fences(&reply))
        .map_err(|e| ApiError::Upstream(format!("Unparseable strategy output: {}", e)))?;

    Ok(Json(json!({
        "donorId": donor.id,
        "donorName": donor.name,
        "bloodType": donor.blood_type,
        "engagementStrategy": strategy,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criticality_ladder() {
        assert_eq!(criticality_level(4, 10), "Critical");
        assert_eq!(criticality_level(5, 10), "High");
        assert_eq!(criticality_level(10, 10), "Moderate");
        assert_eq!(criticality_level(20, 10), "Sufficient");
        assert_eq!(criticality_level(0, 0), "Sufficient");
    }

    #[test]
    fn test_parse_appeal_sections() {
        let text = "SMS: Please donate today!\n\nEMAIL SUBJECT: We need you\n\nEMAIL BODY:\nDear donor,\nPlease come by.";
        let appeal = parse_appeal(text);
        assert_eq!(appeal.sms, "Please donate today!");
        assert_eq!(appeal.email.subject, "We need you");
        assert!(appeal.email.body.starts_with("Dear donor,"));
    }

    #[test]
    fn test_parse_appeal_missing_sections() {
        let appeal = parse_appeal("no structure at all");
        assert!(appeal.sms.is_empty());
        assert!(appeal.email.subject.is_empty());
        assert!(appeal.email.body.is_empty());
    }

    #[test]
    fn test_parse_appeal_sms_only() {
        let appeal = parse_appeal("SMS: short note");
        assert_eq!(appeal.sms, "short note");
        assert!(appeal.email.body.is_empty());
    }
}
