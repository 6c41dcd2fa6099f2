//! Donor registration and advisory routes

use crate::error::{ApiError, ApiResult};
use crate::models::{CreateDonorRequest, Donor, DonorContact};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bd_core::{
    check_eligibility, compatible_donor_types, compute_eligibility_start, score_donor, BloodType,
    DonorStats, Eligibility,
};
use chrono::Utc;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Donors returned by a suggestion query, after ranking.
const SUGGESTION_LIMIT: usize = 20;

/// Eligible donors fetched per compatibility lookup.
const COMPATIBLE_FETCH_LIMIT: i64 = 200;

#[derive(Serialize)]
pub struct CreateDonorResponse {
    pub message: String,
    pub donor: Donor,
}

pub async fn create_donor(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateDonorRequest>,
) -> ApiResult<(StatusCode, Json<CreateDonorResponse>)> {
    let blood_type = BloodType::from_str(&payload.blood_type)?;

    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(ApiError::Validation(
            "Name and email are required".to_string(),
        ));
    }

    // The derived eligibility date is recomputed on every write so it can
    // never drift from the last-donation date.
    let now = Utc::now();
    let eligible_from = compute_eligibility_start(payload.last_donation, now);

    let donor = sqlx::query_as::<_, Donor>(
        r#"
        INSERT INTO donors
            (id, name, email, phone, blood_type, address, last_donation,
             donation_history, eligible_from, medical_conditions)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(blood_type.as_str())
    .bind(&payload.address)
    .bind(payload.last_donation)
    .bind(&payload.donation_history)
    .bind(eligible_from)
    .bind(&payload.medical_conditions)
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateDonorResponse {
            message: "Donor created successfully".to_string(),
            donor,
        }),
    ))
}

pub async fn check_donor_eligibility(
    State(state): State<Arc<AppState>>,
    Path(donor_id): Path<Uuid>,
) -> ApiResult<Json<Eligibility>> {
    let donor = sqlx::query_as::<_, Donor>("SELECT * FROM donors WHERE id = $1")
        .bind(donor_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Donor"))?;

    let result = check_eligibility(donor.last_donation, &donor.medical_conditions, Utc::now());
    Ok(Json(result))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibleDonorsResponse {
    pub requested_blood_type: BloodType,
    pub compatible_types: Vec<BloodType>,
    pub compatible_donors: Vec<DonorContact>,
}

pub async fn find_compatible(
    State(state): State<Arc<AppState>>,
    Path(blood_type): Path<String>,
) -> ApiResult<Json<CompatibleDonorsResponse>> {
    let requested = BloodType::from_str(&blood_type)?;
    let compatible_types = compatible_donor_types(requested);

    let donors = fetch_eligible_donors(&state, compatible_types).await?;

    Ok(Json(CompatibleDonorsResponse {
        requested_blood_type: requested,
        compatible_types: compatible_types.to_vec(),
        compatible_donors: donors
            .into_iter()
            .map(|d| DonorContact {
                id: d.id,
                name: d.name,
                blood_type: d.blood_type,
                phone: d.phone,
                email: d.email,
                last_donation: d.last_donation,
            })
            .collect(),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedDonor {
    pub donor: DonorContact,
    pub score: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestDonorsResponse {
    pub blood_type_needed: BloodType,
    pub suggested_donors: Vec<SuggestedDonor>,
}

pub async fn suggest_donors(
    State(state): State<Arc<AppState>>,
    Path(blood_type): Path<String>,
) -> ApiResult<Json<SuggestDonorsResponse>> {
    let requested = BloodType::from_str(&blood_type)?;
    let compatible_types = compatible_donor_types(requested);

    let donors = fetch_eligible_donors(&state, compatible_types).await?;
    let now = Utc::now();

    let mut suggested: Vec<SuggestedDonor> = donors
        .into_iter()
        .filter_map(|d| {
            // Stored rows hold validated types; skip rather than fail if an
            // administrative edit slipped something unparseable in.
            let donor_type = BloodType::from_str(&d.blood_type).ok()?;
            let stats = DonorStats {
                blood_type: donor_type,
                last_donation: d.last_donation,
                donation_count: d.donation_history.len(),
            };
            Some(SuggestedDonor {
                score: score_donor(&stats, requested, now),
                donor: DonorContact {
                    id: d.id,
                    name: d.name,
                    blood_type: d.blood_type,
                    phone: d.phone,
                    email: d.email,
                    last_donation: d.last_donation,
                },
            })
        })
        .collect();

    // Stable sort keeps the original relative order between equal scores.
    suggested.sort_by(|a, b| b.score.cmp(&a.score));
    suggested.truncate(SUGGESTION_LIMIT);

    Ok(Json(SuggestDonorsResponse {
        blood_type_needed: requested,
        suggested_donors: suggested,
    }))
}

/// Donors of any of `types` whose eligibility window has opened.
async fn fetch_eligible_donors(
    state: &AppState,
    types: &[BloodType],
) -> Result<Vec<Donor>, sqlx::Error> {
    let type_strings: Vec<String> = types.iter().map(|t| t.to_string()).collect();
    sqlx::query_as::<_, Donor>(
        r#"
        SELECT * FROM donors
        WHERE blood_type = ANY($1) AND eligible_from <= now()
        ORDER BY eligible_from
        LIMIT $2
        "#,
    )
    .bind(&type_strings)
    .bind(COMPATIBLE_FETCH_LIMIT)
    .fetch_all(&state.db)
    .await
}
