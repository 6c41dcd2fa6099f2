//! Authentication routes

use crate::auth::{create_token, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiError::Validation(
            "Name, email, and password are required".to_string(),
        ));
    }

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_one(&state.db)
        .await?;
    if existing > 0 {
        return Err(ApiError::Validation(
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Upstream(format!("Password hashing failed: {}", e)))?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, password_hash, created_at)
        VALUES ($1, $2, $3, $4, now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&password_hash)
    .fetch_one(&state.db)
    .await?;

    let token = create_token(user.id, &state.config.jwt_secret)
        .map_err(|e| ApiError::Upstream(format!("Token creation failed: {}", e)))?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let hash = user.password_hash.as_deref().ok_or(ApiError::Unauthorized)?;
    let valid = bcrypt::verify(&payload.password, hash).unwrap_or(false);
    if !valid {
        return Err(ApiError::Unauthorized);
    }

    let token = create_token(user.id, &state.config.jwt_secret)
        .map_err(|e| ApiError::Upstream(format!("Token creation failed: {}", e)))?;

    Ok(Json(AuthResponse { token, user }))
}

#[derive(Deserialize)]
pub struct GoogleLoginRequest {
    pub credential: String,
}

#[derive(Deserialize)]
struct GoogleTokenInfo {
    aud: String,
    sub: String,
    email: String,
    email_verified: String,
    #[serde(default)]
    name: Option<String>,
}

pub async fn google_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GoogleLoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let info: GoogleTokenInfo = state
        .http
        .get(GOOGLE_TOKENINFO_URL)
        .query(&[("id_token", payload.credential.as_str())])
        .send()
        .await
        .map_err(|e| ApiError::Upstream(format!("Token verification failed: {}", e)))?
        .error_for_status()
        .map_err(|_| ApiError::Validation("Invalid Google credential".to_string()))?
        .json()
        .await
        .map_err(|e| ApiError::Upstream(format!("Token verification failed: {}", e)))?;

    if info.aud != state.config.google_client_id {
        return Err(ApiError::Validation(
            "Google credential issued for another application".to_string(),
        ));
    }
    if info.email_verified != "true" {
        return Err(ApiError::Validation(
            "Google email not verified".to_string(),
        ));
    }

    // Create the account on first sign-in, or link the Google id to an
    // existing password account.
    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&info.email)
        .fetch_optional(&state.db)
        .await?;

    let user = match existing {
        Some(user) if user.google_id.is_some() => user,
        Some(user) => {
            sqlx::query_as::<_, User>(
                "UPDATE users SET google_id = $2 WHERE id = $1 RETURNING *",
            )
            .bind(user.id)
            .bind(&info.sub)
            .fetch_one(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (id, name, email, google_id, created_at)
                VALUES ($1, $2, $3, $4, now())
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(info.name.as_deref().unwrap_or(&info.email))
            .bind(&info.email)
            .bind(&info.sub)
            .fetch_one(&state.db)
            .await?
        }
    };

    let token = create_token(user.id, &state.config.jwt_secret)
        .map_err(|e| ApiError::Upstream(format!("Token creation failed: {}", e)))?;

    Ok(Json(AuthResponse { token, user }))
}

pub async fn profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(auth.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(json!({ "user": user })))
}
