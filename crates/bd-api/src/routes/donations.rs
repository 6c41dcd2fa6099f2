//! Payment-based donation routes

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub amount: Option<i64>,
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let amount = match payload.amount {
        Some(a) if a > 0 => a,
        _ => {
            return Err(ApiError::Validation(
                "Invalid amount. Please provide a valid positive number.".to_string(),
            ))
        }
    };

    info!("Creating payment order for {} (smallest unit)", amount);
    let order = state.payments.create_order(amount).await?;
    Ok(Json(order))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub order_creation_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

pub async fn verify_payment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyPaymentRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let (order_id, payment_id, signature) = match (
        payload.order_creation_id,
        payload.razorpay_payment_id,
        payload.razorpay_signature,
    ) {
        (Some(o), Some(p), Some(s)) => (o, p, s),
        _ => {
            return Err(ApiError::Validation(
                "Missing required payment verification parameters".to_string(),
            ))
        }
    };

    if !state.payments.verify_signature(&order_id, &payment_id, &signature) {
        return Err(ApiError::Validation(
            "Payment verification failed".to_string(),
        ));
    }

    info!("Payment {} verified for order {}", payment_id, order_id);

    Ok(Json(json!({
        "success": true,
        "msg": "Payment has been verified and donation recorded. Thank you for your contribution!",
    })))
}
