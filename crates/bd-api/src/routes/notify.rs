//! Notification broadcast, query, and push-connection routes
//!
//! Broadcasts persist the notification before any fan-out so the record
//! survives even when no connections are live.

use crate::error::{ApiError, ApiResult};
use crate::models::{default_expiry, Notification, NotificationResponse, CATEGORIES};
use crate::registry::PushEvent;
use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    pub message: String,
    #[serde(rename = "type", default)]
    pub category: Option<String>,
    #[serde(default)]
    pub additional_data: Option<serde_json::Value>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub msg: String,
    pub recipients: usize,
    pub notification: NotificationSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSummary {
    pub id: Uuid,
    pub message: String,
    #[serde(rename = "type")]
    pub category: String,
    pub additional_data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

pub async fn send_reminder(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SendNotificationRequest>,
) -> ApiResult<Json<SendNotificationResponse>> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::Validation("Message is required".to_string()));
    }

    let category = payload.category.unwrap_or_else(|| "general".to_string());
    if !CATEGORIES.contains(&category.as_str()) {
        return Err(ApiError::Validation(format!(
            "Unknown notification type: {}",
            category
        )));
    }

    let additional_data = payload.additional_data.unwrap_or_else(|| json!({}));

    broadcast_notification(
        &state,
        &payload.message,
        &category,
        additional_data,
        payload.expires_at,
        "Notification sent",
    )
    .await
    .map(Json)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequestBroadcast {
    pub blood_type: String,
    pub location: String,
    pub hospital_name: String,
    pub contact_number: String,
    #[serde(default)]
    pub units_needed: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
}

pub async fn send_blood_request(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BloodRequestBroadcast>,
) -> ApiResult<Json<SendNotificationResponse>> {
    if payload.blood_type.trim().is_empty()
        || payload.location.trim().is_empty()
        || payload.hospital_name.trim().is_empty()
        || payload.contact_number.trim().is_empty()
    {
        return Err(ApiError::Validation(
            "Blood type, location, hospital name, and contact number are required".to_string(),
        ));
    }

    let message = format!(
        "URGENT: {} blood donation needed at {}",
        payload.blood_type, payload.hospital_name
    );

    let additional_data = json!({
        "bloodType": payload.blood_type,
        "location": payload.location,
        "hospitalName": payload.hospital_name,
        "contactNumber": payload.contact_number,
        "unitsNeeded": payload.units_needed.unwrap_or_else(|| "1-2 units".to_string()),
        "patientName": payload.patient_name.unwrap_or_else(|| "Anonymous".to_string()),
        "urgency": payload.urgency.unwrap_or_else(|| "high".to_string()),
        "requestTime": Utc::now().to_rfc3339(),
    });

    broadcast_notification(
        &state,
        &message,
        "emergency",
        additional_data,
        None,
        "Emergency blood request sent",
    )
    .await
    .map(Json)
}

/// Persist a notification, then push it to every live connection.
async fn broadcast_notification(
    state: &AppState,
    message: &str,
    category: &str,
    additional_data: serde_json::Value,
    expires_at: Option<DateTime<Utc>>,
    ack: &str,
) -> ApiResult<SendNotificationResponse> {
    let now = Utc::now();
    let expires_at = expires_at.unwrap_or_else(|| default_expiry(category, now));
    if expires_at <= now {
        return Err(ApiError::Validation(
            "Expiry must lie in the future".to_string(),
        ));
    }

    // Persist first: the record must survive even if no connection is live.
    let notification = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications
            (id, message, category, additional_data, created_at, expires_at, responses)
        VALUES ($1, $2, $3, $4, $5, $6, '[]'::jsonb)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(message)
    .bind(category)
    .bind(&additional_data)
    .bind(now)
    .bind(expires_at)
    .fetch_one(&state.db)
    .await?;

    let recipients = state
        .registry
        .broadcast(&PushEvent {
            id: notification.id,
            message: notification.message.clone(),
            category: notification.category.clone(),
            additional_data: notification.additional_data.clone(),
        })
        .await;

    info!(
        "Broadcast {} notification {} to {} connection(s)",
        notification.category, notification.id, recipients
    );

    Ok(SendNotificationResponse {
        msg: ack.to_string(),
        recipients,
        notification: NotificationSummary {
            id: notification.id,
            message: notification.message,
            category: notification.category,
            additional_data: notification.additional_data,
            timestamp: notification.created_at,
        },
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub notification_id: Uuid,
    pub response: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
}

pub async fn respond(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RespondRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if payload.response != "yes" && payload.response != "no" {
        return Err(ApiError::Validation(
            "Response must be 'yes' or 'no'".to_string(),
        ));
    }

    let entry = NotificationResponse {
        user_id: payload.user_id,
        user_name: payload.user_name,
        response: payload.response.clone(),
        contact_info: payload.contact_info,
        timestamp: Utc::now(),
    };
    let entry_json =
        serde_json::to_value(&entry).map_err(|e| ApiError::Upstream(e.to_string()))?;

    // Append-only: the notification itself is never mutated or removed here.
    let updated = sqlx::query_as::<_, Notification>(
        r#"
        UPDATE notifications
        SET responses = responses || $2::jsonb
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(payload.notification_id)
    .bind(&entry_json)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound("Notification"))?;

    // A positive response to an emergency is worth surfacing for follow-up.
    if payload.response == "yes" {
        if let Some(contact) = updated.additional_data.get("contactNumber") {
            info!(
                "Positive response to blood request {}, requester contact {}",
                updated.id, contact
            );
        }
    }

    Ok(Json(json!({
        "msg": "Response recorded",
        "notificationId": payload.notification_id,
        "response": payload.response,
    })))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveNotification {
    pub id: Uuid,
    pub message: String,
    #[serde(rename = "type")]
    pub category: String,
    pub additional_data: serde_json::Value,
    pub date: DateTime<Utc>,
    pub responses: serde_json::Value,
}

impl From<Notification> for ActiveNotification {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            message: n.message,
            category: n.category,
            additional_data: n.additional_data,
            date: n.created_at,
            responses: n.responses,
        }
    }
}

pub async fn all_active(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<serde_json::Value>> {
    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE expires_at > now() ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;

    let notifications: Vec<ActiveNotification> =
        notifications.into_iter().map(Into::into).collect();
    Ok(Json(json!({ "notifications": notifications })))
}

pub async fn emergency_active(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<serde_json::Value>> {
    let notifications = sqlx::query_as::<_, Notification>(
        r#"
        SELECT * FROM notifications
        WHERE category = 'emergency' AND expires_at > now()
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let requests: Vec<ActiveNotification> = notifications.into_iter().map(Into::into).collect();
    Ok(Json(json!({ "emergencyRequests": requests })))
}

/// Upgrade to a push connection; registered for the socket's lifetime.
pub async fn ws_connect(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    use futures::{SinkExt, StreamExt};

    let (id, mut events) = state.registry.register().await;
    info!("Push connection {} established", id);

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let payload = match serde_json::to_string(&json!({
                    "event": "notification",
                    "data": event,
                })) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!("Failed to encode push event: {}", e);
                        continue;
                    }
                };
                // Best-effort delivery; a failed send ends the connection.
                if sink.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(other)) => debug!("Ignoring inbound push-channel message: {:?}", other),
                }
            }
        }
    }

    state.registry.unregister(id).await;
    info!("Push connection {} closed", id);
}
