//! Payment-gateway client
//!
//! Order creation goes to the Razorpay REST API; payment verification is
//! an offline HMAC-SHA256 check over `order_id|payment_id` against the
//! gateway-supplied signature.

use crate::error::ApiError;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

const ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";

type HmacSha256 = Hmac<Sha256>;

pub struct PaymentClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
}

impl PaymentClient {
    pub fn new(http: reqwest::Client, key_id: String, key_secret: String) -> Self {
        Self {
            http,
            key_id,
            key_secret,
        }
    }

    /// Create a gateway order for `amount` (smallest currency unit), with
    /// automatic capture.
    pub async fn create_order(&self, amount: i64) -> Result<serde_json::Value, ApiError> {
        let body = json!({
            "amount": amount,
            "currency": "INR",
            "receipt": format!("receipt_{}", Utc::now().timestamp_millis()),
            "payment_capture": 1,
        });

        let order = self
            .http
            .post(ORDERS_URL)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("Order creation failed: {}", e)))?
            .error_for_status()
            .map_err(|e| ApiError::Upstream(format!("Order creation failed: {}", e)))?
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("Order creation failed: {}", e)))?;

        Ok(order)
    }

    /// Check a hex-encoded payment signature against the shared secret.
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_signature(&self.key_secret, order_id, payment_id, signature)
    }
}

/// HMAC-SHA256 over `order_id|payment_id`, compared in constant time.
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let sig = sign("secret", "order_1", "pay_1");
        assert!(verify_signature("secret", "order_1", "pay_1", &sig));
    }

    #[test]
    fn test_tampered_payment_id_rejected() {
        let sig = sign("secret", "order_1", "pay_1");
        assert!(!verify_signature("secret", "order_1", "pay_2", &sig));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let sig = sign("secret", "order_1", "pay_1");
        assert!(!verify_signature("other", "order_1", "pay_1", &sig));
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        assert!(!verify_signature("secret", "order_1", "pay_1", "zzzz"));
    }
}
