//! Remote transaction API seam.
//!
//! [`TransactionApi`] is the wire boundary for the guarded top-up mutation.
//! [`MockApi`] serves tests and the CLI; the HTTP client lives in
//! [`super::http`] behind the `network` feature.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body of the top-up mutation.
///
/// Exactly one of `pin` / `verification_token` is present, mirroring the
/// verification method; the pipeline sets them from the
/// [`crate::verification::VerificationResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopupRequest {
    pub amount: f64,
    pub product_code: String,
    pub recipient_phone: String,
    /// Client-generated idempotency reference. Stable across retries of one
    /// mutation so the server can dedupe a replay that follows a timeout.
    pub client_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_mapping_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_cashback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<String>,
}

impl TopupRequest {
    pub fn new(
        amount: f64,
        product_code: impl Into<String>,
        recipient_phone: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            product_code: product_code.into(),
            recipient_phone: recipient_phone.into(),
            client_reference: uuid::Uuid::new_v4().to_string(),
            pin: None,
            verification_token: None,
            supplier_slug: None,
            supplier_mapping_id: None,
            use_cashback: None,
            offer_id: None,
        }
    }
}

/// Settlement details inside a successful response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopupData {
    pub transaction_id: String,
    pub status: String,
    pub amount: f64,
    pub balance: f64,
}

/// Response body of the top-up mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopupResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TopupData>,
}

/// A failed remote call: the structured server body when one was received,
/// plus the transport-level message when the failure never reached the
/// server or the body was unreadable.
#[derive(Debug, Clone, Default)]
pub struct ApiFailure {
    pub body: Option<Value>,
    pub transport: Option<String>,
}

impl ApiFailure {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            body: None,
            transport: Some(message.into()),
        }
    }

    pub fn body(body: Value) -> Self {
        Self {
            body: Some(body),
            transport: None,
        }
    }
}

/// Fallback when no server error shape matched.
pub const GENERIC_FAILURE_MESSAGE: &str = "Top-up failed. Please try again.";

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Surface the richest available error field from a failure.
///
/// Fixed priority: top-level `message`, provider `msg`, nested `data.msg`,
/// nested `data.message`, generic `error`, transport message, generic
/// fallback.
pub fn extract_error_message(failure: &ApiFailure) -> String {
    if let Some(body) = &failure.body {
        let data = body.get("data");
        let candidates = [
            non_empty_str(body.get("message")),
            non_empty_str(body.get("msg")),
            non_empty_str(data.and_then(|d| d.get("msg"))),
            non_empty_str(data.and_then(|d| d.get("message"))),
            non_empty_str(body.get("error")),
        ];
        if let Some(message) = candidates.into_iter().flatten().next() {
            return message.to_string();
        }
    }
    failure
        .transport
        .clone()
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}

/// Wire boundary for the guarded top-up mutation.
#[async_trait]
pub trait TransactionApi: Send + Sync {
    async fn submit_topup(&self, request: &TopupRequest) -> Result<TopupResponse, ApiFailure>;
}

/// Scripted in-memory backend for tests and the CLI.
#[derive(Default)]
pub struct MockApi {
    outcomes: std::sync::Mutex<std::collections::VecDeque<Result<TopupResponse, ApiFailure>>>,
    requests: std::sync::Mutex<Vec<TopupRequest>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_success(&self, balance: f64) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(TopupResponse {
                success: true,
                message: "Top-up successful".into(),
                data: Some(TopupData {
                    transaction_id: uuid::Uuid::new_v4().to_string(),
                    status: "completed".into(),
                    amount: 0.0,
                    balance,
                }),
            }));
    }

    /// Queue an arbitrary response, e.g. a 200 body with `success: false`.
    pub fn push_response(&self, response: TopupResponse) {
        self.outcomes.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_failure(&self, failure: ApiFailure) {
        self.outcomes.lock().unwrap().push_back(Err(failure));
    }

    /// Requests this backend has received, in order.
    pub fn requests(&self) -> Vec<TopupRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionApi for MockApi {
    async fn submit_topup(&self, request: &TopupRequest) -> Result<TopupResponse, ApiFailure> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiFailure::transport("no scripted outcome")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_only_present_fields() {
        let mut request = TopupRequest::new(500.0, "MTN-AIRTIME", "+2348012345678");
        request.pin = Some("0427".into());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["productCode"], "MTN-AIRTIME");
        assert_eq!(value["pin"], "0427");
        assert!(value.get("verificationToken").is_none());
        assert!(value.get("supplierSlug").is_none());
    }

    #[test]
    fn test_client_reference_is_unique_and_stable() {
        let first = TopupRequest::new(10.0, "MTN-AIRTIME", "+234");
        let second = TopupRequest::new(10.0, "MTN-AIRTIME", "+234");
        assert!(!first.client_reference.is_empty());
        assert_ne!(first.client_reference, second.client_reference);

        // Every serialization of one request carries the same reference, so
        // a retried attempt is deduplicable server-side.
        let a = serde_json::to_value(&first).unwrap();
        let b = serde_json::to_value(&first).unwrap();
        assert_eq!(a["clientReference"], b["clientReference"]);
        assert_eq!(a["clientReference"], first.client_reference.as_str());
    }

    #[test]
    fn test_extraction_priority_order() {
        let full = ApiFailure::body(json!({
            "message": "top",
            "msg": "provider",
            "data": {"msg": "nested-msg", "message": "nested-message"},
            "error": "generic"
        }));
        assert_eq!(extract_error_message(&full), "top");

        let no_top = ApiFailure::body(json!({
            "msg": "provider",
            "data": {"msg": "nested-msg"}
        }));
        assert_eq!(extract_error_message(&no_top), "provider");

        let nested_only = ApiFailure::body(json!({"data": {"msg": "Insufficient balance"}}));
        assert_eq!(extract_error_message(&nested_only), "Insufficient balance");

        let nested_message = ApiFailure::body(json!({"data": {"message": "Blocked"}}));
        assert_eq!(extract_error_message(&nested_message), "Blocked");

        let error_only = ApiFailure::body(json!({"error": "oops"}));
        assert_eq!(extract_error_message(&error_only), "oops");
    }

    #[test]
    fn test_extraction_falls_back_to_transport_then_generic() {
        let transport = ApiFailure::transport("connection reset");
        assert_eq!(extract_error_message(&transport), "connection reset");

        let empty = ApiFailure::default();
        assert_eq!(extract_error_message(&empty), GENERIC_FAILURE_MESSAGE);

        // Empty strings don't count as a match.
        let blank = ApiFailure::body(json!({"message": "", "data": {"msg": "real"}}));
        assert_eq!(extract_error_message(&blank), "real");
    }

    #[tokio::test]
    async fn test_mock_api_plays_outcomes() {
        let api = MockApi::new();
        api.push_success(950.0);
        let request = TopupRequest::new(50.0, "MTN-AIRTIME", "+234");

        let response = api.submit_topup(&request).await.unwrap();
        assert!(response.success);
        assert_eq!(response.data.unwrap().balance, 950.0);
        assert_eq!(api.requests().len(), 1);

        // Unscripted call fails at the transport level.
        assert!(api.submit_topup(&request).await.is_err());
    }
}
