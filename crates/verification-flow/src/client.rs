//! Client for the remote verification endpoint

use async_trait::async_trait;
use guildgate_common::{Error, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Something that can confirm an email-verification token.
#[async_trait]
pub trait VerificationApi: Send + Sync {
    /// Confirm `token`. Any failure is reported as one of the two
    /// [`Error`] kinds; callers never see transport details.
    async fn verify(&self, token: &str) -> Result<()>;
}

/// Client for `GET <endpoint>?token=<token>`
pub struct HttpVerificationClient {
    endpoint: String,
    client: reqwest::Client,
}

/// Most of a failure body that is read; anything longer is not a reason.
const MAX_ERROR_BODY_BYTES: usize = 8 * 1024;

/// Fields of a failure body that may carry the reason, in order of preference
const REASON_FIELDS: [&str; 2] = ["message", "error"];

impl HttpVerificationClient {
    /// Create a new client with the given request timeout
    pub fn new(endpoint: String, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl VerificationApi for HttpVerificationClient {
    async fn verify(&self, token: &str) -> Result<()> {
        debug!("Verifying email token against {}", self.endpoint);

        let mut response = match self
            .client
            .get(&self.endpoint)
            .query(&[("token", token)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Verification endpoint unreachable: {}", e);
                return Err(Error::rejected(None));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Verification endpoint accepted token ({})", status);
            return Ok(());
        }

        // A body that is missing, oversized or not JSON just means no reason was given.
        let reason = read_limited_body(&mut response)
            .await
            .and_then(|body| rejection_reason(&body));

        debug!("Verification endpoint rejected token ({}): {:?}", status, reason);
        Err(Error::rejected(reason))
    }
}

/// Read at most [`MAX_ERROR_BODY_BYTES`]; `None` if the body is longer or unreadable.
async fn read_limited_body(response: &mut reqwest::Response) -> Option<Vec<u8>> {
    if response
        .content_length()
        .is_some_and(|len| len > MAX_ERROR_BODY_BYTES as u64)
    {
        debug!("Ignoring oversized failure body");
        return None;
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.ok()? {
        if body.len() + chunk.len() > MAX_ERROR_BODY_BYTES {
            debug!("Ignoring oversized failure body");
            return None;
        }
        body.extend_from_slice(&chunk);
    }
    Some(body)
}

/// First non-blank string among the reason fields of a JSON object body
fn rejection_reason(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    REASON_FIELDS
        .iter()
        .filter_map(|field| value.get(field).and_then(Value::as_str))
        .find(|reason| !reason.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpVerificationClient::new(
            "http://localhost:4000/auth/verify-email".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:4000/auth/verify-email");
    }

    #[test]
    fn test_reason_prefers_message_field() {
        let body = br#"{"statusCode":400,"error":"Bad Request","message":"Token expired"}"#;
        assert_eq!(rejection_reason(body).as_deref(), Some("Token expired"));
    }

    #[test]
    fn test_reason_skips_blank_and_non_string_fields() {
        assert_eq!(
            rejection_reason(br#"{"message":"  ","error":"Token expired"}"#).as_deref(),
            Some("Token expired")
        );
        assert_eq!(
            rejection_reason(br#"{"error":true,"message":"Token expired"}"#).as_deref(),
            Some("Token expired")
        );
        assert_eq!(
            rejection_reason(br#"{"message":{"code":"E1"},"error":"Token expired"}"#).as_deref(),
            Some("Token expired")
        );
    }

    #[test]
    fn test_no_reason_without_usable_field() {
        assert_eq!(rejection_reason(br#"{"error":""}"#), None);
        assert_eq!(rejection_reason(br#"{"status":400}"#), None);
        assert_eq!(rejection_reason(br#"["Token expired"]"#), None);
        assert_eq!(rejection_reason(b"oops"), None);
    }
}
