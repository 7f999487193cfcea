//! Webhook signature verification.
//!
//! Implements the Standard Webhooks signing scheme used by the payment
//! provider:
//!
//! - signed content is `{webhook-id}.{webhook-timestamp}.{raw body}`
//! - the MAC is HMAC-SHA256, base64-encoded
//! - `webhook-signature` holds one or more space-separated `v1,<base64>` entries
//!
//! Verification runs against the raw body bytes before any JSON parsing.
//! Timestamps are checked against a symmetric tolerance window to bound
//! replay.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::provider_event::{ProviderEvent, VerifiedEvent};
use super::webhook_errors::WebhookError;

/// Maximum distance between the signed timestamp and now, in either direction.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

/// The three signature headers of a delivery, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureHeaders {
    pub id: Option<String>,
    pub timestamp: Option<String>,
    pub signature: Option<String>,
}

/// Verifier for payment provider webhook signatures.
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl WebhookVerifier {
    /// Creates a verifier from the configured signing secret.
    ///
    /// A `whsec_`-prefixed secret carries a base64 key; any other secret is
    /// used as raw bytes.
    pub fn new(secret: &str) -> Self {
        let key = secret
            .strip_prefix(SECRET_PREFIX)
            .and_then(|encoded| STANDARD.decode(encoded).ok())
            .unwrap_or_else(|| secret.as_bytes().to_vec());
        Self { key }
    }

    /// Verifies the delivery and decodes its body.
    ///
    /// # Errors
    ///
    /// - `MissingHeader` - a signature header is absent or blank
    /// - `InvalidTimestamp` - timestamp header is not an integer
    /// - `TimestampOutOfRange` - timestamp outside the tolerance window
    /// - `InvalidSignature` - no `v1` entry matches
    /// - `ParseError` - signature valid but body undecodable
    pub fn verify(
        &self,
        headers: &SignatureHeaders,
        body: &[u8],
    ) -> Result<VerifiedEvent, WebhookError> {
        self.verify_at(headers, body, chrono::Utc::now().timestamp())
    }

    /// Same as [`verify`](Self::verify) against an explicit clock.
    pub fn verify_at(
        &self,
        headers: &SignatureHeaders,
        body: &[u8],
        now_secs: i64,
    ) -> Result<VerifiedEvent, WebhookError> {
        // 1. Required headers
        let id = required(&headers.id, "webhook-id")?;
        let timestamp_raw = required(&headers.timestamp, "webhook-timestamp")?;
        let signature_header = required(&headers.signature, "webhook-signature")?;

        // 2. Timestamp window
        let timestamp: i64 = timestamp_raw
            .parse()
            .map_err(|_| WebhookError::InvalidTimestamp)?;
        if now_secs.abs_diff(timestamp) > TIMESTAMP_TOLERANCE_SECS.unsigned_abs() {
            return Err(WebhookError::TimestampOutOfRange);
        }

        // 3. Signature (constant-time, any matching v1 entry)
        let expected = self.compute_signature(id, timestamp_raw, body)?;
        let matched = signature_header
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .filter_map(|(_, encoded)| STANDARD.decode(encoded).ok())
            .any(|candidate| constant_time_compare(&expected, &candidate));
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        // 4. Decode
        let (event_type, event, data) = ProviderEvent::decode(body)?;

        Ok(VerifiedEvent {
            delivery_id: id.to_string(),
            event_type,
            event,
            data,
        })
    }

    /// Produces a `webhook-signature` header value for the given delivery.
    pub fn sign(&self, id: &str, timestamp: i64, body: &[u8]) -> Result<String, WebhookError> {
        let mac = self.compute_signature(id, &timestamp.to_string(), body)?;
        Ok(format!("{},{}", SIGNATURE_VERSION, STANDARD.encode(mac)))
    }

    fn compute_signature(
        &self,
        id: &str,
        timestamp: &str,
        body: &[u8],
    ) -> Result<Vec<u8>, WebhookError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, WebhookError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(WebhookError::MissingHeader(name))
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &str = "test_webhook_secret";
    const NOW: i64 = 1_705_276_800;

    fn body() -> Vec<u8> {
        br#"{"type":"subscription.active","data":{"id":"sub_1","status":"active"}}"#.to_vec()
    }

    fn signed_headers(verifier: &WebhookVerifier, body: &[u8], timestamp: i64) -> SignatureHeaders {
        SignatureHeaders {
            id: Some("msg_1".to_string()),
            timestamp: Some(timestamp.to_string()),
            signature: Some(verifier.sign("msg_1", timestamp, body).unwrap()),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Success Cases
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn valid_signature_yields_typed_event() {
        let verifier = WebhookVerifier::new(SECRET);
        let body = body();
        let headers = signed_headers(&verifier, &body, NOW);

        let verified = verifier.verify_at(&headers, &body, NOW).unwrap();

        assert_eq!(verified.delivery_id, "msg_1");
        assert_eq!(verified.event_type, "subscription.active");
        assert!(matches!(verified.event, ProviderEvent::SubscriptionActive(_)));
    }

    #[test]
    fn any_matching_entry_is_accepted() {
        let verifier = WebhookVerifier::new(SECRET);
        let body = body();
        let mut headers = signed_headers(&verifier, &body, NOW);
        let good = headers.signature.take().unwrap();
        headers.signature = Some(format!("v1,AAAA v2,zzzz {}", good));

        assert!(verifier.verify_at(&headers, &body, NOW).is_ok());
    }

    #[test]
    fn whsec_secret_is_base64_decoded() {
        let encoded = format!("whsec_{}", STANDARD.encode(b"raw-key-bytes"));
        let prefixed = WebhookVerifier::new(&encoded);
        let raw = WebhookVerifier::new("raw-key-bytes");

        let body = body();
        let headers = signed_headers(&raw, &body, NOW);
        assert!(prefixed.verify_at(&headers, &body, NOW).is_ok());
    }

    #[test]
    fn timestamp_at_tolerance_edge_is_accepted() {
        let verifier = WebhookVerifier::new(SECRET);
        let body = body();
        let headers = signed_headers(&verifier, &body, NOW - TIMESTAMP_TOLERANCE_SECS);

        assert!(verifier.verify_at(&headers, &body, NOW).is_ok());
    }

    // ══════════════════════════════════════════════════════════════
    // Rejection Cases
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn tampered_body_is_rejected() {
        let verifier = WebhookVerifier::new(SECRET);
        let body = body();
        let headers = signed_headers(&verifier, &body, NOW);
        let tampered = body.iter().map(|b| if *b == b'1' { b'2' } else { *b }).collect::<Vec<_>>();

        let err = verifier.verify_at(&headers, &tampered, NOW).unwrap_err();
        assert!(matches!(err, WebhookError::InvalidSignature));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signer = WebhookVerifier::new("other_secret");
        let verifier = WebhookVerifier::new(SECRET);
        let body = body();
        let headers = signed_headers(&signer, &body, NOW);

        assert!(matches!(
            verifier.verify_at(&headers, &body, NOW),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let verifier = WebhookVerifier::new(SECRET);
        let body = body();
        let headers = signed_headers(&verifier, &body, NOW - TIMESTAMP_TOLERANCE_SECS - 1);

        assert!(matches!(
            verifier.verify_at(&headers, &body, NOW),
            Err(WebhookError::TimestampOutOfRange)
        ));
    }

    #[test]
    fn future_timestamp_is_rejected() {
        let verifier = WebhookVerifier::new(SECRET);
        let body = body();
        let headers = signed_headers(&verifier, &body, NOW + TIMESTAMP_TOLERANCE_SECS + 1);

        assert!(matches!(
            verifier.verify_at(&headers, &body, NOW),
            Err(WebhookError::TimestampOutOfRange)
        ));
    }

    #[test]
    fn extreme_timestamps_are_out_of_range() {
        let verifier = WebhookVerifier::new(SECRET);
        let body = body();

        for extreme in [i64::MIN, i64::MAX] {
            let mut headers = signed_headers(&verifier, &body, NOW);
            headers.timestamp = Some(extreme.to_string());

            assert!(matches!(
                verifier.verify_at(&headers, &body, NOW),
                Err(WebhookError::TimestampOutOfRange)
            ));
        }
    }

    #[test]
    fn non_numeric_timestamp_is_rejected() {
        let verifier = WebhookVerifier::new(SECRET);
        let body = body();
        let mut headers = signed_headers(&verifier, &body, NOW);
        headers.timestamp = Some("yesterday".to_string());

        assert!(matches!(
            verifier.verify_at(&headers, &body, NOW),
            Err(WebhookError::InvalidTimestamp)
        ));
    }

    #[test]
    fn missing_headers_are_reported_by_name() {
        let verifier = WebhookVerifier::new(SECRET);
        let body = body();

        let mut headers = signed_headers(&verifier, &body, NOW);
        headers.id = None;
        assert!(matches!(
            verifier.verify_at(&headers, &body, NOW),
            Err(WebhookError::MissingHeader("webhook-id"))
        ));

        let mut headers = signed_headers(&verifier, &body, NOW);
        headers.signature = Some("   ".to_string());
        assert!(matches!(
            verifier.verify_at(&headers, &body, NOW),
            Err(WebhookError::MissingHeader("webhook-signature"))
        ));
    }

    #[test]
    fn signature_for_different_delivery_id_is_rejected() {
        let verifier = WebhookVerifier::new(SECRET);
        let body = body();
        let mut headers = signed_headers(&verifier, &body, NOW);
        headers.id = Some("msg_2".to_string());

        assert!(matches!(
            verifier.verify_at(&headers, &body, NOW),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn valid_signature_over_garbage_body_is_parse_error() {
        let verifier = WebhookVerifier::new(SECRET);
        let body = b"not json".to_vec();
        let headers = signed_headers(&verifier, &body, NOW);

        assert!(matches!(
            verifier.verify_at(&headers, &body, NOW),
            Err(WebhookError::ParseError(_))
        ));
    }

    proptest! {
        #[test]
        fn any_single_byte_flip_fails_verification(index in 0usize..64, flip in 1u8..=255) {
            let verifier = WebhookVerifier::new(SECRET);
            let body = body();
            let headers = signed_headers(&verifier, &body, NOW);

            let mut tampered = body.clone();
            let i = index % tampered.len();
            tampered[i] ^= flip;

            prop_assert!(matches!(
                verifier.verify_at(&headers, &tampered, NOW),
                Err(WebhookError::InvalidSignature)
            ));
        }
    }
}
