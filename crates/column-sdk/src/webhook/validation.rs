//! Webhook signature generation and validation.
//!
//! Column signs each delivery with HMAC-SHA256 over `"{timestamp}.{body}"`
//! (or the bare body when no timestamp is sent) and hex-encodes the digest.
//! Deliveries carry either a structured `t=<ts>,v1=<hex>` signature header or
//! a bare hex signature with a separate timestamp header.
//!
//! Verification never returns an error for bad input: malformed hex, stale
//! timestamps and wrong secrets all produce `false`.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, instrument};

use crate::error::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "X-Column-Signature";

/// Header carrying the delivery timestamp when the signature header is bare.
pub const TIMESTAMP_HEADER: &str = "X-Column-Timestamp";

/// Replay window for signed deliveries.
pub const MAX_WEBHOOK_AGE_SECONDS: i64 = 300;

/// A signature produced by [`generate_signature`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPayload {
    /// Hex-encoded HMAC-SHA256 digest
    pub signature: String,

    /// Unix timestamp (seconds) that was signed alongside the payload
    pub timestamp: i64,
}

/// Components of a structured `t=...,v1=...` signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: String,
    pub signature: String,
}

fn signing_input(body: &[u8], timestamp: Option<&str>) -> Vec<u8> {
    match timestamp {
        Some(ts) => {
            let mut input = Vec::with_capacity(ts.len() + 1 + body.len());
            input.extend_from_slice(ts.as_bytes());
            input.push(b'.');
            input.extend_from_slice(body);
            input
        }
        None => body.to_vec(),
    }
}

fn compute_hmac(payload: &[u8], secret: &str) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload);
    Some(mac.finalize().into_bytes().to_vec())
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;

    // Length is not secret
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// Verify a webhook signature against the current time.
///
/// See [`verify_signature_at`].
pub fn verify_signature(
    raw_body: impl AsRef<[u8]>,
    claimed_signature: &str,
    secret: &str,
    claimed_timestamp: Option<&str>,
) -> bool {
    verify_signature_at(
        raw_body,
        claimed_signature,
        secret,
        claimed_timestamp,
        Utc::now(),
    )
}

/// Verify a webhook signature relative to `now`.
///
/// Returns `false` when the secret is empty, when the timestamp is present
/// but unparseable or more than [`MAX_WEBHOOK_AGE_SECONDS`] away from `now`,
/// when the claimed signature is not valid hex, or when the digest differs.
///
/// # Examples
///
/// ```rust
/// use column_sdk::webhook::{generate_signature, verify_signature};
///
/// let body = br#"{"id":"evt_1","type":"entity.created"}"#;
/// let signed = generate_signature(body, "whsec", None);
/// let ts = signed.timestamp.to_string();
///
/// assert!(verify_signature(body, &signed.signature, "whsec", Some(&ts)));
/// assert!(!verify_signature(body, &signed.signature, "other", Some(&ts)));
/// ```
pub fn verify_signature_at(
    raw_body: impl AsRef<[u8]>,
    claimed_signature: &str,
    secret: &str,
    claimed_timestamp: Option<&str>,
    now: DateTime<Utc>,
) -> bool {
    if secret.is_empty() {
        return false;
    }

    if let Some(ts) = claimed_timestamp {
        let Ok(seconds) = ts.trim().parse::<i64>() else {
            debug!("Webhook timestamp is not an integer");
            return false;
        };
        let age = now.timestamp().saturating_sub(seconds).saturating_abs();
        if age > MAX_WEBHOOK_AGE_SECONDS {
            debug!(age_seconds = age, "Webhook timestamp outside replay window");
            return false;
        }
    }

    let Ok(claimed) = hex::decode(claimed_signature.trim()) else {
        return false;
    };

    let input = signing_input(raw_body.as_ref(), claimed_timestamp);
    match compute_hmac(&input, secret) {
        Some(expected) => constant_time_compare(&claimed, &expected),
        None => false,
    }
}

/// Sign a payload the way Column signs deliveries.
///
/// The timestamp defaults to the current Unix time. The result always
/// verifies with [`verify_signature`] given the same payload, secret and
/// timestamp.
pub fn generate_signature(
    payload: impl AsRef<[u8]>,
    secret: &str,
    timestamp: Option<i64>,
) -> SignedPayload {
    let timestamp = timestamp.unwrap_or_else(|| Utc::now().timestamp());
    let ts = timestamp.to_string();
    let input = signing_input(payload.as_ref(), Some(&ts));
    let digest = compute_hmac(&input, secret).unwrap_or_default();

    SignedPayload {
        signature: hex::encode(digest),
        timestamp,
    }
}

/// Serialize `payload` as JSON and sign the result.
pub fn generate_json_signature<T: Serialize>(
    payload: &T,
    secret: &str,
    timestamp: Option<i64>,
) -> Result<SignedPayload, serde_json::Error> {
    let body = serde_json::to_vec(payload)?;
    Ok(generate_signature(body, secret, timestamp))
}

/// Parse a structured `t=<timestamp>,v1=<signature>` header.
///
/// Pairs may appear in any order and unknown keys are ignored. Returns
/// `None` when either `t` or `v1` is missing.
///
/// ```rust
/// use column_sdk::webhook::parse_signature_header;
///
/// let parsed = parse_signature_header("t=1700000000,v1=abcd").unwrap();
/// assert_eq!(parsed.timestamp, "1700000000");
/// assert_eq!(parsed.signature, "abcd");
///
/// assert!(parse_signature_header("abcd").is_none());
/// ```
pub fn parse_signature_header(header: &str) -> Option<SignatureHeader> {
    let mut timestamp = None;
    let mut signature = None;

    for pair in header.split(',') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };
        match key.trim() {
            "t" => timestamp = Some(value.trim().to_string()),
            "v1" => signature = Some(value.trim().to_string()),
            _ => {}
        }
    }

    match (timestamp, signature) {
        (Some(timestamp), Some(signature)) if !timestamp.is_empty() && !signature.is_empty() => {
            Some(SignatureHeader {
                timestamp,
                signature,
            })
        }
        _ => None,
    }
}

/// Build a structured signature header value.
pub fn build_signature_header(signature: &str, timestamp: i64) -> String {
    format!("t={},v1={}", timestamp, signature)
}

/// Validates Column webhook deliveries with a shared secret.
///
/// Accepts both header styles: a structured `t=...,v1=...` value in
/// [`SIGNATURE_HEADER`], or a bare hex digest there plus an optional
/// [`TIMESTAMP_HEADER`].
///
/// # Examples
///
/// ```rust
/// use column_sdk::webhook::{build_signature_header, generate_signature, SignatureValidator};
///
/// let validator = SignatureValidator::new("whsec_test");
/// let body = br#"{"id":"evt_1"}"#;
/// let signed = generate_signature(body, "whsec_test", None);
/// let header = build_signature_header(&signed.signature, signed.timestamp);
///
/// assert!(validator.validate(body, Some(&header), None).is_ok());
/// ```
#[derive(Clone)]
pub struct SignatureValidator {
    secret: String,
}

impl SignatureValidator {
    /// Create a validator for the given webhook secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Check a delivery's signature headers against its body.
    #[instrument(skip(self, payload, signature, timestamp), fields(has_timestamp = timestamp.is_some()))]
    pub fn validate(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
    ) -> Result<(), WebhookError> {
        self.validate_at(payload, signature, timestamp, Utc::now())
    }

    /// [`validate`](Self::validate) relative to an explicit `now`.
    pub fn validate_at(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), WebhookError> {
        let signature = signature.ok_or(WebhookError::MissingSignature {
            header: SIGNATURE_HEADER,
        })?;

        let valid = match parse_signature_header(signature) {
            Some(parsed) => verify_signature_at(
                payload,
                &parsed.signature,
                &self.secret,
                Some(&parsed.timestamp),
                now,
            ),
            None => verify_signature_at(payload, signature, &self.secret, timestamp, now),
        };

        if valid {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }
}

// Security: Don't expose secrets in debug output
impl std::fmt::Debug for SignatureValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureValidator")
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
