//! Column webhook processing and validation.
//!
//! This module provides webhook intake for Column deliveries: signature
//! validation with a replay window, envelope validation, event-type
//! filtering, and async handler execution using a fire-and-forget pattern.
//!
//! # Core Components
//!
//! - [`WebhookHandler`] - Trait for application-provided event processing logic
//! - [`WebhookReceiver`] - Framework-agnostic intake with validation and async dispatch
//! - [`SignatureValidator`] - HMAC-SHA256 signature validation
//! - [`WebhookEnvelope`] - The validated event record
//!
//! # Example
//!
//! ```rust,no_run
//! use column_sdk::webhook::{WebhookEnvelope, WebhookHandler, WebhookReceiver, WebhookRequest};
//! use async_trait::async_trait;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! struct TransferHandler;
//!
//! #[async_trait]
//! impl WebhookHandler for TransferHandler {
//!     async fn handle_event(
//!         &self,
//!         envelope: &WebhookEnvelope,
//!     ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!         println!("{} -> {:?}", envelope.event_type, envelope.resource_ids());
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() {
//! let mut receiver = WebhookReceiver::new(Some("whsec_...".to_string()))
//!     .with_event_filters(vec!["ach.*".to_string(), "wire.*".to_string()]);
//! receiver.add_handler(Arc::new(TransferHandler)).await;
//!
//! let headers = HashMap::from([
//!     ("x-column-signature".to_string(), "t=1700000000,v1=abc...".to_string()),
//! ]);
//! let body = bytes::Bytes::from_static(b"{\"id\":\"evt_1\"}");
//! let response = receiver.receive_webhook(WebhookRequest::new(headers, body)).await;
//! println!("Status: {}", response.status_code());
//! # }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::WebhookError;

pub mod handler;
pub mod receiver;
pub mod validation;

// Re-export main types
pub use handler::WebhookHandler;
pub use receiver::{WebhookReceiver, WebhookRequest, WebhookResponse};
pub use validation::{
    build_signature_header, generate_json_signature, generate_signature, parse_signature_header,
    verify_signature, verify_signature_at, SignatureHeader, SignatureValidator, SignedPayload,
    MAX_WEBHOOK_AGE_SECONDS, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};

/// Fields in `data` that commonly identify the affected resources.
const RESOURCE_ID_FIELDS: [&str; 7] = [
    "id",
    "entity_id",
    "account_id",
    "bank_account_id",
    "transfer_id",
    "card_id",
    "loan_id",
];

/// A validated Column webhook event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    /// Unique event identifier
    pub id: String,

    /// Dot-delimited event type, e.g. `entity.created`
    #[serde(rename = "type")]
    pub event_type: String,

    /// ISO-8601 creation time
    pub created_at: String,

    /// Event payload
    pub data: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub livemode: Option<bool>,
}

impl WebhookEnvelope {
    /// Parse and validate a raw delivery body.
    pub fn from_slice(body: &[u8]) -> Result<Self, WebhookError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| WebhookError::InvalidPayload {
                message: format!("body is not valid JSON: {}", e),
            })?;
        Self::from_value(value)
    }

    /// Validate an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, WebhookError> {
        if !is_valid_envelope(&value) {
            return Err(WebhookError::InvalidPayload {
                message: "expected string id, type and created_at plus an object data field"
                    .to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| WebhookError::InvalidPayload {
            message: e.to_string(),
        })
    }

    /// Category before the first dot of the event type.
    pub fn category(&self) -> &str {
        classify_event(&self.event_type)
    }

    /// Whether the event came from live mode. Absent flags count as live.
    pub fn is_live(&self) -> bool {
        self.livemode.unwrap_or(true)
    }

    /// Identifier fields found in `data`, in a fixed field order.
    pub fn resource_ids(&self) -> Vec<(&'static str, &str)> {
        RESOURCE_ID_FIELDS
            .iter()
            .filter_map(|field| {
                self.data
                    .get(*field)
                    .and_then(Value::as_str)
                    .map(|id| (*field, id))
            })
            .collect()
    }
}

/// Structural check for an event envelope.
///
/// Requires string `id`, `type` and `created_at` plus an object `data`.
pub fn is_valid_envelope(payload: &Value) -> bool {
    let Some(object) = payload.as_object() else {
        return false;
    };

    ["id", "type", "created_at"]
        .iter()
        .all(|key| object.get(*key).is_some_and(Value::is_string))
        && object.get("data").is_some_and(Value::is_object)
}

/// Check an event type against a subscription filter list.
///
/// An empty list matches everything, as does a `*` entry. A `prefix.*` entry
/// matches any type starting with `prefix.`; other entries match exactly.
///
/// ```rust
/// use column_sdk::webhook::event_matches_filter;
///
/// assert!(event_matches_filter::<&str>("entity.created", &[]));
/// assert!(event_matches_filter("entity.created", &["entity.*"]));
/// assert!(!event_matches_filter("entityx.created", &["entity.*"]));
/// ```
pub fn event_matches_filter<S: AsRef<str>>(event_type: &str, filters: &[S]) -> bool {
    if filters.is_empty() {
        return true;
    }

    filters.iter().any(|filter| {
        let filter = filter.as_ref();
        if filter == "*" || filter == event_type {
            return true;
        }
        match filter.strip_suffix('*') {
            Some(prefix) if prefix.ends_with('.') => event_type.starts_with(prefix),
            _ => false,
        }
    })
}

/// Category of an event type, the segment before the first dot.
pub fn classify_event(event_type: &str) -> &str {
    match event_type.split('.').next() {
        Some(category) if !category.is_empty() => category,
        _ => "unknown",
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
