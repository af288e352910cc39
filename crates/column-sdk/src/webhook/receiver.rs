//! Webhook receiver for HTTP intake and async processing coordination.
//!
//! The receiver is framework agnostic: the host converts its HTTP request into
//! a [`WebhookRequest`], calls [`WebhookReceiver::receive_webhook`], and maps the
//! returned [`WebhookResponse`] back onto its own response type.
//!
//! # Processing Steps
//!
//! 1. Validate the signature when a secret is configured (401 on failure)
//! 2. Parse and validate the event envelope (400 on failure)
//! 3. Apply event-type filters (200 acknowledgement, no dispatch, on mismatch)
//! 4. Return 200 and spawn handler tasks (fire-and-forget)
//!
//! Filtered events are still acknowledged so Column does not retry them.

use crate::webhook::handler::WebhookHandler;
use crate::webhook::validation::{SignatureValidator, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::webhook::{event_matches_filter, WebhookEnvelope};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

// ============================================================================
// Webhook Request/Response Types
// ============================================================================

/// Raw HTTP webhook request data.
///
/// # Examples
///
/// ```rust
/// use column_sdk::webhook::WebhookRequest;
/// use std::collections::HashMap;
///
/// let headers = HashMap::from([
///     ("X-Column-Signature".to_string(), "t=1,v1=ab".to_string()),
/// ]);
/// let request = WebhookRequest::new(headers, b"{}".to_vec().into());
/// assert_eq!(request.signature(), Some("t=1,v1=ab"));
/// assert_eq!(request.timestamp(), None);
/// ```
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    headers: HashMap<String, String>,
    body: Bytes,
}

impl WebhookRequest {
    /// Create a new webhook request.
    pub fn new(headers: HashMap<String, String>, body: Bytes) -> Self {
        Self { headers, body }
    }

    /// Look up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(|s| s.as_str())
    }

    /// Get the signature from the X-Column-Signature header.
    pub fn signature(&self) -> Option<&str> {
        self.header(SIGNATURE_HEADER)
    }

    /// Get the timestamp from the X-Column-Timestamp header.
    pub fn timestamp(&self) -> Option<&str> {
        self.header(TIMESTAMP_HEADER)
    }

    /// Get the raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.body
    }

    /// Get all headers.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}

/// HTTP response for webhook requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookResponse {
    /// 200 OK - Event accepted and dispatched to handlers
    Ok { message: String, event_id: String },

    /// 200 OK - Event acknowledged but filtered out
    Ignored { message: String, event_id: String },

    /// 401 Unauthorized - Invalid or missing signature
    Unauthorized { message: String },

    /// 400 Bad Request - Body is not a valid event envelope
    BadRequest { message: String },
}

impl WebhookResponse {
    /// Get the HTTP status code for this response.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Ok { .. } => 200,
            Self::Ignored { .. } => 200,
            Self::Unauthorized { .. } => 401,
            Self::BadRequest { .. } => 400,
        }
    }

    /// Get the response message.
    pub fn message(&self) -> &str {
        match self {
            Self::Ok { message, .. } => message,
            Self::Ignored { message, .. } => message,
            Self::Unauthorized { message } => message,
            Self::BadRequest { message } => message,
        }
    }

    /// Check if response indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok { .. } | Self::Ignored { .. })
    }
}

// ============================================================================
// Webhook Receiver
// ============================================================================

/// Webhook receiver for processing incoming Column deliveries.
///
/// # Examples
///
/// ```rust
/// use column_sdk::webhook::WebhookReceiver;
///
/// let receiver = WebhookReceiver::new(Some("whsec_test".to_string()))
///     .with_event_filters(vec!["entity.*".to_string()]);
/// assert_eq!(receiver.event_filters(), ["entity.*".to_string()]);
/// ```
pub struct WebhookReceiver {
    validator: Option<SignatureValidator>,
    event_filters: Vec<String>,
    handlers: Arc<RwLock<Vec<Arc<dyn WebhookHandler>>>>,
}

impl WebhookReceiver {
    /// Create a new webhook receiver.
    ///
    /// When `secret` is `None` or empty, signatures are not checked.
    pub fn new(secret: Option<String>) -> Self {
        let validator = secret
            .filter(|s| !s.is_empty())
            .map(SignatureValidator::new);

        Self {
            validator,
            event_filters: Vec::new(),
            handlers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Only dispatch events matching these filters. Empty means all events.
    pub fn with_event_filters(mut self, filters: Vec<String>) -> Self {
        self.event_filters = filters;
        self
    }

    /// Configured event filters.
    pub fn event_filters(&self) -> &[String] {
        &self.event_filters
    }

    /// Register a webhook handler.
    ///
    /// Handlers are invoked asynchronously after the response is produced.
    pub async fn add_handler(&mut self, handler: Arc<dyn WebhookHandler>) {
        let mut handlers = self.handlers.write().await;
        handlers.push(handler);
    }

    /// Process an incoming webhook request.
    ///
    /// Returns the response to send to Column. Handler execution happens on
    /// spawned tasks after this returns.
    pub async fn receive_webhook(&self, request: WebhookRequest) -> WebhookResponse {
        if let Some(validator) = &self.validator {
            if let Err(e) =
                validator.validate(request.payload(), request.signature(), request.timestamp())
            {
                warn!(error = %e, "Rejected webhook delivery");
                return WebhookResponse::Unauthorized {
                    message: e.to_string(),
                };
            }
        }

        let envelope = match WebhookEnvelope::from_slice(request.payload()) {
            Ok(env) => env,
            Err(e) => {
                warn!(error = %e, "Webhook payload failed validation");
                return WebhookResponse::BadRequest {
                    message: e.to_string(),
                };
            }
        };

        if !event_matches_filter(&envelope.event_type, &self.event_filters) {
            debug!(
                event_id = %envelope.id,
                event_type = %envelope.event_type,
                "Webhook event filtered out"
            );
            return WebhookResponse::Ignored {
                message: "Event type not subscribed".to_string(),
                event_id: envelope.id,
            };
        }

        info!(
            event_id = %envelope.id,
            event_type = %envelope.event_type,
            livemode = envelope.is_live(),
            "Webhook received"
        );

        let event_id = envelope.id.clone();

        // Spawn async handler tasks (fire-and-forget)
        let handlers = self.handlers.clone();
        let envelope = Arc::new(envelope);
        tokio::spawn(async move {
            let handlers_guard = handlers.read().await;
            for handler in handlers_guard.iter() {
                let handler = handler.clone();
                let envelope = envelope.clone();

                tokio::spawn(async move {
                    if let Err(e) = handler.handle_event(&envelope).await {
                        error!(
                            event_id = %envelope.id,
                            error = %e,
                            "Handler execution failed"
                        );
                    }
                });
            }
        });

        WebhookResponse::Ok {
            message: "Webhook received".to_string(),
            event_id,
        }
    }
}

impl std::fmt::Debug for WebhookReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookReceiver")
            .field("validator", &self.validator)
            .field("event_filters", &self.event_filters)
            .finish()
    }
}

#[cfg(test)]
#[path = "receiver_tests.rs"]
mod tests;
