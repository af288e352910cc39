//! Webhook handler trait for application-provided processing logic.
//!
//! Handlers receive validated [`WebhookEnvelope`] instances and run after the
//! HTTP response has been produced, so slow work never delays the
//! acknowledgement Column waits for.

use crate::webhook::WebhookEnvelope;
use async_trait::async_trait;
use std::error::Error;

/// Application-provided webhook event handler.
///
/// Handler errors are logged by the receiver but do not change the HTTP
/// response. Multiple handlers run concurrently for each event, so
/// implementations must be `Send + Sync`.
///
/// # Examples
///
/// ```rust,no_run
/// use column_sdk::webhook::{WebhookEnvelope, WebhookHandler};
/// use async_trait::async_trait;
///
/// struct LoanPaymentHandler;
///
/// #[async_trait]
/// impl WebhookHandler for LoanPaymentHandler {
///     async fn handle_event(&self, envelope: &WebhookEnvelope) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///         if envelope.category() == "loan" {
///             println!("Loan event {}", envelope.id);
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    /// Handle a webhook event asynchronously.
    ///
    /// Called after the delivery has been acknowledged.
    async fn handle_event(&self, envelope: &WebhookEnvelope) -> Result<(), Box<dyn Error + Send + Sync>>;
}
