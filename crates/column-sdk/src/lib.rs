//! # Column SDK
//!
//! Building blocks for integrating with the Column banking API.
//!
//! This SDK provides:
//! - Webhook signature verification and an inbound delivery receiver
//! - An authenticated API client with 429 retry and cursor pagination
//! - Loan and line-of-credit calculations
//!
//! # Examples
//!
//! ## Verifying a Webhook
//!
//! ```rust
//! use column_sdk::webhook::{generate_signature, verify_signature};
//!
//! let body = br#"{"id":"evt_1","type":"ach.outgoing_transfer.completed"}"#;
//! let signed = generate_signature(body, "whsec_test", None);
//! let timestamp = signed.timestamp.to_string();
//!
//! assert!(verify_signature(body, &signed.signature, "whsec_test", Some(&timestamp)));
//! assert!(!verify_signature(body, &signed.signature, "other_secret", Some(&timestamp)));
//! ```
//!
//! ## Loan Payments
//!
//! ```rust
//! use column_sdk::loan::{monthly_payment, LoanTerms};
//!
//! assert_eq!(monthly_payment(10_000.0, 5.0, 12), 856.07);
//!
//! let terms = LoanTerms::new(10_000.0, 5.0, 12).unwrap();
//! assert_eq!(terms.schedule().len(), 12);
//! ```

pub mod client;
pub mod error;
pub mod loan;
pub mod webhook;

// Re-export commonly used types at crate root for convenience
pub use client::{ApiRequest, ClientConfig, ColumnClient, Environment, Resource, RetryPolicy};
pub use error::{ApiError, ApiErrorBody, ValidationError, WebhookError};
pub use webhook::{SignatureValidator, WebhookEnvelope, WebhookReceiver};
