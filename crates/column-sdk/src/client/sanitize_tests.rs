//! Tests for log redaction helpers.

use super::*;

#[test]
fn test_mask_secret_keeps_edges() {
    assert_eq!(mask_secret("col_abcdefghijklmnop"), "col_...mnop");
    assert_eq!(mask_secret("123456789"), "1234...6789");
}

/// Verify that short values reveal nothing.
#[test]
fn test_mask_secret_short_values() {
    assert_eq!(mask_secret(""), "****");
    assert_eq!(mask_secret("12345678"), "****");
}

#[test]
fn test_sanitize_endpoint_replaces_ids() {
    assert_eq!(
        sanitize_endpoint("/bank-accounts/bacc_2Z3n5kBfTq8mYc1Lr9Dx0WpQvAa/balance"),
        "/bank-accounts/[ID]/balance"
    );
    assert_eq!(
        sanitize_endpoint("/transfers/book/book_2Z3n5kBfTq8mYc1Lr9Dx0W"),
        "/transfers/book/[ID]"
    );
}

/// Verify that short identifiers and plain paths are left alone.
#[test]
fn test_sanitize_endpoint_leaves_short_tokens() {
    assert_eq!(sanitize_endpoint("/entities"), "/entities");
    assert_eq!(sanitize_endpoint("/checks/chk_123"), "/checks/chk_123");
}

#[test]
fn test_api_key_shape() {
    assert!(is_valid_api_key("col_abcdefghij0123456789"));
    assert!(!is_valid_api_key("col_short"));
    assert!(!is_valid_api_key("sk_abcdefghij0123456789"));
    assert!(!is_valid_api_key("col_abcdefghij-0123456789"));
}
