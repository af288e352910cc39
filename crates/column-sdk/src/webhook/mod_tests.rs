//! Tests for envelope validation and event filtering.

use super::*;
use serde_json::json;

fn sample_event() -> Value {
    json!({
        "id": "evt_2Z3n5kBfTq8mYc1Lr9Dx0WpQvAa",
        "type": "ach.outgoing_transfer.settled",
        "created_at": "2024-05-01T12:00:00Z",
        "data": {
            "id": "acht_2Z3n5kBfTq8mYc1Lr9Dx0WpQvAb",
            "bank_account_id": "bacc_2Z3n5kBfTq8mYc1Lr9Dx0WpQvAc",
            "amount": 125000
        }
    })
}

mod envelope_validation_tests {
    use super::*;

    #[test]
    fn test_complete_envelope_is_valid() {
        assert!(is_valid_envelope(&sample_event()));
    }

    /// Verify that every required field is mandatory.
    #[test]
    fn test_missing_required_field_is_invalid() {
        for field in ["id", "type", "created_at", "data"] {
            let mut event = sample_event();
            event.as_object_mut().unwrap().remove(field);
            assert!(!is_valid_envelope(&event), "accepted event without {}", field);
        }
    }

    #[test]
    fn test_wrong_field_types_are_invalid() {
        let mut event = sample_event();
        event["id"] = json!(42);
        assert!(!is_valid_envelope(&event));

        let mut event = sample_event();
        event["data"] = json!("not an object");
        assert!(!is_valid_envelope(&event));
    }

    #[test]
    fn test_non_object_payloads_are_invalid() {
        assert!(!is_valid_envelope(&json!(null)));
        assert!(!is_valid_envelope(&json!([sample_event()])));
        assert!(!is_valid_envelope(&json!("evt")));
    }

    #[test]
    fn test_from_slice_parses_optional_fields() {
        let mut event = sample_event();
        event["api_version"] = json!("2024-01-01");
        event["livemode"] = json!(false);
        let body = serde_json::to_vec(&event).unwrap();

        let envelope = WebhookEnvelope::from_slice(&body).unwrap();

        assert_eq!(envelope.event_type, "ach.outgoing_transfer.settled");
        assert_eq!(envelope.api_version.as_deref(), Some("2024-01-01"));
        assert!(!envelope.is_live());
    }

    /// Verify that an absent livemode flag is treated as live.
    #[test]
    fn test_livemode_defaults_to_live() {
        let envelope = WebhookEnvelope::from_value(sample_event()).unwrap();
        assert_eq!(envelope.livemode, None);
        assert!(envelope.is_live());
    }

    #[test]
    fn test_from_slice_rejects_bad_json() {
        let result = WebhookEnvelope::from_slice(b"{not json");
        assert!(matches!(result, Err(WebhookError::InvalidPayload { .. })));
    }

    #[test]
    fn test_from_value_rejects_incomplete_envelope() {
        let result = WebhookEnvelope::from_value(json!({"id": "evt_1"}));
        assert!(matches!(result, Err(WebhookError::InvalidPayload { .. })));
    }

    #[test]
    fn test_resource_ids_in_field_order() {
        let envelope = WebhookEnvelope::from_value(sample_event()).unwrap();

        assert_eq!(
            envelope.resource_ids(),
            vec![
                ("id", "acht_2Z3n5kBfTq8mYc1Lr9Dx0WpQvAb"),
                ("bank_account_id", "bacc_2Z3n5kBfTq8mYc1Lr9Dx0WpQvAc"),
            ]
        );
    }
}

mod event_filter_tests {
    use super::*;

    /// Verify that an empty filter list matches every event.
    #[test]
    fn test_empty_filters_match_everything() {
        let filters: Vec<String> = Vec::new();
        assert!(event_matches_filter("entity.created", &filters));
        assert!(event_matches_filter("", &filters));
    }

    #[test]
    fn test_wildcard_prefix_matches_category() {
        assert!(event_matches_filter("entity.created", &["entity.*"]));
        assert!(event_matches_filter("entity.updated", &["entity.*"]));
        assert!(!event_matches_filter("account.created", &["entity.*"]));
    }

    /// Verify that prefix matching respects the dot boundary.
    #[test]
    fn test_wildcard_prefix_requires_dot_boundary() {
        assert!(!event_matches_filter("entityx.created", &["entity.*"]));
        assert!(!event_matches_filter("entity", &["entity.*"]));
    }

    #[test]
    fn test_nested_prefix() {
        let filters = ["ach.incoming_transfer.*"];
        assert!(event_matches_filter("ach.incoming_transfer.settled", &filters));
        assert!(!event_matches_filter("ach.outgoing_transfer.settled", &filters));
    }

    #[test]
    fn test_global_wildcard_matches_everything() {
        assert!(event_matches_filter("anything.at.all", &["*"]));
        assert!(event_matches_filter("loan.payment.received", &["wire.*", "*"]));
    }

    #[test]
    fn test_exact_match() {
        let filters = vec!["loan.payment.received".to_string()];
        assert!(event_matches_filter("loan.payment.received", &filters));
        assert!(!event_matches_filter("loan.payment.reversed", &filters));
    }

    #[test]
    fn test_any_filter_may_match() {
        let filters = ["wire.*", "book.transfer.completed"];
        assert!(event_matches_filter("book.transfer.completed", &filters));
        assert!(event_matches_filter("wire.outgoing_transfer.completed", &filters));
        assert!(!event_matches_filter("check.deposited", &filters));
    }

    #[test]
    fn test_classify_event() {
        assert_eq!(classify_event("entity.created"), "entity");
        assert_eq!(classify_event("account.balance.changed"), "account");
        assert_eq!(classify_event("ping"), "ping");
        assert_eq!(classify_event(""), "unknown");
    }
}
