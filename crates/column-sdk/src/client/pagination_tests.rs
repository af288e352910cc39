//! Tests for cursor pagination.

use super::*;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Scripted Fetcher
// ============================================================================

/// Returns pre-programmed pages in order and records every request.
struct ScriptedFetcher {
    pages: Mutex<VecDeque<Result<Page<Value>, ApiError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedFetcher {
    fn new(pages: Vec<Result<Page<Value>, ApiError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher<Value> for ScriptedFetcher {
    async fn fetch_page(&self, request: &ApiRequest) -> Result<Page<Value>, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected extra request: {:?}", request))
    }
}

fn item(id: &str) -> Value {
    json!({ "id": id, "amount": 100 })
}

fn page(ids: &[&str], has_more: bool) -> Result<Page<Value>, ApiError> {
    Ok(Page::new(ids.iter().map(|id| item(id)).collect(), has_more))
}

fn ids(items: &[Value]) -> Vec<&str> {
    items.iter().filter_map(|v| v.cursor_id()).collect()
}

fn three_pages() -> Vec<Result<Page<Value>, ApiError>> {
    vec![
        page(&["a1", "a2"], true),
        page(&["b1", "b2"], true),
        page(&["c1", "c2"], false),
    ]
}

// ============================================================================
// fetch_all
// ============================================================================

mod fetch_all_tests {
    use super::*;

    /// Verify that all pages are collected in server order.
    #[tokio::test]
    async fn test_collects_all_pages_in_order() {
        let fetcher = ScriptedFetcher::new(three_pages());
        let template = ApiRequest::get("/transactions");

        let items = fetch_all(&fetcher, &template, None).await.unwrap();

        assert_eq!(ids(&items), vec!["a1", "a2", "b1", "b2", "c1", "c2"]);
        assert_eq!(fetcher.requests().len(), 3);
    }

    /// Verify that each request carries the page size and the previous page's last id.
    #[tokio::test]
    async fn test_cursor_advances_from_last_item() {
        let fetcher = ScriptedFetcher::new(three_pages());
        let template = ApiRequest::get("/transactions").with_query("status", "posted");

        fetch_all(&fetcher, &template, None).await.unwrap();
        let requests = fetcher.requests();

        assert_eq!(requests[0].query.get("limit").map(String::as_str), Some("100"));
        assert_eq!(requests[0].query.get("starting_after"), None);
        assert_eq!(
            requests[1].query.get("starting_after").map(String::as_str),
            Some("a2")
        );
        assert_eq!(
            requests[2].query.get("starting_after").map(String::as_str),
            Some("b2")
        );
        for request in &requests {
            assert_eq!(request.endpoint, "/transactions");
            assert_eq!(request.query.get("status").map(String::as_str), Some("posted"));
        }
    }

    /// Verify that a limit stops paging early and truncates the overshoot.
    #[tokio::test]
    async fn test_limit_truncates_results() {
        let fetcher = ScriptedFetcher::new(three_pages());
        let template = ApiRequest::get("/transactions");

        let items = fetch_all(&fetcher, &template, Some(4)).await.unwrap();

        assert_eq!(ids(&items), vec!["a1", "a2", "b1", "b2"]);
        assert_eq!(fetcher.requests().len(), 2);
        assert_eq!(
            fetcher.requests()[0].query.get("limit").map(String::as_str),
            Some("4")
        );
    }

    #[tokio::test]
    async fn test_limit_inside_a_page_truncates() {
        let fetcher = ScriptedFetcher::new(three_pages());
        let template = ApiRequest::get("/transactions");

        let items = fetch_all(&fetcher, &template, Some(3)).await.unwrap();

        assert_eq!(ids(&items), vec!["a1", "a2", "b1"]);
    }

    /// Verify that page size is capped even when the limit is larger.
    #[tokio::test]
    async fn test_page_size_capped_at_maximum() {
        let fetcher = ScriptedFetcher::new(vec![page(&["a1"], false)]);
        let template = ApiRequest::get("/entities");

        fetch_all(&fetcher, &template, Some(1_000)).await.unwrap();

        assert_eq!(
            fetcher.requests()[0].query.get("limit").map(String::as_str),
            Some("100")
        );
    }

    /// Verify that an empty page ends pagination even if has_more is set.
    #[tokio::test]
    async fn test_empty_page_stops_pagination() {
        let fetcher = ScriptedFetcher::new(vec![page(&["a1", "a2"], true), page(&[], true)]);
        let template = ApiRequest::get("/entities");

        let items = fetch_all(&fetcher, &template, None).await.unwrap();

        assert_eq!(ids(&items), vec!["a1", "a2"]);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_first_page_empty() {
        let fetcher = ScriptedFetcher::new(vec![page(&[], true)]);
        let template = ApiRequest::get("/entities");

        let items = fetch_all(&fetcher, &template, None).await.unwrap();

        assert!(items.is_empty());
    }

    /// Verify that an error on any page discards everything collected so far.
    #[tokio::test]
    async fn test_page_error_aborts() {
        let fetcher = ScriptedFetcher::new(vec![
            page(&["a1", "a2"], true),
            Err(ApiError::HttpError {
                status: 500,
                message: "boom".to_string(),
            }),
        ]);
        let template = ApiRequest::get("/entities");

        let result = fetch_all(&fetcher, &template, None).await;

        assert!(matches!(result, Err(ApiError::HttpError { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_item_without_id_fails_when_more_pages_needed() {
        let fetcher = ScriptedFetcher::new(vec![Ok(Page::new(
            vec![item("a1"), json!({"amount": 5})],
            true,
        ))]);
        let template = ApiRequest::get("/entities");

        let result = fetch_all(&fetcher, &template, None).await;

        assert!(matches!(result, Err(ApiError::MissingCursor { index: 1 })));
    }

    #[tokio::test]
    async fn test_zero_limit_makes_no_requests() {
        let fetcher = ScriptedFetcher::new(Vec::new());
        let template = ApiRequest::get("/entities");

        let items = fetch_all(&fetcher, &template, Some(0)).await.unwrap();

        assert!(items.is_empty());
        assert!(fetcher.requests().is_empty());
    }
}

mod page_tests {
    use super::*;

    #[test]
    fn test_page_deserializes_list_response() {
        let page: Page<Value> =
            serde_json::from_str(r#"{"data":[{"id":"ent_1"}],"has_more":true}"#).unwrap();

        assert_eq!(page.data.len(), 1);
        assert!(page.has_more);
    }

    /// Verify that a missing has_more flag means no further pages.
    #[test]
    fn test_has_more_defaults_to_false() {
        let page: Page<Value> = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(!page.has_more);
    }

    #[test]
    fn test_value_cursor_id() {
        assert_eq!(json!({"id": "ent_1"}).cursor_id(), Some("ent_1"));
        assert_eq!(json!({"id": 7}).cursor_id(), None);
        assert_eq!(json!({}).cursor_id(), None);
    }
}
