//! Cursor pagination over Column list endpoints.
//!
//! Column list responses look like `{"data": [...], "has_more": true}`. The
//! next page is requested with `starting_after` set to the id of the last
//! item received. [`fetch_all`] walks those pages through any
//! [`PageFetcher`], one request at a time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::client::request::ApiRequest;
use crate::error::ApiError;

/// Largest page size the API accepts.
pub const MAX_PAGE_SIZE: usize = 100;

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in server order
    pub data: Vec<T>,

    /// Whether more items exist after this page
    #[serde(default)]
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, has_more: bool) -> Self {
        Self { data, has_more }
    }
}

/// Items that can act as a pagination cursor.
pub trait Identified {
    /// The id to pass as `starting_after` for the following page.
    fn cursor_id(&self) -> Option<&str>;
}

impl Identified for Value {
    fn cursor_id(&self) -> Option<&str> {
        self.get("id").and_then(Value::as_str)
    }
}

/// Fetches a single page for a request.
///
/// Retry, authentication and base-URL selection belong to the implementation.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch_page(&self, request: &ApiRequest) -> Result<Page<T>, ApiError>;
}

/// Collect every item of a list endpoint, optionally capped at `limit`.
///
/// Each request is `template` plus `limit` (the smaller of `limit` and
/// [`MAX_PAGE_SIZE`]) and, after the first page, `starting_after`. Paging
/// stops when the server reports no more items, when a page comes back
/// empty, or once `limit` items have been collected. The result is then
/// truncated to `limit`.
///
/// Any page failure aborts the whole call; partial results are discarded.
/// An item without an id, where another page is still needed, fails with
/// [`ApiError::MissingCursor`].
///
/// # Examples
///
/// ```rust,no_run
/// use column_sdk::client::{fetch_all, ApiRequest, ClientConfig, ColumnClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ColumnClient::new(ClientConfig::new("col_test_key"))?;
/// let template = ApiRequest::get("/transfers/ach").with_query("status", "completed");
///
/// let transfers: Vec<serde_json::Value> = fetch_all(&client, &template, Some(250)).await?;
/// println!("{} transfers", transfers.len());
/// # Ok(())
/// # }
/// ```
pub async fn fetch_all<T, F>(
    fetcher: &F,
    template: &ApiRequest,
    limit: Option<usize>,
) -> Result<Vec<T>, ApiError>
where
    T: Identified + Send,
    F: PageFetcher<T> + ?Sized,
{
    if limit == Some(0) {
        return Ok(Vec::new());
    }

    let page_size = limit.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let mut results: Vec<T> = Vec::new();
    let mut starting_after: Option<String> = None;

    loop {
        let mut request = template
            .clone()
            .with_query("limit", page_size.to_string());
        if let Some(cursor) = starting_after.take() {
            request = request.with_query("starting_after", cursor);
        }

        let page = fetcher.fetch_page(&request).await?;
        let fetched = page.data.len();
        results.extend(page.data);

        debug!(
            fetched,
            total = results.len(),
            has_more = page.has_more,
            "Fetched list page"
        );

        if !page.has_more || fetched == 0 {
            break;
        }
        if limit.is_some_and(|limit| results.len() >= limit) {
            break;
        }

        let last = results.len() - 1;
        match results[last].cursor_id() {
            Some(id) => starting_after = Some(id.to_string()),
            None => return Err(ApiError::MissingCursor { index: last }),
        }
    }

    if let Some(limit) = limit {
        results.truncate(limit);
    }

    Ok(results)
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
