//! Column API client.
//!
//! [`ColumnClient`] sends authenticated JSON requests to the Column REST API,
//! retries rate-limited calls, and implements [`PageFetcher`] so it can be
//! driven by [`fetch_all`].

mod pagination;
mod request;
mod resources;
mod retry;
mod sanitize;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

use crate::error::{ApiError, ApiErrorBody, ValidationError};

pub use pagination::{fetch_all, Identified, Page, PageFetcher, MAX_PAGE_SIZE};
pub use request::{ApiRequest, Method};
pub use resources::Resource;
pub use retry::{retry_on_rate_limit, RetryPolicy};
pub use sanitize::{is_valid_api_key, mask_secret, sanitize_endpoint};

/// Base URL of the production API.
pub const PRODUCTION_URL: &str = "https://api.column.com/v1";

/// Base URL of the sandbox API.
pub const SANDBOX_URL: &str = "https://api.column-sandbox.com/v1";

/// Header carrying the idempotency key on write requests.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Header carrying the platform id, when one is configured.
pub const PLATFORM_HEADER: &str = "X-Platform-ID";

// ============================================================================
// Environment
// ============================================================================

/// Which Column deployment the client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Sandbox,
    /// A caller-supplied base URL, see [`ClientConfig::with_custom_endpoint`]
    Custom,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Sandbox => "sandbox",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "sandbox" => Ok(Self::Sandbox),
            "custom" => Ok(Self::Custom),
            other => Err(ValidationError::InvalidFormat {
                field: "environment".to_string(),
                message: format!(
                    "unknown environment '{}', expected production, sandbox or custom",
                    other
                ),
            }),
        }
    }
}

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration for [`ColumnClient`].
///
/// # Examples
///
/// ```
/// use column_sdk::client::{ClientConfig, Environment};
/// use std::time::Duration;
///
/// let config = ClientConfig::new("col_test_abcdefghijklmnop")
///     .with_environment(Environment::Sandbox)
///     .with_timeout(Duration::from_secs(10));
///
/// assert_eq!(config.base_url().unwrap(), "https://api.column-sandbox.com/v1");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// API key sent as a bearer token
    pub api_key: String,
    pub environment: Environment,
    /// Base URL used when `environment` is [`Environment::Custom`]
    pub custom_endpoint: Option<String>,
    /// Sent as `X-Platform-ID` when present
    pub platform_id: Option<String>,
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Backoff applied to HTTP 429 responses
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Configuration for the production API with default timeout and retry settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            environment: Environment::Production,
            custom_endpoint: None,
            platform_id: None,
            user_agent: format!("column-sdk/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Point the client at an arbitrary base URL. Switches the environment to custom.
    pub fn with_custom_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.environment = Environment::Custom;
        self.custom_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_platform_id(mut self, platform_id: impl Into<String>) -> Self {
        self.platform_id = Some(platform_id.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Resolve the base URL for the configured environment, without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` if the environment is custom and the
    /// endpoint is missing or is not an absolute http(s) URL.
    pub fn base_url(&self) -> Result<String, ApiError> {
        let raw = match self.environment {
            Environment::Production => PRODUCTION_URL,
            Environment::Sandbox => SANDBOX_URL,
            Environment::Custom => {
                let endpoint = self
                    .custom_endpoint
                    .as_deref()
                    .filter(|e| !e.trim().is_empty())
                    .ok_or_else(|| ApiError::Configuration {
                        message: "custom environment requires a custom endpoint".to_string(),
                    })?;

                let parsed = url::Url::parse(endpoint).map_err(|e| ApiError::Configuration {
                    message: format!("invalid custom endpoint '{}': {}", endpoint, e),
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(ApiError::Configuration {
                        message: format!("custom endpoint must use http or https: {}", endpoint),
                    });
                }
                endpoint
            }
        };

        Ok(raw.trim_end_matches('/').to_string())
    }

    /// Check the configuration before building a client.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.api_key.trim().is_empty() {
            return Err(ApiError::Configuration {
                message: "API key is required".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(ApiError::Configuration {
                message: "timeout must be greater than zero".to_string(),
            });
        }
        self.base_url().map(|_| ())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("environment", &self.environment)
            .field("custom_endpoint", &self.custom_endpoint)
            .field("platform_id", &self.platform_id)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

// ============================================================================
// Column Client
// ============================================================================

/// Authenticated client for the Column REST API.
///
/// # Examples
///
/// ```no_run
/// use column_sdk::client::{ClientConfig, ColumnClient, Resource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ColumnClient::new(ClientConfig::new("col_test_key"))?;
/// let entities: Vec<serde_json::Value> = client.list_all(Resource::Entities, Some(50)).await?;
/// println!("{} entities", entities.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ColumnClient {
    http_client: reqwest::Client,
    config: ClientConfig,
    base_url: String,
}

impl ColumnClient {
    /// Build a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let base_url = config.base_url()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Send a single request and decode the JSON response.
    ///
    /// Write requests carry the JSON body and an `Idempotency-Key` (the
    /// request's own key, or a fresh UUID v4). An empty success body decodes
    /// as JSON `null`.
    ///
    /// # Errors
    ///
    /// - `ApiError::Api` when a non-2xx response carries a Column error body
    /// - `ApiError::HttpError` for any other non-2xx response
    /// - `ApiError::Timeout` when the request exceeds the configured timeout
    /// - `ApiError::JsonError` when the body cannot be decoded into `T`
    pub async fn request<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let url = self.url_for(&request.endpoint);
        let started = Instant::now();

        let mut builder = self
            .http_client
            .request(request.method.into(), &url)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(&request.cleaned_query());

        if let Some(platform_id) = &self.config.platform_id {
            builder = builder.header(PLATFORM_HEADER, platform_id);
        }

        if request.method.is_write() {
            let key = request
                .idempotency_key
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            builder = builder.header(IDEMPOTENCY_HEADER, key);
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::HttpClientError(e)
            }
        })?;

        let status = response.status();
        debug!(
            method = %request.method,
            endpoint = %sanitize_endpoint(&request.endpoint),
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Column API request completed"
        );

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::HttpClientError(e)
            }
        })?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(body) => ApiError::Api {
                    status: status.as_u16(),
                    body,
                },
                Err(_) => ApiError::HttpError {
                    status: status.as_u16(),
                    message: if text.trim().is_empty() {
                        status
                            .canonical_reason()
                            .unwrap_or("Unknown error")
                            .to_string()
                    } else {
                        text
                    },
                },
            });
        }

        if text.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Send a request, retrying HTTP 429 responses per the configured policy.
    #[instrument(skip(self, request), fields(method = %request.method, endpoint = %sanitize_endpoint(&request.endpoint)))]
    pub async fn request_with_retry<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, ApiError> {
        retry_on_rate_limit(&self.config.retry, move || self.request(request)).await
    }

    /// Collect every item of a list resource, optionally capped at `limit`.
    pub async fn list_all<T>(&self, resource: Resource, limit: Option<usize>) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned + Identified + Send + 'static,
    {
        fetch_all(self, &ApiRequest::get(resource.path()), limit).await
    }

    /// Check the credentials by fetching the platform record.
    pub async fn test_connection(&self) -> Result<Value, ApiError> {
        self.request_with_retry(&ApiRequest::get("/platform")).await
    }
}

#[async_trait::async_trait]
impl<T> PageFetcher<T> for ColumnClient
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, request: &ApiRequest) -> Result<Page<T>, ApiError> {
        self.request_with_retry(request).await
    }
}

impl fmt::Debug for ColumnClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnClient")
            .field("base_url", &self.base_url)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
