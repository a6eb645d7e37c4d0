//! Delivery of queued actions to the backend.
//!
//! [`Transport`] is the seam between the replay loop and the network. The
//! production implementation, [`HttpTransport`], speaks plain HTTP with a
//! JSON body and the `apikey` header the backend-as-a-service expects.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use super::action::{Endpoint, Method, OfflineAction};
use crate::config::BackendConfig;
use crate::error::SakaniError;

/// A single request the replay loop wants sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub method: Method,
    pub endpoint: Endpoint,
    pub body: Option<Value>,
}

impl DeliveryRequest {
    /// Build the request that delivers `action`.
    #[must_use]
    pub fn for_action(action: &OfflineAction) -> Self {
        Self {
            method: action.action_type().method(),
            endpoint: action.endpoint.clone(),
            body: action.kind.payload().map(super::action::Payload::to_value),
        }
    }
}

/// Sends delivery requests and reports the HTTP status.
///
/// An `Err` means the request never produced a response (network failure);
/// any received status, successful or not, is `Ok`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, request: DeliveryRequest) -> Result<u16, SakaniError>;
}

/// Whether `status` counts as a successful delivery.
#[must_use]
pub const fn is_success(status: u16) -> bool {
    matches!(status, 200..=299)
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

/// Parse the configured base URL.
///
/// # Errors
///
/// Returns `Config` if the URL is invalid.
pub fn parse_base_url(base_url: &str) -> Result<Url, SakaniError> {
    Url::parse(base_url)
        .map_err(|e| SakaniError::Config(format!("Invalid backend base_url {base_url}: {e}")))
}

/// HTTP transport built on `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpTransport {
    /// Create a transport from backend settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client cannot be
    /// built.
    pub fn new(config: &BackendConfig) -> Result<Self, SakaniError> {
        let base_url = parse_base_url(&config.base_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SakaniError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Resolve an endpoint against the base URL.
    ///
    /// Absolute URLs pass through unchanged.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAction` if the endpoint cannot form a URL.
    pub fn resolve(&self, endpoint: &Endpoint) -> Result<Url, SakaniError> {
        self.base_url.join(endpoint.as_str()).map_err(|e| {
            SakaniError::InvalidAction(format!("Cannot resolve endpoint {endpoint}: {e}"))
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn deliver(&self, request: DeliveryRequest) -> Result<u16, SakaniError> {
        let url = self.resolve(&request.endpoint)?;
        let mut builder = self.client.request(request.method.into(), url);

        if let Some(key) = &self.api_key {
            builder = builder.header("apikey", key).bearer_auth(key);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            SakaniError::Transport(format!(
                "{} {} failed: {e}",
                request.method, request.endpoint
            ))
        })?;

        Ok(response.status().as_u16())
    }
}
