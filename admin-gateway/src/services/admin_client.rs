//! HTTP client for the admin REST API.
//!
//! Every request carries the caller's bearer token, W3C trace context and a
//! fresh `x-request-id`. Non-2xx responses become [`GatewayError::Upstream`]
//! carrying the body's `error` field when the backend supplies one.

use crate::config::BackendSettings;
use crate::error::GatewayError;
use crate::models::session::Session;
use crate::services::routes::Endpoint;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use service_core::observability::{TracedClientExt, TracedRequest};
use uuid::Uuid;

pub const FILE_NAME_HEADER: &str = "x-file-name";

#[derive(Clone)]
pub struct AdminClient {
    client: Client,
    base_url: Url,
}

/// Raw response body with its declared content type.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBody {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<Value>,
}

/// The `error` field of a failed response, else the status reason.
///
/// Backends disagree on the field's shape: a plain string is used as is, an
/// object contributes its `message`, anything else is rendered as JSON.
fn upstream_message(body: &[u8], status: StatusCode) -> String {
    let error = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error);

    match error {
        Some(Value::String(message)) => message,
        Some(error @ Value::Object(_)) => match error.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => error.to_string(),
        },
        Some(Value::Null) | None => format!(
            "Request failed with status {}",
            status.canonical_reason().unwrap_or(status.as_str())
        ),
        Some(other) => other.to_string(),
    }
}

impl AdminClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&settings.url)
            .map_err(|e| anyhow::anyhow!("Invalid backend URL '{}': {}", settings.url, e))?;

        let client = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL joined with the endpoint's segments and query pairs.
    pub fn url_for(&self, endpoint: &Endpoint) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow::anyhow!("Backend URL cannot be a base: {}", self.base_url))?;
            segments.pop_if_empty();
            segments.extend(endpoint.path.iter());
        }

        if !endpoint.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(endpoint.query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url)
    }

    fn request(
        &self,
        endpoint: &Endpoint,
        session: &Session,
    ) -> Result<TracedRequest, GatewayError> {
        let url = self.url_for(endpoint)?;
        let mut request = self
            .client
            .traced_request(endpoint.method.clone(), url)
            .bearer_auth(session.bearer_token());

        if let Some(body) = &endpoint.body {
            request = request.json(body);
        }

        Ok(request)
    }

    async fn dispatch(
        &self,
        request: TracedRequest,
        endpoint: &Endpoint,
    ) -> Result<Response, GatewayError> {
        let request_id = Uuid::new_v4().to_string();

        let response = request.send(&request_id).await.map_err(|e| {
            tracing::error!(
                request_id = %request_id,
                endpoint = %endpoint.describe(),
                error = %e,
                "Admin backend request failed"
            );
            GatewayError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(
                request_id = %request_id,
                endpoint = %endpoint.describe(),
                status = status.as_u16(),
                "Admin backend request succeeded"
            );
            return Ok(response);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    endpoint = %endpoint.describe(),
                    error = %e,
                    "Failed to read error response body"
                );
                Default::default()
            }
        };
        let message = upstream_message(&body, status);

        tracing::error!(
            request_id = %request_id,
            endpoint = %endpoint.describe(),
            status = status.as_u16(),
            error = %message,
            "Admin backend returned an error"
        );

        Err(GatewayError::upstream(status.as_u16(), message))
    }

    /// Issue the call and decode a JSON response. An empty body is `null`.
    pub async fn send(
        &self,
        endpoint: &Endpoint,
        session: &Session,
    ) -> Result<Value, GatewayError> {
        let request = self.request(endpoint, session)?;
        let response = self.dispatch(request, endpoint).await?;

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// Issue the call and return the body untouched.
    pub async fn send_raw(
        &self,
        endpoint: &Endpoint,
        session: &Session,
    ) -> Result<RawBody, GatewayError> {
        let request = self.request(endpoint, session)?;
        let response = self.dispatch(request, endpoint).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = response.bytes().await?.to_vec();

        Ok(RawBody {
            content_type,
            bytes,
        })
    }

    /// Stream `body` to the endpoint, decoding a JSON response.
    pub async fn upload(
        &self,
        endpoint: &Endpoint,
        session: &Session,
        file_name: &str,
        content_type: &str,
        body: reqwest::Body,
    ) -> Result<Value, GatewayError> {
        let request = self
            .request(endpoint, session)?
            .header(reqwest::header::CONTENT_TYPE.as_str(), content_type)
            .header(FILE_NAME_HEADER, file_name)
            .body(body);
        let response = self.dispatch(request, endpoint).await?;

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}
