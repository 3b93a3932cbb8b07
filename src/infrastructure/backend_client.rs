// Backend Client - thin JSON-over-HTTP client for the curriculum backend
// Every request carries Accept/Content-Type JSON, the caller's Authorization
// header verbatim and the configured API key.

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{header, Method, Request, StatusCode};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::BackendConfig;
use crate::error::{AppError, AppResult};

pub const API_KEY_HEADER: &str = "x-api-key";

/// One call to the backend, relative to the configured base url.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub authorization: Option<String>,
}

impl ForwardRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authorization: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn authorization(mut self, value: Option<String>) -> Self {
        self.authorization = value;
        self
    }
}

#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl BackendResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as JSON; an empty body reads as `null`.
    pub fn json_value(&self) -> AppResult<Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn json<T: DeserializeOwned>(&self) -> AppResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client<HttpConnector, Full<Bytes>>,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute url for `path`; empty query values are left out.
    pub fn url(&self, path: &str, query: &[(String, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for (key, value) in query.iter().filter(|(_, v)| !v.is_empty()) {
            serializer.append_pair(key, value);
            any = true;
        }
        if any {
            url.push('?');
            url.push_str(&serializer.finish());
        }
        url
    }

    /// Perform the call. Only a failure to reach the backend is an error here.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, request: ForwardRequest) -> AppResult<BackendResponse> {
        let url = self.url(&request.path, &request.query);

        let mut builder = Request::builder()
            .method(request.method.clone())
            .uri(&url)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(authorization) = &request.authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }

        let payload = match &request.body {
            Some(body) => Bytes::from(serde_json::to_vec(body)?),
            None => Bytes::new(),
        };
        let http_request = builder
            .body(Full::new(payload))
            .map_err(|e| AppError::Internal(format!("Invalid backend request: {}", e)))?;

        let response = self.client.request(http_request).await.map_err(|e| {
            warn!("Backend unreachable at {}: {}", url, e);
            AppError::Transport(format!("Backend unreachable: {}", e))
        })?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to read backend response: {}", e)))?
            .to_bytes();

        debug!("Backend answered {}", status);
        Ok(BackendResponse { status, body })
    }

    /// Like [`send`](Self::send), but a non-success status becomes
    /// `Upstream(failure)`.
    pub async fn forward(&self, request: ForwardRequest, failure: &str) -> AppResult<BackendResponse> {
        let response = self.send(request).await?;
        if !response.is_success() {
            warn!("Backend returned {}: {}", response.status, failure);
            return Err(AppError::Upstream(failure.to_string()));
        }
        Ok(response)
    }
}
