//! One network request in, parsed JSON or a typed failure out. No retries, no timeouts.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const NETWORK_ERROR: &str = "network error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// No response was received at all.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let http = Client::builder()
            .build()
            .map_err(|err| TransportError(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self.http.request(request.method.into(), &request.url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|err| TransportError(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError(err.to_string()))?;
        Ok(TransportResponse { status, body })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Server,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl FetchFailure {
    pub fn network() -> Self {
        Self {
            status: None,
            message: NETWORK_ERROR.to_string(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self.status {
            None => FailureKind::Transport,
            Some(_) => FailureKind::Server,
        }
    }
}

/// Called with the method and path of every request before it is sent.
pub type RequestObserver = Arc<dyn Fn(Method, &str) + Send + Sync>;

#[derive(Clone)]
pub struct Fetcher {
    base_url: String,
    transport: Arc<dyn Transport>,
    observer: Option<RequestObserver>,
}

impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("base_url", &self.base_url)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl Fetcher {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            observer: None,
        }
    }

    /// Fetcher over a real HTTP client.
    pub fn http(base_url: &str) -> Result<Self, TransportError> {
        Ok(Self::new(base_url, Arc::new(HttpTransport::new()?)))
    }

    pub fn with_observer(mut self, observer: RequestObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, FetchFailure> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "issuing request");
        if let Some(observer) = &self.observer {
            observer(method, path);
        }

        let response = self
            .transport
            .send(TransportRequest {
                method,
                url,
                body: body.cloned(),
            })
            .await
            .map_err(|err| {
                debug!(%method, path, error = %err, "transport failure");
                FetchFailure::network()
            })?;

        let parsed = parse_body(&response.body);
        if (200..300).contains(&response.status) {
            return Ok(parsed);
        }

        let message = parsed
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| response.status.to_string());
        debug!(%method, path, status = response.status, %message, "server failure");
        Err(FetchFailure::server(response.status, message))
    }
}

fn parse_body(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or(Value::Null)
}
