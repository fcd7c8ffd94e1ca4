//! Runtime for forwarding a single MCP tool call to the MMS backend.
//!
//! One tool call becomes one HTTP request; the response body comes back untouched. Payloads are
//! never parsed in either direction.

use crate::safety::{redact_url, sanitize_reqwest_error};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum ForwardError {
    /// The forwarder cannot issue the request at all (missing base URL, unsupported verb).
    #[error("config error: {0}")]
    Config(String),
    /// The backend answered with a non-2xx status.
    #[error("backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// Connection, DNS or timeout failure.
    #[error("http transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, ForwardError>;

impl From<reqwest::Error> for ForwardError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(sanitize_reqwest_error(&value))
    }
}

/// Payload attached to an outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundBody {
    pub content_type: Option<String>,
    pub text: String,
}

/// A fully resolved request, as handed to the [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub authorization: Option<HeaderValue>,
    pub body: Option<OutboundBody>,
}

/// Raw backend answer. The body is never parsed.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: String,
}

/// The single outbound suspension point of a tool call.
///
/// Production code uses [`ReqwestTransport`]; tests substitute a recording spy.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<BackendResponse>;
}

/// `reqwest`-backed transport sharing one connection pool across all calls.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Build a transport with its own client. Redirects are never followed, so a 3xx answer is
    /// returned to the caller as-is.
    ///
    /// `timeout` applies to each request as a whole; `None` leaves requests unbounded.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self::with_client(client, timeout))
    }

    /// Wrap an existing client. The client must be built with `redirect::Policy::none()`, or a
    /// single call may reach more than one URL.
    #[must_use]
    pub fn with_client(client: Client, timeout: Option<Duration>) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<BackendResponse> {
        let OutboundRequest {
            method,
            url,
            authorization,
            body,
        } = request;

        let mut builder = self.client.request(method, url);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(OutboundBody { content_type, text }) = body {
            if let Some(ct) = content_type {
                builder = builder.header(CONTENT_TYPE, ct);
            }
            builder = builder.body(text);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        Ok(BackendResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// A tool call resolved to a verb, a relative path and an optional body.
#[derive(Debug, Clone)]
pub struct ForwardRequest<'a> {
    pub method: Method,
    /// Relative path with identifiers already substituted.
    pub path: &'a str,
    /// Inbound `Authorization` value, relayed byte-for-byte.
    pub authorization: Option<&'a HeaderValue>,
    pub body: Option<&'a str>,
    /// Only sent when `body` is present.
    pub content_type: Option<&'a str>,
}

impl<'a> ForwardRequest<'a> {
    #[must_use]
    pub fn new(method: Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            authorization: None,
            body: None,
            content_type: None,
        }
    }

    #[must_use]
    pub fn authorization(mut self, value: Option<&'a HeaderValue>) -> Self {
        self.authorization = value;
        self
    }

    #[must_use]
    pub fn body(mut self, body: &'a str, content_type: Option<&'a str>) -> Self {
        self.body = Some(body);
        self.content_type = content_type;
        self
    }
}

/// Forwards resolved tool calls to the MMS backend.
///
/// Cheap to clone; immutable after construction and safe to share across tasks.
#[derive(Clone)]
pub struct Forwarder {
    inner: Arc<ForwarderInner>,
}

struct ForwarderInner {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl Forwarder {
    /// Create a forwarder. An empty `base_url` is accepted here and reported on every call.
    #[must_use]
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            inner: Arc::new(ForwarderInner {
                base_url: base_url.into(),
                transport,
            }),
        }
    }

    /// The configured backend base URL, or `None` when unset.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        let base = self.inner.base_url.trim();
        (!base.is_empty()).then_some(base)
    }

    /// Concatenate the base URL (trailing `/` stripped) with `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::Config`] if the base URL is unset or the result is not a valid URL.
    pub fn build_url(&self, path: &str) -> Result<Url> {
        let Some(base) = self.base_url() else {
            return Err(ForwardError::Config(
                "MMS_URL is not set; no backend to forward to".to_string(),
            ));
        };
        let url = format!("{}{}", base.trim_end_matches('/'), path);
        Url::parse(&url).map_err(|e| ForwardError::Config(format!("Invalid URL '{url}': {e}")))
    }

    /// Issue exactly one request and return the response body as text.
    ///
    /// # Errors
    ///
    /// - [`ForwardError::Config`] if the base URL is unset or the verb is not GET/PUT/PATCH/POST
    ///   (no network call is attempted)
    /// - [`ForwardError::Http`] on any non-2xx status, carrying the status and body verbatim
    /// - [`ForwardError::Transport`] on connection, DNS or timeout failures
    pub async fn forward(&self, request: ForwardRequest<'_>) -> Result<String> {
        let url = self.build_url(request.path)?;
        ensure_supported_method(&request.method)?;

        let body = request.body.map(|text| OutboundBody {
            content_type: request.content_type.map(str::to_string),
            text: text.to_string(),
        });

        debug!(
            method = %request.method,
            url = %redact_url(&url),
            has_body = body.is_some(),
            "forwarding request to MMS"
        );

        let response = self
            .inner
            .transport
            .send(OutboundRequest {
                method: request.method.clone(),
                url: url.clone(),
                authorization: request.authorization.cloned(),
                body,
            })
            .await
            .inspect_err(|e| {
                warn!(method = %request.method, url = %redact_url(&url), error = %e, "MMS request failed");
            })?;

        if response.status.is_success() {
            return Ok(response.body);
        }

        warn!(
            method = %request.method,
            url = %redact_url(&url),
            status = response.status.as_u16(),
            "MMS returned non-success status"
        );
        Err(ForwardError::Http {
            status: response.status.as_u16(),
            body: response.body,
        })
    }
}

fn ensure_supported_method(method: &Method) -> Result<()> {
    if *method == Method::GET
        || *method == Method::PUT
        || *method == Method::PATCH
        || *method == Method::POST
    {
        Ok(())
    } else {
        Err(ForwardError::Config(format!(
            "Unsupported HTTP method: {method}"
        )))
    }
}
