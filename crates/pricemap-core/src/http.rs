//! HTTP transport boundary.
//!
//! The harvest engine never talks to `reqwest` directly; everything goes
//! through the [`HttpClient`] trait so behavior tests can run offline
//! against a [`ScriptedHttpClient`].

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// HTTP request envelope for storefront and rate-service calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: 10_000,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// HTTP response envelope. Non-2xx statuses come back as responses, not
/// errors; the retry layer decides what is transient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status_only(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level failure (timeout, connection refused, body read).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    retryable: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport contract: async execution behind an object-safe trait.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Production transport using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent("pricemap/0.1.0")
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = self.client.get(&request.url);

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let timeout = std::time::Duration::from_millis(request.timeout_ms);
            builder = builder.timeout(timeout);

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::new(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

/// Deterministic offline transport for tests: maps a URL fragment to a
/// queue of canned outcomes, consumed in order. Once a queue holds a single
/// entry it is replayed for every later match, so steady-state fixtures
/// need only one response.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<ScriptedRoute>>,
    requests: Mutex<Vec<String>>,
}

struct ScriptedRoute {
    fragment: String,
    queue: Vec<Result<HttpResponse, HttpError>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for every request whose URL contains `fragment`.
    /// Routes are matched most-recently-registered-fragment last, in
    /// registration order, first match wins.
    pub fn stub(&self, fragment: impl Into<String>, outcome: Result<HttpResponse, HttpError>) {
        let fragment = fragment.into();
        let mut routes = self.routes.lock().expect("scripted routes poisoned");
        if let Some(route) = routes.iter_mut().find(|r| r.fragment == fragment) {
            route.queue.push(outcome);
        } else {
            routes.push(ScriptedRoute {
                fragment,
                queue: vec![outcome],
            });
        }
    }

    pub fn stub_body(&self, fragment: impl Into<String>, body: impl Into<String>) {
        self.stub(fragment, Ok(HttpResponse::ok(body)));
    }

    pub fn stub_status(&self, fragment: impl Into<String>, status: u16) {
        self.stub(fragment, Ok(HttpResponse::status_only(status)));
    }

    /// URLs seen so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("scripted request log poisoned")
            .clone()
    }

    pub fn request_count_matching(&self, fragment: &str) -> usize {
        self.requests()
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            self.requests
                .lock()
                .expect("scripted request log poisoned")
                .push(request.url.clone());

            let mut routes = self.routes.lock().expect("scripted routes poisoned");
            let route = routes
                .iter_mut()
                .find(|r| request.url.contains(&r.fragment));

            match route {
                Some(route) if route.queue.len() > 1 => Ok(route.queue.remove(0)?),
                Some(route) => route.queue[0].clone().map_err(Into::into),
                None => Err(HttpError::non_retryable(format!(
                    "no scripted response for {}",
                    request.url
                ))),
            }
        })
    }
}
