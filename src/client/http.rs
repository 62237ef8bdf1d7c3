//! Blocking JSON-over-HTTP plumbing shared by the API clients

use crate::cli::option::{ArgValue, ParsedArgs};
use crate::error::{LunrError, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// Decoded JSON body tagged with the HTTP status it came with
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub code: u16,
    pub body: Value,
}

impl Response {
    pub fn new(body: Value, code: u16) -> Self {
        Response { code, body }
    }

    /// No rows, no keys, or no body at all
    pub fn is_empty(&self) -> bool {
        match &self.body {
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// A field rendered as text; strings lose their quotes
    pub fn field(&self, key: &str) -> Result<String> {
        match self.body.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Null) | None => Err(LunrError::client(format!(
                "response is missing '{}'",
                key
            ))),
            Some(other) => Ok(other.to_string()),
        }
    }

    /// Set a key on an object body; other bodies are left alone
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        if let Value::Object(map) = &mut self.body {
            map.insert(key.to_string(), value.into());
        }
    }

    /// Rows of a list response; an object becomes a single row
    pub fn rows(&self) -> Vec<Map<String, Value>> {
        match &self.body {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_object().cloned())
                .collect(),
            Value::Object(map) => vec![map.clone()],
            _ => Vec::new(),
        }
    }
}

/// Query parameters; keys without a value are never sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Params::insert`]
    pub fn with(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.insert(key, value);
        self
    }

    /// Add `key` only when `value` is present
    pub fn with_opt(mut self, key: &str, value: Option<impl fmt::Display>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    /// Set `key`, replacing any earlier value
    pub fn insert(&mut self, key: &str, value: impl fmt::Display) {
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }
}

impl From<&ParsedArgs> for Params {
    fn from(args: &ParsedArgs) -> Self {
        let mut params = Params::new();
        for (key, value) in args.iter() {
            match value {
                ArgValue::Unset => {}
                ArgValue::Bool(flag) => params.insert(key, flag),
                ArgValue::Str(s) => params.insert(key, s),
            }
        }
        params
    }
}

/// Fail unless every key in `require` is present
pub fn required(method: &str, params: &Params, require: &[&str]) -> Result<()> {
    match require.iter().find(|key| !params.contains_key(key)) {
        Some(key) => Err(LunrError::client(format!(
            "'{}' is required argument for method '{}'",
            key, method
        ))),
        None => Ok(()),
    }
}

/// Fail if any key is outside `allow`
pub fn allowed(method: &str, params: &Params, allow: &[&str]) -> Result<()> {
    match params.keys().find(|key| !allow.contains(key)) {
        Some(key) => Err(LunrError::client(format!(
            "'{}' is not an argument for method '{}'",
            key, method
        ))),
        None => Ok(()),
    }
}

/// Per-client knobs
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub timeout: Option<Duration>,
    /// Log response bodies as well as requests
    pub debug: bool,
}

impl ClientOptions {
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client bound to a base URL
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    debug: bool,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, options: &ClientOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let agent = format!("lunrclient/{}", crate::VERSION);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&agent).map_err(|e| LunrError::client(e.to_string()))?,
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LunrError::client(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpClient {
            base_url: base_url.into(),
            client,
            debug: options.debug,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, uri: &str) -> String {
        format!("{}{}", self.base_url, uri)
    }

    pub fn get(&self, uri: &str, params: &Params) -> Result<Response> {
        self.request(Method::GET, &self.url(uri), params, None)
    }

    pub fn put(&self, uri: &str, params: &Params) -> Result<Response> {
        self.request(Method::PUT, &self.url(uri), params, None)
    }

    pub fn post(&self, uri: &str, params: &Params) -> Result<Response> {
        self.request(Method::POST, &self.url(uri), params, None)
    }

    pub fn delete(&self, uri: &str, params: &Params) -> Result<Response> {
        self.request(Method::DELETE, &self.url(uri), params, None)
    }

    /// POST a JSON document instead of query parameters
    pub fn post_json(&self, uri: &str, body: &Value) -> Result<Response> {
        self.request(Method::POST, &self.url(uri), &Params::new(), Some(body))
    }

    fn request(
        &self,
        method: Method,
        url: &str,
        params: &Params,
        body: Option<&Value>,
    ) -> Result<Response> {
        tracing::debug!(%method, url, params = ?params.as_slice(), "sending request");

        let mut request = self.client.request(method, url);
        if !params.is_empty() {
            request = request.query(params.as_slice());
        }
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let resp = request.send()?;
        let code = resp.status().as_u16();
        let text = resp.text()?;
        if self.debug {
            tracing::debug!(code, body = %text, "received response");
        }

        if code != 200 {
            return Err(LunrError::Http {
                message: format!("{} returned '{}' with '{}'", url, code, reason(&text)),
                code,
            });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        Ok(Response::new(body, code))
    }
}

/// The `reason` field of an error body, else the raw body
fn reason(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("reason").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| text.trim().to_string())
}
