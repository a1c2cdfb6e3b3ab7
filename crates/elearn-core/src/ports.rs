//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `elearn-core` (pure Rust).
//! Implementations live in `elearn-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use elearn_types::{
    chat::SocketEvent,
    course::UploadFile,
    ClientError, Result,
};

pub const AUTHORIZATION: &str = "Authorization";

// ─── HTTP Port ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Vec<FormPart>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file: UploadFile },
}

/// An outgoing request, built by the API client and sent through `HttpPort`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    /// Failure to authenticate this request sends the user to the login view
    pub requires_auth: bool,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            requires_auth: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn requiring_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Set a header, replacing any existing value (names compare case-insensitively).
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// URL with the query string appended, percent-encoded.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let qs: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("{}?{}", self.url, qs.join("&"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turn a non-2xx response into an error.
    pub fn error_for_status(self) -> Result<Self> {
        match self.status {
            200..=299 => Ok(self),
            401 => Err(ClientError::Unauthorized),
            status => Err(ClientError::Http {
                status,
                body: self.text(),
            }),
        }
    }
}

/// Sends one request. Returns `Ok` for every HTTP status; `Err` only when
/// the request never produced a response.
#[async_trait(?Send)]
pub trait HttpPort {
    async fn send(&self, req: &HttpRequest) -> Result<HttpResponse>;
}

// ─── Storage Port ────────────────────────────────────────────

/// Synchronous string key/value storage (browser `localStorage` semantics).
pub trait StoragePort {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Socket Port ─────────────────────────────────────────────

pub type SocketEvents = Pin<Box<dyn Stream<Item = SocketEvent>>>;

/// Write half of a live socket
pub trait SocketHandle {
    fn send_text(&self, text: &str) -> Result<()>;

    /// Client-initiated close. Idempotent.
    fn close(&self);
}

/// Opens sockets. The returned stream yields transport events in arrival
/// order and ends after `SocketEvent::Closed`.
pub trait SocketConnector {
    fn connect(&self, url: &str) -> Result<(Box<dyn SocketHandle>, SocketEvents)>;
}
