//! Context key extraction
//!
//! The context key is the lowercased host of a request. It is the only part of
//! the request the tenant resolver ever looks at.

use axum::http::{header::HOST, request::Parts, HeaderMap, Request};

/// Anything that can tell us which host a request was addressed to
pub trait HostSource {
    /// Raw host value, if the request carries one
    fn host(&self) -> Option<&str>;
}

impl HostSource for str {
    fn host(&self) -> Option<&str> {
        Some(self)
    }
}

impl HostSource for String {
    fn host(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl HostSource for HeaderMap {
    fn host(&self) -> Option<&str> {
        self.get(HOST).and_then(|value| value.to_str().ok())
    }
}

impl HostSource for Parts {
    fn host(&self) -> Option<&str> {
        self.headers
            .host()
            .or_else(|| self.uri.authority().map(|authority| authority.as_str()))
    }
}

impl<B> HostSource for Request<B> {
    fn host(&self) -> Option<&str> {
        self.headers()
            .host()
            .or_else(|| self.uri().authority().map(|authority| authority.as_str()))
    }
}

/// Normalize a host value into a context key
///
/// Only case is normalized. The port, if any, stays part of the key, so a
/// tenant served on `localhost:5000` lists that exact value as a hostname.
pub fn context_key(host: &str) -> String {
    host.to_lowercase()
}

/// Context key for a request; an absent host gives the empty key
pub fn request_context_key<H: HostSource + ?Sized>(request: &H) -> String {
    request.host().map(context_key).unwrap_or_default()
}
