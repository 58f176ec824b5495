//! Wire-level request and response types and the transport seam.
//!
//! # Design
//! These types describe an HTTP exchange as plain data. The crate assembles a
//! [`WireRequest`] and materializes a [`RawResponse`] but never touches the
//! network itself: a [`Transport`] supplied by the host performs the send.
//! Keeping the seam this narrow makes the engine deterministic and lets tests
//! substitute an in-memory transport.
//!
//! Headers are split by destination because many HTTP stacks reject a
//! content header placed among request headers and vice versa.

use std::future::Future;

use bytes::Bytes;
use http::Method;

/// A fully resolved request, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: Method,
    /// Absolute, escaped URI including any query string.
    pub uri: String,
    /// Request-level headers.
    pub headers: Vec<(String, String)>,
    /// Body-level headers other than `Content-Type`.
    pub content_headers: Vec<(String, String)>,
    pub body: String,
    /// The media type of `body`.
    pub content_type: String,
}

impl WireRequest {
    /// Looks up a request-level or body-level header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .chain(&self.content_headers)
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A response as reported by a transport.
///
/// A header with several values appears once per value, in the order the
/// transport received them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub content_headers: Vec<(String, String)>,
    pub body: Bytes,
}

/// Sends a [`WireRequest`] and returns the [`RawResponse`].
///
/// Timeouts, retries, connection reuse and TLS are the implementation's
/// concern. Its errors are returned to callers unchanged.
pub trait Transport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send(&self, request: WireRequest) -> impl Future<Output = Result<RawResponse, Self::Error>> + Send;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Error = T::Error;

    fn send(&self, request: WireRequest) -> impl Future<Output = Result<RawResponse, Self::Error>> + Send {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    type Error = T::Error;

    fn send(&self, request: WireRequest) -> impl Future<Output = Result<RawResponse, Self::Error>> + Send {
        (**self).send(request)
    }
}
