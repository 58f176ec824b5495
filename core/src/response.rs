//! Materialized responses.
//!
//! # Design
//! A [`Response`] owns everything the transport reported: the status, the
//! body decoded as UTF-8 (lossily), and a flattened header list. Typed
//! parsing is deferred until the caller asks for it and is best-effort: any
//! miss yields `None`.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::headers::CONTENT_TYPE;
use crate::http::RawResponse;
use crate::serializer::{ContentTypeRegistry, SerializationStrategy, StrategyExt};

/// A response with flattened headers and on-demand typed parsing.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    content: String,
    registry: Arc<ContentTypeRegistry>,
}

impl Response {
    /// Builds a response whose [`Response::parse`] uses `registry`.
    ///
    /// Request and content headers are merged into one list. Names are
    /// grouped case-insensitively in first-seen order and repeated values
    /// are joined with `,` in reporting order.
    pub fn materialize(raw: RawResponse, registry: Arc<ContentTypeRegistry>) -> Self {
        let RawResponse {
            status,
            headers,
            content_headers,
            body,
        } = raw;

        let mut flattened: Vec<(String, String)> = Vec::with_capacity(headers.len() + content_headers.len());
        for (name, value) in headers.into_iter().chain(content_headers) {
            match flattened
                .iter_mut()
                .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
            {
                Some((_, joined)) => {
                    joined.push(',');
                    joined.push_str(&value);
                }
                None => flattened.push((name, value)),
            }
        }

        let content = String::from_utf8_lossy(&body).into_owned();
        tracing::debug!(status, content_length = content.len(), headers = flattened.len(), "materialized response");

        Self {
            status,
            headers: flattened,
            content,
            registry,
        }
    }

    /// Materializes against a fresh registry with the default strategies.
    pub fn from_raw(raw: RawResponse) -> Self {
        Self::materialize(raw, Arc::new(ContentTypeRegistry::new()))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    /// Looks up a flattened header value, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    /// Parses the content with the strategy registered for its content type.
    pub fn parse<T: DeserializeOwned>(&self) -> Option<T> {
        self.parse_with(&self.registry)
    }

    /// Like [`Response::parse`], looking the strategy up in `registry`.
    pub fn parse_with<T: DeserializeOwned>(&self, registry: &ContentTypeRegistry) -> Option<T> {
        let content_type = self.content_type()?;
        registry.deserialize(content_type, &self.content)
    }

    /// Parses the content with `strategy`, ignoring the content type.
    pub fn parse_using<T, S>(&self, strategy: &S) -> Option<T>
    where
        T: DeserializeOwned,
        S: SerializationStrategy + ?Sized,
    {
        match strategy.decode(&self.content) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(strategy = ?strategy, error = %err, "failed to deserialize content");
                None
            }
        }
    }
}
