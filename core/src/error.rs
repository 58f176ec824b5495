//! Error types for request composition and content negotiation.
//!
//! # Design
//! Composition and configuration failures are raised before any transport
//! call is attempted, so a caller can fix the input and retry. Transport
//! failures are carried through [`FetchError::Transport`] untouched; this
//! crate never inspects, retries or re-wraps them.
//!
//! Deserialization misses are deliberately absent: the convenience parse
//! paths degrade to `None` instead of failing.

use thiserror::Error;

/// Errors raised while configuring a client or composing a request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A non-blank base URL was not a well-formed absolute URI.
    #[error("base url '{url}' is not a well-formed absolute uri")]
    BadBaseUrl { url: String },

    /// No base URL is set and the resource URL is not a well-formed absolute URI.
    #[error("url '{url}' is not a well-formed absolute uri")]
    BadAbsoluteUrl { url: String },

    /// A base URL is set and the resource URL is not a well-formed relative URI.
    #[error("url '{url}' is not a well-formed relative uri")]
    BadRelativeUrl { url: String },

    /// The request URL is blank and no base URL is set.
    #[error("no url provided and no base url set")]
    NoUrlProvided,

    /// The XML strategy was asked to serialize a value with no type name.
    #[error("anonymous types cannot be serialized, use a named struct or enum")]
    AnonymousTypeNotSupported,

    /// A direct strategy lookup was made with a blank content type.
    #[error("content type cannot be blank")]
    BlankContentType,

    /// No registered pattern matches the content type.
    #[error("no serialization strategy registered for content type '{content_type}'")]
    NoStrategy { content_type: String },

    /// A content-type glob could not be compiled.
    #[error("invalid content type pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The method token is not a valid HTTP method.
    #[error("invalid http method '{method}'")]
    InvalidMethod { method: String },

    /// A strategy failed to serialize a value.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Errors returned by the fetch operations of [`crate::Client`].
#[derive(Debug, Error)]
pub enum FetchError<E: std::error::Error + 'static> {
    /// The request could not be composed; nothing was sent.
    #[error(transparent)]
    Request(#[from] Error),

    /// The transport collaborator failed.
    #[error("transport error: {0}")]
    Transport(#[source] E),
}

impl<E: std::error::Error + 'static> FetchError<E> {
    /// Returns the composition error, if that is what this is.
    pub fn as_request(&self) -> Option<&Error> {
        match self {
            FetchError::Request(err) => Some(err),
            FetchError::Transport(_) => None,
        }
    }
}
