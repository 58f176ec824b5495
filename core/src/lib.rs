//! Request composition and content negotiation over a pluggable HTTP transport.
//!
//! # Overview
//! A [`Request`] describes one call declaratively: URL, method, headers,
//! query and body parameters, and an optional explicit body. A [`Client`]
//! merges it with its base URL and default headers, encodes it into a
//! [`WireRequest`], hands that to a host-supplied [`Transport`], and turns the
//! [`RawResponse`] into a [`Response`] that can be parsed into typed values
//! through the [`ContentTypeRegistry`].
//!
//! # Design
//! - The crate performs no I/O. The only await point is [`Transport::send`],
//!   so assembly and materialization are deterministic and testable with an
//!   in-memory transport.
//! - Requests are values: builder methods consume and return them.
//! - Composition errors are raised before anything is sent. Transport errors
//!   are passed through unchanged in [`FetchError::Transport`].
//! - Response parsing is best-effort and yields `None` on any miss.
//!
//! ```
//! use fetch_core::{Method, Request};
//!
//! let request = Request::new("/search?q=rust")
//!     .with_method(Method::POST)
//!     .with_query("page", 2)
//!     .with_body_param("tags", ["a", "b"]);
//! assert_eq!(request.params().len(), 3);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod http;
pub mod param;
pub mod request;
pub mod response;
pub mod serializer;
pub mod url;

pub use ::http::Method;
pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, FetchError};
pub use headers::HeaderList;
pub use self::http::{RawResponse, Transport, WireRequest};
pub use param::{ParamKind, ParamValue, Parameter};
pub use request::Request;
pub use response::Response;
pub use serializer::{ContentTypeRegistry, JsonStrategy, SerializationStrategy, StrategyExt, XmlStrategy};
