//! Request assembly and the fetch operations.
//!
//! # Design
//! `Client` holds the long-lived settings (base URL, default headers, the
//! content-type registry) and a host-supplied [`Transport`]. Assembly is a
//! pure function of those settings and one [`Request`]: it validates and
//! composes the URL, merges defaults, encodes parameters and splits headers
//! into request and content slots, all before the transport is called. A
//! composition error therefore never produces a partial network call.
//!
//! Default headers live in a `DashMap` keyed by lower-cased name so that
//! concurrent fetches can read them while another task adds one.

use std::sync::Arc;

use dashmap::DashMap;
use http::Method;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{Error, FetchError};
use crate::headers::{mime, CONTENT_TYPE};
use crate::http::{Transport, WireRequest};
use crate::param::{build_query_string, ParamKind};
use crate::request::Request;
use crate::response::Response;
use crate::serializer::ContentTypeRegistry;
use crate::url::{compose, validate_base_url};

/// Composes requests, hands them to a transport and materializes responses.
pub struct Client<T> {
    base_url: Option<String>,
    default_headers: DashMap<String, (String, String)>,
    registry: Arc<ContentTypeRegistry>,
    transport: T,
}

impl<T: Transport> Client<T> {
    /// A client with no base URL, no default headers and the default registry.
    pub fn new(transport: T) -> Self {
        Self {
            base_url: None,
            default_headers: DashMap::new(),
            registry: Arc::new(ContentTypeRegistry::new()),
            transport,
        }
    }

    pub fn with_base_url(transport: T, base_url: &str) -> Result<Self, Error> {
        let mut client = Self::new(transport);
        client.set_base_url(base_url)?;
        Ok(client)
    }

    pub fn from_config(config: ClientConfig, transport: T) -> Result<Self, Error> {
        let mut client = Self::new(transport);
        if let Some(base_url) = config.base_url.as_deref() {
            client.set_base_url(base_url)?;
        }
        for (name, value) in &config.default_headers {
            client.set_default_header(name, value);
        }
        Ok(client)
    }

    /// Replaces the content-type registry used for parsing responses.
    pub fn with_registry(mut self, registry: Arc<ContentTypeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the base URL. A blank value clears it.
    pub fn set_base_url(&mut self, base_url: &str) -> Result<(), Error> {
        self.base_url = validate_base_url(base_url)?;
        Ok(())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Adds a header sent with every request that does not set it itself.
    ///
    /// The first value set for a name (in any case) is kept.
    pub fn set_default_header(&self, name: &str, value: &str) {
        self.default_headers
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| (name.to_string(), value.to_string()));
    }

    pub fn default_header(&self, name: &str) -> Option<String> {
        self.default_headers
            .get(&name.to_ascii_lowercase())
            .map(|entry| entry.value().1.clone())
    }

    pub fn registry(&self) -> &Arc<ContentTypeRegistry> {
        &self.registry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolves `request` into the exact request the transport will see.
    pub fn assemble(&self, request: Request) -> Result<WireRequest, Error> {
        let Request {
            url,
            method,
            mut headers,
            body,
            params,
            ..
        } = request;

        if self.base_url.is_none() && url.trim().is_empty() {
            return Err(Error::NoUrlProvided);
        }
        let mut uri = compose(self.base_url.as_deref(), &url)?;

        for entry in self.default_headers.iter() {
            let (name, value) = entry.value();
            headers.set_if_absent(name, value);
        }

        let query = build_query_string(params.iter().filter(|p| p.kind() == ParamKind::Query));
        if !query.is_empty() {
            let fragment = uri.find('#').map(|index| uri.split_off(index));
            uri.push(if uri.contains('?') { '&' } else { '?' });
            uri.push_str(&query);
            if let Some(fragment) = fragment {
                uri.push_str(&fragment);
            }
        }

        let body = if body.trim().is_empty() {
            build_query_string(params.iter().filter(|p| p.kind() == ParamKind::Body))
        } else {
            body
        };

        let content_type = headers
            .remove(CONTENT_TYPE)
            .unwrap_or_else(|| mime::FORM_ENCODED.to_string());
        let (headers, content_headers) = headers.partition();

        tracing::debug!(
            %method,
            %uri,
            headers = headers.len(),
            content_headers = content_headers.len(),
            body_length = body.len(),
            "assembled request"
        );

        Ok(WireRequest {
            method,
            uri,
            headers,
            content_headers,
            body,
            content_type,
        })
    }

    /// Assembles `request`, sends it and materializes the response.
    pub async fn fetch(&self, request: Request) -> Result<Response, FetchError<T::Error>> {
        let wire = self.assemble(request)?;
        let raw = self
            .transport
            .send(wire)
            .await
            .map_err(FetchError::Transport)?;
        Ok(Response::materialize(raw, Arc::clone(&self.registry)))
    }

    /// `GET url`.
    pub async fn fetch_url(&self, url: &str) -> Result<Response, FetchError<T::Error>> {
        self.fetch(Request::new(url)).await
    }

    pub async fn fetch_with(&self, url: &str, method: Method) -> Result<Response, FetchError<T::Error>> {
        self.fetch(Request::new(url).with_method(method)).await
    }

    /// Like [`Client::fetch_with`] with the method given as a token, e.g. `"PATCH"`.
    pub async fn fetch_with_str(&self, url: &str, method: &str) -> Result<Response, FetchError<T::Error>> {
        let method = Method::from_bytes(method.as_bytes()).map_err(|_| Error::InvalidMethod {
            method: method.to_string(),
        })?;
        self.fetch_with(url, method).await
    }

    /// `GET` the base URL itself. Fails with [`Error::NoUrlProvided`] when none is set.
    pub async fn fetch_base(&self) -> Result<Response, FetchError<T::Error>> {
        self.fetch_url("").await
    }

    /// Fetches and parses the content into `D`.
    ///
    /// Uses the request's own strategy when it has one, otherwise the
    /// registry entry for the response content type. Parse misses are
    /// `Ok(None)`.
    pub async fn fetch_as<D: DeserializeOwned>(&self, request: Request) -> Result<Option<D>, FetchError<T::Error>> {
        let strategy = request.strategy().cloned();
        let response = self.fetch(request).await?;
        Ok(match strategy {
            Some(strategy) => response.parse_using(strategy.as_ref()),
            None => response.parse(),
        })
    }
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers.len())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use tracing_test::traced_test;

    use super::*;
    use crate::http::RawResponse;

    /// A transport that is never called by these tests.
    struct Unused;

    impl Transport for Unused {
        type Error = Infallible;

        async fn send(&self, _: WireRequest) -> Result<RawResponse, Infallible> {
            Ok(RawResponse::default())
        }
    }

    fn client(base_url: &str) -> Client<Unused> {
        Client::with_base_url(Unused, base_url).unwrap()
    }

    #[test]
    fn composes_relative_resource_against_base() {
        let wire = client("http://localhost.com").assemble(Request::new("my-test-resource")).unwrap();
        assert_eq!(wire.uri, "http://localhost.com/my-test-resource");
        assert_eq!(wire.method, Method::GET);
    }

    #[test]
    fn empty_url_without_base_is_no_url() {
        let client = Client::new(Unused);
        for url in ["", "  ", "?page=1"] {
            assert!(matches!(client.assemble(Request::new(url)), Err(Error::NoUrlProvided)), "{url}");
        }
    }

    #[test]
    fn blank_base_url_clears_it() {
        let mut client = client("http://localhost.com");
        client.set_base_url("  ").unwrap();
        assert_eq!(client.base_url(), None);
        assert!(matches!(client.set_base_url("not a url"), Err(Error::BadBaseUrl { .. })));
    }

    #[test]
    fn appends_to_an_existing_query_with_ampersand() {
        let client = Client::new(Unused);
        let wire = client
            .assemble(
                Request::new("http://localhost.com/?MyParameter=hello%20world").with_query("MyOtherParameter", "hello mars"),
            )
            .unwrap();
        assert_eq!(
            wire.uri,
            "http://localhost.com/?MyParameter=hello%20world&MyOtherParameter=hello%20mars"
        );
    }

    #[test]
    fn query_is_inserted_before_the_fragment() {
        let client = Client::new(Unused);
        let wire = client
            .assemble(Request::new("http://localhost.com/page#top").with_query("a", "1"))
            .unwrap();
        assert_eq!(wire.uri, "http://localhost.com/page?a=1#top");
        let parsed = ::url::Url::parse(&wire.uri).unwrap();
        assert_eq!(parsed.query(), Some("a=1"));
        assert_eq!(parsed.fragment(), Some("top"));

        let wire = client
            .assemble(Request::new("http://localhost.com/page?x=1#top").with_query("a", "1"))
            .unwrap();
        assert_eq!(wire.uri, "http://localhost.com/page?x=1&a=1#top");
    }

    #[test]
    fn body_parameters_are_encoded_as_body() {
        let wire = client("http://localhost.com")
            .assemble(Request::new("/").with_method(Method::POST).with_body_param("TestValue", "\""))
            .unwrap();
        assert_eq!(wire.body, "TestValue=%22");
        assert_eq!(wire.content_type, "application/x-www-form-encoded");
        assert!(!wire.uri.contains('?'));
    }

    #[test]
    fn explicit_body_wins_over_body_parameters() {
        let wire = client("http://localhost.com")
            .assemble(
                Request::new("/")
                    .with_body_param("ignored", 1)
                    .with_body("plain text", "text/plain"),
            )
            .unwrap();
        assert_eq!(wire.body, "plain text");
        assert_eq!(wire.content_type, "text/plain");
    }

    #[test]
    fn defaults_do_not_override_request_headers() {
        let client = client("http://localhost.com");
        client.set_default_header("X-Api-Key", "default");
        client.set_default_header("x-api-key", "second");
        client.set_default_header("Accept", "application/json");
        assert_eq!(client.default_header("X-API-KEY").as_deref(), Some("default"));

        let wire = client
            .assemble(Request::new("/").with_header("x-api-key", "mine"))
            .unwrap();
        assert_eq!(wire.header("X-Api-Key"), Some("mine"));
        assert_eq!(wire.header("accept"), Some("application/json"));
        assert_eq!(wire.headers.len(), 2);
    }

    #[test]
    fn content_headers_are_routed_separately() {
        let wire = client("http://localhost.com")
            .assemble(
                Request::new("/")
                    .with_header("content-type", "application/xml")
                    .with_header("Content-Language", "en")
                    .with_header("X-Trace", "1"),
            )
            .unwrap();
        assert_eq!(wire.content_type, "application/xml");
        assert_eq!(wire.headers, vec![("X-Trace".to_string(), "1".to_string())]);
        assert_eq!(wire.content_headers, vec![("Content-Language".to_string(), "en".to_string())]);
    }

    #[test]
    fn from_config_installs_base_url_and_headers() {
        let config = ClientConfig {
            base_url: Some("http://localhost:8080/api/".to_string()),
            default_headers: [("Accept".to_string(), "application/json".to_string())].into(),
        };
        let client = Client::from_config(config, Unused).unwrap();
        let wire = client.assemble(Request::new("items")).unwrap();
        assert_eq!(wire.uri, "http://localhost:8080/api/items");
        assert_eq!(wire.header("accept"), Some("application/json"));
    }

    #[test]
    #[traced_test]
    fn assembly_is_logged() {
        client("http://localhost.com")
            .assemble(Request::new("logged").with_method(Method::DELETE))
            .unwrap();
        assert!(logs_contain("assembled request"));
        assert!(logs_contain("http://localhost.com/logged"));
    }

    #[test]
    fn from_config_rejects_bad_base_url() {
        let config = ClientConfig {
            base_url: Some("localhost".to_string()),
            ..ClientConfig::default()
        };
        assert!(matches!(Client::from_config(config, Unused), Err(Error::BadBaseUrl { .. })));
    }
}
