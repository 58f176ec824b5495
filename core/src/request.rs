//! Value-based request description.
//!
//! # Design
//! Every builder method consumes the request and returns the updated value,
//! so two call sites can never mutate what they believe are independent
//! requests. Clone explicitly to branch a description.
//!
//! Assigning a URL that carries a query string moves the query into the
//! parameter list. Parameters the caller already added under the same query
//! name are kept and the extracted ones with that name are dropped.

use std::collections::HashSet;
use std::sync::Arc;

use http::Method;
use serde::Serialize;

use crate::error::Error;
use crate::headers::{mime, HeaderList, CONTENT_TYPE};
use crate::param::{parse_query_string, ParamKind, ParamValue, Parameter};
use crate::serializer::{ContentTypeRegistry, JsonStrategy, SerializationStrategy, StrategyExt, XmlStrategy};
use crate::url::split_query;

/// A declarative description of one HTTP call.
#[derive(Debug, Clone)]
#[must_use]
pub struct Request {
    pub(crate) url: String,
    pub(crate) method: Method,
    pub(crate) headers: HeaderList,
    pub(crate) body: String,
    pub(crate) params: Vec<Parameter>,
    pub(crate) strategy: Option<Arc<dyn SerializationStrategy>>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: Method::GET,
            headers: HeaderList::new(),
            body: String::new(),
            params: Vec::new(),
            strategy: None,
        }
    }
}

impl Request {
    /// A `GET` request for `url`.
    pub fn new(url: &str) -> Self {
        Self::default().with_url(url)
    }

    pub fn with_url(mut self, url: &str) -> Self {
        let (path, query) = split_query(url);
        if let Some(query) = query {
            let existing: HashSet<String> = self
                .params
                .iter()
                .filter(|p| p.kind() == ParamKind::Query)
                .map(|p| p.name().to_string())
                .collect();
            self.params.extend(
                parse_query_string(query)
                    .into_iter()
                    .filter(|p| !existing.contains(p.name())),
            );
        }
        self.url = path.trim().to_string();
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_query(self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.with_param(Parameter::query(name, value))
    }

    pub fn with_body_param(self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.with_param(Parameter::body(name, value))
    }

    pub fn with_param(mut self, param: Parameter) -> Self {
        if param.name().is_empty() {
            tracing::warn!(kind = ?param.kind(), "adding a parameter with an empty name");
        }
        self.params.push(param);
        self
    }

    /// Sets a header, replacing any header with the same name in any case.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.remove(name);
        self
    }

    /// Sets an explicit body and its content type.
    ///
    /// A non-blank explicit body always wins over body parameters.
    pub fn with_body(mut self, content: impl Into<String>, content_type: &str) -> Self {
        self.body = content.into();
        self.headers.set(CONTENT_TYPE, content_type);
        self
    }

    /// Drops the explicit body so body parameters are sent again.
    pub fn without_body(mut self) -> Self {
        self.body.clear();
        self
    }

    pub fn with_json_body<T: Serialize>(self, value: &T) -> Result<Self, Error> {
        let content = JsonStrategy.encode(value)?;
        Ok(self.with_body(content, mime::JSON))
    }

    /// Fails with [`Error::AnonymousTypeNotSupported`] for values without a type name.
    pub fn with_xml_body<T: Serialize>(self, value: &T) -> Result<Self, Error> {
        let content = XmlStrategy.encode(value)?;
        Ok(self.with_body(content, mime::XML))
    }

    /// Serializes the body with whatever strategy `registry` selects for `content_type`.
    pub fn with_serialized_body<T: Serialize>(
        self,
        registry: &ContentTypeRegistry,
        content_type: &str,
        value: &T,
    ) -> Result<Self, Error> {
        let content = registry.serialize(content_type, value)?;
        Ok(self.with_body(content, content_type))
    }

    /// Parses the response with this strategy instead of looking one up.
    pub fn with_strategy(mut self, strategy: Arc<dyn SerializationStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn strategy(&self) -> Option<&Arc<dyn SerializationStrategy>> {
        self.strategy.as_ref()
    }

    /// The explicit `Content-Type` header, or the form-encoded default.
    pub fn content_type(&self) -> &str {
        self.headers.get(CONTENT_TYPE).unwrap_or(mime::FORM_ENCODED)
    }
}
