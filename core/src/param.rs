//! Query and body parameters and their string encoding.
//!
//! # Design
//! Each [`Parameter`] renders its own fragment independently of the others:
//! a null value renders as the bare name, a list as repeated `name[]=item`
//! fragments, and a scalar as `name=value`. The set-level functions join the
//! fragments with `&` and percent-encode the result once, so the encoding of
//! a parameter depends only on its name, value and kind.
//!
//! Parameters sharing a name are never deduplicated.

use std::fmt;

use crate::url::escape;

/// Destination of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Rendered into the request URL's query string.
    Query,
    /// Rendered into the form-encoded request body.
    Body,
}

/// The value carried by a [`Parameter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// No value; renders as the bare name.
    Null,
    /// A single value in its natural string form.
    Scalar(String),
    /// An ordered sequence; renders one `name[]=item` per element.
    List(Vec<String>),
}

impl ParamValue {
    /// Builds a list value from anything iterable whose items display.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        ParamValue::List(items.into_iter().map(|item| item.to_string()).collect())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Scalar(value.clone())
    }
}

macro_rules! scalar_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from_display!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl<T: fmt::Display> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::list(values)
    }
}

impl<T: fmt::Display> From<&[T]> for ParamValue {
    fn from(values: &[T]) -> Self {
        ParamValue::list(values)
    }
}

impl<T: fmt::Display, const N: usize> From<[T; N]> for ParamValue {
    fn from(values: [T; N]) -> Self {
        ParamValue::list(values)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

/// A named value destined for the query string or the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    value: ParamValue,
    kind: ParamKind,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<ParamValue>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind,
        }
    }

    pub fn query(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self::new(name, value, ParamKind::Query)
    }

    pub fn body(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self::new(name, value, ParamKind::Body)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Renders the unencoded fragment for this parameter.
    ///
    /// A list with no elements renders as an empty string.
    pub fn render(&self) -> String {
        match &self.value {
            ParamValue::Null => self.name.clone(),
            ParamValue::Scalar(value) => format!("{}={value}", self.name),
            ParamValue::List(items) => items
                .iter()
                .map(|item| format!("{}[]={item}", self.name))
                .collect::<Vec<_>>()
                .join("&"),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Joins the rendered fragments with `&` and percent-encodes the result.
///
/// Spaces become `%20`. Characters that are legal in a URI, including `+`,
/// `&` and `=`, pass through untouched.
pub fn build_query_string<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = &'a Parameter>,
{
    let joined = params
        .into_iter()
        .map(Parameter::render)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("&");
    escape(&joined).into_owned()
}

/// Like [`build_query_string`], with encoded spaces replaced by `+`.
pub fn encode_form<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = &'a Parameter>,
{
    build_query_string(params).replace("%20", "+")
}

/// Parses a raw query string (without the leading `?`) into query parameters.
///
/// Pairs are split on `&`, then on the first `=`. A missing `=` yields an
/// empty value and values are percent-decoded. Malformed fragments never fail.
pub(crate) fn parse_query_string(query: &str) -> Vec<Parameter> {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => {
                let decoded = percent_encoding::percent_decode_str(value).decode_utf8_lossy();
                Parameter::query(name, decoded.into_owned())
            }
            None => Parameter::query(pair, String::new()),
        })
        .collect()
}
