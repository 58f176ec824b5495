//! Base URL and resource URL composition.
//!
//! # Design
//! A client either has a base URL, in which case every resource URL must be
//! a well-formed relative reference that is appended to it, or it has none,
//! in which case every resource URL must itself be absolute. Inline query
//! strings are pulled out of the resource URL when it is assigned to a
//! request (see [`split_query`]), so composition only ever deals with paths.

use std::borrow::Cow;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::Error;

/// Characters that may not appear literally in a URI.
const ILLEGAL: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

const TRIMMED: &[char] = &['/', '\\', ' '];

/// Percent-encodes characters that are illegal in a URI.
///
/// Valid URI punctuation (`/ ? & = + : # [ ] @ !` and friends) is left
/// untouched, as are already-legal ASCII letters and digits.
pub fn escape(input: &str) -> Cow<'_, str> {
    utf8_percent_encode(input, ILLEGAL).into()
}

/// Validates a candidate base URL.
///
/// Returns `Ok(None)` for blank input, which clears the base URL.
pub fn validate_base_url(url: &str) -> Result<Option<String>, Error> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if !is_well_formed_absolute(trimmed) {
        return Err(Error::BadBaseUrl {
            url: url.to_string(),
        });
    }
    Ok(Some(trimmed.to_string()))
}

/// Produces the absolute URL for a resource.
///
/// The resource is trimmed and escaped first. With a base URL, trailing `/`, `\` and
/// spaces are trimmed from the base and leading ones from the resource, and
/// the two are joined with a single `/` unless the resource starts with `?`.
pub fn compose(base_url: Option<&str>, resource_url: &str) -> Result<String, Error> {
    match base_url {
        Some(base) => {
            let resource = escape(resource_url.trim().trim_start_matches(TRIMMED));
            if !is_well_formed_relative(&resource) {
                return Err(Error::BadRelativeUrl {
                    url: resource_url.to_string(),
                });
            }
            let root = base.trim_end_matches(TRIMMED);
            if resource.starts_with('?') {
                Ok(format!("{root}{resource}"))
            } else {
                Ok(format!("{root}/{resource}"))
            }
        }
        None => {
            let resource = escape(resource_url.trim());
            if !is_well_formed_absolute(&resource) {
                return Err(Error::BadAbsoluteUrl {
                    url: resource_url.to_string(),
                });
            }
            Ok(resource.into_owned())
        }
    }
}

/// Splits an inline query string off a URL.
///
/// Returns the URL without its query and the raw query (no leading `?`).
/// The query is only split off when it is non-blank and well-formed on its
/// own; a lone `?` is dropped with no query. Otherwise the URL is returned
/// unchanged.
pub fn split_query(url: &str) -> (&str, Option<&str>) {
    let Some(index) = url.find('?') else {
        return (url, None);
    };
    let (path, rest) = url.split_at(index);
    let query = rest.trim_matches('?');

    if query.trim().is_empty() {
        return (path, None);
    }
    if is_well_formed_relative(query) {
        (path, Some(query))
    } else {
        (url, None)
    }
}

/// True when `url` is an absolute, hierarchical URI with no illegal characters.
pub fn is_well_formed_absolute(url: &str) -> bool {
    if url.chars().any(is_illegal) || !has_valid_escapes(url) {
        return false;
    }
    match ::url::Url::parse(url) {
        Ok(parsed) => !parsed.cannot_be_a_base() && parsed.host().is_some(),
        Err(_) => false,
    }
}

/// True when `url` is a relative reference with no scheme, no fragment and no
/// illegal characters.
pub fn is_well_formed_relative(url: &str) -> bool {
    !url.chars().any(is_illegal) && !url.contains('#') && !has_scheme(url) && has_valid_escapes(url)
}

fn is_illegal(c: char) -> bool {
    !c.is_ascii()
        || c.is_ascii_control()
        || matches!(c, ' ' | '"' | '<' | '>' | '\\' | '^' | '`' | '{' | '|' | '}')
}

fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn has_valid_escapes(url: &str) -> bool {
    let bytes = url.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        b != b'%'
            || (bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}
