//! Header storage and classification.
//!
//! Header names keep the casing they were set with but every lookup is
//! case-insensitive. Content headers describe the body and travel in a
//! separate slot of the wire request from transport headers.

/// MIME types used as defaults.
pub mod mime {
    pub const FORM_ENCODED: &str = "application/x-www-form-encoded";
    pub const JSON: &str = "application/json";
    pub const XML: &str = "application/xml";
}

pub const CONTENT_TYPE: &str = "Content-Type";

/// Headers that describe the body rather than the request.
pub const CONTENT_HEADERS: [&str; 11] = [
    "Allow",
    "Content-Disposition",
    "Content-Encoding",
    "Content-Language",
    "Content-Length",
    "Content-Location",
    "Content-MD5",
    "Content-Range",
    "Content-Type",
    "Expires",
    "Last-Modified",
];

/// True when `name` is one of [`CONTENT_HEADERS`], ignoring case.
pub fn is_content_header(name: &str) -> bool {
    CONTENT_HEADERS
        .iter()
        .any(|header| header.eq_ignore_ascii_case(name))
}

/// An ordered header map with case-insensitive names and one value per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(String, String)>,
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header, replacing any value stored under the same name.
    ///
    /// The replaced entry keeps its position but takes the new casing.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => self.entries[index] = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Sets a header only if no header with the same name exists.
    ///
    /// Returns `true` if the header was inserted.
    pub fn set_if_absent(&mut self, name: &str, value: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push((name.to_string(), value.to_string()));
        true
    }

    /// Removes a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|index| self.entries.remove(index).1)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Splits into `(transport, content)` headers, in insertion order.
    pub fn partition(self) -> (Vec<(String, String)>, Vec<(String, String)>) {
        self.entries
            .into_iter()
            .partition(|(name, _)| !is_content_header(name))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderList {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = HeaderList::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}
