//! Content-type to strategy registry with glob matching.
//!
//! # Design
//! Patterns are compiled to unanchored, case-insensitive regexes when they
//! are registered, so a pattern matches anywhere in the content type and a
//! bare `application/json` also matches `application/json; charset=utf-8`. The entry table is an append-only `Vec` behind an `ArcSwap`:
//! readers take a lock-free snapshot and scan it in registration order, and
//! writers append through `rcu`, so a concurrent reader sees either the old
//! or the new table and never a torn one. Each entry builds its strategy on
//! first use through a `OnceLock`, which runs the factory at most once even
//! under contention.

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{JsonStrategy, SerializationStrategy, StrategyExt, XmlStrategy};
use crate::error::Error;

const JSON_PATTERN: &str = "*/json*";
const XML_PATTERN: &str = "*/xml*";

type Factory = Box<dyn Fn() -> Arc<dyn SerializationStrategy> + Send + Sync>;

struct Entry {
    pattern: String,
    matcher: Regex,
    factory: Factory,
    strategy: OnceLock<Arc<dyn SerializationStrategy>>,
}

impl Entry {
    fn strategy(&self) -> Arc<dyn SerializationStrategy> {
        Arc::clone(self.strategy.get_or_init(|| (self.factory)()))
    }
}

/// Maps content types to serialization strategies. First match wins.
pub struct ContentTypeRegistry {
    entries: ArcSwap<Vec<Arc<Entry>>>,
}

impl ContentTypeRegistry {
    /// A registry with the default JSON (`*/json*`) and XML (`*/xml*`) entries.
    pub fn new() -> Self {
        let registry = Self::empty();
        // Both default globs are plain literals with wildcards and always compile.
        let _ = registry.register_default::<JsonStrategy>(JSON_PATTERN);
        let _ = registry.register_default::<XmlStrategy>(XML_PATTERN);
        registry
    }

    /// A registry with no entries.
    pub fn empty() -> Self {
        Self {
            entries: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Registers a strategy factory for a glob pattern (`*` and `?` wildcards).
    ///
    /// The factory runs on the first lookup that selects this entry.
    pub fn register<S, F>(&self, pattern: &str, factory: F) -> Result<(), Error>
    where
        S: SerializationStrategy + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.insert(
            pattern,
            Box::new(move || Arc::new(factory()) as Arc<dyn SerializationStrategy>),
        )
    }

    /// Registers a strategy type built with [`Default`] on first use.
    pub fn register_default<S>(&self, pattern: &str) -> Result<(), Error>
    where
        S: SerializationStrategy + Default + 'static,
    {
        self.register(pattern, S::default)
    }

    /// Registers an already-built strategy instance.
    pub fn register_shared(&self, pattern: &str, strategy: Arc<dyn SerializationStrategy>) -> Result<(), Error> {
        self.insert(pattern, Box::new(move || Arc::clone(&strategy)))
    }

    fn insert(&self, pattern: &str, factory: Factory) -> Result<(), Error> {
        let matcher = compile_glob(pattern).map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        let entry = Arc::new(Entry {
            pattern: pattern.to_string(),
            matcher,
            factory,
            strategy: OnceLock::new(),
        });
        self.entries.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::clone(&entry));
            next
        });
        tracing::trace!(pattern, "registered serialization strategy");
        Ok(())
    }

    /// Registered patterns, in match order.
    pub fn patterns(&self) -> Vec<String> {
        self.entries
            .load()
            .iter()
            .map(|entry| entry.pattern.clone())
            .collect()
    }

    /// Finds the strategy for a content type.
    ///
    /// Fails with [`Error::BlankContentType`] for blank input; an unmatched
    /// content type is `Ok(None)`.
    pub fn resolve(&self, content_type: &str) -> Result<Option<Arc<dyn SerializationStrategy>>, Error> {
        if content_type.trim().is_empty() {
            return Err(Error::BlankContentType);
        }
        let entries = self.entries.load();
        let found = entries
            .iter()
            .find(|entry| entry.matcher.is_match(content_type));
        tracing::trace!(
            content_type,
            pattern = found.map(|entry| entry.pattern.as_str()),
            "resolved serialization strategy"
        );
        Ok(found.map(|entry| entry.strategy()))
    }

    /// Deserializes `content` using the strategy for `content_type`.
    ///
    /// Never fails: blank input, an unmatched content type and unparsable
    /// content all yield `None`.
    pub fn deserialize<T: DeserializeOwned>(&self, content_type: &str, content: &str) -> Option<T> {
        if content_type.trim().is_empty() || content.trim().is_empty() {
            return None;
        }
        let strategy = self.resolve(content_type).ok().flatten()?;
        match strategy.decode(content) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(content_type, error = %err, "failed to deserialize content");
                None
            }
        }
    }

    /// Serializes `value` using the strategy for `content_type`.
    pub fn serialize<T: Serialize>(&self, content_type: &str, value: &T) -> Result<String, Error> {
        let strategy = self.resolve(content_type)?.ok_or_else(|| Error::NoStrategy {
            content_type: content_type.to_string(),
        })?;
        strategy.encode(value)
    }
}

impl Default for ContentTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContentTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentTypeRegistry")
            .field("patterns", &self.patterns())
            .finish()
    }
}

/// Compiles a glob into an unanchored, case-insensitive regex.
fn compile_glob(pattern: &str) -> Result<Regex, regex::Error> {
    let body = regex::escape(pattern).replace(r"\*", ".*").replace(r"\?", ".");
    Regex::new(&format!("(?i){body}"))
}
