//! Pluggable serialization strategies keyed by content type.
//!
//! # Design
//! A strategy turns values into text and text back into values for one
//! family of content types. Strategies are stored behind `Arc<dyn _>` in the
//! [`ContentTypeRegistry`], so the object-safe surface works on
//! type-erased serde values (`erased_serde`). The typed entry points live on
//! [`StrategyExt`], which is implemented for every strategy, trait objects
//! included.

mod json;
mod registry;
mod xml;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use json::JsonStrategy;
pub use registry::ContentTypeRegistry;
pub use xml::XmlStrategy;

use crate::error::Error;

/// Callback handed a type-erased deserializer over some content.
pub type Visit<'a, 'de> =
    dyn FnMut(&mut dyn erased_serde::Deserializer<'de>) -> Result<(), erased_serde::Error> + 'a;

/// Converts values to and from one text format.
pub trait SerializationStrategy: fmt::Debug + Send + Sync {
    /// Serializes a value into this strategy's format.
    fn serialize(&self, value: &dyn erased_serde::Serialize) -> Result<String, Error>;

    /// Builds a deserializer over `content` and hands it to `visit`.
    fn deserialize_with<'de>(&self, content: &'de str, visit: &mut Visit<'_, 'de>) -> Result<(), erased_serde::Error>;
}

/// Typed helpers over any [`SerializationStrategy`].
pub trait StrategyExt: SerializationStrategy {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, Error> {
        self.serialize(value)
    }

    fn decode<T: DeserializeOwned>(&self, content: &str) -> Result<T, erased_serde::Error> {
        let mut decoded = None;
        self.deserialize_with(content, &mut |deserializer| {
            decoded = Some(erased_serde::deserialize::<T>(deserializer)?);
            Ok(())
        })?;
        decoded.ok_or_else(|| <erased_serde::Error as serde::de::Error>::custom("strategy produced no value"))
    }
}

impl<S: SerializationStrategy + ?Sized> StrategyExt for S {}
