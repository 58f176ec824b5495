//! JSON serialization strategy backed by `serde_json`.

use serde::de::Error as _;

use super::{SerializationStrategy, Visit};
use crate::error::Error;

/// JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStrategy;

impl SerializationStrategy for JsonStrategy {
    fn serialize(&self, value: &dyn erased_serde::Serialize) -> Result<String, Error> {
        serde_json::to_string(value).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn deserialize_with<'de>(&self, content: &'de str, visit: &mut Visit<'_, 'de>) -> Result<(), erased_serde::Error> {
        let mut json = serde_json::Deserializer::from_str(content);
        {
            let mut erased = <dyn erased_serde::Deserializer>::erase(&mut json);
            visit(&mut erased)?;
        }
        json.end().map_err(erased_serde::Error::custom)
    }
}
