//! XML serialization strategy backed by `quick-xml`, with the root element named after the type.

use std::fmt;

use serde::ser::{self, Serialize, Serializer};

use super::{SerializationStrategy, Visit};
use crate::error::Error;

/// XML via `quick-xml`.
///
/// The root element is named after the serialized type, so values without a
/// type name (maps, sequences, tuples, primitives, `serde_json::Value`) are
/// rejected with [`Error::AnonymousTypeNotSupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlStrategy;

impl SerializationStrategy for XmlStrategy {
    fn serialize(&self, value: &dyn erased_serde::Serialize) -> Result<String, Error> {
        if root_name(value).is_none() {
            return Err(Error::AnonymousTypeNotSupported);
        }
        quick_xml::se::to_string(&value).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn deserialize_with<'de>(&self, content: &'de str, visit: &mut Visit<'_, 'de>) -> Result<(), erased_serde::Error> {
        let mut xml = quick_xml::de::Deserializer::from_str(content);
        let mut erased = <dyn erased_serde::Deserializer>::erase(&mut xml);
        visit(&mut erased)
    }
}

/// Returns the type name serde reports for `value`, if it has one.
fn root_name(value: &dyn erased_serde::Serialize) -> Option<&'static str> {
    Serialize::serialize(value, RootName).ok().flatten()
}

#[derive(Debug)]
struct ProbeError(String);

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ProbeError {}

impl ser::Error for ProbeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ProbeError(msg.to_string())
    }
}

/// A serializer that only records the outermost type name.
struct RootName;

/// Compound state for named shapes; fields are ignored.
struct Named(&'static str);

/// Compound state for unnamed shapes; elements are ignored.
struct Unnamed;

macro_rules! unnamed_primitives {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, _: $ty) -> Result<Self::Ok, Self::Error> {
                Ok(None)
            }
        )*
    };
}

impl Serializer for RootName {
    type Ok = Option<&'static str>;
    type Error = ProbeError;
    type SerializeSeq = Unnamed;
    type SerializeTuple = Unnamed;
    type SerializeTupleStruct = Named;
    type SerializeTupleVariant = Named;
    type SerializeMap = Unnamed;
    type SerializeStruct = Named;
    type SerializeStructVariant = Named;

    unnamed_primitives!(
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_f32: f32,
        serialize_f64: f64,
        serialize_char: char,
        serialize_str: &str,
        serialize_bytes: &[u8],
    );

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Ok(None)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(None)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Self::Ok, Self::Error> {
        Ok(Some(name))
    }

    fn serialize_unit_variant(self, name: &'static str, _: u32, _: &'static str) -> Result<Self::Ok, Self::Error> {
        Ok(Some(name))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, name: &'static str, _: &T) -> Result<Self::Ok, Self::Error> {
        Ok(Some(name))
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<Self::Ok, Self::Error> {
        Ok(Some(name))
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(Unnamed)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(Unnamed)
    }

    fn serialize_tuple_struct(self, name: &'static str, _: usize) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Ok(Named(name))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Ok(Named(name))
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(Unnamed)
    }

    fn serialize_struct(self, name: &'static str, _: usize) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(Named(name))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Ok(Named(name))
    }
}

impl ser::SerializeSeq for Unnamed {
    type Ok = Option<&'static str>;
    type Error = ProbeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, _: &T) -> Result<(), ProbeError> {
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, ProbeError> {
        Ok(None)
    }
}

impl ser::SerializeTuple for Unnamed {
    type Ok = Option<&'static str>;
    type Error = ProbeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, _: &T) -> Result<(), ProbeError> {
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, ProbeError> {
        Ok(None)
    }
}

impl ser::SerializeMap for Unnamed {
    type Ok = Option<&'static str>;
    type Error = ProbeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, _: &T) -> Result<(), ProbeError> {
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, _: &T) -> Result<(), ProbeError> {
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, ProbeError> {
        Ok(None)
    }
}

impl ser::SerializeTupleStruct for Named {
    type Ok = Option<&'static str>;
    type Error = ProbeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &T) -> Result<(), ProbeError> {
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, ProbeError> {
        Ok(Some(self.0))
    }
}

impl ser::SerializeTupleVariant for Named {
    type Ok = Option<&'static str>;
    type Error = ProbeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &T) -> Result<(), ProbeError> {
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, ProbeError> {
        Ok(Some(self.0))
    }
}

impl ser::SerializeStruct for Named {
    type Ok = Option<&'static str>;
    type Error = ProbeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &'static str, _: &T) -> Result<(), ProbeError> {
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, ProbeError> {
        Ok(Some(self.0))
    }
}

impl ser::SerializeStructVariant for Named {
    type Ok = Option<&'static str>;
    type Error = ProbeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &'static str, _: &T) -> Result<(), ProbeError> {
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, ProbeError> {
        Ok(Some(self.0))
    }
}
