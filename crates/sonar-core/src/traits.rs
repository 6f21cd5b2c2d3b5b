//! Capabilities supplied by resource kinds

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;
use crate::types::{FieldType, Selection};

/// Primary key type of remote records
pub type Id = i64;

/// A resource kind that can be decoded from one raw wire entity.
///
/// Implementors describe the fields they need (`selection`), optionally
/// declare the wire type of the attributes they are filtered by
/// (`field_types`), and map a raw object into the typed resource.
pub trait WireDecodable: Sized {
    /// Fields selected under `entities`
    fn selection() -> Selection;

    /// Declared filter attribute types; undeclared attributes are inferred
    /// from the first value they are filtered with.
    fn field_types() -> &'static [(&'static str, FieldType)] {
        &[]
    }

    fn from_wire(raw: &Value) -> Result<Self, DecodeError>;
}

/// A resource kind with a fixed remote collection name
pub trait RemoteResource: WireDecodable {
    /// Root field of the query and key of the response envelope
    const OBJECT_NAME: &'static str;
}

/// Decode a raw entity through its serde representation
pub fn from_json<T: DeserializeOwned>(raw: &Value) -> Result<T, DecodeError> {
    T::deserialize(raw).map_err(|e| DecodeError::Entity(e.to_string()))
}

/// Raw entities pass through untouched
impl WireDecodable for Value {
    fn selection() -> Selection {
        Selection::fields(["id"])
    }

    fn from_wire(raw: &Value) -> Result<Self, DecodeError> {
        Ok(raw.clone())
    }
}
