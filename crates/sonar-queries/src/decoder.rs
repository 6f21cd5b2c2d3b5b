//! Response Decoder
//!
//! Reads the `<object_name>` envelope of a response:
//!
//! ```text
//! { <object_name>: { entities: [...] | null, page_info?: { total_count, page, records_per_page } } }
//! ```
//!
//! Collections are strict: a null or missing `entities` is a backend
//! contract violation. Pages are lenient and treat it as an empty page.

use serde::Deserialize;
use serde_json::{Map, Value};
use sonar_core::{
    DecodeError, PageInfo, PageRequest, PaginatedResult, SonarError, SonarResult, WireDecodable,
};
use tracing::debug;

/// The object keyed by `object_name`
pub fn envelope<'a>(
    response: &'a Value,
    object_name: &str,
) -> Result<&'a Map<String, Value>, DecodeError> {
    match response.get(object_name) {
        None | Some(Value::Null) => Err(DecodeError::MissingObject(object_name.to_string())),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(DecodeError::unexpected(object_name, "an object")),
    }
}

/// Entity list, `None` when null or missing
fn entity_list<'a>(
    envelope: &'a Map<String, Value>,
) -> Result<Option<&'a Vec<Value>>, DecodeError> {
    match envelope.get("entities") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(entities)) => Ok(Some(entities)),
        Some(_) => Err(DecodeError::unexpected("entities", "an array")),
    }
}

/// Map raw entities through the resource decoder, in order
pub fn decode_entities<R: WireDecodable>(entities: &[Value]) -> Result<Vec<R>, DecodeError> {
    entities
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            R::from_wire(raw).map_err(|e| DecodeError::Entity(format!("entities[{}]: {}", i, e)))
        })
        .collect()
}

/// Read `page_info` from an envelope
pub fn decode_page_info(envelope: &Map<String, Value>) -> Result<PageInfo, DecodeError> {
    match envelope.get("page_info") {
        None | Some(Value::Null) => Err(DecodeError::MissingField("page_info".into())),
        Some(raw) => PageInfo::deserialize(raw).map_err(|_| {
            DecodeError::unexpected("page_info", "an object with a non-negative integer total_count")
        }),
    }
}

/// Decode a full collection (`get`)
pub fn decode_collection<R: WireDecodable>(
    response: &Value,
    object_name: &str,
) -> SonarResult<Vec<R>> {
    let envelope = envelope(response, object_name)?;
    let entities = entity_list(envelope)?.ok_or_else(|| SonarError::ResourceNotFound {
        object: object_name.to_string(),
    })?;

    let items = decode_entities(entities)?;
    debug!(object = object_name, count = items.len(), "Decoded collection");
    Ok(items)
}

/// Decode one page (`paginate`)
pub fn decode_page<R: WireDecodable>(
    response: &Value,
    object_name: &str,
    request: &PageRequest,
) -> SonarResult<PaginatedResult<R>> {
    let envelope = envelope(response, object_name)?;
    let page_info = decode_page_info(envelope)?;
    let items = match entity_list(envelope)? {
        Some(entities) => decode_entities(entities)?,
        None => vec![],
    };

    debug!(
        object = object_name,
        count = items.len(),
        total_count = page_info.total_count,
        "Decoded page"
    );
    Ok(PaginatedResult::new(items, page_info.total_count, request))
}
