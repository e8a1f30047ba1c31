//! Field decoders that never reject a value
//!
//! A field of the wrong JSON type decodes to that field's default instead of
//! failing the whole record, so `{"x": null}` reads as `x = 0`. List elements
//! that are not objects decode as if they were `{}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Any number, else `0.0`
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64().unwrap_or_default())
}

/// Any string, else empty
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or(Value::deserialize(deserializer)?, ""))
}

/// An array decoded element by element, else empty
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(records(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// A top-level array decoded element by element. Anything else is an error.
pub fn records<T>(value: Value) -> Result<Vec<T>, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    match value {
        Value::Array(items) => Ok(items.into_iter().map(element).collect()),
        _ => Err(serde::de::Error::custom("expected a JSON array")),
    }
}

/// Decode one record; anything that is not an object is read as `{}`
pub fn element<T>(value: Value) -> T
where
    T: DeserializeOwned + Default,
{
    match value {
        Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => T::default(),
    }
}

pub(crate) fn string_or(value: Value, fallback: &str) -> String {
    match value {
        Value::String(s) => s,
        _ => fallback.to_string(),
    }
}
