//! Conversion of flattened items into caller types

use crate::error::{Error, Result};
use crate::flatten::types::FlattenedItem;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize a flattened value into `T`.
///
/// Keys `T` does not declare are ignored. Shape and type mismatches fail
/// with [`Error::StructuralMismatch`].
pub fn materialize<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(Error::StructuralMismatch)
}

/// Deserialize one flattened item into `T`
pub fn materialize_one<T: DeserializeOwned>(item: FlattenedItem) -> Result<T> {
    materialize(Value::Object(item))
}

/// Deserialize a batch of flattened items into `T`, usually a `Vec<_>`
pub fn materialize_many<T: DeserializeOwned>(items: Vec<FlattenedItem>) -> Result<T> {
    materialize(Value::Array(items.into_iter().map(Value::Object).collect()))
}
