//! Columnar encoding of state packages
//!
//! A package becomes a single-row Parquet file. The schema is inferred from
//! the package's own JSON form on every write, so nested objects turn into
//! struct columns and arrays into list columns. Two writes of the same
//! dataset may therefore carry different schemas when the API payload
//! changes shape.
//!
//! Parquet has no empty struct, so empty JSON objects are written as nulls.
//! Scalars that mix types within one column are written as strings.

use arrow::json::reader::{infer_json_schema_from_iterator, ReaderBuilder};
use parquet::arrow::ArrowWriter;
use serde_json::Value;
use std::sync::Arc;

use super::{SinkError, SinkResult};
use crate::StatePackage;

/// Encode a package as a one-row Parquet file
///
/// # Errors
/// [`SinkError::Serialization`] if the package cannot be turned into JSON,
/// [`SinkError::Columnar`] if schema inference, decoding or Parquet writing fails
pub fn encode_package(package: &StatePackage) -> SinkResult<Vec<u8>> {
    let mut row = serde_json::to_value(package)
        .map_err(|e| SinkError::Serialization(format!("Failed to encode package: {e}")))?;
    null_empty_objects(&mut row);

    let schema = infer_json_schema_from_iterator(std::iter::once(Ok(&row)))
        .map_err(|e| SinkError::Columnar(format!("Schema inference failed: {e}")))?;
    let schema = Arc::new(schema);

    let mut decoder = ReaderBuilder::new(schema.clone())
        .with_coerce_primitive(true)
        .build_decoder()
        .map_err(|e| SinkError::Columnar(format!("Failed to build decoder: {e}")))?;
    decoder
        .serialize(&[&row])
        .map_err(|e| SinkError::Columnar(format!("Failed to decode row: {e}")))?;
    let batch = decoder
        .flush()
        .map_err(|e| SinkError::Columnar(format!("Failed to build record batch: {e}")))?
        .ok_or_else(|| SinkError::Columnar("No rows decoded".to_string()))?;

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, None)
        .map_err(|e| SinkError::Columnar(format!("Failed to create Parquet writer: {e}")))?;
    writer
        .write(&batch)
        .map_err(|e| SinkError::Columnar(format!("Failed to write record batch: {e}")))?;
    writer
        .close()
        .map_err(|e| SinkError::Columnar(format!("Failed to finish Parquet file: {e}")))?;

    Ok(buffer)
}

/// Replace every empty object, at any depth, with null
fn null_empty_objects(value: &mut Value) {
    match value {
        Value::Object(map) => map.values_mut().for_each(null_empty_objects),
        Value::Array(items) => items.iter_mut().for_each(null_empty_objects),
        _ => {}
    }
    if matches!(value, Value::Object(map) if map.is_empty()) {
        *value = Value::Null;
    }
}
