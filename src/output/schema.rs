//! Table schema inference and JSON to Arrow conversion
//!
//! Records from different pages do not always share a field set, so the
//! table schema is the union of every key seen, in first-seen order, and
//! every column is nullable. Nested objects and arrays are kept as JSON
//! text so the table stays flat.

use crate::error::Result;
use crate::types::JsonValue;
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::collections::HashMap;
use std::sync::Arc;

/// Column used for records that are not JSON objects
pub const VALUE_COLUMN: &str = "value";

/// Infer a flat table schema from a set of JSON records
pub fn infer_table_schema(records: &[JsonValue]) -> Schema {
    let mut columns: Vec<(String, DataType)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut observe = |name: &str, value: &JsonValue| {
        let inferred = infer_type(value);
        match index.get(name) {
            Some(&i) => columns[i].1 = merge_types(&columns[i].1, &inferred),
            None => {
                index.insert(name.to_string(), columns.len());
                columns.push((name.to_string(), inferred));
            }
        }
    };

    for record in records {
        match record {
            JsonValue::Object(obj) => {
                for (key, value) in obj {
                    observe(key, value);
                }
            }
            other => observe(VALUE_COLUMN, other),
        }
    }

    if columns.is_empty() && !records.is_empty() {
        columns.push((VALUE_COLUMN.to_string(), DataType::Utf8));
    }

    let fields: Vec<Field> = columns
        .into_iter()
        .map(|(name, dtype)| {
            // All-null columns are written as empty text
            let dtype = if dtype == DataType::Null {
                DataType::Utf8
            } else {
                dtype
            };
            Field::new(name, dtype, true)
        })
        .collect();

    Schema::new(fields)
}

/// Convert JSON records to one Arrow RecordBatch, one row per record
pub fn records_to_batch(records: &[JsonValue], schema: &Schema) -> Result<RecordBatch> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let values: Vec<Option<&JsonValue>> = records
            .iter()
            .map(|record| cell(record, field.name()))
            .collect();
        columns.push(build_array(&values, field.data_type()));
    }

    let options = RecordBatchOptions::new().with_row_count(Some(records.len()));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(schema.clone()),
        columns,
        &options,
    )?)
}

/// Value of one cell, `None` when the record lacks the column
fn cell<'a>(record: &'a JsonValue, column: &str) -> Option<&'a JsonValue> {
    match record {
        JsonValue::Object(obj) => obj.get(column).filter(|v| !v.is_null()),
        JsonValue::Null => None,
        other if column == VALUE_COLUMN => Some(other),
        _ => None,
    }
}

/// Infer Arrow DataType from a JSON value
fn infer_type(value: &JsonValue) -> DataType {
    match value {
        JsonValue::Null => DataType::Null,
        JsonValue::Bool(_) => DataType::Boolean,
        JsonValue::Number(n) => {
            if n.is_i64() {
                DataType::Int64
            } else {
                DataType::Float64
            }
        }
        JsonValue::String(_) | JsonValue::Array(_) | JsonValue::Object(_) => DataType::Utf8,
    }
}

/// Merge two data types into a compatible type
fn merge_types(type1: &DataType, type2: &DataType) -> DataType {
    match (type1, type2) {
        (a, b) if a == b => a.clone(),

        // Null can merge with anything
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),

        // Numbers can merge (prefer Float64 for mixed)
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }

        // Different types -> fall back to String (most flexible)
        _ => DataType::Utf8,
    }
}

/// Build an Arrow array from JSON values
fn build_array(values: &[Option<&JsonValue>], data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(JsonValue::as_bool)).collect();
            Arc::new(arr)
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(JsonValue::as_i64)).collect();
            Arc::new(arr)
        }

        DataType::Float64 => {
            let arr: Float64Array = values.iter().map(|v| v.and_then(JsonValue::as_f64)).collect();
            Arc::new(arr)
        }

        _ => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.map(|v| match v {
                        JsonValue::String(s) => s.clone(),
                        _ => v.to_string(),
                    })
                })
                .collect();
            Arc::new(arr)
        }
    }
}
