//! Conversion between [`DataModel`] and plain JSON values.

use serde_json::{Map, Number, Value};

use crate::types::{DataModel, MapEntry};

/// Convert an arbitrary JSON value into a tree value.
///
/// Integers that fit `i64` become [`DataModel::Integer`], every other number
/// becomes [`DataModel::Float`]. Object members keep their order.
///
/// Unsigned integers above `i64::MAX` therefore lose precision and export
/// as floats: `18446744073709551615` comes back as `1.8446744073709552e19`.
/// JSON documents whose integers fit `i64` round-trip exactly.
pub fn unknown_to_data_model(value: &Value) -> DataModel {
    match value {
        Value::Null => DataModel::Null,
        Value::Bool(b) => DataModel::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => DataModel::Integer(i),
            None => n.as_f64().map_or(DataModel::Null, DataModel::Float),
        },
        Value::String(s) => DataModel::String(s.clone()),
        Value::Array(items) => DataModel::list(items.iter().map(unknown_to_data_model)),
        Value::Object(members) => DataModel::map_from_entries(
            members
                .iter()
                .map(|(key, value)| MapEntry::keyed(key.clone(), unknown_to_data_model(value))),
        ),
    }
}

/// Convert a tree value into JSON.
///
/// Maps export their logical view: unkeyed entries and later duplicates of a
/// key are dropped. Non-finite floats become `null`.
pub fn data_model_to_json(model: &DataModel) -> Value {
    match model {
        DataModel::Null => Value::Null,
        DataModel::Integer(n) => Value::Number((*n).into()),
        DataModel::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        DataModel::Boolean(b) => Value::Bool(*b),
        DataModel::String(s) => Value::String(s.clone()),
        DataModel::List(list) => Value::Array(list.iter().map(data_model_to_json).collect()),
        DataModel::Map(map) => {
            let mut members = Map::with_capacity(map.len());
            for (key, value) in map.logical_entries() {
                members.insert(key.to_string(), data_model_to_json(value));
            }
            Value::Object(members)
        }
    }
}
