use crate::metrics::Fields;
use serde_json::{
    Map,
    Value,
};

/// Flatten a nested JSON object into `fields`, joining nested keys with `_`.
///
/// Numbers are stored as `f64`; nested objects are descended into with the
/// joined key as the new `prefix`. Strings, booleans, arrays and nulls are
/// dropped. When two paths produce the same key the later one overwrites the
/// earlier.
pub fn flatten(item: &Map<String, Value>, fields: &mut Fields, prefix: &str) {
    for (key, value) in item {
        let id = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}_{key}")
        };

        match value {
            Value::Number(number) => {
                if let Some(number) = number.as_f64() {
                    fields.insert(id, number);
                }
            }
            Value::Object(nested) => flatten(nested, fields, &id),
            Value::String(_) | Value::Bool(_) | Value::Array(_) | Value::Null => {}
        }
    }
}
