use serde_json::Value;

use super::error::SchemaError;
use super::schema::{Schema, SchemaKind};

/// Validates `value` against `schema`. Nothing is coerced: the value is
/// either accepted as-is or rejected with the path of the offending field.
pub fn validate(schema: &Schema, value: &Value) -> std::result::Result<(), SchemaError> {
    validate_value(schema, value, &mut Vec::new())
}

pub fn validate_value(
    schema: &Schema,
    value: &Value,
    path: &mut Vec<String>,
) -> std::result::Result<(), SchemaError> {
    match &schema.kind {
        SchemaKind::Null => {
            if !value.is_null() {
                return Err(SchemaError::at(path, expected("null", value)));
            }
        }
        SchemaKind::Boolean => {
            if !value.is_boolean() {
                return Err(SchemaError::at(path, expected("boolean", value)));
            }
        }
        SchemaKind::Integer => {
            if !(value.is_i64() || value.is_u64()) {
                return Err(SchemaError::at(path, expected("integer", value)));
            }
        }
        SchemaKind::Number => {
            if !value.is_number() {
                return Err(SchemaError::at(path, expected("number", value)));
            }
        }
        SchemaKind::String => {
            if !value.is_string() {
                return Err(SchemaError::at(path, expected("string", value)));
            }
        }
        SchemaKind::Enum { values } => {
            let Some(text) = value.as_str() else {
                return Err(SchemaError::at(path, expected("string", value)));
            };
            if !values.iter().any(|allowed| allowed == text) {
                return Err(SchemaError::at(
                    path,
                    format!("expected one of [{}], found `{}`", values.join(", "), text),
                ));
            }
        }
        SchemaKind::Array { items } => {
            let Some(array) = value.as_array() else {
                return Err(SchemaError::at(path, expected("array", value)));
            };
            for (idx, element) in array.iter().enumerate() {
                path.push(idx.to_string());
                validate_value(items, element, path)?;
                path.pop();
            }
        }
        SchemaKind::Object {
            properties,
            required,
            additional,
        } => {
            let object = value
                .as_object()
                .ok_or_else(|| SchemaError::at(path, expected("object", value)))?;

            for key in required {
                let present = object.get(key).map(|v| !v.is_null()).unwrap_or(false);
                if !present {
                    let mut required_path = path.clone();
                    required_path.push(key.clone());
                    return Err(SchemaError::at(
                        &required_path,
                        format!("missing required property `{}`", key),
                    ));
                }
            }

            for (key, val) in object {
                if let Some(sub_schema) = properties.get(key) {
                    // optional properties may be sent as explicit nulls
                    if val.is_null() && !required.contains(key) {
                        continue;
                    }
                    path.push(key.clone());
                    validate_value(sub_schema, val, path)?;
                    path.pop();
                } else if !additional {
                    let mut extra_path = path.clone();
                    extra_path.push(key.clone());
                    return Err(SchemaError::at(
                        &extra_path,
                        format!("unexpected property `{}`", key),
                    ));
                }
            }
        }
        SchemaKind::Any => {}
    }

    Ok(())
}

/// Drops properties a closed object schema does not declare, at any depth.
/// Applied to model output only; caller input stays strict.
pub fn strip_undeclared(schema: &Schema, value: &mut Value) {
    match (&schema.kind, value) {
        (
            SchemaKind::Object {
                properties,
                additional,
                ..
            },
            Value::Object(object),
        ) => {
            if !additional {
                object.retain(|key, _| properties.contains_key(key));
            }
            for (key, val) in object.iter_mut() {
                if let Some(sub_schema) = properties.get(key) {
                    strip_undeclared(sub_schema, val);
                }
            }
        }
        (SchemaKind::Array { items }, Value::Array(array)) => {
            for element in array {
                strip_undeclared(items, element);
            }
        }
        _ => {}
    }
}

fn expected(type_name: &str, found: &Value) -> String {
    format!("expected {}, found {}", type_name, json_type(found))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
