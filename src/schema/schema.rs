use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SchemaKind {
    #[serde(rename = "null")]
    Null,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "string")]
    String,
    /// A string restricted to a fixed set of values.
    #[serde(rename = "enum")]
    Enum { values: Vec<String> },
    #[serde(rename = "array")]
    Array { items: Box<Schema> },
    #[serde(rename = "object")]
    Object {
        properties: HashMap<String, Schema>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        required: Vec<String>,
        #[serde(default = "Schema::allow_additional")]
        additional: bool,
    },
    #[serde(rename = "any")]
    Any,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: SchemaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Schema {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            name: None,
            kind,
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String)
    }

    pub fn number() -> Self {
        Self::new(SchemaKind::Number)
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SchemaKind::Enum {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn array(items: Schema) -> Self {
        Self::new(SchemaKind::Array {
            items: Box::new(items),
        })
    }

    /// An empty object that accepts no properties beyond the ones added
    /// with [`Schema::field`] and [`Schema::optional`].
    pub fn object() -> Self {
        Self::new(SchemaKind::Object {
            properties: HashMap::new(),
            required: Vec::new(),
            additional: false,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a required property. No-op on non-object schemas.
    pub fn field(self, name: impl Into<String>, schema: Schema) -> Self {
        self.property(name.into(), schema, true)
    }

    /// Adds an optional property. No-op on non-object schemas.
    pub fn optional(self, name: impl Into<String>, schema: Schema) -> Self {
        self.property(name.into(), schema, false)
    }

    fn property(mut self, name: String, schema: Schema, is_required: bool) -> Self {
        if let SchemaKind::Object {
            properties,
            required,
            ..
        } = &mut self.kind
        {
            if is_required && !required.contains(&name) {
                required.push(name.clone());
            }
            properties.insert(name, schema);
        }
        self
    }

    /// Renders the schema as standard JSON Schema, the form model providers
    /// accept for tool parameters and structured responses.
    pub fn to_json_schema(&self) -> Value {
        let mut out = match &self.kind {
            SchemaKind::Null => json!({ "type": "null" }),
            SchemaKind::Boolean => json!({ "type": "boolean" }),
            SchemaKind::Integer => json!({ "type": "integer" }),
            SchemaKind::Number => json!({ "type": "number" }),
            SchemaKind::String => json!({ "type": "string" }),
            SchemaKind::Enum { values } => json!({ "type": "string", "enum": values }),
            SchemaKind::Array { items } => json!({
                "type": "array",
                "items": items.to_json_schema(),
            }),
            SchemaKind::Object {
                properties,
                required,
                additional,
            } => {
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(key, schema)| (key.clone(), schema.to_json_schema()))
                    .collect();
                let mut required = required.clone();
                required.sort();
                json!({
                    "type": "object",
                    "properties": props,
                    "required": required,
                    "additionalProperties": additional,
                })
            }
            SchemaKind::Any => json!({}),
        };
        if let (Some(description), Some(obj)) = (&self.description, out.as_object_mut()) {
            obj.insert("description".to_string(), json!(description));
        }
        out
    }

    pub(crate) fn allow_additional() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_builder_tracks_required_fields() {
        let schema = Schema::object()
            .field("name", Schema::string())
            .optional("age", Schema::number());
        match &schema.kind {
            SchemaKind::Object {
                properties,
                required,
                additional,
            } => {
                assert_eq!(properties.len(), 2);
                assert_eq!(required, &vec!["name".to_string()]);
                assert!(!additional);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn json_schema_export_carries_descriptions_and_enums() {
        let schema = Schema::object()
            .field(
                "role",
                Schema::one_of(["user", "assistant"]).with_description("speaker"),
            )
            .with_description("turn");
        let exported = schema.to_json_schema();
        assert_eq!(exported["description"], "turn");
        assert_eq!(exported["properties"]["role"]["enum"][1], "assistant");
        assert_eq!(exported["properties"]["role"]["description"], "speaker");
        assert_eq!(exported["required"][0], "role");
        assert_eq!(exported["additionalProperties"], false);
    }
}
