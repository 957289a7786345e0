use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::Schema;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolManifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input: Schema,
    pub output: Schema,
}

impl ToolManifest {
    pub fn builder(name: impl Into<String>) -> ToolManifestBuilder {
        ToolManifestBuilder::new(name)
    }

    /// What the model gets to see: name, description and parameter schema.
    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            parameters: self.input.to_json_schema(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Clone, Debug)]
pub struct ToolManifestBuilder {
    manifest: ToolManifest,
}

impl ToolManifestBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            manifest: ToolManifest {
                name: name.into(),
                description: None,
                input: Schema::object(),
                output: Schema::new(crate::schema::SchemaKind::Any),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.manifest.description = Some(description.into());
        self
    }

    pub fn input(mut self, schema: Schema) -> Self {
        self.manifest.input = schema;
        self
    }

    pub fn output(mut self, schema: Schema) -> Self {
        self.manifest.output = schema;
        self
    }

    pub fn build(self) -> ToolManifest {
        self.manifest
    }
}
