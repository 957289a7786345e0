use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::manifest::ToolManifest;
use crate::error::{FlowError, Result};

/// A tool call requested by the model.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolInvocation {
    /// Provider-assigned call id, echoed back with the result.
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ToolInvocation {
    pub fn new<T: Into<String>>(id: T, name: T, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// A completed tool call: the model's arguments and the handler's output.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolExecution {
    pub id: String,
    pub name: String,
    pub input: Value,
    pub output: Value,
}

impl ToolExecution {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.output.clone()).map_err(|e| {
            FlowError::Serialization(format!("tool `{}` output: {}", self.name, e))
        })
    }
}

/// A schema-typed unit the model may call during generation.
///
/// Handlers turn expected failures into a structured fallback value.
/// An `Err` means something unexpected happened.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn manifest(&self) -> ToolManifest;
    async fn call(&self, invocation: ToolInvocation) -> Result<Value>;
}
