use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FlowError, Result};
use crate::schema::Schema;
use crate::tools::{ToolDescriptor, ToolExecution};

/// Inline media attached to a prompt, usually a base64 data URI.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl MediaRef {
    /// Accepts `data:<mime>;base64,<payload>` URIs and plain http(s) URLs.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if let Some(rest) = url.strip_prefix("data:") {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| FlowError::Config("data URI is missing its payload".into()))?;
            let content_type = header
                .strip_suffix(";base64")
                .ok_or_else(|| FlowError::Config("data URI must be base64 encoded".into()))?;
            if content_type.is_empty() {
                return Err(FlowError::Config("data URI must include a MIME type".into()));
            }
            base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|e| FlowError::Config(format!("invalid base64 payload: {e}")))?;
            return Ok(Self {
                url: url.to_string(),
                content_type: Some(content_type.to_string()),
            });
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(Self {
                url: url.to_string(),
                content_type: None,
            });
        }
        Err(FlowError::Config(
            "media reference must be a data URI or an http(s) URL".into(),
        ))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmRequest {
    #[serde(default)]
    pub system: Option<String>,
    pub prompt: String,
    #[serde(default)]
    pub media: Vec<MediaRef>,
    /// Shape the structured reply must conform to.
    #[serde(default)]
    pub output_schema: Option<Schema>,
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
    /// Results of earlier tool calls, replayed so the model can use them.
    #[serde(default)]
    pub tool_results: Vec<ToolExecution>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub metadata: Option<Value>,
}

fn default_temperature() -> f32 {
    0.2
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            media: Vec::new(),
            output_schema: None,
            tools: Vec::new(),
            tool_results: Vec::new(),
            temperature: default_temperature(),
            metadata: None,
        }
    }

    pub fn with_output_schema(mut self, schema: Schema) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn with_media(mut self, media: Vec<MediaRef>) -> Self {
        self.media = media;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Structured reply. `None` when the model produced nothing usable.
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl LlmResponse {
    pub fn output(value: Value) -> Self {
        Self {
            output: Some(value),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tool_call(name: impl Into<String>, arguments: Value) -> Self {
        let name = name.into();
        Self {
            tool_calls: vec![ToolCall {
                id: format!("call-{name}"),
                name,
                arguments,
            }],
            ..Self::default()
        }
    }

    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
