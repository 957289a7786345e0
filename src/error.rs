use thiserror::Error;

use crate::schema::SchemaError;

pub type Result<T> = std::result::Result<T, FlowError>;

/// Shown to callers whenever the underlying failure must not leak.
pub const GENERIC_CALLER_MESSAGE: &str =
    "The AI service is currently unavailable or encountered an error. Please try again later.";

#[derive(Debug, Error)]
pub enum FlowError {
    /// Caller-safe failure raised at the flow boundary.
    #[error("{message}")]
    Failed { flow: String, message: String },
    #[error(transparent)]
    Validation(#[from] SchemaError),
    #[error("tool `{0}` not registered")]
    ToolNotRegistered(String),
    #[error("flow `{0}` not registered")]
    FlowNotRegistered(String),
    #[error("{kind} manifest does not match `{name}`")]
    ManifestMismatch { kind: &'static str, name: String },
    #[error("flow `{0}` produced no output")]
    EmptyGeneration(String),
    #[error("generation error: {0}")]
    Generation(String),
    #[error("directory error: {0}")]
    Directory(String),
    #[error("template error: {0}")]
    Template(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlowError {
    pub fn failed(flow: impl Into<String>, message: impl Into<String>) -> Self {
        FlowError::Failed {
            flow: flow.into(),
            message: message.into(),
        }
    }

    /// Message that can be shown to an end user without exposing internals.
    pub fn caller_message(&self) -> String {
        match self {
            FlowError::Failed { message, .. } => message.clone(),
            FlowError::Validation(err) => err.to_string(),
            _ => GENERIC_CALLER_MESSAGE.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FlowError::Validation(_))
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(error: serde_json::Error) -> Self {
        FlowError::Serialization(error.to_string())
    }
}

impl From<minijinja::Error> for FlowError {
    fn from(error: minijinja::Error) -> Self {
        FlowError::Template(error.to_string())
    }
}
