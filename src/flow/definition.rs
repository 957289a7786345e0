use serde::{de::DeserializeOwned, Serialize};

use super::template::PromptTemplate;
use crate::error::{FlowError, Result};
use crate::schema::Schema;
use crate::tools::ToolExecution;

/// What the orchestrator does with a failure after input validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the detail and return a caller-safe `FlowError::Failed`.
    Raise { message: &'static str },
    /// Log the detail and return the flow's degraded output.
    Degrade,
    /// Return the error unmodified.
    Propagate,
}

impl FailurePolicy {
    pub fn label(&self) -> &'static str {
        match self {
            FailurePolicy::Raise { .. } => "raise",
            FailurePolicy::Degrade => "degrade",
            FailurePolicy::Propagate => "propagate",
        }
    }
}

/// Immutable description of a flow, built once when the flow is created.
#[derive(Clone, Debug)]
pub struct FlowDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Schema,
    pub output_schema: Schema,
    pub prompt: PromptTemplate,
    /// Tool names offered to the model, in order.
    pub tools: Vec<&'static str>,
    pub policy: FailurePolicy,
}

/// A named, typed generation operation.
///
/// The hooks are called by the orchestrator in this order: `short_circuit`
/// after every round that executed tools, then `resolve` once generation
/// ends, then `on_missing_output` if nothing was resolved, and finally
/// `post_process` on the value returned to the caller.
pub trait FlowSpec: Send + Sync {
    type Input: Serialize + Send + Sync;
    type Output: Serialize + DeserializeOwned + Send;

    fn definition(&self) -> &FlowDefinition;

    /// Builds the final output straight from tool results, skipping any
    /// further model rounds.
    fn short_circuit(
        &self,
        _input: &Self::Input,
        _executions: &[ToolExecution],
    ) -> Option<Self::Output> {
        None
    }

    fn resolve(
        &self,
        _input: &Self::Input,
        output: Option<Self::Output>,
        _executions: &[ToolExecution],
    ) -> Option<Self::Output> {
        output
    }

    fn on_missing_output(&self, _input: &Self::Input) -> Result<Self::Output> {
        Err(FlowError::EmptyGeneration(self.definition().name.to_string()))
    }

    /// Output returned under [`FailurePolicy::Degrade`].
    fn degraded_output(&self, _input: &Self::Input) -> Option<Self::Output> {
        None
    }

    fn post_process(&self, _output: &mut Self::Output) {}
}
