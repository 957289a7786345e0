use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info_span, warn, Instrument};

use super::definition::{FailurePolicy, FlowSpec};
use super::invoker::{GenerationInvoker, GenerationRequest, GenerationResult};
use crate::error::{FlowError, Result};
use crate::llm::DynLlmClient;
use crate::schema;
use crate::tools::{ToolExecution, ToolRegistry};

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 3;

/// Per-invocation state machine, emitted as debug events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowStage {
    Validating,
    Rendering,
    Generating,
    ToolExecuting,
    Resolving,
    PostProcessing,
    Done,
    Failed,
}

fn enter(stage: FlowStage) {
    debug!(stage = ?stage, "flow stage");
}

/// Runs flows. Holds no per-invocation state, so one instance serves any
/// number of concurrent calls.
pub struct FlowOrchestrator {
    invoker: GenerationInvoker,
    max_tool_rounds: usize,
    temperature: f32,
}

impl FlowOrchestrator {
    pub fn new(client: DynLlmClient, tools: Arc<ToolRegistry>) -> Self {
        Self {
            invoker: GenerationInvoker::new(client, tools),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            temperature: 0.2,
        }
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        self.invoker.tools()
    }

    pub async fn execute<F: FlowSpec>(&self, flow: &F, input: F::Input) -> Result<F::Output> {
        let definition = flow.definition();
        let span = info_span!("flow", name = definition.name);
        async move {
            enter(FlowStage::Validating);
            let input_value = serde_json::to_value(&input)?;
            if let Err(err) = schema::validate(&definition.input_schema, &input_value) {
                enter(FlowStage::Failed);
                return Err(err.into());
            }

            match self.run(flow, &input, &input_value).await {
                Ok(mut output) => {
                    enter(FlowStage::PostProcessing);
                    flow.post_process(&mut output);
                    enter(FlowStage::Done);
                    Ok(output)
                }
                Err(err) => {
                    enter(FlowStage::Failed);
                    apply_policy(flow, &input, err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run<F: FlowSpec>(
        &self,
        flow: &F,
        input: &F::Input,
        input_value: &Value,
    ) -> Result<F::Output> {
        let definition = flow.definition();

        enter(FlowStage::Rendering);
        debug!(template = definition.prompt.name(), "rendering prompt");
        let prompt = definition.prompt.render(input_value)?;
        let tools = self.invoker.tools().descriptors(&definition.tools)?;
        let mut request = GenerationRequest::new(prompt, definition.output_schema.clone())
            .with_tools(tools);
        request.temperature = self.temperature;

        let mut executions: Vec<ToolExecution> = Vec::new();
        let mut raw_output = None;
        let mut answered = false;

        for round in 0..self.max_tool_rounds {
            enter(FlowStage::Generating);
            match self.invoker.invoke(&request, &executions, true).await? {
                GenerationResult::Output(output) => {
                    raw_output = output;
                    answered = true;
                    break;
                }
                GenerationResult::ToolCalls(new_executions) => {
                    enter(FlowStage::ToolExecuting);
                    debug!(round, calls = new_executions.len(), "tools executed");
                    executions.extend(new_executions);
                    if let Some(output) = flow.short_circuit(input, &executions) {
                        debug!("short-circuited from tool output");
                        return Ok(output);
                    }
                }
            }
        }

        if !answered {
            enter(FlowStage::Generating);
            if let GenerationResult::Output(output) =
                self.invoker.invoke(&request, &executions, false).await?
            {
                raw_output = output;
            }
        }

        enter(FlowStage::Resolving);
        let decoded = match raw_output {
            Some(value) => Some(decode_output::<F>(flow, value)?),
            None => None,
        };
        match flow.resolve(input, decoded, &executions) {
            Some(output) => Ok(output),
            None => flow.on_missing_output(input),
        }
    }
}

fn decode_output<F: FlowSpec>(flow: &F, mut value: Value) -> Result<F::Output> {
    let output_schema = &flow.definition().output_schema;
    schema::strip_undeclared(output_schema, &mut value);
    schema::validate(output_schema, &value)?;
    Ok(serde_json::from_value(value)?)
}

fn apply_policy<F: FlowSpec>(flow: &F, input: &F::Input, err: FlowError) -> Result<F::Output> {
    let definition = flow.definition();
    match &definition.policy {
        FailurePolicy::Raise { message } => {
            error!(flow = definition.name, error = %err, "flow failed");
            Err(FlowError::failed(definition.name, *message))
        }
        FailurePolicy::Degrade => {
            error!(flow = definition.name, error = %err, "flow degraded");
            match flow.degraded_output(input) {
                Some(output) => Ok(output),
                None => {
                    warn!(flow = definition.name, "no degraded output available");
                    Err(FlowError::failed(
                        definition.name,
                        crate::error::GENERIC_CALLER_MESSAGE,
                    ))
                }
            }
        }
        FailurePolicy::Propagate => Err(err),
    }
}
