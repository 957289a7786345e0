use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::debug;

use super::template::RenderedPrompt;
use crate::error::{FlowError, Result};
use crate::llm::{DynLlmClient, LlmRequest};
use crate::schema::Schema;
use crate::tools::{ToolDescriptor, ToolExecution, ToolInvocation, ToolRegistry};

/// Everything one generation round needs.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub prompt: RenderedPrompt,
    pub output_schema: Schema,
    pub tools: Vec<ToolDescriptor>,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(prompt: RenderedPrompt, output_schema: Schema) -> Self {
        Self {
            prompt,
            output_schema,
            tools: Vec::new(),
            temperature: 0.2,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = tools;
        self
    }

    fn to_llm_request(&self, tool_results: &[ToolExecution], offer_tools: bool) -> LlmRequest {
        let mut request = LlmRequest::new(self.prompt.text.clone())
            .with_media(self.prompt.media.clone())
            .with_output_schema(self.output_schema.clone())
            .with_temperature(self.temperature);
        if offer_tools {
            request.tools = self.tools.clone();
        }
        request.tool_results = tool_results.to_vec();
        request
    }
}

/// Result of one round: either the model answered, or it asked for tools
/// which have now been executed.
#[derive(Clone, Debug)]
pub enum GenerationResult {
    Output(Option<Value>),
    ToolCalls(Vec<ToolExecution>),
}

pub struct GenerationInvoker {
    client: DynLlmClient,
    tools: Arc<ToolRegistry>,
}

impl GenerationInvoker {
    pub fn new(client: DynLlmClient, tools: Arc<ToolRegistry>) -> Self {
        Self { client, tools }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Calls the model once. `previous` carries tool results from earlier
    /// rounds. With `offer_tools == false` the model is not given any tool
    /// descriptors and any tool request it still makes is ignored.
    pub async fn invoke(
        &self,
        request: &GenerationRequest,
        previous: &[ToolExecution],
        offer_tools: bool,
    ) -> Result<GenerationResult> {
        let offer_tools = offer_tools && !request.tools.is_empty();
        let response = self
            .client
            .complete(request.to_llm_request(previous, offer_tools))
            .await?;

        if !offer_tools || response.tool_calls.is_empty() {
            return Ok(GenerationResult::Output(response.output));
        }

        let allowed: HashSet<&str> = request.tools.iter().map(|t| t.name.as_str()).collect();
        if let Some(call) = response
            .tool_calls
            .iter()
            .find(|call| !allowed.contains(call.name.as_str()))
        {
            return Err(FlowError::ToolNotRegistered(call.name.clone()));
        }

        debug!(
            tools = ?response.tool_calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "model requested tools"
        );
        let executions = join_all(response.tool_calls.into_iter().map(|call| {
            self.tools
                .execute(ToolInvocation::new(call.id, call.name, call.arguments))
        }))
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

        Ok(GenerationResult::ToolCalls(executions))
    }
}
