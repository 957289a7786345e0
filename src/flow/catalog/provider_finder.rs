use serde::{Deserialize, Serialize};

use super::directory_matches;
use crate::directory::DirectoryEntry;
use crate::error::Result;
use crate::flow::constants::provider_finder;
use crate::flow::definition::{FailurePolicy, FlowDefinition, FlowSpec};
use crate::flow::template::PromptTemplate;
use crate::schema::Schema;
use crate::tools::{ToolExecution, DIRECTORY_LOOKUP_TOOL};

pub const NAME: &str = "find_providers_in_conversation";

const PROMPT: PromptTemplate = PromptTemplate::new(
    "findProvidersInConversationPrompt",
    r#"You are an assistant helping a user find a service provider. Understand their need and use the 'findProvidersForProject' tool to check whether any professionals in our network can help.

1. The user's need: "{{ need }}"
2. Identify the single most relevant service category. "my sink is clogged" is "Plumbing"; "I need to build a website" might be "Web Developer".
3. Call 'findProvidersForProject' with that category.
4. Respond:
   - if the tool returns providers: "I found a few professionals who might be able to help with that. Here are their details:"
   - if it returns an empty list: "I'm sorry, I couldn't find any available providers for that category right now. You could try rephrasing your need or creating a job post to find individual candidates.""#,
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProviderSearchInput {
    pub need: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSearchOutput {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_providers: Option<Vec<DirectoryEntry>>,
}

pub struct ProviderFinderFlow {
    definition: FlowDefinition,
}

impl ProviderFinderFlow {
    pub fn new() -> Self {
        Self {
            definition: FlowDefinition {
                name: NAME,
                description: "Finds directory providers for a need stated in conversation.",
                input_schema: Schema::object()
                    .field(
                        "need",
                        Schema::string()
                            .with_description("What the user needs help with, in their own words."),
                    )
                    .with_name("ProviderSearchInput"),
                output_schema: super::reply_schema("ProviderSearchOutput"),
                prompt: PROMPT,
                tools: vec![DIRECTORY_LOOKUP_TOOL],
                // callers handle raw errors themselves
                policy: FailurePolicy::Propagate,
            },
        }
    }
}

impl Default for ProviderFinderFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowSpec for ProviderFinderFlow {
    type Input = ProviderSearchInput;
    type Output = ProviderSearchOutput;

    fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    fn short_circuit(
        &self,
        _input: &ProviderSearchInput,
        executions: &[ToolExecution],
    ) -> Option<ProviderSearchOutput> {
        let providers = directory_matches(executions)?;
        let response = if providers.is_empty() {
            provider_finder::NO_PROVIDERS
        } else {
            provider_finder::PROVIDERS_FOUND
        };
        Some(ProviderSearchOutput {
            response: response.to_string(),
            matched_providers: Some(providers),
        })
    }

    fn resolve(
        &self,
        _input: &ProviderSearchInput,
        output: Option<ProviderSearchOutput>,
        executions: &[ToolExecution],
    ) -> Option<ProviderSearchOutput> {
        output.map(|output| ProviderSearchOutput {
            response: output.response,
            matched_providers: Some(directory_matches(executions).unwrap_or_default()),
        })
    }

    /// A silent model is an answer here, not a failure.
    fn on_missing_output(&self, _input: &ProviderSearchInput) -> Result<ProviderSearchOutput> {
        Ok(ProviderSearchOutput {
            response: provider_finder::REPHRASE.to_string(),
            matched_providers: None,
        })
    }
}
