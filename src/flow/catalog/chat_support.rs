use serde::{Deserialize, Serialize};

use super::{directory_matches, ConversationTurn};
use crate::directory::DirectoryEntry;
use crate::flow::constants::chat;
use crate::flow::definition::{FailurePolicy, FlowDefinition, FlowSpec};
use crate::flow::template::PromptTemplate;
use crate::schema::Schema;
use crate::tools::{ToolExecution, DIRECTORY_LOOKUP_TOOL};

pub const NAME: &str = "chat";

const PROMPT: PromptTemplate = PromptTemplate::new(
    "chatPrompt",
    r#"You are "YOLO Needs AI", a friendly, knowledgeable and versatile assistant for an app called "YOLO Needs". Be as helpful as possible.

You can:
1. Hold a general conversation: answer questions, explain, advise or help with creative tasks.
2. Find service providers: if the user explicitly needs a professional (e.g. "my sink is leaking", "I need a mover"), make a best-effort guess of the category and call 'findProvidersForProject'.
3. Answer questions about how the "YOLO Needs" app works.

Unless the request clearly requires a service provider, answer directly.

Conversation so far:
{% for turn in history %}
{{ turn.role }}: {{ turn.content }}
{% endfor %}
user: {{ newMessage }}
assistant:"#,
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatInput {
    pub history: Vec<ConversationTurn>,
    pub new_message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatOutput {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_providers: Option<Vec<DirectoryEntry>>,
}

impl ChatOutput {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            matched_providers: None,
        }
    }
}

pub struct ChatSupportFlow {
    definition: FlowDefinition,
}

impl ChatSupportFlow {
    pub fn new() -> Self {
        Self {
            definition: FlowDefinition {
                name: NAME,
                description: "Conversational support that can look up providers mid-conversation.",
                input_schema: Schema::object()
                    .field(
                        "history",
                        Schema::array(ConversationTurn::schema())
                            .with_description("The conversation history."),
                    )
                    .field(
                        "newMessage",
                        Schema::string().with_description("The latest message from the user."),
                    )
                    .with_name("ChatInput"),
                output_schema: super::reply_schema("ChatOutput"),
                prompt: PROMPT,
                tools: vec![DIRECTORY_LOOKUP_TOOL],
                policy: FailurePolicy::Degrade,
            },
        }
    }
}

impl Default for ChatSupportFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowSpec for ChatSupportFlow {
    type Input = ChatInput;
    type Output = ChatOutput;

    fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    fn short_circuit(&self, _input: &ChatInput, executions: &[ToolExecution]) -> Option<ChatOutput> {
        let providers = directory_matches(executions)?;
        if providers.is_empty() {
            return Some(ChatOutput::text(chat::NO_PROVIDERS));
        }
        Some(ChatOutput {
            response: chat::PROVIDERS_FOUND.to_string(),
            matched_providers: Some(providers),
        })
    }

    /// Only the model's text is kept; provider lists come from the tool.
    fn resolve(
        &self,
        _input: &ChatInput,
        output: Option<ChatOutput>,
        _executions: &[ToolExecution],
    ) -> Option<ChatOutput> {
        output.map(|output| ChatOutput::text(output.response))
    }

    fn degraded_output(&self, _input: &ChatInput) -> Option<ChatOutput> {
        Some(ChatOutput::text(chat::DEGRADED))
    }
}
