use serde::{Deserialize, Serialize};

use crate::error::GENERIC_CALLER_MESSAGE;
use crate::flow::definition::{FailurePolicy, FlowDefinition, FlowSpec};
use crate::flow::markdown;
use crate::flow::template::PromptTemplate;
use crate::schema::Schema;

pub const NAME: &str = "hiring_assistant";

const PROMPT: PromptTemplate = PromptTemplate::new(
    "hiringAssistantPrompt",
    r#"You are an expert hiring assistant. Analyze the user's hiring need and write a professional job description.
Your output MUST use markdown (e.g. **bold headings**, bullet points).
Include sections for the Role Title, Responsibilities, and Required Skills.

User Need: {{ need }}"#,
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HiringAssistantInput {
    pub need: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HiringAssistantOutput {
    /// Markdown, kept verbatim because later flows take it as input.
    pub job_description: String,
    #[serde(default)]
    pub job_description_html: String,
}

pub struct HiringAssistantFlow {
    definition: FlowDefinition,
}

impl HiringAssistantFlow {
    pub fn new() -> Self {
        Self {
            definition: FlowDefinition {
                name: NAME,
                description: "Writes a markdown job description from a hiring need.",
                input_schema: Schema::object()
                    .field(
                        "need",
                        Schema::string().with_description(
                            "The hiring requirement, e.g. 'I want to hire an AI engineer for an app project'.",
                        ),
                    )
                    .with_name("HiringAssistantInput"),
                output_schema: Schema::object()
                    .field(
                        "jobDescription",
                        Schema::string().with_description(
                            "A markdown job description with Role, Responsibilities and Skills sections.",
                        ),
                    )
                    .with_name("HiringAssistantOutput"),
                prompt: PROMPT,
                tools: Vec::new(),
                policy: FailurePolicy::Raise {
                    message: GENERIC_CALLER_MESSAGE,
                },
            },
        }
    }
}

impl Default for HiringAssistantFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowSpec for HiringAssistantFlow {
    type Input = HiringAssistantInput;
    type Output = HiringAssistantOutput;

    fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    fn post_process(&self, output: &mut Self::Output) {
        output.job_description_html = markdown::to_html(&output.job_description);
    }
}
