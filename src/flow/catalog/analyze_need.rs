use serde::{Deserialize, Serialize};

use crate::error::GENERIC_CALLER_MESSAGE;
use crate::flow::definition::{FailurePolicy, FlowDefinition, FlowSpec};
use crate::flow::markdown;
use crate::flow::template::PromptTemplate;
use crate::schema::Schema;
use crate::tools::{DIRECTORY_LOOKUP_TOOL, WEB_SEARCH_TOOL};

pub const NAME: &str = "analyze_need";

const PROMPT: PromptTemplate = PromptTemplate::new(
    "analyzeNeedPrompt",
    r#"You are "YOLO Needs AI", an expert consultant and universal problem-solver. Your goal is to analyze a user's need and provide a clear, structured, and actionable solution.

1. Understand the user's goal: read the description and analyze the photo, if one is attached.
2. Use your tools when they help:
   a. If a professional from our network could solve the problem (e.g. "my sink is leaking"), call 'findProvidersForProject' with the service category.
   b. If the problem needs external knowledge or research (e.g. "how do I plan a trip from Bengaluru to Bidar?"), call 'searchWebForExperts'.
3. Incorporate tool results: when a tool returns something you MUST use it. Mention matched providers. Summarize web answers and put their source links in 'additionalInfo'.
4. Fill in the output:
   - summary: a brief, high-level summary of the solution.
   - steps: a step-by-step plan with a 'title' and 'description' per step. Omit for simple answers.
   - additionalInfo: extra tips, context or warnings, in markdown. Include web search source links as "[Title](https://example.com)".

User need description: {{ description }}
{% if imageDataUri %}
Photo of the need: (attached)
{% endif %}"#,
)
.with_media(&["imageDataUri"]);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeNeedInput {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data_uri: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SolutionStep {
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeNeedOutput {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<SolutionStep>>,
    /// Rendered to HTML before it is returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

pub struct AnalyzeNeedFlow {
    definition: FlowDefinition,
}

impl AnalyzeNeedFlow {
    pub fn new() -> Self {
        let input_schema = Schema::object()
            .field(
                "description",
                Schema::string().with_description(
                    "The user's need, problem or question. May be empty when a photo is provided.",
                ),
            )
            .optional(
                "imageDataUri",
                Schema::string().with_description(
                    "Optional photo as a data URI: 'data:<mimetype>;base64,<encoded_data>'.",
                ),
            )
            .with_name("AnalyzeNeedInput");
        let output_schema = Schema::object()
            .field(
                "summary",
                Schema::string().with_description("A one or two-sentence summary of the solution."),
            )
            .optional(
                "steps",
                Schema::array(
                    Schema::object()
                        .field("title", Schema::string())
                        .field("description", Schema::string()),
                )
                .with_description("Actionable steps. Omitted for simple answers."),
            )
            .optional(
                "additionalInfo",
                Schema::string()
                    .with_description("Extra tips or warnings in markdown, including source links."),
            )
            .with_name("AnalyzeNeedOutput");

        Self {
            definition: FlowDefinition {
                name: NAME,
                description: "Turns a described need into a structured, actionable solution.",
                input_schema,
                output_schema,
                prompt: PROMPT,
                tools: vec![DIRECTORY_LOOKUP_TOOL, WEB_SEARCH_TOOL],
                policy: FailurePolicy::Raise {
                    message: GENERIC_CALLER_MESSAGE,
                },
            },
        }
    }
}

impl Default for AnalyzeNeedFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowSpec for AnalyzeNeedFlow {
    type Input = AnalyzeNeedInput;
    type Output = AnalyzeNeedOutput;

    fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    fn post_process(&self, output: &mut Self::Output) {
        if let Some(info) = output.additional_info.as_mut() {
            *info = markdown::to_html(info);
        }
    }
}
