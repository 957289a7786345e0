use serde::{Deserialize, Serialize};

use crate::flow::constants::failures;
use crate::flow::definition::{FailurePolicy, FlowDefinition, FlowSpec};
use crate::flow::template::PromptTemplate;
use crate::schema::Schema;

pub const NAME: &str = "analyze_document_for_roles";

const PROMPT: PromptTemplate = PromptTemplate::new(
    "analyzeDocumentForRolesPrompt",
    r#"You are an expert project manager and technical recruiter. Read the project document below and identify the key professional roles required to complete the project.

Write a concise, single-line description of the roles needed. It will populate a search box, so keep it clear and direct.
For a web application: "Need a Frontend Developer, a Backend Developer, and a UI/UX Designer for a web app project."
For a marketing campaign: "Looking for a Social Media Manager and a Graphic Designer."

Project Document:
```
{{ documentText }}
```"#,
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRolesInput {
    pub document_text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRolesOutput {
    pub roles_description: String,
}

pub struct DocumentRolesFlow {
    definition: FlowDefinition,
}

impl DocumentRolesFlow {
    pub fn new() -> Self {
        Self {
            definition: FlowDefinition {
                name: NAME,
                description: "Summarizes the professional roles a project document calls for.",
                input_schema: Schema::object()
                    .field(
                        "documentText",
                        Schema::string()
                            .with_description("Text extracted from an uploaded project document."),
                    )
                    .with_name("DocumentRolesInput"),
                output_schema: Schema::object()
                    .field(
                        "rolesDescription",
                        Schema::string()
                            .with_description("Single-line summary of the roles the project needs."),
                    )
                    .with_name("DocumentRolesOutput"),
                prompt: PROMPT,
                tools: Vec::new(),
                policy: FailurePolicy::Raise {
                    message: failures::DOCUMENT_ROLES,
                },
            },
        }
    }
}

impl Default for DocumentRolesFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowSpec for DocumentRolesFlow {
    type Input = DocumentRolesInput;
    type Output = DocumentRolesOutput;

    fn definition(&self) -> &FlowDefinition {
        &self.definition
    }
}
