use serde::{Deserialize, Serialize};

use crate::flow::definition::{FailurePolicy, FlowDefinition, FlowSpec};
use crate::flow::markdown;
use crate::flow::template::PromptTemplate;
use crate::schema::Schema;
use crate::tools::WEB_SEARCH_TOOL;

pub const NAME: &str = "find_profiles";

const PROMPT: PromptTemplate = PromptTemplate::new(
    "findProfilesPrompt",
    r#"You are an expert talent sourcer. Analyze the job description and find real, potential candidates on the web who match the role.

1. Read the job description to understand the ideal candidate's skills and experience.
2. Identify the role title and key skills.
3. Call 'searchWebForExperts' with a query like "Top [Role Title] profiles on LinkedIn with [Skill 1] and [Skill 2]". Prioritize LinkedIn profiles.
4. Extract real information only: the professionals' actual names and the direct URLs of their profiles. Never invent names or links. Include the thumbnail URL when one is provided.
5. For each candidate give the name, profile link, thumbnail if present, and a concise summary of why they fit. If you find at least 2-3 plausible candidates, return them even if the match is not perfect.

Job Description:
```
{{ jobDescription }}
```"#,
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FindProfilesInput {
    pub job_description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CandidateProfile {
    pub name: String,
    pub link: String,
    /// Rendered to HTML before it is returned.
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FindProfilesOutput {
    pub suggested_candidates: Vec<CandidateProfile>,
}

pub struct CandidateFinderFlow {
    definition: FlowDefinition,
}

impl CandidateFinderFlow {
    pub fn new() -> Self {
        let candidate = Schema::object()
            .field(
                "name",
                Schema::string().with_description("The professional's real full name."),
            )
            .field(
                "link",
                Schema::string().with_description("Direct URL to the professional's profile."),
            )
            .field(
                "summary",
                Schema::string()
                    .with_description("One or two sentences on why this professional is a match."),
            )
            .optional(
                "thumbnail",
                Schema::string().with_description("Profile picture URL, if available."),
            );
        Self {
            definition: FlowDefinition {
                name: NAME,
                description: "Sources real candidate profiles from the web for a job description.",
                input_schema: Schema::object()
                    .field(
                        "jobDescription",
                        Schema::string().with_description("The full job description text."),
                    )
                    .with_name("FindProfilesInput"),
                output_schema: Schema::object()
                    .field(
                        "suggestedCandidates",
                        Schema::array(candidate)
                            .with_description("Professionals found through the web search."),
                    )
                    .with_name("FindProfilesOutput"),
                prompt: PROMPT,
                tools: vec![WEB_SEARCH_TOOL],
                policy: FailurePolicy::Degrade,
            },
        }
    }
}

impl Default for CandidateFinderFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowSpec for CandidateFinderFlow {
    type Input = FindProfilesInput;
    type Output = FindProfilesOutput;

    fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    fn degraded_output(&self, _input: &FindProfilesInput) -> Option<FindProfilesOutput> {
        Some(FindProfilesOutput::default())
    }

    fn post_process(&self, output: &mut Self::Output) {
        for candidate in &mut output.suggested_candidates {
            candidate.summary = markdown::to_html(&candidate.summary);
        }
    }
}
