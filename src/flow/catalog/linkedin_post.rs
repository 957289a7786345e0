use serde::{Deserialize, Serialize};

use crate::flow::constants::failures;
use crate::flow::definition::{FailurePolicy, FlowDefinition, FlowSpec};
use crate::flow::markdown;
use crate::flow::template::PromptTemplate;
use crate::schema::Schema;

pub const NAME: &str = "generate_linkedin_post";

const PROMPT: PromptTemplate = PromptTemplate::new(
    "generateLinkedInPostPrompt",
    r#"You are an expert social media manager who crafts high-converting recruitment posts for LinkedIn.
Transform the job description below into a short, punchy and compelling LinkedIn post that makes top talent want to apply.

1. Hook: open with an attention-grabbing question or statement and an emoji.
2. Core message: 2-3 sentences on the role's impact and the most exciting part of the opportunity. No corporate jargon.
3. Call to action: end with an enthusiastic CTA that invites engagement (e.g. "Ready to build the future?").
4. Hashtags: 3-5 relevant, popular hashtags (e.g. #Hiring, #JobOpening).
5. Formatting: the output MUST use markdown (e.g. **bold**, bullet points).

Job Description:
```
{{ jobDescription }}
```"#,
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInPostInput {
    pub job_description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInPostOutput {
    #[serde(rename = "linkedInPost")]
    pub linkedin_post: String,
    #[serde(rename = "linkedInPostHtml", default)]
    pub linkedin_post_html: String,
}

pub struct LinkedInPostFlow {
    definition: FlowDefinition,
}

impl LinkedInPostFlow {
    pub fn new() -> Self {
        Self {
            definition: FlowDefinition {
                name: NAME,
                description: "Turns a job description into a LinkedIn recruitment post.",
                input_schema: Schema::object()
                    .field(
                        "jobDescription",
                        Schema::string().with_description("The full job description text."),
                    )
                    .with_name("LinkedInPostInput"),
                output_schema: Schema::object()
                    .field(
                        "linkedInPost",
                        Schema::string().with_description(
                            "An engaging LinkedIn post in markdown, with relevant hashtags.",
                        ),
                    )
                    .with_name("LinkedInPostOutput"),
                prompt: PROMPT,
                tools: Vec::new(),
                policy: FailurePolicy::Raise {
                    message: failures::LINKEDIN_POST,
                },
            },
        }
    }
}

impl Default for LinkedInPostFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowSpec for LinkedInPostFlow {
    type Input = LinkedInPostInput;
    type Output = LinkedInPostOutput;

    fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    fn post_process(&self, output: &mut Self::Output) {
        output.linkedin_post_html = markdown::to_html(&output.linkedin_post);
    }
}
