use serde::{Deserialize, Serialize};

use crate::error::GENERIC_CALLER_MESSAGE;
use crate::flow::definition::{FailurePolicy, FlowDefinition, FlowSpec};
use crate::flow::template::PromptTemplate;
use crate::schema::Schema;

pub const NAME: &str = "describe_image";

const PROMPT: PromptTemplate = PromptTemplate::new(
    "describeImagePrompt",
    r#"You are an expert assistant with two skills: identifying problems shown in images and extracting text from images. Produce the most useful text for the user's "need" box based on the attached image.

1. Check whether the image mainly contains text (a document, a screenshot of notes, handwriting).
2. If it does, extract all of the text accurately. Output only the extracted text.
3. If it does not, describe the problem or need concisely, e.g. "Leaking pipe under the sink." or "A car with a flat tire." If no clear problem is shown, describe what you see.

Your response directly populates a text field, so return either the full extracted text or a concise description.

Image: (attached)"#,
)
.with_media(&["imageDataUri"]);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DescribeImageInput {
    pub image_data_uri: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DescribeImageOutput {
    pub description: String,
}

pub struct DescribeImageFlow {
    definition: FlowDefinition,
}

impl DescribeImageFlow {
    pub fn new() -> Self {
        Self {
            definition: FlowDefinition {
                name: NAME,
                description: "Describes the need shown in a photo, or extracts its text.",
                input_schema: Schema::object()
                    .field(
                        "imageDataUri",
                        Schema::string().with_description(
                            "Photo as a data URI: 'data:<mimetype>;base64,<encoded_data>'.",
                        ),
                    )
                    .with_name("DescribeImageInput"),
                output_schema: Schema::object()
                    .field(
                        "description",
                        Schema::string().with_description(
                            "Description of the need shown in the image, or its extracted text.",
                        ),
                    )
                    .with_name("DescribeImageOutput"),
                prompt: PROMPT,
                tools: Vec::new(),
                policy: FailurePolicy::Raise {
                    message: GENERIC_CALLER_MESSAGE,
                },
            },
        }
    }
}

impl Default for DescribeImageFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowSpec for DescribeImageFlow {
    type Input = DescribeImageInput;
    type Output = DescribeImageOutput;

    fn definition(&self) -> &FlowDefinition {
        &self.definition
    }
}
