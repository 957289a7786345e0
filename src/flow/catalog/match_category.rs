use serde::{Deserialize, Serialize};

use crate::error::GENERIC_CALLER_MESSAGE;
use crate::flow::definition::{FailurePolicy, FlowDefinition, FlowSpec};
use crate::flow::template::PromptTemplate;
use crate::schema::Schema;
use crate::tools::ToolExecution;

pub const NAME: &str = "match_category";

const PROMPT: PromptTemplate = PromptTemplate::new(
    "matchCategoryPrompt",
    r#"You match a user's request to a predefined list of service categories.
Analyze the query and select the most relevant category from the list. The query may be a synonym, a broader term, or a specific example of a service.
If the query is "healthcare" and the categories include "Doctor" and "Plumber", match "Doctor".
If the query is "fix a leaky pipe", match "Plumbing".
Return only the single best matching category, spelled exactly as listed. If no category is a reasonably close match, return an empty string for matchedCategory.

User Query: "{{ userQuery }}"

Available Categories:
{% for category in availableCategories %}
- {{ category }}
{% endfor %}"#,
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchCategoryInput {
    pub user_query: String,
    pub available_categories: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchCategoryOutput {
    /// One of the available categories, or `""` for no match.
    pub matched_category: String,
}

impl MatchCategoryOutput {
    pub fn is_match(&self) -> bool {
        !self.matched_category.is_empty()
    }
}

pub struct MatchCategoryFlow {
    definition: FlowDefinition,
}

impl MatchCategoryFlow {
    pub fn new() -> Self {
        Self {
            definition: FlowDefinition {
                name: NAME,
                description: "Maps a free-text query onto one of a fixed set of categories.",
                input_schema: Schema::object()
                    .field(
                        "userQuery",
                        Schema::string().with_description("The user's search query for a service."),
                    )
                    .field(
                        "availableCategories",
                        Schema::array(Schema::string())
                            .with_description("The service categories to choose from."),
                    )
                    .with_name("MatchCategoryInput"),
                output_schema: Schema::object()
                    .field(
                        "matchedCategory",
                        Schema::string().with_description(
                            "The single best matching category from the list, or an empty string.",
                        ),
                    )
                    .with_name("MatchCategoryOutput"),
                prompt: PROMPT,
                tools: Vec::new(),
                policy: FailurePolicy::Raise {
                    message: GENERIC_CALLER_MESSAGE,
                },
            },
        }
    }
}

impl Default for MatchCategoryFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// Snaps a model answer onto the listed spelling. Answers outside the
/// list become the no-match sentinel.
fn canonical_category(answer: &str, available: &[String]) -> String {
    let answer = answer.trim();
    if answer.is_empty() {
        return String::new();
    }
    available
        .iter()
        .find(|category| category.as_str() == answer)
        .or_else(|| {
            available
                .iter()
                .find(|category| category.trim().eq_ignore_ascii_case(answer))
        })
        .cloned()
        .unwrap_or_default()
}

impl FlowSpec for MatchCategoryFlow {
    type Input = MatchCategoryInput;
    type Output = MatchCategoryOutput;

    fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    fn resolve(
        &self,
        input: &MatchCategoryInput,
        output: Option<MatchCategoryOutput>,
        _executions: &[ToolExecution],
    ) -> Option<MatchCategoryOutput> {
        output.map(|output| MatchCategoryOutput {
            matched_category: canonical_category(
                &output.matched_category,
                &input.available_categories,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<String> {
        vec!["Plumbing".into(), "Tech Help".into()]
    }

    #[test]
    fn canonicalizes_case_and_whitespace() {
        assert_eq!(canonical_category(" tech help ", &categories()), "Tech Help");
        assert_eq!(canonical_category("Plumbing", &categories()), "Plumbing");
    }

    #[test]
    fn unknown_answers_become_no_match() {
        assert_eq!(canonical_category("Basket Weaving", &categories()), "");
        assert_eq!(canonical_category("  ", &categories()), "");
    }
}
