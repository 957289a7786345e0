use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::manifest::ToolManifest;
use super::tool::{Tool, ToolInvocation};
use crate::error::Result;
use crate::flow::template::PromptTemplate;
use crate::llm::{DynLlmClient, LlmRequest};
use crate::schema::{self, Schema};

pub const WEB_SEARCH_TOOL: &str = "searchWebForExperts";
pub const DEFAULT_MAX_RESULTS: usize = 5;

pub const NOT_CONFIGURED_ANSWER: &str = "The web search tool is not configured. Please ask the user to contact support and mention that the SERP_API_KEY is missing.";
pub const NO_RESULTS_ANSWER: &str = "I couldn't find any relevant results on the web for that query. You could try rephrasing your request.";
pub const SUMMARY_UNAVAILABLE_ANSWER: &str = "I found some results, but I had trouble summarizing them.";
pub const UNEXPECTED_ANSWER: &str = "I encountered an unexpected error while trying to search the web. Please try again later.";

const SUMMARIZE_PROMPT: PromptTemplate = PromptTemplate::new(
    "summarizeSearchResults",
    r#"You are a research assistant. Based on the following web search results for the query "{{ query }}", synthesize a helpful, conversational answer for the user.
Format your response in clear markdown. If you find useful links, include them in your answer. Do not just list the results; provide a cohesive summary.
Also provide a list of the source links you used.

Search Results:
{% for result in results %}
- Title: {{ result.title }}
  Link: {{ result.link }}
  Snippet: {{ result.snippet }}
{% if result.thumbnail %}
  Thumbnail: {{ result.thumbnail }}
{% endif %}
{% endfor %}"#,
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchLink {
    pub title: String,
    pub link: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WebSearchResult {
    pub answer: String,
    pub links: Vec<SearchLink>,
}

impl WebSearchResult {
    pub fn schema() -> Schema {
        Schema::object()
            .field(
                "answer",
                Schema::string().with_description(
                    "A comprehensive, helpful, and conversational answer synthesized from the web search results, formatted in clear markdown.",
                ),
            )
            .field(
                "links",
                Schema::array(
                    Schema::object()
                        .field("title", Schema::string())
                        .field("link", Schema::string()),
                )
                .with_description("The most relevant source links found during the search."),
            )
            .with_name("WebSearchResult")
    }

    fn message(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            links: Vec::new(),
        }
    }
}

/// One organic hit as returned by the search API.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub status: u16,
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
}

impl SearchResponse {
    pub fn ok(organic_results: Vec<OrganicResult>) -> Self {
        Self {
            status: 200,
            organic_results,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            organic_results: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP search call. A non-2xx status is a normal response, not an
/// error; `Err` is reserved for transport and decoding failures.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, api_key: &str) -> Result<SearchResponse>;
}

/// Terminal branches of a web search, in the order they are checked.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    NotConfigured,
    HttpFailure(u16),
    NoResults,
    Summarized(WebSearchResult),
    SummaryUnavailable(Vec<OrganicResult>),
    Unexpected(String),
}

impl SearchOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            SearchOutcome::NotConfigured => "not_configured",
            SearchOutcome::HttpFailure(_) => "http_failure",
            SearchOutcome::NoResults => "no_results",
            SearchOutcome::Summarized(_) => "summarized",
            SearchOutcome::SummaryUnavailable(_) => "summary_unavailable",
            SearchOutcome::Unexpected(_) => "unexpected",
        }
    }

    pub fn into_result(self) -> WebSearchResult {
        match self {
            SearchOutcome::NotConfigured => WebSearchResult::message(NOT_CONFIGURED_ANSWER),
            SearchOutcome::HttpFailure(status) => WebSearchResult::message(format!(
                "Sorry, the web search failed with status: {status}. I cannot complete the request right now."
            )),
            SearchOutcome::NoResults => WebSearchResult::message(NO_RESULTS_ANSWER),
            SearchOutcome::Summarized(result) => result,
            SearchOutcome::SummaryUnavailable(snippets) => WebSearchResult {
                answer: SUMMARY_UNAVAILABLE_ANSWER.to_string(),
                links: snippets
                    .into_iter()
                    .map(|s| SearchLink {
                        title: s.title,
                        link: s.link,
                    })
                    .collect(),
            },
            SearchOutcome::Unexpected(_) => WebSearchResult::message(UNEXPECTED_ANSWER),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchInput {
    query: String,
}

/// Searches the web and has the model summarize the top hits.
pub struct WebSearchTool {
    backend: Option<Arc<dyn SearchBackend>>,
    api_key: Option<String>,
    summarizer: DynLlmClient,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(summarizer: DynLlmClient) -> Self {
        Self {
            backend: None,
            api_key: None,
            summarizer,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Without an API key the tool stays in its "not configured" branch.
    pub fn with_backend(mut self, backend: Arc<dyn SearchBackend>, api_key: Option<String>) -> Self {
        self.backend = Some(backend);
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some() && self.api_key.is_some()
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let (Some(backend), Some(api_key)) = (&self.backend, &self.api_key) else {
            return SearchOutcome::NotConfigured;
        };

        let response = match backend.search(query, api_key).await {
            Ok(response) => response,
            Err(err) => return SearchOutcome::Unexpected(err.to_string()),
        };
        if !response.is_success() {
            return SearchOutcome::HttpFailure(response.status);
        }

        let snippets: Vec<OrganicResult> = response
            .organic_results
            .into_iter()
            .take(self.max_results)
            .collect();
        if snippets.is_empty() {
            return SearchOutcome::NoResults;
        }
        self.summarize(query, snippets).await
    }

    async fn summarize(&self, query: &str, snippets: Vec<OrganicResult>) -> SearchOutcome {
        let rendered = match SUMMARIZE_PROMPT.render(&json!({ "query": query, "results": snippets })) {
            Ok(rendered) => rendered,
            Err(err) => return SearchOutcome::Unexpected(err.to_string()),
        };
        let schema = WebSearchResult::schema();
        let request = LlmRequest::new(rendered.text).with_output_schema(schema.clone());

        let output = match self.summarizer.complete(request).await {
            Ok(response) => response.output,
            Err(err) => return SearchOutcome::Unexpected(err.to_string()),
        };
        let summary = output.and_then(|mut value| {
            schema::strip_undeclared(&schema, &mut value);
            if let Err(err) = schema::validate(&schema, &value) {
                debug!(%err, "summary does not match the result schema");
                return None;
            }
            serde_json::from_value::<WebSearchResult>(value).ok()
        });
        match summary {
            Some(result) => SearchOutcome::Summarized(result),
            None => SearchOutcome::SummaryUnavailable(snippets),
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        WEB_SEARCH_TOOL
    }

    fn manifest(&self) -> ToolManifest {
        ToolManifest::builder(WEB_SEARCH_TOOL)
            .description(
                "Searches the web for information, guides, or solutions related to a user's query. \
                 Use this for research, planning (e.g., travel), or finding external information.",
            )
            .input(Schema::object().field(
                "query",
                Schema::string().with_description(
                    "A concise and effective search query to find relevant information on the web.",
                ),
            ))
            .output(WebSearchResult::schema())
            .build()
    }

    async fn call(&self, invocation: ToolInvocation) -> Result<Value> {
        let input: SearchInput = serde_json::from_value(invocation.input)?;
        let outcome = self.search(&input.query).await;
        match &outcome {
            SearchOutcome::Summarized(_) => {
                debug!(query = %input.query, outcome = outcome.kind(), "web search");
            }
            SearchOutcome::Unexpected(detail) => {
                warn!(query = %input.query, outcome = outcome.kind(), %detail, "web search failed");
            }
            _ => {
                warn!(query = %input.query, outcome = outcome.kind(), "web search degraded");
            }
        }
        Ok(serde_json::to_value(outcome.into_result())?)
    }
}

#[cfg(feature = "http-client")]
pub use serp::SerpApiBackend;

#[cfg(feature = "http-client")]
mod serp {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde::Deserialize;

    use super::{OrganicResult, SearchBackend, SearchResponse};
    use crate::error::{FlowError, Result};

    #[derive(Deserialize)]
    struct SerpPayload {
        #[serde(default)]
        organic_results: Vec<OrganicResult>,
    }

    /// SerpApi over reqwest.
    #[derive(Clone)]
    pub struct SerpApiBackend {
        client: reqwest::Client,
        endpoint: String,
        engine: String,
    }

    impl SerpApiBackend {
        pub fn new(endpoint: impl Into<String>, engine: impl Into<String>, timeout: Duration) -> Result<Self> {
            let client = reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .timeout(timeout)
                .build()
                .map_err(|e| FlowError::Config(format!("failed to build HTTP client: {e}")))?;
            Ok(Self {
                client,
                endpoint: endpoint.into(),
                engine: engine.into(),
            })
        }
    }

    #[async_trait]
    impl SearchBackend for SerpApiBackend {
        async fn search(&self, query: &str, api_key: &str) -> Result<SearchResponse> {
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[("q", query), ("engine", self.engine.as_str()), ("api_key", api_key)])
                .send()
                .await
                .map_err(|e| FlowError::Other(anyhow::anyhow!("search request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(status = status.as_u16(), body = %body.chars().take(300).collect::<String>(), "search API returned an error status");
                return Ok(SearchResponse::status(status.as_u16()));
            }

            let payload: SerpPayload = response
                .json()
                .await
                .map_err(|e| FlowError::Other(anyhow::anyhow!("invalid search response: {e}")))?;
            Ok(SearchResponse {
                status: status.as_u16(),
                organic_results: payload.organic_results,
            })
        }
    }
}
