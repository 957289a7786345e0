use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use needsflow::tools::web_search::{
    NOT_CONFIGURED_ANSWER, NO_RESULTS_ANSWER, SUMMARY_UNAVAILABLE_ANSWER, UNEXPECTED_ANSWER,
};
use needsflow::tools::{OrganicResult, WEB_SEARCH_TOOL};
use needsflow::{
    FlowCatalog, FlowError, LlmResponse, ScriptedClient, SearchBackend, SearchOutcome,
    SearchResponse, ToolInvocation, ToolRegistry, WebSearchTool,
};
use serde_json::json;

struct FakeBackend {
    response: Option<SearchResponse>,
    calls: AtomicUsize,
}

impl FakeBackend {
    fn returning(response: SearchResponse) -> Arc<Self> {
        Arc::new(Self {
            response: Some(response),
            calls: AtomicUsize::new(0),
        })
    }

    fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            response: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn search(&self, _query: &str, api_key: &str) -> needsflow::Result<SearchResponse> {
        assert_eq!(api_key, "serp-key");
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .clone()
            .ok_or_else(|| FlowError::Other(anyhow::anyhow!("dns failure")))
    }
}

fn hits(count: usize) -> Vec<OrganicResult> {
    (0..count)
        .map(|idx| OrganicResult {
            title: format!("Guide {idx}"),
            link: format!("https://example.com/{idx}"),
            snippet: format!("snippet {idx}"),
            thumbnail: None,
        })
        .collect()
}

fn summary() -> LlmResponse {
    LlmResponse::output(json!({
        "answer": "Try **Lisbon** in spring.",
        "links": [{ "title": "Guide 0", "link": "https://example.com/0" }]
    }))
}

#[tokio::test]
async fn missing_key_short_circuits_without_calling_backend() {
    let backend = FakeBackend::returning(SearchResponse::ok(hits(3)));
    let summarizer = Arc::new(ScriptedClient::new());
    let tool = WebSearchTool::new(summarizer.clone()).with_backend(backend.clone(), Some("  ".into()));

    assert!(!tool.is_configured());
    let outcome = tool.search("travel to portugal").await;
    assert_eq!(outcome, SearchOutcome::NotConfigured);
    assert_eq!(outcome.into_result().answer, NOT_CONFIGURED_ANSWER);
    assert_eq!(backend.calls(), 0);
    assert_eq!(summarizer.call_count(), 0);
}

#[tokio::test]
async fn http_failure_reports_status_with_no_links() {
    let backend = FakeBackend::returning(SearchResponse::status(500));
    let tool = WebSearchTool::new(Arc::new(ScriptedClient::new()))
        .with_backend(backend, Some("serp-key".into()));

    let result = tool.search("travel").await.into_result();
    assert!(result.answer.contains("500"));
    assert!(result.links.is_empty());
}

#[tokio::test]
async fn empty_results_skip_the_summarizer() {
    let summarizer = Arc::new(ScriptedClient::new().then(summary()));
    let tool = WebSearchTool::new(summarizer.clone())
        .with_backend(FakeBackend::returning(SearchResponse::ok(vec![])), Some("serp-key".into()));

    let outcome = tool.search("travel").await;
    assert_eq!(outcome, SearchOutcome::NoResults);
    assert_eq!(outcome.into_result().answer, NO_RESULTS_ANSWER);
    assert_eq!(summarizer.call_count(), 0);
}

#[tokio::test]
async fn only_top_results_reach_the_summarizer() {
    let summarizer = Arc::new(ScriptedClient::new().then(summary()));
    let tool = WebSearchTool::new(summarizer.clone())
        .with_backend(FakeBackend::returning(SearchResponse::ok(hits(8))), Some("serp-key".into()));

    let outcome = tool.search("travel to portugal").await;
    assert_eq!(outcome.kind(), "summarized");
    let result = outcome.into_result();
    assert_eq!(result.answer, "Try **Lisbon** in spring.");
    assert_eq!(result.links.len(), 1);

    let requests = summarizer.requests();
    assert_eq!(requests.len(), 1);
    let prompt = &requests[0].prompt;
    assert!(prompt.contains("travel to portugal"));
    assert!(prompt.contains("https://example.com/4"));
    assert!(!prompt.contains("https://example.com/5"));
    assert!(requests[0].output_schema.is_some());
}

#[tokio::test]
async fn missing_summary_falls_back_to_raw_links() {
    let tool = WebSearchTool::new(Arc::new(ScriptedClient::new()))
        .with_backend(FakeBackend::returning(SearchResponse::ok(hits(2))), Some("serp-key".into()));

    let result = tool.search("travel").await.into_result();
    assert_eq!(result.answer, SUMMARY_UNAVAILABLE_ANSWER);
    assert_eq!(result.links.len(), 2);
    assert_eq!(result.links[1].link, "https://example.com/1");
}

#[tokio::test]
async fn malformed_summary_falls_back_to_raw_links() {
    let summarizer = Arc::new(ScriptedClient::new().then(LlmResponse::output(json!({ "answer": 3 }))));
    let tool = WebSearchTool::new(summarizer)
        .with_backend(FakeBackend::returning(SearchResponse::ok(hits(1))), Some("serp-key".into()));

    let outcome = tool.search("travel").await;
    assert!(matches!(outcome, SearchOutcome::SummaryUnavailable(ref raw) if raw.len() == 1));
}

#[tokio::test]
async fn summarizer_and_transport_errors_are_unexpected() {
    let summarizer = Arc::new(ScriptedClient::new().then_fail("quota exceeded"));
    let tool = WebSearchTool::new(summarizer)
        .with_backend(FakeBackend::returning(SearchResponse::ok(hits(1))), Some("serp-key".into()));
    let result = tool.search("travel").await.into_result();
    assert_eq!(result.answer, UNEXPECTED_ANSWER);
    assert!(result.links.is_empty());

    let tool = WebSearchTool::new(Arc::new(ScriptedClient::new()))
        .with_backend(FakeBackend::unreachable(), Some("serp-key".into()));
    assert_eq!(tool.search("travel").await.kind(), "unexpected");
}

#[tokio::test]
async fn tool_call_never_errors_on_degraded_branches() -> anyhow::Result<()> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(WebSearchTool::new(Arc::new(ScriptedClient::new()))))?;

    let execution = registry
        .execute(ToolInvocation::new(
            "c1",
            WEB_SEARCH_TOOL,
            json!({ "query": "best hiking boots" }),
        ))
        .await?;
    assert_eq!(execution.output["answer"], NOT_CONFIGURED_ANSWER);
    assert_eq!(execution.output["links"], json!([]));
    Ok(())
}

#[tokio::test]
async fn catalog_search_renders_answer_as_html() -> anyhow::Result<()> {
    let catalog = FlowCatalog::builder()
        .llm(Arc::new(ScriptedClient::new().then(summary())))
        .search_backend(
            FakeBackend::returning(SearchResponse::ok(hits(2))),
            Some("serp-key".into()),
        )
        .build()?;

    let result = catalog.search_web("travel to portugal").await?;
    assert!(result.answer.contains("<strong>Lisbon</strong>"));
    assert_eq!(result.links[0].title, "Guide 0");
    Ok(())
}
