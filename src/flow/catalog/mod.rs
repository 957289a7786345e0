//! The flows this crate ships, and [`FlowCatalog`], which wires them to a
//! model client, the directory and the web search backend.

pub mod analyze_need;
pub mod candidate_finder;
pub mod chat_support;
pub mod describe_image;
pub mod document_roles;
pub mod hiring_assistant;
pub mod linkedin_post;
pub mod match_category;
pub mod provider_finder;

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::definition::{FlowDefinition, FlowSpec};
use super::markdown;
use super::orchestrator::{FlowOrchestrator, DEFAULT_MAX_TOOL_ROUNDS};
use crate::directory::{DirectoryEntry, DynDirectoryStore, MemoryDirectory, SmartSearch};
use crate::error::{FlowError, Result};
use crate::llm::DynLlmClient;
use crate::schema::{self, Schema, SchemaRegistry};
use crate::tools::{
    DirectoryLookupTool, SearchBackend, ToolExecution, ToolInvocation, ToolRegistry,
    WebSearchResult, WebSearchTool, DIRECTORY_LOOKUP_TOOL, WEB_SEARCH_TOOL,
};

pub use analyze_need::{AnalyzeNeedFlow, AnalyzeNeedInput, AnalyzeNeedOutput, SolutionStep};
pub use candidate_finder::{
    CandidateFinderFlow, CandidateProfile, FindProfilesInput, FindProfilesOutput,
};
pub use chat_support::{ChatInput, ChatOutput, ChatSupportFlow};
pub use describe_image::{DescribeImageFlow, DescribeImageInput, DescribeImageOutput};
pub use document_roles::{DocumentRolesFlow, DocumentRolesInput, DocumentRolesOutput};
pub use hiring_assistant::{HiringAssistantFlow, HiringAssistantInput, HiringAssistantOutput};
pub use linkedin_post::{LinkedInPostFlow, LinkedInPostInput, LinkedInPostOutput};
pub use match_category::{MatchCategoryFlow, MatchCategoryInput, MatchCategoryOutput};
pub use provider_finder::{ProviderFinderFlow, ProviderSearchInput, ProviderSearchOutput};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConversationRole {
    User,
    #[serde(alias = "model")]
    Assistant,
}

/// One entry of caller-supplied chat history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub role: ConversationRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ConversationRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ConversationRole::Assistant,
            content: content.into(),
        }
    }

    pub fn schema() -> Schema {
        Schema::object()
            .field("role", Schema::one_of(["user", "assistant", "model"]))
            .field("content", Schema::string())
    }
}

/// `{ response, matchedProviders? }`, shared by the conversational flows.
pub(crate) fn reply_schema(name: &str) -> Schema {
    Schema::object()
        .field(
            "response",
            Schema::string().with_description("The assistant's reply to the user."),
        )
        .optional(
            "matchedProviders",
            Schema::array(DirectoryEntry::schema())
                .with_description("Service providers that match the user's request."),
        )
        .with_name(name)
}

/// Providers returned by every directory lookup in `executions`, deduplicated
/// by id. `None` when no lookup ran.
pub(crate) fn directory_matches(executions: &[ToolExecution]) -> Option<Vec<DirectoryEntry>> {
    let mut lookups = executions
        .iter()
        .filter(|execution| execution.name == DIRECTORY_LOOKUP_TOOL)
        .peekable();
    lookups.peek()?;

    let mut seen = HashSet::new();
    let mut providers = Vec::new();
    for execution in lookups {
        let entries: Vec<DirectoryEntry> = execution.decode().unwrap_or_default();
        for entry in entries {
            if seen.insert(entry.id.clone()) {
                providers.push(entry);
            }
        }
    }
    Some(providers)
}

/// One exported schema: a flow's or a tool's input and output.
#[derive(Clone, Debug, Serialize)]
pub struct SchemaExportEntry {
    pub kind: &'static str,
    pub name: String,
    pub input: Value,
    pub output: Value,
}

pub struct FlowCatalogBuilder {
    client: Option<DynLlmClient>,
    store: Option<DynDirectoryStore>,
    search_backend: Option<Arc<dyn SearchBackend>>,
    search_api_key: Option<String>,
    max_search_results: usize,
    max_tool_rounds: usize,
    temperature: f32,
}

impl Default for FlowCatalogBuilder {
    fn default() -> Self {
        Self {
            client: None,
            store: None,
            search_backend: None,
            search_api_key: None,
            max_search_results: crate::tools::web_search::DEFAULT_MAX_RESULTS,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            temperature: 0.2,
        }
    }
}

impl FlowCatalogBuilder {
    pub fn llm(mut self, client: DynLlmClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn directory(mut self, store: DynDirectoryStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn search_backend(
        mut self,
        backend: Arc<dyn SearchBackend>,
        api_key: Option<String>,
    ) -> Self {
        self.search_backend = Some(backend);
        self.search_api_key = api_key;
        self
    }

    pub fn max_search_results(mut self, max_results: usize) -> Self {
        self.max_search_results = max_results;
        self
    }

    pub fn max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn build(self) -> Result<FlowCatalog> {
        let client = self
            .client
            .ok_or_else(|| FlowError::Config("flow catalog requires an LLM client".into()))?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryDirectory::new()) as DynDirectoryStore);

        let mut web_search =
            WebSearchTool::new(Arc::clone(&client)).with_max_results(self.max_search_results);
        if let Some(backend) = self.search_backend {
            web_search = web_search.with_backend(backend, self.search_api_key);
        }

        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(DirectoryLookupTool::new(Arc::clone(&store))))?;
        tools.register(Arc::new(web_search))?;

        let orchestrator = Arc::new(
            FlowOrchestrator::new(client, Arc::new(tools))
                .with_max_tool_rounds(self.max_tool_rounds)
                .with_temperature(self.temperature),
        );

        let mut catalog = FlowCatalog {
            schemas: SchemaRegistry::new(),
            smart_search: SmartSearch::new(Arc::clone(&store), Arc::clone(&orchestrator)),
            orchestrator,
            store,
            analyze_need: AnalyzeNeedFlow::new(),
            chat: ChatSupportFlow::new(),
            describe_image: DescribeImageFlow::new(),
            document_roles: DocumentRolesFlow::new(),
            hiring_assistant: HiringAssistantFlow::new(),
            linkedin_post: LinkedInPostFlow::new(),
            candidate_finder: CandidateFinderFlow::new(),
            provider_finder: ProviderFinderFlow::new(),
            match_category: MatchCategoryFlow::new(),
        };
        catalog.schemas = catalog.build_schema_registry();
        Ok(catalog)
    }
}

/// Every flow, ready to call. Built once; all methods take `&self` and may
/// run concurrently.
pub struct FlowCatalog {
    orchestrator: Arc<FlowOrchestrator>,
    schemas: SchemaRegistry,
    store: DynDirectoryStore,
    smart_search: SmartSearch,
    analyze_need: AnalyzeNeedFlow,
    chat: ChatSupportFlow,
    describe_image: DescribeImageFlow,
    document_roles: DocumentRolesFlow,
    hiring_assistant: HiringAssistantFlow,
    linkedin_post: LinkedInPostFlow,
    candidate_finder: CandidateFinderFlow,
    provider_finder: ProviderFinderFlow,
    match_category: MatchCategoryFlow,
}

impl FlowCatalog {
    pub fn builder() -> FlowCatalogBuilder {
        FlowCatalogBuilder::default()
    }

    pub fn directory(&self) -> &DynDirectoryStore {
        &self.store
    }

    pub fn tools(&self) -> &ToolRegistry {
        self.orchestrator.tools()
    }

    pub async fn analyze_need(&self, input: AnalyzeNeedInput) -> Result<AnalyzeNeedOutput> {
        self.orchestrator.execute(&self.analyze_need, input).await
    }

    pub async fn chat(&self, input: ChatInput) -> Result<ChatOutput> {
        self.orchestrator.execute(&self.chat, input).await
    }

    pub async fn describe_image(&self, input: DescribeImageInput) -> Result<DescribeImageOutput> {
        self.orchestrator.execute(&self.describe_image, input).await
    }

    pub async fn analyze_document_for_roles(
        &self,
        input: DocumentRolesInput,
    ) -> Result<DocumentRolesOutput> {
        self.orchestrator.execute(&self.document_roles, input).await
    }

    pub async fn hiring_assistant(
        &self,
        input: HiringAssistantInput,
    ) -> Result<HiringAssistantOutput> {
        self.orchestrator.execute(&self.hiring_assistant, input).await
    }

    pub async fn generate_linkedin_post(
        &self,
        input: LinkedInPostInput,
    ) -> Result<LinkedInPostOutput> {
        self.orchestrator.execute(&self.linkedin_post, input).await
    }

    pub async fn find_profiles(&self, input: FindProfilesInput) -> Result<FindProfilesOutput> {
        self.orchestrator.execute(&self.candidate_finder, input).await
    }

    pub async fn find_providers_in_conversation(
        &self,
        input: ProviderSearchInput,
    ) -> Result<ProviderSearchOutput> {
        self.orchestrator.execute(&self.provider_finder, input).await
    }

    pub async fn match_category(&self, input: MatchCategoryInput) -> Result<MatchCategoryOutput> {
        self.orchestrator.execute(&self.match_category, input).await
    }

    /// Free-text need to available directory entries.
    pub async fn smart_search(&self, description: &str) -> Result<Vec<DirectoryEntry>> {
        self.smart_search.find_providers(description).await
    }

    /// Runs the web search tool directly, with the answer rendered to HTML.
    pub async fn search_web(&self, query: &str) -> Result<WebSearchResult> {
        let execution = self
            .tools()
            .execute(ToolInvocation::new(
                "direct",
                WEB_SEARCH_TOOL,
                json!({ "query": query }),
            ))
            .await?;
        let mut result: WebSearchResult = execution.decode()?;
        result.answer = markdown::to_html(&result.answer);
        Ok(result)
    }

    pub fn definitions(&self) -> Vec<&FlowDefinition> {
        vec![
            self.analyze_need.definition(),
            self.chat.definition(),
            self.describe_image.definition(),
            self.document_roles.definition(),
            self.hiring_assistant.definition(),
            self.linkedin_post.definition(),
            self.candidate_finder.definition(),
            self.provider_finder.definition(),
            self.match_category.definition(),
        ]
    }

    /// Every flow and tool schema under `<name>.input` / `<name>.output`.
    pub fn schema_registry(&self) -> &SchemaRegistry {
        &self.schemas
    }

    fn build_schema_registry(&self) -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        for definition in self.definitions() {
            registry.register(format!("{}.input", definition.name), definition.input_schema.clone());
            registry.register(format!("{}.output", definition.name), definition.output_schema.clone());
        }
        for manifest in self.tools().manifests() {
            registry.register(format!("{}.input", manifest.name), manifest.input.clone());
            registry.register(format!("{}.output", manifest.name), manifest.output.clone());
        }
        registry
    }

    pub fn schemas(&self) -> Vec<SchemaExportEntry> {
        let flows = self.definitions().into_iter().map(|definition| SchemaExportEntry {
            kind: "flow",
            name: definition.name.to_string(),
            input: definition.input_schema.to_json_schema(),
            output: definition.output_schema.to_json_schema(),
        });
        let tools = self.tools().manifests().into_iter().map(|manifest| SchemaExportEntry {
            kind: "tool",
            name: manifest.name.clone(),
            input: manifest.input.to_json_schema(),
            output: manifest.output.to_json_schema(),
        });
        flows.chain(tools).collect()
    }

    /// Runs a flow by name with JSON input. Used by the CLI.
    pub async fn run_json(&self, name: &str, input: Value) -> Result<Value> {
        match name {
            analyze_need::NAME => self.run_value(&self.analyze_need, input).await,
            chat_support::NAME => self.run_value(&self.chat, input).await,
            describe_image::NAME => self.run_value(&self.describe_image, input).await,
            document_roles::NAME => self.run_value(&self.document_roles, input).await,
            hiring_assistant::NAME => self.run_value(&self.hiring_assistant, input).await,
            linkedin_post::NAME => self.run_value(&self.linkedin_post, input).await,
            candidate_finder::NAME => self.run_value(&self.candidate_finder, input).await,
            provider_finder::NAME => self.run_value(&self.provider_finder, input).await,
            match_category::NAME => self.run_value(&self.match_category, input).await,
            other => Err(FlowError::FlowNotRegistered(other.to_string())),
        }
    }

    async fn run_value<F>(&self, flow: &F, input: Value) -> Result<Value>
    where
        F: FlowSpec,
        F::Input: DeserializeOwned,
    {
        // validate first so the error names the field instead of a serde position
        schema::validate(&flow.definition().input_schema, &input)?;
        let typed: F::Input = serde_json::from_value(input)?;
        let output = self.orchestrator.execute(flow, typed).await?;
        Ok(serde_json::to_value(output)?)
    }
}
