pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod flow;
pub mod llm;
pub mod schema;
pub mod tools;
pub mod utils;

pub use config::{EnvConfig, NeedsConfig};
pub use directory::{
    DirectoryEntry, DirectoryStore, DynDirectoryStore, JsonFileDirectory, MemoryDirectory,
    SmartSearch,
};
pub use error::{FlowError, Result, GENERIC_CALLER_MESSAGE};
pub use flow::catalog::{
    AnalyzeNeedInput, AnalyzeNeedOutput, CandidateProfile, ChatInput, ChatOutput,
    ConversationRole, ConversationTurn, DescribeImageInput, DescribeImageOutput,
    DocumentRolesInput, DocumentRolesOutput, FindProfilesInput, FindProfilesOutput,
    HiringAssistantInput, HiringAssistantOutput, LinkedInPostInput, LinkedInPostOutput,
    MatchCategoryInput, MatchCategoryOutput, ProviderSearchInput, ProviderSearchOutput,
    SolutionStep,
};
pub use flow::{
    FailurePolicy, FlowCatalog, FlowCatalogBuilder, FlowDefinition, FlowOrchestrator, FlowSpec,
    FlowStage, PromptTemplate,
};
#[cfg(feature = "http-client")]
pub use llm::GenericHttpClient;
pub use llm::{DynLlmClient, LlmClient, LlmRequest, LlmResponse, MediaRef, ScriptedClient, ToolCall};
pub use schema::{Schema, SchemaError, SchemaKind, SchemaRegistry};
pub use tools::{
    DirectoryLookupTool, SearchBackend, SearchOutcome, SearchResponse, Tool, ToolExecution,
    ToolInvocation, ToolManifest, ToolRegistry, WebSearchResult, WebSearchTool,
};
pub use utils::{logging, validation};
