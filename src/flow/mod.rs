pub mod catalog;
pub mod constants;
pub mod definition;
pub mod invoker;
pub mod markdown;
pub mod orchestrator;
pub mod template;

pub use catalog::{FlowCatalog, FlowCatalogBuilder, SchemaExportEntry};
pub use definition::{FailurePolicy, FlowDefinition, FlowSpec};
pub use invoker::{GenerationInvoker, GenerationRequest, GenerationResult};
pub use orchestrator::{FlowOrchestrator, FlowStage, DEFAULT_MAX_TOOL_ROUNDS};
pub use template::{PromptTemplate, RenderedPrompt};
