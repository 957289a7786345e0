pub mod directory;
pub mod manifest;
pub mod registry;
pub mod tool;
pub mod web_search;

pub use directory::{DirectoryLookupTool, LookupOutcome, DIRECTORY_LOOKUP_TOOL};
pub use manifest::{ToolDescriptor, ToolManifest, ToolManifestBuilder};
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolExecution, ToolInvocation};
#[cfg(feature = "http-client")]
pub use web_search::SerpApiBackend;
pub use web_search::{
    OrganicResult, SearchBackend, SearchLink, SearchOutcome, SearchResponse, WebSearchResult,
    WebSearchTool, WEB_SEARCH_TOOL,
};
