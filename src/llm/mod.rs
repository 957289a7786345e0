pub mod client;
pub mod http;
pub mod response_cleaner;
pub mod scripted;
pub mod types;

pub use client::{DynLlmClient, LlmClient};
#[cfg(feature = "http-client")]
pub use http::GenericHttpClient;
pub use response_cleaner::{clean_response, parse_structured};
pub use scripted::ScriptedClient;
pub use types::{LlmRequest, LlmResponse, MediaRef, ToolCall};
