//! HTTP transport for OpenAI-compatible chat completion endpoints.

#[cfg(feature = "http-client")]
pub mod generic;

#[cfg(feature = "http-client")]
pub use generic::GenericHttpClient;
