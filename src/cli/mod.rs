//! Helpers behind the `needsflow` binary.

use std::path::Path;
use std::sync::Arc;

use crate::config::NeedsConfig;
use crate::directory::{seed_defaults, DynDirectoryStore, JsonFileDirectory, MemoryDirectory};
use crate::error::{FlowError, Result};
use crate::flow::{FlowCatalog, FlowDefinition, SchemaExportEntry};
use crate::llm::ScriptedClient;

/// Opens the JSON directory at `path`, or a seeded in-memory directory.
pub async fn open_directory(path: Option<&Path>) -> Result<DynDirectoryStore> {
    match path {
        Some(path) => Ok(Arc::new(JsonFileDirectory::new(path))),
        None => {
            let store = MemoryDirectory::new();
            seed_defaults(&store).await?;
            Ok(Arc::new(store))
        }
    }
}

/// Catalog wired to the configured model and search API.
#[cfg(feature = "http-client")]
pub fn catalog_from_config(config: &NeedsConfig, store: DynDirectoryStore) -> Result<FlowCatalog> {
    use std::time::Duration;

    use crate::llm::GenericHttpClient;
    use crate::tools::SerpApiBackend;

    config.validate()?;
    let client = GenericHttpClient::with_timeout(
        &config.llm.endpoint,
        config.llm.resolved_api_key()?,
        &config.llm.model,
        Duration::from_secs(config.llm.timeout_secs),
    )?;
    let backend = SerpApiBackend::new(
        &config.search.endpoint,
        &config.search.engine,
        Duration::from_secs(config.search.timeout_secs),
    )?;

    FlowCatalog::builder()
        .llm(Arc::new(client))
        .directory(store)
        .search_backend(Arc::new(backend), config.search.resolved_api_key())
        .max_search_results(config.search.max_results)
        .max_tool_rounds(config.orchestrator.max_tool_rounds)
        .temperature(config.llm.temperature)
        .build()
}

#[cfg(not(feature = "http-client"))]
pub fn catalog_from_config(_config: &NeedsConfig, _store: DynDirectoryStore) -> Result<FlowCatalog> {
    Err(FlowError::Config(
        "needsflow was built without the `http-client` feature".into(),
    ))
}

/// Catalog for listing and schema export. Its client is never called.
pub fn offline_catalog() -> Result<FlowCatalog> {
    FlowCatalog::builder()
        .llm(Arc::new(ScriptedClient::new()))
        .build()
}

pub fn schema_exports() -> Result<Vec<SchemaExportEntry>> {
    Ok(offline_catalog()?.schemas())
}

pub fn render_flow_table(definitions: &[&FlowDefinition]) -> String {
    let mut out = format!("{:<32} {:<10} {:<48} {}\n", "Flow", "Policy", "Tools", "Description");
    for definition in definitions {
        let tools = if definition.tools.is_empty() {
            "-".to_string()
        } else {
            definition.tools.join(", ")
        };
        out.push_str(&format!(
            "{:<32} {:<10} {:<48} {}\n",
            definition.name,
            definition.policy.label(),
            tools,
            definition.description
        ));
    }
    out
}

pub fn parse_input(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw)
        .map_err(|e| FlowError::Config(format!("--input is not valid JSON: {e}")))
}
