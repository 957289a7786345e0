use std::path::Path;

use serde::{Deserialize, Serialize};

use super::env::EnvConfig;
use crate::error::{FlowError, Result};
use crate::flow::DEFAULT_MAX_TOOL_ROUNDS;
use crate::tools::web_search::DEFAULT_MAX_RESULTS;
use crate::utils::validation::ConfigValidator;

pub const DEFAULT_LLM_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_LLM_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://serpapi.com/search.json";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    pub endpoint: String,
    /// Literal key or `${VAR}`.
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: 0.2,
            timeout_secs: 120,
        }
    }
}

impl LlmSettings {
    pub fn resolved_api_key(&self) -> Result<String> {
        EnvConfig::resolve(&self.api_key)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    pub endpoint: String,
    pub engine: String,
    pub api_key: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            engine: "google".to_string(),
            api_key: "${SERP_API_KEY}".to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            timeout_secs: 30,
        }
    }
}

impl SearchSettings {
    /// `None` leaves the web search tool unconfigured.
    pub fn resolved_api_key(&self) -> Option<String> {
        EnvConfig::resolve_optional(&self.api_key)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrchestratorSettings {
    pub max_tool_rounds: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NeedsConfig {
    pub llm: LlmSettings,
    pub search: SearchSettings,
    pub orchestrator: OrchestratorSettings,
}

impl NeedsConfig {
    /// Reads a JSON file. Absent keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FlowError::Config(format!("failed to read `{}`: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| FlowError::Config(format!("invalid configuration: {e}")))
    }

    /// Defaults, with `NEEDSFLOW_LLM_ENDPOINT` and `NEEDSFLOW_LLM_MODEL`
    /// applied when set. Keys stay as placeholders until resolved.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(endpoint) = EnvConfig::get_env_optional("NEEDSFLOW_LLM_ENDPOINT") {
            config.llm.endpoint = endpoint;
        }
        if let Some(model) = EnvConfig::get_env_optional("NEEDSFLOW_LLM_MODEL") {
            config.llm.model = model;
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate_url(&self.llm.endpoint)?;
        ConfigValidator::validate_model_name(&self.llm.model)?;
        ConfigValidator::validate_temperature(f64::from(self.llm.temperature))?;
        if !EnvConfig::is_placeholder(&self.llm.api_key) {
            ConfigValidator::validate_api_key(&self.llm.api_key)?;
        }
        ConfigValidator::validate_url(&self.search.endpoint)?;
        ConfigValidator::validate_positive("search.max_results", self.search.max_results)?;
        ConfigValidator::validate_positive(
            "orchestrator.max_tool_rounds",
            self.orchestrator.max_tool_rounds,
        )?;
        Ok(())
    }
}
