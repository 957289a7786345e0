use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::manifest::ToolManifest;
use super::tool::{Tool, ToolInvocation};
use crate::directory::{DirectoryEntry, DynDirectoryStore};
use crate::error::Result;
use crate::schema::Schema;

pub const DIRECTORY_LOOKUP_TOOL: &str = "findProvidersForProject";

/// What a lookup produced. Both failure shapes reach the model as an empty
/// list; the distinction only matters for logging and tests.
#[derive(Clone, Debug, PartialEq)]
pub enum LookupOutcome {
    Found(Vec<DirectoryEntry>),
    NoMatch,
    StoreUnavailable(String),
}

impl LookupOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            LookupOutcome::Found(_) => "found",
            LookupOutcome::NoMatch => "no_match",
            LookupOutcome::StoreUnavailable(_) => "store_unavailable",
        }
    }

    pub fn into_entries(self) -> Vec<DirectoryEntry> {
        match self {
            LookupOutcome::Found(entries) => entries,
            LookupOutcome::NoMatch | LookupOutcome::StoreUnavailable(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupInput {
    category: String,
}

/// Finds available providers whose stored category equals the requested one.
pub struct DirectoryLookupTool {
    store: DynDirectoryStore,
}

impl DirectoryLookupTool {
    pub fn new(store: DynDirectoryStore) -> Self {
        Self { store }
    }

    /// Surrounding whitespace is trimmed; after that the match against the
    /// stored category is exact and case-sensitive.
    pub async fn lookup(&self, category: &str) -> LookupOutcome {
        let category = category.trim();
        if category.is_empty() {
            return LookupOutcome::NoMatch;
        }
        match self.store.query(category, true).await {
            Ok(entries) if entries.is_empty() => LookupOutcome::NoMatch,
            Ok(entries) => LookupOutcome::Found(entries),
            Err(err) => LookupOutcome::StoreUnavailable(err.to_string()),
        }
    }
}

#[async_trait]
impl Tool for DirectoryLookupTool {
    fn name(&self) -> &'static str {
        DIRECTORY_LOOKUP_TOOL
    }

    fn manifest(&self) -> ToolManifest {
        ToolManifest::builder(DIRECTORY_LOOKUP_TOOL)
            .description(
                "Finds available service providers in the directory for a given category. \
                 Use it when the user's need maps to a service category such as Moving, \
                 Tutoring, Plumbing or Doctor.",
            )
            .input(Schema::object().field(
                "category",
                Schema::string().with_description(
                    "The service category to search for, e.g. 'Moving' or 'Tech Help'.",
                ),
            ))
            .output(Schema::array(DirectoryEntry::schema()))
            .build()
    }

    async fn call(&self, invocation: ToolInvocation) -> Result<Value> {
        let input: LookupInput = serde_json::from_value(invocation.input)?;
        let outcome = self.lookup(&input.category).await;
        match &outcome {
            LookupOutcome::StoreUnavailable(detail) => {
                warn!(category = %input.category, outcome = outcome.kind(), %detail, "directory lookup failed");
            }
            _ => {
                debug!(category = %input.category, outcome = outcome.kind(), "directory lookup");
            }
        }
        Ok(serde_json::to_value(outcome.into_entries())?)
    }
}
