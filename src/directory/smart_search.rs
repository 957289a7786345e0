use std::sync::Arc;

use tracing::{debug, error, info};

use super::{seed_defaults, DirectoryEntry, DynDirectoryStore};
use crate::error::{FlowError, Result};
use crate::flow::catalog::{MatchCategoryFlow, MatchCategoryInput};
use crate::flow::constants::failures;
use crate::flow::FlowOrchestrator;

const PIPELINE: &str = "smart_search";

/// Free-text need, to a known category, to available directory entries.
///
/// Category matching is fuzzy (the model does it); the directory query that
/// follows is exact.
pub struct SmartSearch {
    store: DynDirectoryStore,
    orchestrator: Arc<FlowOrchestrator>,
    matcher: MatchCategoryFlow,
}

impl SmartSearch {
    pub fn new(store: DynDirectoryStore, orchestrator: Arc<FlowOrchestrator>) -> Self {
        Self {
            store,
            orchestrator,
            matcher: MatchCategoryFlow::new(),
        }
    }

    /// Distinct categories in first-seen order. Seeds the directory when it
    /// is empty.
    pub async fn categories(&self) -> Result<Vec<String>> {
        let mut entries = self.store.get_all().await.map_err(store_failure)?;
        if entries.is_empty() {
            info!("directory is empty, seeding defaults");
            seed_defaults(self.store.as_ref()).await.map_err(store_failure)?;
            entries = self.store.get_all().await.map_err(store_failure)?;
        }

        let mut categories: Vec<String> = Vec::new();
        for entry in entries {
            if !categories.contains(&entry.category) {
                categories.push(entry.category);
            }
        }
        Ok(categories)
    }

    pub async fn find_providers(&self, description: &str) -> Result<Vec<DirectoryEntry>> {
        let description = description.trim();
        if description.is_empty() {
            return Ok(Vec::new());
        }

        let categories = self.categories().await?;
        let matched = self
            .orchestrator
            .execute(
                &self.matcher,
                MatchCategoryInput {
                    user_query: description.to_string(),
                    available_categories: categories,
                },
            )
            .await?;

        if !matched.is_match() {
            debug!(query = %description, "no category matched");
            return Ok(Vec::new());
        }
        debug!(category = %matched.matched_category, "category matched");
        self.store
            .query(&matched.matched_category, true)
            .await
            .map_err(store_failure)
    }
}

fn store_failure(err: FlowError) -> FlowError {
    error!(error = %err, "provider search failed");
    FlowError::failed(PIPELINE, failures::SMART_SEARCH)
}
