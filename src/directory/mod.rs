//! Read access to the service-provider directory.
//!
//! The store itself is an external collaborator; this module only fixes the
//! query interface the flows and the smart search pipeline rely on.

pub mod seed;
pub mod smart_search;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};
use crate::schema::Schema;

pub use seed::{default_entries, seed_defaults, SeedReport};
pub use smart_search::SmartSearch;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(alias = "phone_number")]
    pub phone_number: String,
    #[serde(alias = "avg_cost")]
    pub average_cost: f64,
    pub available: bool,
}

impl DirectoryEntry {
    pub fn schema() -> Schema {
        Schema::object()
            .field("id", Schema::string())
            .field("name", Schema::string())
            .field("category", Schema::string())
            .field("phoneNumber", Schema::string())
            .field(
                "averageCost",
                Schema::number().with_description("Average cost of the service, never negative."),
            )
            .field("available", Schema::boolean())
            .with_name("DirectoryEntry")
    }
}

#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Entries whose category equals `category` exactly. With
    /// `available_only`, unavailable entries are filtered out.
    async fn query(&self, category: &str, available_only: bool) -> Result<Vec<DirectoryEntry>>;
    async fn get_all(&self) -> Result<Vec<DirectoryEntry>>;
    /// Inserts or replaces the entry with the same id.
    async fn upsert(&self, entry: DirectoryEntry) -> Result<()>;
}

pub type DynDirectoryStore = Arc<dyn DirectoryStore>;

fn matches(entry: &DirectoryEntry, category: &str, available_only: bool) -> bool {
    entry.category == category && (!available_only || entry.available)
}

/// In-memory directory, keeps insertion order.
#[derive(Default)]
pub struct MemoryDirectory {
    inner: RwLock<Vec<DirectoryEntry>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }

    pub fn with_entries(entries: Vec<DirectoryEntry>) -> Self {
        Self {
            inner: RwLock::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectory {
    async fn query(&self, category: &str, available_only: bool) -> Result<Vec<DirectoryEntry>> {
        Ok(self
            .inner
            .read()
            .iter()
            .filter(|entry| matches(entry, category, available_only))
            .cloned()
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<DirectoryEntry>> {
        Ok(self.inner.read().clone())
    }

    async fn upsert(&self, entry: DirectoryEntry) -> Result<()> {
        let mut guard = self.inner.write();
        match guard.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => *existing = entry,
            None => guard.push(entry),
        }
        Ok(())
    }
}

/// Directory persisted as a JSON array on disk. A missing file reads as an
/// empty directory.
pub struct JsonFileDirectory {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl JsonFileDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<DirectoryEntry>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                FlowError::Directory(format!("invalid directory file `{}`: {}", self.path.display(), e))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(FlowError::Directory(format!(
                "failed to read `{}`: {}",
                self.path.display(),
                err
            ))),
        }
    }
}

#[async_trait]
impl DirectoryStore for JsonFileDirectory {
    async fn query(&self, category: &str, available_only: bool) -> Result<Vec<DirectoryEntry>> {
        let entries = self.load().await?;
        Ok(entries
            .into_iter()
            .filter(|entry| matches(entry, category, available_only))
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<DirectoryEntry>> {
        self.load().await
    }

    async fn upsert(&self, entry: DirectoryEntry) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        match entries.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        let content = serde_json::to_string_pretty(&entries)?;
        tokio::fs::write(&self.path, content).await.map_err(|e| {
            FlowError::Directory(format!("failed to write `{}`: {}", self.path.display(), e))
        })
    }
}
