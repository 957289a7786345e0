use tracing::info;

use super::{DirectoryEntry, DirectoryStore};
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedReport {
    pub seeded: usize,
}

/// Bootstrap entries used when the directory is empty.
pub fn default_entries() -> Vec<DirectoryEntry> {
    [
        ("prov1", "Speedy Movers", "Moving", "555-0101", 150.0, true),
        ("prov2", "Pro-Move Experts", "Moving", "555-0102", 200.0, false),
        ("prov3", "Brainy Tutors", "Tutoring", "555-0103", 50.0, true),
        ("prov4", "Tech Wizards", "Tech Help", "555-0104", 75.0, true),
        ("prov5", "Go-Get-It Errands", "Errands", "555-0105", 30.0, true),
        ("prov6", "Eventful Planners", "Events", "555-0106", 300.0, false),
        ("prov7", "Dr. Wellness", "Doctor", "555-0108", 250.0, true),
        ("prov8", "Fix-It-Fast", "Plumbing", "555-0109", 120.0, true),
        ("prov9", "Anytime Helper", "Other", "555-0107", 40.0, true),
    ]
    .into_iter()
    .map(|(id, name, category, phone, cost, available)| DirectoryEntry {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        phone_number: phone.to_string(),
        average_cost: cost,
        available,
    })
    .collect()
}

/// Writes the default entries. Entries are upserted by id, so running this
/// twice leaves the directory unchanged.
pub async fn seed_defaults(store: &dyn DirectoryStore) -> Result<SeedReport> {
    let entries = default_entries();
    let seeded = entries.len();
    for entry in entries {
        store.upsert(entry).await?;
    }
    info!(seeded, "seeded default directory entries");
    Ok(SeedReport { seeded })
}
