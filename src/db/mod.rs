// SPDX-License-Identifier: MIT

//! Local persistence boundary.
//!
//! The storage engine itself is an external concern; the engine only needs a
//! key-value table of activities keyed by id plus a single credential record.
//! Two reference implementations are provided: an in-memory store for tests
//! and embedding, and a JSON-file store for durable local data.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Activity, Credentials};

/// Activity table keyed by activity id.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Insert or replace activities by id. Replacement is whole-record,
    /// never a field merge.
    async fn bulk_upsert(&self, activities: &[Activity]) -> Result<()>;

    /// All stored activities, ordered by start date descending.
    async fn get_all(&self) -> Result<Vec<Activity>>;

    /// Full wipe. There is no per-id delete.
    async fn clear_all(&self) -> Result<()>;

    /// Wipe and upsert as a single commit step, so an aborted sync never
    /// leaves the table half-written.
    async fn replace_all(&self, activities: &[Activity]) -> Result<()>;
}

/// Durable home of the single OAuth credential record.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<Credentials>>;
    async fn save(&self, credentials: &Credentials) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}
