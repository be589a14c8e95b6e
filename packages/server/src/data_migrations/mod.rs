//! Data migration framework for one-off record transformations.
//!
//! Data migrations are different from schema revisions: a revision changes
//! which properties a record carries, a data migration rewrites the data
//! inside existing properties. Migrations run offline through `migrate_cli`,
//! never on the request path.
//!
//! To add one, implement `DataMigration` and register it in
//! [`all_migrations`].

pub mod backfill_structured_details;

pub use backfill_structured_details::BackfillStructuredDetails;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::domains::itinerary::ItineraryStore;

/// Execution context handed to a migration.
pub struct MigrationContext {
    pub store: Arc<dyn ItineraryStore>,
    /// When set, report what would change without writing anything.
    pub dry_run: bool,
}

/// Aggregate counts for one migration run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MigrationReport {
    pub scanned: usize,
    pub migrated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// One registered data migration.
#[async_trait]
pub trait DataMigration: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Count records this migration would touch.
    async fn estimate(&self, store: &Arc<dyn ItineraryStore>) -> Result<usize>;

    /// Run over every eligible record.
    async fn run(&self, ctx: &MigrationContext) -> Result<MigrationReport>;
}

/// All registered migrations.
pub fn all_migrations() -> Vec<Box<dyn DataMigration>> {
    vec![Box::new(BackfillStructuredDetails)]
}

/// Look up a migration by name.
pub fn find_migration(name: &str) -> Option<Box<dyn DataMigration>> {
    all_migrations().into_iter().find(|m| m.name() == name)
}
