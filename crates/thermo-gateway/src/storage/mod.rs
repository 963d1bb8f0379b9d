//! Storage gateway: the single seam between handlers and the reading table.
//!
//! Handlers and the notifier depend on [`TemperatureStore`] rather than a
//! concrete pool, so tests run against [`MemoryTemperatureStore`] while
//! production wires in [`PgTemperatureStore`].

pub mod memory;
pub mod postgres;

pub use memory::MemoryTemperatureStore;
pub use postgres::PgTemperatureStore;

use crate::domain::model::Reading;
use async_trait::async_trait;

/// Raw aggregate row produced by the summary query, before display
/// formatting. `average`/`min`/`max` are `None` on an empty table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryRow {
    pub count: i64,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, sqlx::Error>;

/// Storage gateway for the `temperatures` table.
///
/// Every mutating operation runs inside a transaction and raises the
/// `temperature_changes` signal on commit, so out-of-process watchers
/// observe the write without depending on in-process delivery.
#[async_trait]
pub trait TemperatureStore: Send + Sync {
    /// All readings, descending by id.
    async fn list(&self) -> StorageResult<Vec<Reading>>;

    /// Single reading by id, `None` when no row matches.
    async fn get(&self, id: i32) -> StorageResult<Option<Reading>>;

    /// Insert a new reading; the returned row carries the assigned id.
    async fn insert(&self, city: &str, temperature: f64) -> StorageResult<Reading>;

    /// Update city and temperature; `None` when no row matches.
    async fn update(&self, id: i32, city: &str, temperature: f64)
        -> StorageResult<Option<Reading>>;

    /// Delete a reading, returning the removed row; `None` when no row matches.
    async fn delete(&self, id: i32) -> StorageResult<Option<Reading>>;

    /// Re-draw every temperature uniformly from `[20.0, 35.0)` rounded to
    /// two decimals, in one transaction with one change signal for the
    /// whole batch. An empty table is a successful no-op.
    async fn randomize_all(&self) -> StorageResult<Vec<Reading>>;

    /// Aggregate count/avg/min/max over all readings.
    async fn summary(&self) -> StorageResult<SummaryRow>;
}
