//! Summary calculator: derives the snapshot pushed to live subscribers.

use crate::domain::model::{Snapshot, Summary};
use crate::storage::{StorageResult, TemperatureStore};

/// Compute the display summary from the aggregate query.
///
/// The empty-table result is special-cased so aggregates come back as
/// `"0.00"` instead of an undefined value.
pub async fn compute_summary(store: &dyn TemperatureStore) -> StorageResult<Summary> {
    let row = store.summary().await?;

    if row.count == 0 {
        return Ok(Summary::empty());
    }

    Ok(Summary::from_aggregates(
        row.count,
        row.average.unwrap_or_default(),
        row.min.unwrap_or_default(),
        row.max.unwrap_or_default(),
    ))
}

/// Compute a full snapshot: summary and ordered list, fetched
/// concurrently. Both must complete before the snapshot is usable.
pub async fn compute_snapshot(store: &dyn TemperatureStore) -> StorageResult<Snapshot> {
    let (summary, list) = tokio::try_join!(compute_summary(store), store.list())?;
    Ok(Snapshot { summary, list })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTemperatureStore;

    #[tokio::test]
    async fn test_empty_table_summary() {
        let store = MemoryTemperatureStore::new();
        let summary = compute_summary(&store).await.unwrap();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, "0.00");
        assert_eq!(summary.min, "0.00");
        assert_eq!(summary.max, "0.00");
    }

    #[tokio::test]
    async fn test_snapshot_reflects_storage() {
        let store = MemoryTemperatureStore::new();
        store.insert("Jakarta", 31.0).await.unwrap();
        store.insert("Bandung", 23.0).await.unwrap();

        let snapshot = compute_snapshot(&store).await.unwrap();
        assert_eq!(snapshot.summary.count, 2);
        assert_eq!(snapshot.summary.average, "27.00");
        assert_eq!(snapshot.summary.min, "23.00");
        assert_eq!(snapshot.summary.max, "31.00");
        assert_eq!(snapshot.list.len(), 2);
        // Newest first
        assert_eq!(snapshot.list[0].city, "Bandung");
    }
}
