//! In-memory storage gateway for tests and demos.
//!
//! Same contract as the PostgreSQL store minus the out-of-process
//! signal (there is no other process to notify). Injected wherever a
//! test needs storage without a database.

use crate::domain::model::Reading;
use crate::storage::{StorageResult, SummaryRow, TemperatureStore};
use crate::storage::postgres::random_temperature;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

#[derive(Default)]
struct Table {
    rows: Vec<Reading>,
    next_id: i32,
}

/// `Mutex<Vec<Reading>>`-backed implementation of [`TemperatureStore`].
#[derive(Default)]
pub struct MemoryTemperatureStore {
    table: Mutex<Table>,
}

impl MemoryTemperatureStore {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(Table {
                rows: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored readings (test assertions).
    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    /// True when no readings are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TemperatureStore for MemoryTemperatureStore {
    async fn list(&self) -> StorageResult<Vec<Reading>> {
        let table = self.table.lock().await;
        let mut rows = table.rows.clone();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn get(&self, id: i32) -> StorageResult<Option<Reading>> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, city: &str, temperature: f64) -> StorageResult<Reading> {
        let mut table = self.table.lock().await;
        let reading = Reading {
            id: table.next_id,
            city: city.to_string(),
            temperature,
            updated_at: Utc::now(),
        };
        table.next_id += 1;
        table.rows.push(reading.clone());
        Ok(reading)
    }

    async fn update(
        &self,
        id: i32,
        city: &str,
        temperature: f64,
    ) -> StorageResult<Option<Reading>> {
        let mut table = self.table.lock().await;
        match table.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.city = city.to_string();
                row.temperature = temperature;
                row.updated_at = Utc::now();
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i32) -> StorageResult<Option<Reading>> {
        let mut table = self.table.lock().await;
        match table.rows.iter().position(|r| r.id == id) {
            Some(index) => Ok(Some(table.rows.remove(index))),
            None => Ok(None),
        }
    }

    async fn randomize_all(&self) -> StorageResult<Vec<Reading>> {
        let mut table = self.table.lock().await;
        let mut rng = rand::thread_rng();
        for row in table.rows.iter_mut() {
            row.temperature = random_temperature(&mut rng);
            row.updated_at = Utc::now();
        }
        let mut rows = table.rows.clone();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn summary(&self) -> StorageResult<SummaryRow> {
        let table = self.table.lock().await;
        let count = table.rows.len() as i64;
        if count == 0 {
            return Ok(SummaryRow {
                count: 0,
                average: None,
                min: None,
                max: None,
            });
        }

        let sum: f64 = table.rows.iter().map(|r| r.temperature).sum();
        let min = table
            .rows
            .iter()
            .map(|r| r.temperature)
            .fold(f64::INFINITY, f64::min);
        let max = table
            .rows
            .iter()
            .map(|r| r.temperature)
            .fold(f64::NEG_INFINITY, f64::max);

        Ok(SummaryRow {
            count,
            average: Some(sum / count as f64),
            min: Some(min),
            max: Some(max),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::postgres::{RANDOMIZE_MAX, RANDOMIZE_MIN};

    #[tokio::test]
    async fn test_insert_then_get() {
        let store = MemoryTemperatureStore::new();
        let created = store.insert("Bandung", 24.5).await.unwrap();

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.city, "Bandung");
        assert_eq!(fetched.temperature, 24.5);
        assert_eq!(fetched.id, created.id);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_none() {
        let store = MemoryTemperatureStore::new();
        let created = store.insert("Medan", 30.0).await.unwrap();

        assert!(store.delete(created.id).await.unwrap().is_some());
        assert!(store.get(created.id).await.unwrap().is_none());
        // Idempotent from the handler's perspective: second delete finds nothing
        assert!(store.delete(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_descending_by_id() {
        let store = MemoryTemperatureStore::new();
        store.insert("A", 20.0).await.unwrap();
        store.insert("B", 21.0).await.unwrap();
        store.insert("C", 22.0).await.unwrap();

        let list = store.list().await.unwrap();
        let ids: Vec<i32> = list.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_randomize_preserves_count_and_range() {
        let store = MemoryTemperatureStore::new();
        for i in 0..5 {
            store.insert("X", 50.0 + i as f64).await.unwrap();
        }

        let updated = store.randomize_all().await.unwrap();
        assert_eq!(updated.len(), 5);
        assert_eq!(store.len().await, 5);
        for reading in updated {
            assert!((RANDOMIZE_MIN..RANDOMIZE_MAX).contains(&reading.temperature));
        }
    }

    #[tokio::test]
    async fn test_randomize_empty_is_ok() {
        let store = MemoryTemperatureStore::new();
        let updated = store.randomize_all().await.unwrap();
        assert!(updated.is_empty());
    }

    #[tokio::test]
    async fn test_summary_aggregates() {
        let store = MemoryTemperatureStore::new();
        store.insert("A", 20.0).await.unwrap();
        store.insert("B", 30.0).await.unwrap();

        let row = store.summary().await.unwrap();
        assert_eq!(row.count, 2);
        assert_eq!(row.average, Some(25.0));
        assert_eq!(row.min, Some(20.0));
        assert_eq!(row.max, Some(30.0));
    }

    #[tokio::test]
    async fn test_summary_empty() {
        let store = MemoryTemperatureStore::new();
        let row = store.summary().await.unwrap();
        assert_eq!(row.count, 0);
        assert!(row.average.is_none());
    }
}
