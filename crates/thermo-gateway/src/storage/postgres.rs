//! PostgreSQL storage gateway.
//!
//! Mutations run inside transactions; the change signal is raised with
//! `pg_notify` from within the transaction, which PostgreSQL delivers
//! on commit and discards on rollback. That keeps the signal and the
//! write atomic without a second round-trip.

use crate::domain::model::Reading;
use crate::storage::{StorageResult, SummaryRow, TemperatureStore};
use async_trait::async_trait;
use rand::Rng;
use sqlx::PgPool;
use tracing::debug;

/// Lower bound (inclusive) for randomized temperatures
pub const RANDOMIZE_MIN: f64 = 20.0;
/// Upper bound (exclusive) for randomized temperatures
pub const RANDOMIZE_MAX: f64 = 35.0;

/// Pooled PostgreSQL implementation of [`TemperatureStore`].
pub struct PgTemperatureStore {
    pool: PgPool,
    channel: String,
}

impl PgTemperatureStore {
    pub fn new(pool: PgPool, channel: impl Into<String>) -> Self {
        Self {
            pool,
            channel: channel.into(),
        }
    }

    /// Create the `temperatures` table if it does not exist (idempotent,
    /// applied once at startup).
    pub async fn ensure_schema(pool: &PgPool) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS temperatures (
                id          SERIAL PRIMARY KEY,
                city        TEXT             NOT NULL,
                temperature DOUBLE PRECISION NOT NULL,
                updated_at  TIMESTAMPTZ      NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Raise the change signal inside an open transaction. Delivery
    /// happens on commit.
    async fn signal_change(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        op: &str,
    ) -> StorageResult<()> {
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(&self.channel)
            .bind(op)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TemperatureStore for PgTemperatureStore {
    async fn list(&self) -> StorageResult<Vec<Reading>> {
        sqlx::query_as::<_, Reading>("SELECT * FROM temperatures ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await
    }

    async fn get(&self, id: i32) -> StorageResult<Option<Reading>> {
        sqlx::query_as::<_, Reading>("SELECT * FROM temperatures WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn insert(&self, city: &str, temperature: f64) -> StorageResult<Reading> {
        let mut tx = self.pool.begin().await?;

        let reading = sqlx::query_as::<_, Reading>(
            "INSERT INTO temperatures (city, temperature, updated_at) \
             VALUES ($1, $2, NOW()) RETURNING *",
        )
        .bind(city)
        .bind(temperature)
        .fetch_one(&mut *tx)
        .await?;

        self.signal_change(&mut tx, "insert").await?;
        tx.commit().await?;

        debug!(id = reading.id, city = %reading.city, "inserted reading");
        Ok(reading)
    }

    async fn update(
        &self,
        id: i32,
        city: &str,
        temperature: f64,
    ) -> StorageResult<Option<Reading>> {
        let mut tx = self.pool.begin().await?;

        let reading = sqlx::query_as::<_, Reading>(
            "UPDATE temperatures SET city = $1, temperature = $2, updated_at = NOW() \
             WHERE id = $3 RETURNING *",
        )
        .bind(city)
        .bind(temperature)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        // No row matched: nothing changed, nothing to signal.
        if reading.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        self.signal_change(&mut tx, "update").await?;
        tx.commit().await?;

        debug!(id, "updated reading");
        Ok(reading)
    }

    async fn delete(&self, id: i32) -> StorageResult<Option<Reading>> {
        let mut tx = self.pool.begin().await?;

        let reading = sqlx::query_as::<_, Reading>(
            "DELETE FROM temperatures WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if reading.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        self.signal_change(&mut tx, "delete").await?;
        tx.commit().await?;

        debug!(id, "deleted reading");
        Ok(reading)
    }

    async fn randomize_all(&self) -> StorageResult<Vec<Reading>> {
        let mut tx = self.pool.begin().await?;

        let ids: Vec<(i32,)> = sqlx::query_as("SELECT id FROM temperatures")
            .fetch_all(&mut *tx)
            .await?;

        // Draw all values up front; ThreadRng must not be held across awaits.
        let temps: Vec<f64> = {
            let mut rng = rand::thread_rng();
            ids.iter().map(|_| random_temperature(&mut rng)).collect()
        };

        for ((id,), temp) in ids.into_iter().zip(temps) {
            sqlx::query(
                "UPDATE temperatures SET temperature = $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(temp)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        let updated = sqlx::query_as::<_, Reading>("SELECT * FROM temperatures ORDER BY id DESC")
            .fetch_all(&mut *tx)
            .await?;

        // One signal for the whole batch, not one per row.
        self.signal_change(&mut tx, "randomize").await?;
        tx.commit().await?;

        debug!(rows = updated.len(), "randomized all temperatures");
        Ok(updated)
    }

    async fn summary(&self) -> StorageResult<SummaryRow> {
        let row: (i64, Option<f64>, Option<f64>, Option<f64>) = sqlx::query_as(
            "SELECT COUNT(*), AVG(temperature), MIN(temperature), MAX(temperature) \
             FROM temperatures",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(SummaryRow {
            count: row.0,
            average: row.1,
            min: row.2,
            max: row.3,
        })
    }
}

/// Draw one temperature uniformly from `[20.00, 35.00)` in whole
/// hundredths. Drawing hundredths directly keeps the rounded value
/// strictly below the upper bound.
pub(crate) fn random_temperature<R: Rng>(rng: &mut R) -> f64 {
    let hundredths: i64 = rng.gen_range(
        (RANDOMIZE_MIN * 100.0) as i64..(RANDOMIZE_MAX * 100.0) as i64,
    );
    hundredths as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_randomize_bounds() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let t = random_temperature(&mut rng);
            assert!((RANDOMIZE_MIN..RANDOMIZE_MAX).contains(&t), "out of range: {t}");
            // Already rounded to two decimals
            assert_eq!(t, (t * 100.0).round() / 100.0);
        }
    }
}
