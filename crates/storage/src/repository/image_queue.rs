use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::Result;
use crate::models::ImageQueueItem;

/// Repository for the per-image-set accumulator of OCR distances.
///
/// Rows past their `expires_at` are invisible to reads and removed by
/// [`ImageQueueRepository::purge_expired`].
pub struct ImageQueueRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ImageQueueRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the live items of an image set
    pub async fn list(&self, image_set_id: &str) -> Result<Vec<ImageQueueItem>> {
        let items = sqlx::query_as::<_, ImageQueueItem>(
            r#"
            SELECT image_set_id, item_key, item_value, expires_at
            FROM image_set_queue
            WHERE image_set_id = $1 AND expires_at > now()
            ORDER BY item_key
            "#,
        )
        .bind(image_set_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    pub async fn upsert(
        &self,
        image_set_id: &str,
        key: &str,
        value: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO image_set_queue (image_set_id, item_key, item_value, expires_at, updated_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (image_set_id, item_key)
            DO UPDATE SET item_value = EXCLUDED.item_value,
                          expires_at = EXCLUDED.expires_at,
                          updated_at = now()
            "#,
        )
        .bind(image_set_id)
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete expired rows, returning how many were removed
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM image_set_queue WHERE expires_at <= now()")
            .execute(self.pool)
            .await?;

        tracing::debug!("Purged {} expired image queue rows", result.rows_affected());
        Ok(result.rows_affected())
    }
}
