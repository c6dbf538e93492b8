use sqlx::PgPool;

use crate::error::Result;
use crate::models::Leaderboard;

/// Repository for leaderboard snapshots, keyed by conversation id
pub struct LeaderboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LeaderboardRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the snapshot of a conversation, if one was ever stored
    pub async fn find_optional(&self, chat_id: &str) -> Result<Option<Leaderboard>> {
        let leaderboard = sqlx::query_as::<_, Leaderboard>(
            r#"
            SELECT chat_id, stats, updated_at
            FROM leaderboards
            WHERE chat_id = $1
            "#,
        )
        .bind(chat_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(leaderboard)
    }

    /// Replace the snapshot of a conversation
    pub async fn upsert(&self, chat_id: &str, stats: &str) -> Result<Leaderboard> {
        let leaderboard = sqlx::query_as::<_, Leaderboard>(
            r#"
            INSERT INTO leaderboards (chat_id, stats, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (chat_id)
            DO UPDATE SET stats = EXCLUDED.stats, updated_at = now()
            RETURNING chat_id, stats, updated_at
            "#,
        )
        .bind(chat_id)
        .bind(stats)
        .fetch_one(self.pool)
        .await?;

        Ok(leaderboard)
    }
}
