use sqlx::PgPool;

use crate::error::Result;
use crate::models::DisplayName;

pub struct DisplayNameRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DisplayNameRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_optional(&self, user_id: &str) -> Result<Option<DisplayName>> {
        let name = sqlx::query_as::<_, DisplayName>(
            r#"
            SELECT user_id, name, updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(name)
    }

    pub async fn upsert(&self, user_id: &str, name: &str) -> Result<DisplayName> {
        let display_name = sqlx::query_as::<_, DisplayName>(
            r#"
            INSERT INTO users (user_id, name, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id)
            DO UPDATE SET name = EXCLUDED.name, updated_at = now()
            RETURNING user_id, name, updated_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        Ok(display_name)
    }
}
