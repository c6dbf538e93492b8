//! Narrow persistence interfaces consumed by the update engine.
//!
//! [`Database`] implements them on PostgreSQL, [`crate::MemoryStore`] in memory.

use std::collections::HashMap;

use chrono::{TimeDelta, Utc};

use crate::Database;
use crate::error::Result;
use crate::models::{DisplayName, Leaderboard};
use crate::repository::{DisplayNameRepository, ImageQueueRepository, LeaderboardRepository};

#[async_trait::async_trait]
pub trait LeaderboardStore: Send + Sync {
    async fn get_snapshot(&self, chat_id: &str) -> Result<Option<Leaderboard>>;

    async fn put_snapshot(&self, chat_id: &str, stats: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait DisplayNameStore: Send + Sync {
    async fn get_display_name(&self, user_id: &str) -> Result<Option<DisplayName>>;

    async fn put_display_name(&self, user_id: &str, name: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait ImageQueueStore: Send + Sync {
    /// Live entries of an image set keyed by image index, `None` if there are none
    async fn get_queue(&self, image_set_id: &str) -> Result<Option<HashMap<String, String>>>;

    /// Insert or overwrite one entry; it stops being visible after `ttl`
    async fn upsert_queue(
        &self,
        image_set_id: &str,
        key: &str,
        value: &str,
        ttl: TimeDelta,
    ) -> Result<()>;
}

#[async_trait::async_trait]
impl LeaderboardStore for Database {
    async fn get_snapshot(&self, chat_id: &str) -> Result<Option<Leaderboard>> {
        LeaderboardRepository::new(self.pool())
            .find_optional(chat_id)
            .await
    }

    async fn put_snapshot(&self, chat_id: &str, stats: &str) -> Result<()> {
        LeaderboardRepository::new(self.pool())
            .upsert(chat_id, stats)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl DisplayNameStore for Database {
    async fn get_display_name(&self, user_id: &str) -> Result<Option<DisplayName>> {
        DisplayNameRepository::new(self.pool())
            .find_optional(user_id)
            .await
    }

    async fn put_display_name(&self, user_id: &str, name: &str) -> Result<()> {
        DisplayNameRepository::new(self.pool())
            .upsert(user_id, name)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ImageQueueStore for Database {
    async fn get_queue(&self, image_set_id: &str) -> Result<Option<HashMap<String, String>>> {
        let items = ImageQueueRepository::new(self.pool())
            .list(image_set_id)
            .await?;

        if items.is_empty() {
            return Ok(None);
        }

        Ok(Some(
            items
                .into_iter()
                .map(|item| (item.item_key, item.item_value))
                .collect(),
        ))
    }

    async fn upsert_queue(
        &self,
        image_set_id: &str,
        key: &str,
        value: &str,
        ttl: TimeDelta,
    ) -> Result<()> {
        ImageQueueRepository::new(self.pool())
            .upsert(image_set_id, key, value, Utc::now() + ttl)
            .await
    }
}
