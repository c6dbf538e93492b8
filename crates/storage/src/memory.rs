use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{DisplayName, Leaderboard};
use crate::store::{DisplayNameStore, ImageQueueStore, LeaderboardStore};

/// In-process store with the same semantics as [`crate::Database`].
///
/// Used by tests and by the CLI when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    leaderboards: RwLock<HashMap<String, Leaderboard>>,
    names: RwLock<HashMap<String, DisplayName>>,
    queues: RwLock<HashMap<String, HashMap<String, QueuedValue>>>,
}

struct QueuedValue {
    value: String,
    expires_at: DateTime<Utc>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored snapshot text of a conversation
    pub async fn snapshot(&self, chat_id: &str) -> Option<String> {
        self.leaderboards
            .read()
            .await
            .get(chat_id)
            .map(|leaderboard| leaderboard.stats.clone())
    }

    pub async fn purge_expired(&self) -> u64 {
        let now = Utc::now();
        let mut queues = self.queues.write().await;
        let mut removed = 0;

        for items in queues.values_mut() {
            let before = items.len();
            items.retain(|_, queued| queued.expires_at > now);
            removed += (before - items.len()) as u64;
        }
        queues.retain(|_, items| !items.is_empty());

        tracing::debug!("Purged {} expired image queue entries", removed);
        removed
    }
}

#[async_trait::async_trait]
impl LeaderboardStore for MemoryStore {
    async fn get_snapshot(&self, chat_id: &str) -> Result<Option<Leaderboard>> {
        Ok(self.leaderboards.read().await.get(chat_id).cloned())
    }

    async fn put_snapshot(&self, chat_id: &str, stats: &str) -> Result<()> {
        self.leaderboards.write().await.insert(
            chat_id.to_string(),
            Leaderboard {
                chat_id: chat_id.to_string(),
                stats: stats.to_string(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl DisplayNameStore for MemoryStore {
    async fn get_display_name(&self, user_id: &str) -> Result<Option<DisplayName>> {
        Ok(self.names.read().await.get(user_id).cloned())
    }

    async fn put_display_name(&self, user_id: &str, name: &str) -> Result<()> {
        self.names.write().await.insert(
            user_id.to_string(),
            DisplayName {
                user_id: user_id.to_string(),
                name: name.to_string(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl ImageQueueStore for MemoryStore {
    async fn get_queue(&self, image_set_id: &str) -> Result<Option<HashMap<String, String>>> {
        let now = Utc::now();
        let queues = self.queues.read().await;

        let live: HashMap<String, String> = queues
            .get(image_set_id)
            .map(|items| {
                items
                    .iter()
                    .filter(|(_, queued)| queued.expires_at > now)
                    .map(|(key, queued)| (key.clone(), queued.value.clone()))
                    .collect()
            })
            .unwrap_or_default();

        if live.is_empty() {
            Ok(None)
        } else {
            Ok(Some(live))
        }
    }

    async fn upsert_queue(
        &self,
        image_set_id: &str,
        key: &str,
        value: &str,
        ttl: TimeDelta,
    ) -> Result<()> {
        self.queues
            .write()
            .await
            .entry(image_set_id.to_string())
            .or_default()
            .insert(
                key.to_string(),
                QueuedValue {
                    value: value.to_string(),
                    expires_at: Utc::now() + ttl,
                },
            );
        Ok(())
    }
}
