use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Decoded leaderboard for one conversation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    pub chat_id: String,
    pub title: String,
    pub subtitle: String,
    pub entries: Vec<LeaderboardEntry>,
    /// Snapshot text exactly as stored
    pub stats: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    /// Accumulated distance, kept as text to preserve the stored precision
    pub amount: String,
}
