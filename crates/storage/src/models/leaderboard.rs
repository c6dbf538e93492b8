use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Stored leaderboard snapshot for one conversation.
///
/// `stats` is the complete rendered text; it is always replaced as a whole.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Leaderboard {
    pub chat_id: String,
    pub stats: String,
    pub updated_at: DateTime<Utc>,
}
