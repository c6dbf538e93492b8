use leaderboard::Snapshot;
use storage::LeaderboardStore;
use storage::dto::leaderboard::{LeaderboardEntry, LeaderboardResponse};

use crate::error::{WebError, WebResult};

/// Stored leaderboard of a conversation with its entries decoded
pub async fn get_leaderboard(
    store: &dyn LeaderboardStore,
    chat_id: &str,
) -> WebResult<LeaderboardResponse> {
    let leaderboard = store
        .get_snapshot(chat_id)
        .await?
        .ok_or_else(|| WebError::LeaderboardNotFound(chat_id.to_string()))?;

    let lines: Vec<&str> = leaderboard.stats.split('\n').collect();
    let snapshot = Snapshot::parse(&lines).map_err(|e| WebError::CorruptLeaderboard {
        chat_id: chat_id.to_string(),
        reason: e.to_string(),
    })?;

    let entries = snapshot
        .standings()
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| LeaderboardEntry {
            rank: idx + 1,
            name: entry.name.clone(),
            amount: entry.amount.to_string(),
        })
        .collect();

    Ok(LeaderboardResponse {
        chat_id: leaderboard.chat_id,
        title: snapshot.title,
        subtitle: snapshot.subtitle,
        entries,
        stats: leaderboard.stats,
        updated_at: leaderboard.updated_at,
    })
}
