use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::dto::leaderboard::LeaderboardResponse;

use crate::error::WebResult;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/leaderboards/{chat_id}",
    params(
        ("chat_id" = String, Path, description = "User, group or room id of the conversation")
    ),
    responses(
        (status = 200, description = "Leaderboard found", body = LeaderboardResponse),
        (status = 404, description = "Conversation has no leaderboard")
    ),
    tag = "leaderboards"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> WebResult<Response> {
    let leaderboard = services::get_leaderboard(state.leaderboards.as_ref(), &chat_id).await?;

    Ok(Json(leaderboard).into_response())
}
