use std::sync::Arc;

use leaderboard::UpdateEngine;
use storage::LeaderboardStore;

use crate::middleware::auth::SignatureVerifier;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<UpdateEngine>,
    pub leaderboards: Arc<dyn LeaderboardStore>,
    pub verifier: Arc<dyn SignatureVerifier>,
}
