use axum::{Router, middleware, routing::post};

use super::handlers::callback;
use crate::middleware::auth::require_signature;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/callback", post(callback))
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            require_signature,
        ))
}
