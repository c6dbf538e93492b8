use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod features;
pub mod middleware;
pub mod state;

pub use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::webhook::handlers::callback,
        features::leaderboards::handlers::get_leaderboard,
    ),
    components(
        schemas(
            features::webhook::dto::WebhookRequest,
            features::webhook::dto::WebhookEvent,
            features::webhook::dto::EventSource,
            features::webhook::dto::EventMessage,
            features::webhook::dto::ImageSetInfo,
            features::webhook::dto::WebhookResponse,
            features::webhook::dto::ReplyMessages,
            storage::dto::leaderboard::LeaderboardResponse,
            storage::dto::leaderboard::LeaderboardEntry,
        )
    ),
    tags(
        (name = "webhook", description = "Chat platform event delivery"),
        (name = "leaderboards", description = "Read-only leaderboard endpoints"),
    )
)]
pub struct ApiDoc;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Running challenge bot is up" }))
        .merge(features::webhook::routes::routes(&state))
        .nest("/api/leaderboards", features::leaderboards::routes::routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
