use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::WebResult;
use crate::state::AppState;

use super::dto::{WebhookRequest, WebhookResponse};
use super::services;

#[utoipa::path(
    post,
    path = "/callback",
    request_body = WebhookRequest,
    params(
        ("X-Webhook-Signature" = String, Header, description = "Delivery signature of the batch")
    ),
    responses(
        (status = 200, description = "Batch processed, replies per event; malformed events are skipped", body = WebhookResponse),
        (status = 400, description = "Unreadable request body"),
        (status = 401, description = "Missing or invalid signature")
    ),
    tag = "webhook"
)]
pub async fn callback(
    State(state): State<AppState>,
    Json(payload): Json<WebhookRequest>,
) -> WebResult<Response> {
    let batch_id = Uuid::new_v4();
    let span = tracing::info_span!("batch", %batch_id, events = payload.events.len());

    let replies = async {
        tracing::info!("Processing webhook batch");
        let events = services::to_message_events(payload.events);
        services::process_events(&state.engine, &events).await
    }
    .instrument(span)
    .await;

    Ok(Json(WebhookResponse { replies }).into_response())
}
