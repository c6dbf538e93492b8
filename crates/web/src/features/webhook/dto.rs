use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Batch of chat events forwarded by the platform gateway.
///
/// Events stay raw until each one is converted on its own, so a malformed
/// event cannot reject its neighbours.
#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookRequest {
    #[serde(default)]
    #[schema(value_type = Vec<WebhookEvent>)]
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct WebhookEvent {
    #[serde(default)]
    #[validate(length(min = 1, message = "reply_token must not be empty"))]
    pub reply_token: String,
    pub source: EventSource,
    /// Absent for follow, join and other non-message events
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EventSource {
    /// `user`, `group` or `room`
    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
    pub room_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EventMessage {
    /// `text`, `image`; anything else is ignored
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
    /// Base64 image content
    pub data: Option<String>,
    pub image_set: Option<ImageSetInfo>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ImageSetInfo {
    #[validate(length(min = 1, message = "image set id must not be empty"))]
    pub id: String,
    /// 1-based position of this image
    #[validate(range(min = 1, max = 20))]
    pub index: u32,
    /// At most `MAX_IMAGE_SET_SIZE` images
    #[validate(range(min = 1, max = 20))]
    pub total: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookResponse {
    pub replies: Vec<ReplyMessages>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReplyMessages {
    pub reply_token: String,
    pub messages: Vec<String>,
}
