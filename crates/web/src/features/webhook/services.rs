use base64::Engine;
use leaderboard::{
    EventReplies, ImageSet, MessageEvent, MessageKind, SourceKind, UpdateEngine,
};
use serde_json::Value;
use validator::Validate;

use crate::error::{WebError, WebResult};

use super::dto::{EventMessage, EventSource, ReplyMessages, WebhookEvent};

/// Convert every event of a batch, dropping the ones that do not convert.
pub fn to_message_events(events: Vec<Value>) -> Vec<MessageEvent> {
    events
        .into_iter()
        .enumerate()
        .filter_map(|(idx, event)| match to_message_event(event) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Skipping event {} of batch: {}", idx, e);
                None
            }
        })
        .collect()
}

/// Convert one wire event into the engine's event model.
///
/// Events that carry no message come back as `None`.
pub fn to_message_event(event: Value) -> WebResult<Option<MessageEvent>> {
    let event: WebhookEvent =
        serde_json::from_value(event).map_err(|e| WebError::InvalidEvent(e.to_string()))?;

    if event.message.is_none() {
        tracing::debug!("Ignoring {} event without message", event.source.kind);
        return Ok(None);
    }
    event.validate()?;

    let WebhookEvent {
        reply_token,
        source,
        message,
    } = event;

    Ok(Some(MessageEvent {
        reply_token,
        source: to_source(source)?,
        message: match message {
            Some(message) => to_message(message)?,
            None => MessageKind::Unsupported,
        },
    }))
}

fn to_source(source: EventSource) -> WebResult<SourceKind> {
    let missing = |field: &str| WebError::InvalidEvent(format!("{} source without {}", source.kind, field));

    match source.kind.as_str() {
        "user" => Ok(SourceKind::User {
            user_id: source.user_id.clone().ok_or_else(|| missing("user_id"))?,
        }),
        "group" => Ok(SourceKind::Group {
            group_id: source.group_id.clone().ok_or_else(|| missing("group_id"))?,
            user_id: source.user_id.clone(),
        }),
        "room" => Ok(SourceKind::Room {
            room_id: source.room_id.clone().ok_or_else(|| missing("room_id"))?,
            user_id: source.user_id.clone(),
        }),
        other => Err(WebError::InvalidEvent(format!("Unknown source type '{}'", other))),
    }
}

fn to_message(message: EventMessage) -> WebResult<MessageKind> {
    match message.kind.as_str() {
        "text" => Ok(MessageKind::Text(message.text.unwrap_or_default())),
        "image" => {
            let data = message
                .data
                .ok_or_else(|| WebError::InvalidEvent("image message without data".to_string()))?;
            let image = base64::engine::general_purpose::STANDARD
                .decode(data.as_bytes())
                .map_err(|e| WebError::InvalidEvent(format!("Invalid image data: {}", e)))?;

            match message.image_set {
                Some(set) => {
                    set.validate()?;
                    Ok(MessageKind::ImagePart {
                        image,
                        set: ImageSet {
                            id: set.id,
                            index: set.index,
                            total: set.total,
                        },
                    })
                }
                None => Ok(MessageKind::Image(image)),
            }
        }
        _ => Ok(MessageKind::Unsupported),
    }
}

pub async fn process_events(engine: &UpdateEngine, events: &[MessageEvent]) -> Vec<ReplyMessages> {
    engine
        .process_batch(events)
        .await
        .into_iter()
        .map(|EventReplies { reply_token, messages }| ReplyMessages {
            reply_token,
            messages,
        })
        .collect()
}
