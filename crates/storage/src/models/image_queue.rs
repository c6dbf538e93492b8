use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One queued OCR result of a multi-image message.
///
/// `item_key` is the 1-based image index, `item_value` the extracted distance.
#[derive(Debug, Clone, FromRow)]
pub struct ImageQueueItem {
    pub image_set_id: String,
    pub item_key: String,
    pub item_value: String,
    pub expires_at: DateTime<Utc>,
}
