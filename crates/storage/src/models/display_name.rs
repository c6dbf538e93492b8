use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Latest name a user submitted with a distance command.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DisplayName {
    pub user_id: String,
    pub name: String,
    pub updated_at: DateTime<Utc>,
}
