//! Inbound chat events as the engine sees them.

/// Where a message was posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    User { user_id: String },
    Group { group_id: String, user_id: Option<String> },
    Room { room_id: String, user_id: Option<String> },
}

impl SourceKind {
    /// Storage key of the conversation's leaderboard
    pub fn chat_id(&self) -> &str {
        match self {
            Self::User { user_id } => user_id,
            Self::Group { group_id, .. } => group_id,
            Self::Room { room_id, .. } => room_id,
        }
    }

    pub fn sender_id(&self) -> Option<&str> {
        match self {
            Self::User { user_id } => Some(user_id.as_str()),
            Self::Group { user_id, .. } | Self::Room { user_id, .. } => user_id.as_deref(),
        }
    }
}

/// Most images a single multi-image upload may carry.
pub const MAX_IMAGE_SET_SIZE: u32 = 20;

/// Position of an image inside a multi-image upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSet {
    pub id: String,
    /// 1-based
    pub index: u32,
    pub total: u32,
}

impl ImageSet {
    pub fn is_last(&self) -> bool {
        self.index >= self.total
    }

    pub fn is_within_limit(&self) -> bool {
        self.total <= MAX_IMAGE_SET_SIZE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Text(String),
    Image(Vec<u8>),
    ImagePart { image: Vec<u8>, set: ImageSet },
    /// Stickers, files, locations and the like
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub reply_token: String,
    pub source: SourceKind,
    pub message: MessageKind,
}
