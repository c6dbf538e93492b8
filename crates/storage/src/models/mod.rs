mod display_name;
mod image_queue;
mod leaderboard;

pub use display_name::DisplayName;
pub use image_queue::ImageQueueItem;
pub use leaderboard::Leaderboard;
