pub mod display_name;
pub mod image_queue;
pub mod leaderboard;

pub use display_name::DisplayNameRepository;
pub use image_queue::ImageQueueRepository;
pub use leaderboard::LeaderboardRepository;
