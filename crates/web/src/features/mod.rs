pub mod leaderboards;
pub mod webhook;
