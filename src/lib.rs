pub mod config;
pub mod countdown;
pub mod error;
pub mod format;
pub mod leaderboard;
pub mod logging;
pub mod server;
pub mod upstream;
