pub mod health;
pub mod leaderboard;

pub use health::health_check;
pub use leaderboard::{create_session, get_meta, get_records, get_session, post_event};
