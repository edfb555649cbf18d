pub mod leaderboard;
pub mod navigation;
pub mod score;
pub mod song;

pub use leaderboard::*;
pub use navigation::*;
pub use score::*;
pub use song::*;
