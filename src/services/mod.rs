pub mod leaderboard;
pub mod navigation;
pub mod pagination;
pub mod ranking;
pub mod refresh;
pub mod score_index;

// 重新导出主要的服务结构体，以便可以直接从 services 模块导入
pub use leaderboard::{LeaderboardOptions, LeaderboardService};
pub use navigation::NavigationSync;
pub use refresh::{HttpSnapshotSource, LeaderboardStore, RefreshScheduler};
