use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::navigation::{LocationEntry, NavigationState, SortMode};
use crate::models::score::UserId;
use crate::models::song::SongId;

/// 统一的API响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub code: u32,
    pub status: String,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            status: "ok".to_string(),
            message: None,
            data: Some(data),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerCell {
    pub userid: UserId,
    pub name: String,
}

/// 单个谱面的最佳成绩
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreCell {
    pub rank: String,
    pub points: u32,
    /// 连击数为 0 时不显示
    pub combo: Option<u32>,
    pub halo: String,
    pub player: Option<PlayerCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChartCell {
    pub slot: u8,
    /// None 表示该歌曲没有这个谱面
    pub difficulty: Option<u32>,
    pub score: Option<ScoreCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SongRow {
    pub id: SongId,
    pub name: String,
    pub artist: String,
    /// 人气排序下的名次 (从 1 开始)
    pub position: Option<usize>,
    /// 人气排序下的总游玩次数
    pub plays: Option<u32>,
    pub charts: Vec<ChartCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LeaderboardRow {
    Header { series: u32, label: String },
    Song(SongRow),
}

/// 副选择 (版本 / 谱面) 下拉框
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubsortSelector {
    pub label: String,
    pub options: Vec<String>,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PageInfo {
    pub offset: usize,
    pub limit: usize,
    pub total: usize,
    pub has_prev: bool,
    pub has_next: bool,
    /// 按版本分组翻页
    pub by_group: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardView {
    pub sort: SortMode,
    pub sort_label: String,
    pub subsort: Option<SubsortSelector>,
    pub rows: Vec<LeaderboardRow>,
    pub no_records: bool,
    pub page: PageInfo,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionView {
    pub session_id: String,
    pub state: NavigationState,
    /// 当前地址
    pub location: LocationEntry,
    /// 当前地址编码后的片段，如 `grade/SP Expert`
    pub fragment: String,
    /// 本次操作需要写入地址的记录，外部导航时为空
    pub pushed: Option<LocationEntry>,
    pub view: LeaderboardView,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SortOption {
    pub value: SortMode,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VersionInfo {
    pub series: u32,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardMeta {
    pub sorts: Vec<SortOption>,
    pub charts: Vec<String>,
    pub versions: Vec<VersionInfo>,
    pub page_limit: usize,
    pub show_player_names: bool,
}

/// 会话中的用户操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// 切换排序方式
    Sort { sort: String },
    /// 切换版本 / 谱面
    Subsort { index: usize },
    NextPage,
    PrevPage,
    /// 浏览器后退
    Back,
    /// 浏览器前进
    Forward,
}
