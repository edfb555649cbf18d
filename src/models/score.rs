use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::models::song::{ChartSlot, SongId};

pub type UserId = u64;

/// 全网最佳成绩，每个 (songid, chart) 至多一条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub songid: SongId,
    pub chart: ChartSlot,
    /// 评级 (AAA, AA, ...)
    pub rank: String,
    pub points: u32,
    #[serde(default)]
    pub combo: u32,
    /// 通关状态的显示名称
    pub halo: String,
    /// 通关状态序数，用于排序
    #[serde(default)]
    pub lamp: u32,
    #[serde(default)]
    pub userid: Option<UserId>,
    #[serde(default)]
    pub plays: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlayerInfo {
    pub name: String,
}

/// 上游刷新接口返回的快照
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSnapshot {
    #[serde(default)]
    pub records: Vec<ScoreRecord>,
    #[serde(default)]
    pub players: HashMap<UserId, PlayerInfo>,
}
