use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::utils::error::AppError;

pub type SongId = u32;

/// 每首歌固定的谱面槽位数量 (SP 5 + 未使用 1 + DP 4)
pub const CHART_SLOT_COUNT: usize = 10;

/// 可供选择的谱面槽位，槽位 5 不存在
pub const SELECTABLE_CHART_SLOTS: [u8; 9] = [0, 1, 2, 3, 4, 6, 7, 8, 9];

/// 谱面槽位 (0-9)，默认为 SP Beginner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ChartSlot(u8);

impl ChartSlot {
    pub fn new(slot: u8) -> Option<Self> {
        (usize::from(slot) < CHART_SLOT_COUNT).then_some(Self(slot))
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn all() -> impl Iterator<Item = ChartSlot> {
        (0..CHART_SLOT_COUNT as u8).map(ChartSlot)
    }

    /// 下拉框中的第 `index` 个谱面
    pub fn from_selection(index: usize) -> Option<Self> {
        SELECTABLE_CHART_SLOTS.get(index).copied().map(ChartSlot)
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "SP Beginner",
            1 => "SP Basic",
            2 => "SP Difficult",
            3 => "SP Expert",
            4 => "SP Challenge",
            6 => "DP Basic",
            7 => "DP Difficult",
            8 => "DP Expert",
            9 => "DP Challenge",
            _ => "Unused",
        }
    }
}

impl TryFrom<u8> for ChartSlot {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ChartSlot::new(value).ok_or(AppError::InvalidChartSlot(value))
    }
}

impl From<ChartSlot> for u8 {
    fn from(slot: ChartSlot) -> u8 {
        slot.0
    }
}

impl fmt::Display for ChartSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 可选择谱面的显示名称，按槽位顺序
pub fn selectable_chart_names() -> Vec<String> {
    SELECTABLE_CHART_SLOTS
        .iter()
        .map(|&slot| ChartSlot(slot).name().to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub name: String,
    pub artist: String,
    /// 所属版本 (series / category)
    pub series: u32,
    /// 按槽位排列的难度，0 表示没有该谱面
    pub difficulties: [u32; CHART_SLOT_COUNT],
}

impl Song {
    pub fn difficulty(&self, slot: ChartSlot) -> Option<u32> {
        match self.difficulties[slot.index()] {
            0 => None,
            rating => Some(rating),
        }
    }
}

/// 歌曲目录：启动时加载，运行期间只读
#[derive(Debug, Clone, Default)]
pub struct SongCatalog {
    songs: HashMap<SongId, Song>,
    versions: BTreeMap<u32, String>,
}

impl SongCatalog {
    pub fn new(songs: Vec<Song>, versions: BTreeMap<u32, String>) -> Self {
        let songs = songs.into_iter().map(|song| (song.id, song)).collect();
        Self { songs, versions }
    }

    pub fn get(&self, id: SongId) -> Option<&Song> {
        self.songs.get(&id)
    }

    pub fn songs(&self) -> impl Iterator<Item = &Song> {
        self.songs.values()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn versions(&self) -> &BTreeMap<u32, String> {
        &self.versions
    }

    /// 版本数量：目录中出现的版本与配置了名称的版本的并集
    pub fn version_count(&self) -> usize {
        let mut series: Vec<u32> = self.songs.values().map(|song| song.series).collect();
        series.extend(self.versions.keys().copied());
        series.sort_unstable();
        series.dedup();
        series.len()
    }

    /// 版本名称，没有配置时回退为 "Series N"
    pub fn version_label(&self, series: u32) -> String {
        self.versions
            .get(&series)
            .cloned()
            .unwrap_or_else(|| format!("Series {series}"))
    }
}
