use std::collections::{BTreeMap, HashMap};

use crate::models::{ChartSlot, ScoreRecord, SongId};

pub type ChartRecords = BTreeMap<ChartSlot, ScoreRecord>;

/// 成绩索引：songid -> 谱面 -> 最佳成绩
///
/// 每次刷新都整体重建，不做增量更新。同一 (songid, chart) 出现多次时以最后一条为准。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreIndex {
    songs: HashMap<SongId, ChartRecords>,
}

impl ScoreIndex {
    pub fn build(records: &[ScoreRecord]) -> Self {
        let mut songs: HashMap<SongId, ChartRecords> = HashMap::new();
        for record in records {
            songs
                .entry(record.songid)
                .or_default()
                .insert(record.chart, record.clone());
        }
        log::debug!("成绩索引重建完成: {} 条记录, {} 首歌曲", records.len(), songs.len());
        Self { songs }
    }

    pub fn song(&self, songid: SongId) -> Option<&ChartRecords> {
        self.songs.get(&songid)
    }

    pub fn record(&self, songid: SongId, chart: ChartSlot) -> Option<&ScoreRecord> {
        self.songs.get(&songid).and_then(|charts| charts.get(&chart))
    }

    /// 歌曲在所有谱面上的总游玩次数
    pub fn plays(&self, songid: SongId) -> u32 {
        total_plays(self.song(songid))
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    pub fn record_count(&self) -> usize {
        self.songs.values().map(BTreeMap::len).sum()
    }
}

/// 累加一首歌 10 个谱面的游玩次数，缺失的谱面按 0 计
pub fn total_plays(charts: Option<&ChartRecords>) -> u32 {
    let Some(charts) = charts else {
        return 0;
    };
    ChartSlot::all()
        .filter_map(|slot| charts.get(&slot))
        .map(|record| record.plays)
        .fold(0u32, u32::saturating_add)
}
