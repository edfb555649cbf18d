use std::cmp::Reverse;

use crate::models::{ChartSlot, Song, SongCatalog, SongId, SortMode};
use crate::services::score_index::ScoreIndex;

/// 排行结果中的一项：版本标题或歌曲
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankedEntry {
    GroupHeader { series: u32, label: String },
    Song(SongId),
}

impl RankedEntry {
    pub fn is_header(&self) -> bool {
        matches!(self, RankedEntry::GroupHeader { .. })
    }
}

/// 排好序的列表。只有 series 模式包含版本标题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedList {
    pub sort: SortMode,
    pub entries: Vec<RankedEntry>,
}

impl RankedList {
    /// 列表长度 (series 模式包括标题)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 没有任何歌曲可显示
    pub fn is_empty(&self) -> bool {
        !self.entries.iter().any(|entry| !entry.is_header())
    }

    /// 按出现顺序排列的版本名称，下标即版本选择框的下标
    pub fn group_labels(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                RankedEntry::GroupHeader { label, .. } => Some(label.clone()),
                RankedEntry::Song(_) => None,
            })
            .collect()
    }

    pub fn group_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_header()).count()
    }

    /// 第 `group` 个版本分组 (含标题)
    pub fn group(&self, group: usize) -> &[RankedEntry] {
        let starts: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_header())
            .map(|(position, _)| position)
            .collect();
        match starts.get(group) {
            Some(&start) => {
                let end = starts.get(group + 1).copied().unwrap_or(self.entries.len());
                &self.entries[start..end]
            }
            None => &[],
        }
    }
}

/// 根据排序方式生成歌曲顺序
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingEngine {
    /// 过滤掉没有游玩记录的歌曲
    pub filter_empty_songs: bool,
}

impl RankingEngine {
    pub fn new(filter_empty_songs: bool) -> Self {
        Self { filter_empty_songs }
    }

    /// `chart_selection` 只对 grade / clear 生效，超出范围时使用第一个谱面
    pub fn rank(
        &self,
        catalog: &SongCatalog,
        index: &ScoreIndex,
        sort: SortMode,
        chart_selection: usize,
    ) -> RankedList {
        let mut songs: Vec<&Song> = catalog
            .songs()
            .filter(|song| !self.filter_empty_songs || index.plays(song.id) > 0)
            .collect();

        let entries = match sort {
            SortMode::Series => {
                songs.sort_by(|a, b| b.series.cmp(&a.series).then(b.id.cmp(&a.id)));
                group_by_series(catalog, &songs)
            }
            SortMode::Name => {
                songs.sort_by_cached_key(|song| (song.name.to_lowercase(), swap_case(&song.name), song.id));
                flat(&songs)
            }
            SortMode::Popularity => {
                songs.sort_by_cached_key(|song| (Reverse(index.plays(song.id)), song.id));
                flat(&songs)
            }
            SortMode::Grade | SortMode::Clear => {
                let chart = resolve_chart(chart_selection);
                songs.sort_by_cached_key(|song| {
                    let key = index
                        .record(song.id, chart)
                        .map(|record| match sort {
                            SortMode::Grade => record.points,
                            _ => record.lamp,
                        })
                        .unwrap_or(0);
                    (Reverse(key), song.id)
                });
                flat(&songs)
            }
        };

        log::debug!("排序完成: sort={}, 共 {} 项", sort, entries.len());
        RankedList { sort, entries }
    }
}

fn resolve_chart(selection: usize) -> ChartSlot {
    ChartSlot::from_selection(selection)
        .or_else(|| {
            log::debug!("谱面选择 {} 超出范围，使用默认谱面", selection);
            ChartSlot::from_selection(0)
        })
        .unwrap_or_default()
}

/// 忽略大小写相同时小写在前 ("same" < "Same")
fn swap_case(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_lowercase() {
                c.to_uppercase().next().unwrap_or(c)
            } else {
                c.to_lowercase().next().unwrap_or(c)
            }
        })
        .collect()
}

fn flat(songs: &[&Song]) -> Vec<RankedEntry> {
    songs.iter().map(|song| RankedEntry::Song(song.id)).collect()
}

/// 在每个版本的第一首歌前插入标题
fn group_by_series(catalog: &SongCatalog, songs: &[&Song]) -> Vec<RankedEntry> {
    let mut entries = Vec::with_capacity(songs.len() + catalog.version_count());
    let mut current: Option<u32> = None;
    for song in songs {
        if current != Some(song.series) {
            current = Some(song.series);
            entries.push(RankedEntry::GroupHeader {
                series: song.series,
                label: catalog.version_label(song.series),
            });
        }
        entries.push(RankedEntry::Song(song.id));
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreRecord;
    use std::collections::BTreeMap;

    fn song(id: SongId, name: &str, series: u32) -> Song {
        Song {
            id,
            name: name.to_string(),
            artist: "Artist".to_string(),
            series,
            difficulties: [1, 2, 3, 4, 5, 0, 2, 3, 4, 5],
        }
    }

    fn record(songid: SongId, chart: u8, points: u32, lamp: u32, plays: u32) -> ScoreRecord {
        ScoreRecord {
            songid,
            chart: ChartSlot::new(chart).unwrap(),
            rank: "AA".to_string(),
            points,
            combo: 100,
            halo: "clear".to_string(),
            lamp,
            userid: None,
            plays,
        }
    }

    fn catalog(songs: Vec<Song>) -> SongCatalog {
        let mut versions = BTreeMap::new();
        versions.insert(1, "1st Mix".to_string());
        versions.insert(2, "2nd Mix".to_string());
        SongCatalog::new(songs, versions)
    }

    fn ids(list: &RankedList) -> Vec<SongId> {
        list.entries
            .iter()
            .filter_map(|entry| match entry {
                RankedEntry::Song(id) => Some(*id),
                RankedEntry::GroupHeader { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_series_groups_newest_first() {
        let catalog = catalog(vec![song(1, "A", 2), song(2, "B", 2), song(3, "C", 1)]);
        let list = RankingEngine::new(false).rank(&catalog, &ScoreIndex::default(), SortMode::Series, 0);
        assert_eq!(
            list.entries,
            vec![
                RankedEntry::GroupHeader { series: 2, label: "2nd Mix".to_string() },
                RankedEntry::Song(2),
                RankedEntry::Song(1),
                RankedEntry::GroupHeader { series: 1, label: "1st Mix".to_string() },
                RankedEntry::Song(3),
            ]
        );
        assert_eq!(list.group_labels(), vec!["2nd Mix", "1st Mix"]);
        assert_eq!(list.group(1), &[
            RankedEntry::GroupHeader { series: 1, label: "1st Mix".to_string() },
            RankedEntry::Song(3),
        ]);
        assert!(list.group(2).is_empty());
    }

    #[test]
    fn test_series_header_precedes_each_group_once() {
        let songs: Vec<Song> = (1..=30).map(|id| song(id, "X", id % 4)).collect();
        let list = RankingEngine::new(false).rank(&catalog(songs), &ScoreIndex::default(), SortMode::Series, 0);

        let mut seen = Vec::new();
        for (position, entry) in list.entries.iter().enumerate() {
            if let RankedEntry::GroupHeader { series, .. } = entry {
                assert!(!seen.contains(series));
                seen.push(*series);
                match &list.entries[position + 1] {
                    RankedEntry::Song(id) => assert_eq!(id % 4, *series),
                    other => panic!("标题后应为歌曲: {other:?}"),
                }
            }
        }
        assert_eq!(seen, vec![3, 2, 1, 0]);
        assert_eq!(list.group_labels()[3], "Series 0");
    }

    #[test]
    fn test_name_order_lowercase_first_then_id() {
        let catalog = catalog(vec![
            song(9, "Same", 1),
            song(4, "same", 1),
            song(2, "Same", 1),
            song(7, "alpha", 1),
        ]);
        let list = RankingEngine::new(false).rank(&catalog, &ScoreIndex::default(), SortMode::Name, 0);
        // 只差大小写时小写在前，完全相同时按 id 升序
        assert_eq!(ids(&list), vec![7, 4, 2, 9]);
        assert_eq!(list.group_count(), 0);
    }

    #[test]
    fn test_popularity_ties_break_by_ascending_id() {
        let catalog = catalog(vec![song(10, "A", 1), song(20, "B", 1), song(30, "C", 1)]);
        let index = ScoreIndex::build(&[
            record(10, 0, 0, 0, 5),
            record(20, 1, 0, 0, 2),
            record(20, 6, 0, 0, 3),
            record(30, 3, 0, 0, 9),
        ]);
        let list = RankingEngine::new(false).rank(&catalog, &index, SortMode::Popularity, 0);
        assert_eq!(ids(&list), vec![30, 10, 20]);
    }

    #[test]
    fn test_grade_uses_selected_chart_only() {
        let catalog = catalog(vec![song(1, "A", 1), song(2, "B", 1), song(3, "C", 1)]);
        let index = ScoreIndex::build(&[
            record(1, 3, 500, 1, 1),
            record(2, 3, 900, 1, 1),
            record(3, 6, 999, 4, 1),
        ]);
        let engine = RankingEngine::new(false);
        // 下标 3 -> SP Expert
        assert_eq!(ids(&engine.rank(&catalog, &index, SortMode::Grade, 3)), vec![2, 1, 3]);
        // 下标 5 -> DP Basic (槽位 6)
        assert_eq!(ids(&engine.rank(&catalog, &index, SortMode::Grade, 5)), vec![3, 1, 2]);
    }

    #[test]
    fn test_clear_sorts_by_lamp() {
        let catalog = catalog(vec![song(1, "A", 1), song(2, "B", 1), song(3, "C", 1)]);
        let index = ScoreIndex::build(&[
            record(1, 0, 900, 2, 1),
            record(2, 0, 100, 5, 1),
            record(3, 0, 500, 2, 1),
        ]);
        let list = RankingEngine::new(false).rank(&catalog, &index, SortMode::Clear, 0);
        assert_eq!(ids(&list), vec![2, 1, 3]);
    }

    #[test]
    fn test_out_of_range_chart_selection_falls_back() {
        let catalog = catalog(vec![song(1, "A", 1), song(2, "B", 1)]);
        let index = ScoreIndex::build(&[record(2, 0, 10, 0, 1)]);
        let engine = RankingEngine::new(false);
        assert_eq!(
            engine.rank(&catalog, &index, SortMode::Grade, 42),
            engine.rank(&catalog, &index, SortMode::Grade, 0)
        );
    }

    #[test]
    fn test_filter_empty_songs_applies_to_every_mode() {
        let catalog = catalog(vec![song(1, "A", 1), song(5, "E", 2), song(6, "F", 2)]);
        let index = ScoreIndex::build(&[record(1, 0, 10, 1, 3), record(6, 2, 10, 1, 1)]);
        let engine = RankingEngine::new(true);
        for mode in SortMode::ALL {
            let list = engine.rank(&catalog, &index, mode, 0);
            assert!(!ids(&list).contains(&5), "{mode} 中不应包含歌曲 5");
            assert_eq!(ids(&list).len(), 2);
        }
    }

    #[test]
    fn test_everything_filtered_is_empty() {
        let catalog = catalog(vec![song(1, "A", 1)]);
        let list = RankingEngine::new(true).rank(&catalog, &ScoreIndex::default(), SortMode::Series, 0);
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }
}
