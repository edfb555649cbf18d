use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::{
    selectable_chart_names, ChartCell, ChartSlot, LeaderboardMeta, LeaderboardRow, LeaderboardView,
    LocationEntry, NavigationState, PageInfo, PlayerCell, ScoreCell, SessionEvent, SessionView,
    SongCatalog, SongId, SongRow, SortMode, SortOption, SubsortSelector, VersionInfo,
};
use crate::services::navigation::{HistoryLocation, Location, NavEvent, NavigationSync};
use crate::services::pagination::{GroupPage, PageWindow};
use crate::services::ranking::{RankedEntry, RankedList, RankingEngine};
use crate::services::refresh::{LeaderboardData, LeaderboardStore};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct LeaderboardOptions {
    pub filter_empty_songs: bool,
    pub show_player_names: bool,
    pub page_limit: usize,
    /// series 列表超过该长度时改为按版本翻页
    pub series_group_threshold: usize,
    pub session_ttl: Duration,
}

impl Default for LeaderboardOptions {
    fn default() -> Self {
        Self {
            filter_empty_songs: false,
            show_player_names: true,
            page_limit: 10,
            series_group_threshold: 99,
            session_ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl LeaderboardOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            filter_empty_songs: config.filter_empty_songs,
            show_player_names: config.show_player_names,
            page_limit: config.page_limit.max(1),
            series_group_threshold: config.series_group_threshold,
            session_ttl: Duration::from_secs(config.session_ttl_secs),
        }
    }
}

/// 会话：视图状态 + 地址历史
#[derive(Debug)]
struct Session {
    state: NavigationState,
    history: HistoryLocation,
}

enum PageMode {
    /// 一次显示全部 (数量不多的 series 列表)
    All,
    Rows(PageWindow),
    Groups(GroupPage),
}

struct Layout {
    list: RankedList,
    sub_index: usize,
    mode: PageMode,
}

/// 排行榜服务，持有目录、当前数据、配置和会话
#[derive(Clone)]
pub struct LeaderboardService {
    catalog: Arc<SongCatalog>,
    store: LeaderboardStore,
    options: LeaderboardOptions,
    navigation: NavigationSync,
    engine: RankingEngine,
    /// 同一会话的事件持锁逐个处理
    sessions: Cache<String, Arc<Mutex<Session>>>,
}

impl LeaderboardService {
    pub fn new(
        catalog: Arc<SongCatalog>,
        store: LeaderboardStore,
        options: LeaderboardOptions,
        navigation: NavigationSync,
    ) -> Self {
        let sessions = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(options.session_ttl)
            .build();
        Self {
            engine: RankingEngine::new(options.filter_empty_songs),
            catalog,
            store,
            options,
            navigation,
            sessions,
        }
    }

    pub fn store(&self) -> &LeaderboardStore {
        &self.store
    }

    pub fn catalog(&self) -> &SongCatalog {
        &self.catalog
    }

    pub fn meta(&self) -> LeaderboardMeta {
        LeaderboardMeta {
            sorts: self
                .navigation
                .sorts()
                .iter()
                .map(|&sort| SortOption {
                    value: sort,
                    label: sort.label().to_string(),
                })
                .collect(),
            charts: selectable_chart_names(),
            versions: self
                .catalog
                .versions()
                .iter()
                .map(|(&series, label)| VersionInfo {
                    series,
                    label: label.clone(),
                })
                .collect(),
            page_limit: self.options.page_limit,
            show_player_names: self.options.show_player_names,
        }
    }

    /// 无会话渲染：直接打开某个地址时的第一页
    pub fn render_location(&self, entry: Option<LocationEntry>) -> LeaderboardView {
        let history = HistoryLocation::from_entry(entry);
        let mut state = self.navigation.parse_initial(&history);
        let data = self.store.snapshot();
        self.build_view(&mut state, &data)
    }

    pub async fn create_session(&self, entry: Option<LocationEntry>) -> SessionView {
        let history = HistoryLocation::from_entry(entry);
        let state = self.navigation.parse_initial(&history);
        let session_id = Uuid::new_v4().to_string();
        log::info!("创建排行榜会话 {}: sort={}, subsort='{}'", session_id, state.sort, state.subselection);

        let mut session = Session { state, history };
        let view = self.render_session(&session_id, &mut session, None);
        self.sessions
            .insert(session_id, Arc::new(Mutex::new(session)))
            .await;
        view
    }

    pub async fn get_session(&self, session_id: &str) -> AppResult<SessionView> {
        let handle = self.load_session(session_id).await?;
        let mut session = handle.lock().await;
        Ok(self.render_session(session_id, &mut session, None))
    }

    pub async fn handle_event(&self, session_id: &str, event: SessionEvent) -> AppResult<SessionView> {
        let handle = self.load_session(session_id).await?;
        let mut session = handle.lock().await;
        log::debug!("会话 {} 收到事件: {:?}", session_id, event);

        let nav_event = match event {
            SessionEvent::Sort { sort } => Some(NavEvent::SelectSort(sort.parse::<SortMode>()?)),
            SessionEvent::Subsort { index } => Some(NavEvent::SelectSubsort(index)),
            SessionEvent::NextPage => self.page_event(&session.state, true),
            SessionEvent::PrevPage => self.page_event(&session.state, false),
            SessionEvent::Back => session.history.back().map(NavEvent::External),
            SessionEvent::Forward => session.history.forward().map(NavEvent::External),
        };

        let pushed = match nav_event {
            Some(nav_event) => {
                let Session { state, history } = &mut *session;
                let transition = self.navigation.dispatch(state, nav_event, history);
                *state = transition.state;
                transition.push
            }
            None => None,
        };

        Ok(self.render_session(session_id, &mut session, pushed))
    }

    async fn load_session(&self, session_id: &str) -> AppResult<Arc<Mutex<Session>>> {
        self.sessions
            .get(session_id)
            .await
            .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))
    }

    /// 渲染会话。收回的 offset 和回退的版本写回状态，地址的当前记录与状态保持一致
    fn render_session(
        &self,
        session_id: &str,
        session: &mut Session,
        pushed: Option<LocationEntry>,
    ) -> SessionView {
        let data = self.store.snapshot();
        let view = self.build_view(&mut session.state, &data);
        let location = LocationEntry::from_state(&session.state);
        if session.history.current().is_some_and(|current| current != location) {
            session.history.replace(location.clone());
        }
        SessionView {
            session_id: session_id.to_string(),
            state: session.state.clone(),
            fragment: location.to_fragment(),
            location,
            pushed,
            view,
        }
    }

    /// 翻页：按行翻页只改 offset，按版本翻页等同于切换版本
    fn page_event(&self, state: &NavigationState, forward: bool) -> Option<NavEvent> {
        let data = self.store.snapshot();
        let layout = self.layout(state, &data);
        match layout.mode {
            PageMode::All => None,
            PageMode::Rows(window) => {
                let offset = if forward {
                    window.next_offset()?
                } else {
                    window.prev_offset()
                };
                (offset != state.offset).then_some(NavEvent::SetOffset(offset))
            }
            PageMode::Groups(page) => {
                let target = if forward { page.next() } else { page.prev() };
                target.map(NavEvent::SelectSubsort)
            }
        }
    }

    fn layout(&self, state: &NavigationState, data: &LeaderboardData) -> Layout {
        let sub_index = self.navigation.sub_index(state);
        let list = self.engine.rank(&self.catalog, &data.index, state.sort, sub_index);
        let mode = match state.sort {
            SortMode::Series if list.len() > self.options.series_group_threshold => {
                PageMode::Groups(GroupPage::new(list.group_count(), sub_index))
            }
            SortMode::Series => PageMode::All,
            _ => PageMode::Rows(PageWindow::new(list.len(), state.offset, self.options.page_limit)),
        };
        Layout {
            list,
            sub_index,
            mode,
        }
    }

    fn build_view(&self, state: &mut NavigationState, data: &LeaderboardData) -> LeaderboardView {
        let Layout {
            list,
            sub_index,
            mode,
        } = self.layout(state, data);

        let no_records = list.is_empty();
        let popularity = state.sort == SortMode::Popularity;

        let (visible, first_position, page): (&[RankedEntry], usize, PageInfo) = match &mode {
            PageMode::All => (
                list.entries.as_slice(),
                0,
                PageInfo {
                    offset: 0,
                    limit: list.len(),
                    total: list.len(),
                    has_prev: false,
                    has_next: false,
                    by_group: false,
                },
            ),
            PageMode::Rows(window) => {
                state.offset = window.offset;
                (
                    window.slice(&list.entries),
                    window.offset,
                    PageInfo {
                        offset: window.offset,
                        limit: window.limit,
                        total: window.total,
                        has_prev: window.has_prev(),
                        has_next: window.has_next(),
                        by_group: false,
                    },
                )
            }
            PageMode::Groups(group) => {
                state.subselection = group.index.to_string();
                (
                    list.group(group.index),
                    0,
                    PageInfo {
                        offset: group.index,
                        limit: 1,
                        total: group.count,
                        has_prev: group.has_prev(),
                        has_next: group.has_next(),
                        by_group: true,
                    },
                )
            }
        };

        let rows = visible
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| match entry {
                RankedEntry::GroupHeader { series, label } => Some(LeaderboardRow::Header {
                    series: *series,
                    label: label.clone(),
                }),
                RankedEntry::Song(id) => {
                    let position = popularity.then_some(first_position + i + 1);
                    self.song_row(*id, data, position).map(LeaderboardRow::Song)
                }
            })
            .collect();

        let subsort = match (&mode, state.sort) {
            (PageMode::Groups(group), SortMode::Series) => Some(SubsortSelector {
                label: "Version".to_string(),
                options: list.group_labels(),
                index: group.index,
            }),
            (_, SortMode::Grade) => Some(SubsortSelector {
                label: "Difficulty".to_string(),
                options: selectable_chart_names(),
                index: sub_index,
            }),
            (_, SortMode::Clear) => Some(SubsortSelector {
                label: "Chart".to_string(),
                options: selectable_chart_names(),
                index: sub_index,
            }),
            _ => None,
        };

        LeaderboardView {
            sort: state.sort,
            sort_label: state.sort.label().to_string(),
            subsort,
            rows,
            no_records,
            page,
            updated_at: data.updated_at,
        }
    }

    fn song_row(&self, id: SongId, data: &LeaderboardData, position: Option<usize>) -> Option<SongRow> {
        let song = self.catalog.get(id)?;
        let charts = ChartSlot::all()
            .map(|slot| ChartCell {
                slot: slot.into(),
                difficulty: song.difficulty(slot),
                score: data.index.record(id, slot).map(|record| ScoreCell {
                    rank: record.rank.clone(),
                    points: record.points,
                    combo: (record.combo > 0).then_some(record.combo),
                    halo: record.halo.clone(),
                    player: self.player_cell(record.userid, data),
                }),
            })
            .collect();

        Some(SongRow {
            id,
            name: song.name.clone(),
            artist: song.artist.clone(),
            position,
            plays: position.map(|_| data.index.plays(id)),
            charts,
        })
    }

    fn player_cell(&self, userid: Option<u64>, data: &LeaderboardData) -> Option<PlayerCell> {
        if !self.options.show_player_names {
            return None;
        }
        let userid = userid?;
        let name = data
            .players
            .get(&userid)
            .map(|player| player.name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        Some(PlayerCell { userid, name })
    }
}
