use crate::models::{selectable_chart_names, LocationEntry, NavigationState, SortMode};
use crate::utils::error::{AppError, AppResult};

/// 可前进/后退的地址，浏览器历史记录的抽象
pub trait Location {
    fn current(&self) -> Option<LocationEntry>;
    fn push(&mut self, entry: LocationEntry);
    /// 改写当前记录，不产生新的历史
    fn replace(&mut self, entry: LocationEntry);
}

/// 内存中的历史记录栈，会话使用
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLocation {
    entries: Vec<LocationEntry>,
    cursor: usize,
}

impl HistoryLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entry(entry: Option<LocationEntry>) -> Self {
        let mut history = Self::new();
        if let Some(entry) = entry {
            history.push(entry);
        }
        history
    }

    pub fn back(&mut self) -> Option<LocationEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    pub fn forward(&mut self) -> Option<LocationEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }
}

impl Location for HistoryLocation {
    fn current(&self) -> Option<LocationEntry> {
        self.entries.get(self.cursor).cloned()
    }

    fn push(&mut self, entry: LocationEntry) {
        // 新记录会丢弃当前位置之后的前进历史
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }

    fn replace(&mut self, entry: LocationEntry) {
        match self.entries.get_mut(self.cursor) {
            Some(current) => *current = entry,
            None => self.push(entry),
        }
    }
}

/// 视图状态的变化事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    SelectSort(SortMode),
    SelectSubsort(usize),
    SetOffset(usize),
    /// 后退/前进带来的地址变化
    External(LocationEntry),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: NavigationState,
    /// 需要写入地址的记录
    pub push: Option<LocationEntry>,
}

impl Transition {
    fn unchanged(state: &NavigationState) -> Self {
        Self {
            state: state.clone(),
            push: None,
        }
    }
}

/// 视图状态与地址之间的双向同步
#[derive(Debug, Clone)]
pub struct NavigationSync {
    sorts: Vec<SortMode>,
    version_count: usize,
}

impl NavigationSync {
    /// 排序名称来自配置，未知名称视为配置错误
    pub fn new<S: AsRef<str>>(enabled_sorts: &[S], version_count: usize) -> AppResult<Self> {
        let mut sorts = Vec::with_capacity(enabled_sorts.len());
        for name in enabled_sorts {
            let mode: SortMode = name
                .as_ref()
                .trim()
                .parse()
                .map_err(|_| AppError::ConfigError(format!("未知的排序方式: {}", name.as_ref())))?;
            if !sorts.contains(&mode) {
                sorts.push(mode);
            }
        }
        if sorts.is_empty() {
            return Err(AppError::ConfigError("至少需要启用一种排序方式".to_string()));
        }
        Ok(Self {
            sorts,
            version_count,
        })
    }

    pub fn sorts(&self) -> &[SortMode] {
        &self.sorts
    }

    pub fn is_enabled(&self, sort: SortMode) -> bool {
        self.sorts.contains(&sort)
    }

    pub fn default_sort(&self) -> SortMode {
        if self.is_enabled(SortMode::Series) {
            SortMode::Series
        } else {
            self.sorts[0]
        }
    }

    /// 排序方式对应的副选择取值，name / popularity 没有副选择
    pub fn valid_domain(&self, sort: SortMode) -> Vec<String> {
        match sort {
            SortMode::Series => (0..self.version_count).map(|index| index.to_string()).collect(),
            SortMode::Grade | SortMode::Clear => selectable_chart_names(),
            SortMode::Name | SortMode::Popularity => Vec::new(),
        }
    }

    /// 当前副选择在取值列表中的下标，找不到时为 0
    pub fn sub_index(&self, state: &NavigationState) -> usize {
        self.valid_domain(state.sort)
            .iter()
            .position(|candidate| *candidate == state.subselection)
            .unwrap_or(0)
    }

    pub fn initial_state(&self) -> NavigationState {
        self.resolve_external(self.default_sort().as_str(), None)
    }

    /// 把地址中的 (sort, subsort) 解析为合法的状态，offset 归零
    pub fn resolve_external(&self, sort: &str, raw: Option<&str>) -> NavigationState {
        let sort = match sort.parse::<SortMode>() {
            Ok(mode) if self.is_enabled(mode) => mode,
            _ => {
                log::debug!("地址中的排序方式 '{}' 无效，使用默认排序", sort);
                self.default_sort()
            }
        };

        let domain = self.valid_domain(sort);
        let subselection = if domain.is_empty() {
            raw.unwrap_or_default().to_string()
        } else {
            match raw {
                Some(raw) if domain.iter().any(|candidate| candidate == raw) => raw.to_string(),
                _ => domain[0].clone(),
            }
        };

        NavigationState {
            sort,
            subselection,
            offset: 0,
        }
    }

    pub fn parse_initial<L: Location>(&self, location: &L) -> NavigationState {
        match location.current() {
            Some(entry) => self.resolve_external(&entry.sort, entry.subsort.as_deref()),
            None => self.initial_state(),
        }
    }

    /// 纯状态转换: (旧状态, 事件) -> (新状态, 需要写入地址的记录)
    pub fn apply(&self, state: &NavigationState, event: NavEvent) -> Transition {
        match event {
            NavEvent::SelectSort(sort) => {
                if sort == state.sort {
                    return Transition::unchanged(state);
                }
                if !self.is_enabled(sort) {
                    log::warn!("排序方式 {} 未启用，忽略", sort);
                    return Transition::unchanged(state);
                }
                let next = NavigationState {
                    sort,
                    subselection: self.valid_domain(sort).into_iter().next().unwrap_or_default(),
                    offset: 0,
                };
                let push = LocationEntry::from_state(&next);
                Transition {
                    state: next,
                    push: Some(push),
                }
            }
            NavEvent::SelectSubsort(index) => {
                let domain = self.valid_domain(state.sort);
                if domain.is_empty() {
                    return Transition::unchanged(state);
                }
                let index = if index < domain.len() { index } else { 0 };
                if domain[index] == state.subselection {
                    return Transition::unchanged(state);
                }
                let next = NavigationState {
                    sort: state.sort,
                    subselection: domain[index].clone(),
                    offset: 0,
                };
                let push = LocationEntry::from_state(&next);
                Transition {
                    state: next,
                    push: Some(push),
                }
            }
            NavEvent::SetOffset(offset) => Transition {
                state: NavigationState {
                    offset,
                    ..state.clone()
                },
                push: None,
            },
            NavEvent::External(entry) => Transition {
                state: self.resolve_external(&entry.sort, entry.subsort.as_deref()),
                push: None,
            },
        }
    }

    /// 执行转换并把结果写入地址
    pub fn dispatch<L: Location>(
        &self,
        state: &NavigationState,
        event: NavEvent,
        location: &mut L,
    ) -> Transition {
        let transition = self.apply(state, event);
        if let Some(entry) = &transition.push {
            location.push(entry.clone());
        }
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(fragment: &str) -> HistoryLocation {
        HistoryLocation::from_entry(LocationEntry::parse_fragment(fragment))
    }

    fn fragment(location: &HistoryLocation) -> Option<String> {
        location.current().map(|entry| entry.to_fragment())
    }

    fn sync() -> NavigationSync {
        NavigationSync::new(&["series", "name", "popularity", "grade", "clear"], 4).unwrap()
    }

    #[test]
    fn test_unknown_sort_in_config_is_fatal() {
        let err = NavigationSync::new(&["series", "rating"], 3).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        let empty: [&str; 0] = [];
        assert!(NavigationSync::new(&empty, 3).is_err());
    }

    #[test]
    fn test_valid_domains() {
        let sync = sync();
        assert_eq!(sync.valid_domain(SortMode::Series), vec!["0", "1", "2", "3"]);
        assert_eq!(sync.valid_domain(SortMode::Grade).len(), 9);
        assert_eq!(sync.valid_domain(SortMode::Clear)[8], "DP Challenge");
        assert!(sync.valid_domain(SortMode::Name).is_empty());
    }

    #[test]
    fn test_init_defaults() {
        let sync = sync();
        let state = sync.parse_initial(&HistoryLocation::new());
        assert_eq!(state.sort, SortMode::Series);
        assert_eq!(state.subselection, "0");

        let state = sync.parse_initial(&at("series/17"));
        assert_eq!(state.subselection, "0");

        let state = sync.parse_initial(&at("bogus/SP Expert"));
        assert_eq!(state.sort, SortMode::Series);

        let state = sync.parse_initial(&at("grade/DP Expert"));
        assert_eq!(state.sort, SortMode::Grade);
        assert_eq!(sync.sub_index(&state), 7);
    }

    #[test]
    fn test_disabled_sort_falls_back() {
        let sync = NavigationSync::new(&["series", "name", "popularity"], 2).unwrap();
        let state = sync.resolve_external("clear", Some("SP Basic"));
        assert_eq!(state.sort, SortMode::Series);
        let transition = sync.apply(&state, NavEvent::SelectSort(SortMode::Grade));
        assert_eq!(transition.state, state);
        assert!(transition.push.is_none());
    }

    #[test]
    fn test_sort_change_resets_and_pushes() {
        let sync = sync();
        let mut location = HistoryLocation::new();
        let state = NavigationState {
            sort: SortMode::Series,
            subselection: "2".to_string(),
            offset: 30,
        };
        let transition = sync.dispatch(&state, NavEvent::SelectSort(SortMode::Grade), &mut location);
        assert_eq!(transition.state.sort, SortMode::Grade);
        assert_eq!(transition.state.subselection, "SP Beginner");
        assert_eq!(transition.state.offset, 0);
        assert_eq!(fragment(&location).as_deref(), Some("grade/SP Beginner"));

        // 重复选择同一排序不产生新的地址记录
        let again = sync.dispatch(&transition.state, NavEvent::SelectSort(SortMode::Grade), &mut location);
        assert!(again.push.is_none());
        assert_eq!(location.entries.len(), 1);
    }

    #[test]
    fn test_subsort_change_resets_offset() {
        let sync = sync();
        let state = NavigationState {
            sort: SortMode::Clear,
            subselection: "SP Basic".to_string(),
            offset: 20,
        };
        let transition = sync.apply(&state, NavEvent::SelectSubsort(3));
        assert_eq!(transition.state.subselection, "SP Expert");
        assert_eq!(transition.state.offset, 0);
        assert_eq!(transition.push, Some(LocationEntry::new("clear", Some("SP Expert".into()))));

        let out_of_range = sync.apply(&state, NavEvent::SelectSubsort(40));
        assert_eq!(out_of_range.state.subselection, "SP Beginner");

        let name_state = sync.resolve_external("name", None);
        assert!(sync.apply(&name_state, NavEvent::SelectSubsort(1)).push.is_none());
    }

    #[test]
    fn test_paging_never_pushes() {
        let sync = sync();
        let state = sync.resolve_external("popularity", None);
        let transition = sync.apply(&state, NavEvent::SetOffset(10));
        assert_eq!(transition.state.offset, 10);
        assert_eq!(transition.state.sort, SortMode::Popularity);
        assert!(transition.push.is_none());
    }

    #[test]
    fn test_external_change_resolves_without_push() {
        let sync = sync();
        let mut location = HistoryLocation::new();
        let state = sync.initial_state();
        let entry = LocationEntry::new("clear", Some("nonsense".to_string()));
        let transition = sync.dispatch(&state, NavEvent::External(entry), &mut location);
        assert_eq!(transition.state.sort, SortMode::Clear);
        assert_eq!(transition.state.subselection, "SP Beginner");
        assert!(transition.push.is_none());
        assert!(location.entries.is_empty());
    }

    #[test]
    fn test_push_then_parse_round_trip() {
        let sync = sync();
        let mut location = HistoryLocation::new();
        let state = sync.initial_state();
        let sorted = sync.dispatch(&state, NavEvent::SelectSort(SortMode::Clear), &mut location);
        let picked = sync.dispatch(&sorted.state, NavEvent::SelectSubsort(6), &mut location);

        let restored = sync.parse_initial(&at(&fragment(&location).unwrap()));
        assert_eq!(restored.sort, picked.state.sort);
        assert_eq!(restored.subselection, picked.state.subselection);

        for mode in [SortMode::Name, SortMode::Popularity, SortMode::Series] {
            let mut location = HistoryLocation::new();
            let moved = sync.dispatch(&restored, NavEvent::SelectSort(mode), &mut location);
            let fresh = sync.parse_initial(&at(&fragment(&location).unwrap()));
            assert_eq!((fresh.sort, fresh.subselection), (moved.state.sort, moved.state.subselection));
        }
    }

    #[test]
    fn test_history_back_and_forward() {
        let mut history = at("series/0");
        history.push(LocationEntry::new("name", None));
        history.push(LocationEntry::new("grade", Some("SP Expert".into())));

        assert_eq!(history.back(), Some(LocationEntry::new("name", None)));
        assert_eq!(history.back().map(|entry| entry.sort), Some("series".to_string()));
        assert_eq!(history.back(), None);
        assert_eq!(history.forward().map(|entry| entry.sort), Some("name".to_string()));

        // 在历史中间写入会丢弃前进记录
        history.push(LocationEntry::new("popularity", None));
        assert_eq!(history.forward(), None);
        assert_eq!(history.entries.len(), 3);
    }

    #[test]
    fn test_replace_rewrites_current_entry() {
        let mut history = at("series/0");
        history.push(LocationEntry::new("series", Some("2".into())));
        history.replace(LocationEntry::new("series", Some("0".into())));
        assert_eq!(history.entries.len(), 2);
        assert_eq!(fragment(&history).as_deref(), Some("series/0"));
        assert_eq!(history.back().and_then(|entry| entry.subsort), Some("0".to_string()));

        let mut empty = HistoryLocation::new();
        empty.replace(LocationEntry::new("name", None));
        assert_eq!(fragment(&empty).as_deref(), Some("name"));
    }
}
