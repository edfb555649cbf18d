use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::utils::error::AppError;

/// 排行榜排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Series,
    Name,
    Popularity,
    Grade,
    Clear,
}

impl SortMode {
    pub const ALL: [SortMode; 5] = [
        SortMode::Series,
        SortMode::Name,
        SortMode::Popularity,
        SortMode::Grade,
        SortMode::Clear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Series => "series",
            SortMode::Name => "name",
            SortMode::Popularity => "popularity",
            SortMode::Grade => "grade",
            SortMode::Clear => "clear",
        }
    }

    /// 排序下拉框中显示的名称
    pub fn label(self) -> &'static str {
        match self {
            SortMode::Series => "Series",
            SortMode::Name => "Song Name",
            SortMode::Popularity => "Popularity",
            SortMode::Grade => "Score",
            SortMode::Clear => "Clear Halo",
        }
    }
}

impl FromStr for SortMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| AppError::InvalidSortMode(s.to_string()))
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 页面的视图状态。offset 只存在于会话中，不写入地址
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NavigationState {
    pub sort: SortMode,
    pub subselection: String,
    pub offset: usize,
}

/// 可导航地址中的一条记录 (sort + subsort)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LocationEntry {
    pub sort: String,
    #[serde(default)]
    pub subsort: Option<String>,
}

impl LocationEntry {
    pub fn new(sort: impl Into<String>, subsort: Option<String>) -> Self {
        Self {
            sort: sort.into(),
            subsort,
        }
    }

    pub fn from_state(state: &NavigationState) -> Self {
        let subsort = (!state.subselection.is_empty()).then(|| state.subselection.clone());
        Self::new(state.sort.as_str(), subsort)
    }

    /// 编码为地址片段，如 `grade/SP Expert`
    pub fn to_fragment(&self) -> String {
        match &self.subsort {
            Some(sub) => format!("{}/{}", self.sort, sub),
            None => self.sort.clone(),
        }
    }

    /// 解析地址片段，空字符串视为没有记录
    pub fn parse_fragment(fragment: &str) -> Option<Self> {
        let fragment = fragment.trim().trim_start_matches('#');
        if fragment.is_empty() {
            return None;
        }
        let entry = match fragment.split_once('/') {
            Some((sort, sub)) if !sub.is_empty() => Self::new(sort, Some(sub.to_string())),
            Some((sort, _)) => Self::new(sort, None),
            None => Self::new(fragment, None),
        };
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_mode_parse() {
        assert_eq!("popularity".parse::<SortMode>().unwrap(), SortMode::Popularity);
        assert!(matches!(
            "rating".parse::<SortMode>(),
            Err(AppError::InvalidSortMode(_))
        ));
        for mode in SortMode::ALL {
            assert_eq!(mode.as_str().parse::<SortMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_fragment_round_trip() {
        let entry = LocationEntry::new("clear", Some("DP Expert".to_string()));
        assert_eq!(entry.to_fragment(), "clear/DP Expert");
        assert_eq!(LocationEntry::parse_fragment(&entry.to_fragment()), Some(entry));

        let bare = LocationEntry::new("name", None);
        assert_eq!(LocationEntry::parse_fragment("#name"), Some(bare.clone()));
        assert_eq!(LocationEntry::parse_fragment("name/"), Some(bare));
        assert_eq!(LocationEntry::parse_fragment("  "), None);
    }

    #[test]
    fn test_entry_from_state_skips_empty_subselection() {
        let state = NavigationState {
            sort: SortMode::Popularity,
            subselection: String::new(),
            offset: 20,
        };
        assert_eq!(LocationEntry::from_state(&state), LocationEntry::new("popularity", None));
    }
}
