use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub info_data_path: String,
    pub songs_file: String,
    pub versions_file: String,
    /// 上游成绩快照地址
    pub refresh_url: String,
    pub refresh_interval_secs: u64,
    /// 隐藏没有任何成绩的歌曲
    pub filter_empty_songs: bool,
    pub show_player_names: bool,
    /// 启用 grade / clear 两种按个人成绩的排序
    pub show_personal_sort: bool,
    pub page_limit: usize,
    pub series_group_threshold: usize,
    pub session_ttl_secs: u64,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => parse_flag(&value).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: env_or("HOST", "127.0.0.1"),
            port: env_parse("PORT", 8080),
            info_data_path: env_or("INFO_DATA_PATH", "data"),
            songs_file: env_or("SONGS_FILE", "songs.csv"),
            versions_file: env_or("VERSIONS_FILE", "versions.yaml"),
            refresh_url: env_or("REFRESH_URL", "http://127.0.0.1:8081/records.json"),
            refresh_interval_secs: env_parse("REFRESH_INTERVAL_SECS", 15),
            filter_empty_songs: env_flag("FILTER_EMPTY_SONGS", false),
            show_player_names: env_flag("SHOW_PLAYER_NAMES", true),
            show_personal_sort: env_flag("SHOW_PERSONAL_SORT", false),
            page_limit: env_parse("PAGE_LIMIT", 10),
            series_group_threshold: env_parse("SERIES_GROUP_THRESHOLD", 99),
            session_ttl_secs: env_parse("SESSION_TTL_SECS", 1800),
        }
    }
}

impl AppConfig {
    pub fn songs_path(&self) -> PathBuf {
        PathBuf::from(&self.info_data_path).join(&self.songs_file)
    }

    pub fn versions_path(&self) -> PathBuf {
        PathBuf::from(&self.info_data_path).join(&self.versions_file)
    }

    /// 按显示顺序排列的排序方式
    pub fn enabled_sorts(&self) -> Vec<&'static str> {
        let mut sorts = vec!["series", "name", "popularity"];
        if self.show_personal_sort {
            sorts.extend(["grade", "clear"]);
        }
        sorts
    }
}

lazy_static! {
    pub static ref CONFIG: Arc<AppConfig> = Arc::new(AppConfig::default());
}
