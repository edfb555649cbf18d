use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::AppConfig;
use crate::models::{Song, SongCatalog, SongId};
use crate::utils::error::AppResult;

// songs.csv 的一行
#[derive(Debug, Deserialize)]
struct SongRecord {
    id: SongId,
    name: String,
    #[serde(default)]
    artist: String,
    category: u32,
    #[serde(default)]
    diff0: u32,
    #[serde(default)]
    diff1: u32,
    #[serde(default)]
    diff2: u32,
    #[serde(default)]
    diff3: u32,
    #[serde(default)]
    diff4: u32,
    #[serde(default)]
    diff5: u32,
    #[serde(default)]
    diff6: u32,
    #[serde(default)]
    diff7: u32,
    #[serde(default)]
    diff8: u32,
    #[serde(default)]
    diff9: u32,
}

impl From<SongRecord> for Song {
    fn from(record: SongRecord) -> Self {
        Song {
            id: record.id,
            name: record.name,
            artist: record.artist,
            series: record.category,
            difficulties: [
                record.diff0,
                record.diff1,
                record.diff2,
                record.diff3,
                record.diff4,
                record.diff5,
                record.diff6,
                record.diff7,
                record.diff8,
                record.diff9,
            ],
        }
    }
}

/// 加载歌曲目录，解析失败的行记录日志后跳过
pub fn load_songs(path: &Path) -> AppResult<Vec<Song>> {
    log::debug!("正在加载歌曲信息，路径: {}", path.display());
    let mut rdr = csv::Reader::from_path(path)?;
    let mut songs = Vec::new();

    for (index, result) in rdr.deserialize::<SongRecord>().enumerate() {
        let line_num = index + 2; // +1 for header, +1 for 1-based index
        match result {
            Ok(record) => songs.push(Song::from(record)),
            Err(e) => log::error!("解析 {} 第 {} 行失败: {}", path.display(), line_num, e),
        }
    }

    log::debug!("歌曲信息加载完成，共 {} 条", songs.len());
    Ok(songs)
}

/// 版本名称表，文件不存在时为空 (界面回退为 "Series N")
pub fn load_versions(path: &Path) -> AppResult<BTreeMap<u32, String>> {
    if !path.exists() {
        log::warn!("版本名称文件不存在: {}", path.display());
        return Ok(BTreeMap::new());
    }
    let content = fs::read_to_string(path)?;
    let versions: BTreeMap<u32, String> = serde_yaml::from_str(&content)?;
    log::debug!("版本名称加载完成，共 {} 条", versions.len());
    Ok(versions)
}

pub fn load_catalog(config: &AppConfig) -> AppResult<SongCatalog> {
    let songs = load_songs(&config.songs_path())?;
    let versions = load_versions(&config.versions_path())?;
    log::info!("已加载 {} 首歌曲, {} 个版本", songs.len(), versions.len());
    Ok(SongCatalog::new(songs, versions))
}
