use chrono::{DateTime, Utc};
use reqwest::Client;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::models::{PlayerInfo, RecordSnapshot, UserId};
use crate::services::score_index::ScoreIndex;
use crate::utils::error::{AppError, AppResult};

/// 一次刷新得到的完整数据，成绩索引与玩家表总是来自同一个快照
#[derive(Debug, Clone, Default)]
pub struct LeaderboardData {
    pub index: ScoreIndex,
    pub players: HashMap<UserId, PlayerInfo>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LeaderboardData {
    pub fn from_snapshot(snapshot: RecordSnapshot) -> Self {
        Self {
            index: ScoreIndex::build(&snapshot.records),
            players: snapshot.players,
            updated_at: Some(Utc::now()),
        }
    }
}

/// 当前数据的持有者，刷新时整体替换
#[derive(Debug, Clone, Default)]
pub struct LeaderboardStore {
    current: Arc<RwLock<Arc<LeaderboardData>>>,
}

impl LeaderboardStore {
    pub fn new(data: LeaderboardData) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(data))),
        }
    }

    pub fn snapshot(&self) -> Arc<LeaderboardData> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, data: LeaderboardData) {
        let data = Arc::new(data);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = data;
    }
}

/// 成绩快照的来源
pub trait SnapshotSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = AppResult<RecordSnapshot>> + Send;
}

/// 通过 HTTP 拉取上游的成绩快照
#[derive(Clone)]
pub struct HttpSnapshotSource {
    client: Client,
    url: String,
}

impl HttpSnapshotSource {
    pub fn new(url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(3))
            .timeout(Duration::from_secs(12))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("构建 HTTP 客户端失败，回退默认设置: {e}");
                Client::new()
            });
        Self {
            client,
            url: url.into(),
        }
    }
}

impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> AppResult<RecordSnapshot> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::RefreshFailed(format!("{} 返回 {}", self.url, status)));
        }
        Ok(response.json::<RecordSnapshot>().await?)
    }
}

/// 定时刷新成绩。上一次请求结束后才安排下一次，失败不会中断循环
pub struct RefreshScheduler<S> {
    source: S,
    store: LeaderboardStore,
    interval: Duration,
}

impl<S: SnapshotSource + 'static> RefreshScheduler<S> {
    pub fn new(source: S, store: LeaderboardStore, interval: Duration) -> Self {
        Self {
            source,
            store,
            interval,
        }
    }

    /// 拉取一次并替换当前数据，失败时保留旧数据
    pub async fn tick(&self) -> AppResult<()> {
        let snapshot = self.source.fetch().await?;
        let data = LeaderboardData::from_snapshot(snapshot);
        log::info!(
            "成绩已刷新: {} 首歌曲, {} 条记录, {} 名玩家",
            data.index.song_count(),
            data.index.record_count(),
            data.players.len()
        );
        self.store.replace(data);
        Ok(())
    }

    pub async fn run(self) {
        loop {
            if let Err(e) = self.tick().await {
                log::error!("刷新成绩失败: {e}，{} 秒后重试", self.interval.as_secs());
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
