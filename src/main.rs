use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use std::sync::Arc;
use std::time::Duration;

mod config;
mod controllers;
mod models;
mod routes;
mod services;
mod utils;

use config::CONFIG;
use services::{
    HttpSnapshotSource, LeaderboardOptions, LeaderboardService, LeaderboardStore, NavigationSync,
    RefreshScheduler,
};
use utils::data_loader::load_catalog;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 加载.env文件
    dotenv().ok();

    // 初始化日志
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    // 歌曲目录在启动时加载一次
    let catalog = match load_catalog(&CONFIG) {
        Ok(catalog) => {
            if catalog.is_empty() {
                log::warn!("歌曲目录为空，排行榜将没有任何歌曲");
            }
            Arc::new(catalog)
        }
        Err(e) => {
            log::error!("加载歌曲目录失败: {}", e);
            std::process::exit(1);
        }
    };

    let navigation = match NavigationSync::new(&CONFIG.enabled_sorts(), catalog.version_count()) {
        Ok(navigation) => navigation,
        Err(e) => {
            log::error!("排序配置无效: {}", e);
            std::process::exit(1);
        }
    };

    let store = LeaderboardStore::default();
    let service = web::Data::new(LeaderboardService::new(
        catalog,
        store.clone(),
        LeaderboardOptions::from_config(&CONFIG),
        navigation,
    ));

    log::info!(
        "每 {} 秒从 {} 刷新成绩",
        CONFIG.refresh_interval_secs,
        CONFIG.refresh_url
    );
    RefreshScheduler::new(
        HttpSnapshotSource::new(CONFIG.refresh_url.clone()),
        store,
        Duration::from_secs(CONFIG.refresh_interval_secs.max(1)),
    )
    .spawn();

    let host = CONFIG.host.clone();
    let port = CONFIG.port;
    log::info!("Starting server at http://{}:{}", host, port);
    log::info!("Swagger UI: http://{}:{}/swagger-ui/", host, port);

    // 创建并启动HTTP服务器
    HttpServer::new(move || {
        // 配置CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(service.clone())
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .configure(routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
