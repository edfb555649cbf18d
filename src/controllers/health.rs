use actix_web::{get, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::LeaderboardService;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    /// 最近一次成功刷新的时间，尚未刷新时为空
    pub updated_at: Option<DateTime<Utc>>,
    pub songs: usize,
    pub records: usize,
}

/// 健康检查端点
///
/// 用于检查服务是否正在运行，并返回成绩数据的新鲜程度。
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "服务健康", body = HealthStatus)
    )
)]
#[get("/health")]
pub async fn health_check(service: web::Data<LeaderboardService>) -> impl Responder {
    let data = service.store().snapshot();
    HttpResponse::Ok().json(HealthStatus {
        status: "OK".to_string(),
        updated_at: data.updated_at,
        songs: service.catalog().len(),
        records: data.index.record_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SongCatalog;
    use crate::services::{LeaderboardOptions, LeaderboardStore, NavigationSync};
    use actix_web::{test, App};
    use serde_json::Value;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_health_before_first_refresh() {
        let service = LeaderboardService::new(
            Arc::new(SongCatalog::default()),
            LeaderboardStore::default(),
            LeaderboardOptions::default(),
            NavigationSync::new(&["series"], 0).unwrap(),
        );
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .service(health_check),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "OK");
        assert!(body["updated_at"].is_null());
        assert_eq!(body["records"], 0);
    }
}
