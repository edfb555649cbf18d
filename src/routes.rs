use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::controllers;
use crate::utils::error::AppError;

#[derive(OpenApi)]
#[openapi(
    paths(
        controllers::health::health_check,
        controllers::leaderboard::get_records,
        controllers::leaderboard::get_meta,
        controllers::leaderboard::create_session,
        controllers::leaderboard::get_session,
        controllers::leaderboard::post_event,
    ),
    tags(
        (name = "records", description = "成绩排行榜")
    )
)]
pub struct ApiDoc;

pub fn configure(cfg: &mut web::ServiceConfig) {
    // 请求体解析失败统一返回 JSON 错误
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    );

    cfg
        .service(controllers::health_check)      // GET /health
        .service(controllers::get_meta)          // GET /records/meta
        .service(controllers::get_records)       // GET /records
        .service(controllers::create_session)    // POST /records/session
        .service(controllers::get_session)       // GET /records/session/{id}
        .service(controllers::post_event);       // POST /records/session/{id}/event

    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
