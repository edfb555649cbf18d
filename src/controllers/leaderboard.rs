use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::models::{
    ApiResponse, LeaderboardMeta, LeaderboardView, LocationEntry, SessionEvent, SessionView,
};
use crate::services::LeaderboardService;
use crate::utils::error::AppResult;

/// 地址中的排序与副选择
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct RecordsQuery {
    /// series / name / popularity / grade / clear
    pub sort: Option<String>,
    /// 版本下标或谱面名称
    pub subsort: Option<String>,
}

impl RecordsQuery {
    fn location(&self) -> Option<LocationEntry> {
        self.sort
            .as_ref()
            .map(|sort| LocationEntry::new(sort.clone(), self.subsort.clone()))
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub sort: Option<String>,
    pub subsort: Option<String>,
    /// 也可以直接传入地址片段，例如 "#grade/SP Expert"
    pub fragment: Option<String>,
}

impl CreateSessionRequest {
    fn location(&self) -> Option<LocationEntry> {
        match (&self.fragment, &self.sort) {
            (Some(fragment), _) => LocationEntry::parse_fragment(fragment),
            (None, Some(sort)) => Some(LocationEntry::new(sort.clone(), self.subsort.clone())),
            (None, None) => None,
        }
    }
}

/// 直接打开某个地址时看到的第一页
#[utoipa::path(
    get,
    path = "/records",
    params(RecordsQuery),
    responses(
        (status = 200, description = "排行榜视图", body = ApiResponse<LeaderboardView>)
    )
)]
#[get("/records")]
pub async fn get_records(
    query: web::Query<RecordsQuery>,
    service: web::Data<LeaderboardService>,
) -> AppResult<HttpResponse> {
    log::debug!("收到排行榜查询: sort={:?}, subsort={:?}", query.sort, query.subsort);
    let view = service.render_location(query.location());
    Ok(HttpResponse::Ok().json(ApiResponse::ok(view)))
}

#[utoipa::path(
    get,
    path = "/records/meta",
    responses(
        (status = 200, description = "可用的排序方式、谱面和版本", body = ApiResponse<LeaderboardMeta>)
    )
)]
#[get("/records/meta")]
pub async fn get_meta(service: web::Data<LeaderboardService>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(service.meta())))
}

/// 创建浏览会话，可选的初始地址
#[utoipa::path(
    post,
    path = "/records/session",
    request_body(content = CreateSessionRequest, description = "初始地址，可省略"),
    responses(
        (status = 200, description = "会话已创建", body = ApiResponse<SessionView>)
    )
)]
#[post("/records/session")]
pub async fn create_session(
    req: Option<web::Json<CreateSessionRequest>>,
    service: web::Data<LeaderboardService>,
) -> AppResult<HttpResponse> {
    let location = req.and_then(|req| req.location());
    let session = service.create_session(location).await;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(session)))
}

#[utoipa::path(
    get,
    path = "/records/session/{id}",
    params(
        ("id" = String, Path, description = "会话ID")
    ),
    responses(
        (status = 200, description = "会话当前视图", body = ApiResponse<SessionView>),
        (status = 404, description = "会话不存在或已过期")
    )
)]
#[get("/records/session/{id}")]
pub async fn get_session(
    path: web::Path<String>,
    service: web::Data<LeaderboardService>,
) -> AppResult<HttpResponse> {
    let session = service.get_session(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(session)))
}

/// 在会话上执行一次用户操作
#[utoipa::path(
    post,
    path = "/records/session/{id}/event",
    params(
        ("id" = String, Path, description = "会话ID")
    ),
    request_body = SessionEvent,
    responses(
        (status = 200, description = "操作后的视图，pushed 为需要写入地址的记录", body = ApiResponse<SessionView>),
        (status = 400, description = "无效的操作"),
        (status = 404, description = "会话不存在或已过期")
    )
)]
#[post("/records/session/{id}/event")]
pub async fn post_event(
    path: web::Path<String>,
    event: web::Json<SessionEvent>,
    service: web::Data<LeaderboardService>,
) -> AppResult<HttpResponse> {
    let session = service
        .handle_event(&path.into_inner(), event.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(session)))
}
