use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("无效的排序方式: {0}")]
    InvalidSortMode(String),

    #[error("无效的谱面编号: {0}")]
    InvalidChartSlot(u8),

    #[error("找不到会话: {0}")]
    SessionNotFound(String),

    #[error("错误的请求: {0}")]
    BadRequest(String),

    #[error("成绩刷新失败: {0}")]
    RefreshFailed(String),

    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP请求错误: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Serde JSON错误: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Serde YAML错误: {0}")]
    SerdeYamlError(#[from] serde_yaml::Error),

    #[error("CSV错误: {0}")]
    CsvError(#[from] csv::Error),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            AppError::InvalidSortMode(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidChartSlot(_) => StatusCode::BAD_REQUEST,
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RefreshFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::SerdeJsonError(_) => StatusCode::BAD_REQUEST,
            AppError::IoError(_)
            | AppError::ReqwestError(_)
            | AppError::SerdeYamlError(_)
            | AppError::CsvError(_)
            | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_type = match self {
            AppError::InvalidSortMode(_) => "invalid_sort_mode",
            AppError::InvalidChartSlot(_) => "invalid_chart_slot",
            AppError::SessionNotFound(_) => "session_not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::RefreshFailed(_) => "refresh_failed",
            AppError::IoError(_) => "io_error",
            AppError::ReqwestError(_) => "request_error",
            AppError::SerdeJsonError(_) => "serialization_error",
            AppError::SerdeYamlError(_) => "serialization_error",
            AppError::CsvError(_) => "csv_error",
            AppError::ConfigError(_) => "configuration_error",
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::SessionNotFound("abc".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidSortMode("rating".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ConfigError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
