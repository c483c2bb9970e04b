//! Error Handling Module
//!
//! Provides a closed error taxonomy with HTTP status and code mapping.
//! Uses thiserror for domain errors and integrates with tracing for structured logging.

use std::any::Any;

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::WarehouseError;
use crate::types::ProjectNumbersError;

/// API 에러 타입
///
/// # Design Decision
///
/// - 클라이언트 에러: 400 (잘못된 입력, 쿼리 실행 전에 거부)
/// - 웨어하우스 에러: 500 + 원인별 `code`
///   (연결 불가 / 인증 실패 / 쿼리 실패를 대시보드가 구분 가능)
///
/// 드라이버 에러 메시지는 `details`로 전달. 자격 증명, URL, 스택 트레이스는
/// 포함하지 않음
#[derive(Debug, Error)]
pub enum ApiError {
    // ============ 400 Bad Request ============
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    // ============ 500 Internal Server Error ============
    #[error("Warehouse unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Warehouse authentication failed: {0}")]
    UpstreamAuthFailed(String),

    #[error("Warehouse query failed: {0}")]
    UpstreamQueryFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// API 에러 응답 구조
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamUnavailable(_)
            | ApiError::UpstreamAuthFailed(_)
            | ApiError::UpstreamQueryFailed(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            ApiError::UpstreamAuthFailed(_) => "UPSTREAM_AUTH_FAILED",
            ApiError::UpstreamQueryFailed(_) => "UPSTREAM_QUERY_FAILED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (message, details) = match &self {
            // 4xx 클라이언트 에러
            ApiError::InvalidInput(msg) => (msg.clone(), None),

            // 5xx 웨어하우스 에러
            ApiError::UpstreamUnavailable(msg) => {
                tracing::error!("Warehouse unavailable: {}", msg);
                ("Warehouse is currently unavailable".to_string(), Some(msg.clone()))
            }
            ApiError::UpstreamAuthFailed(msg) => {
                tracing::error!("Warehouse authentication failed: {}", msg);
                ("Warehouse authentication failed".to_string(), Some(msg.clone()))
            }
            ApiError::UpstreamQueryFailed(msg) => {
                tracing::error!("Warehouse query failed: {}", msg);
                ("Warehouse query failed".to_string(), Some(msg.clone()))
            }

            // 내부 상세는 로그에만 남김
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
        };

        let body = ErrorResponse {
            error: message,
            code: self.code().to_string(),
            details,
        };

        (self.status(), Json(body)).into_response()
    }
}

/// 웨어하우스 에러를 ApiError로 변환
impl From<WarehouseError> for ApiError {
    fn from(err: WarehouseError) -> Self {
        let message = err.to_string();
        match err {
            WarehouseError::Connection(_) | WarehouseError::Unavailable { .. } => {
                ApiError::UpstreamUnavailable(message)
            }
            WarehouseError::Authentication { .. } => ApiError::UpstreamAuthFailed(message),
            WarehouseError::Query { .. }
            | WarehouseError::Protocol(_)
            | WarehouseError::Schema(_) => ApiError::UpstreamQueryFailed(message),
        }
    }
}

impl From<ProjectNumbersError> for ApiError {
    fn from(err: ProjectNumbersError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

/// 쿼리 문자열 역직렬화 실패 (중복 필드 등)도 JSON 에러 응답으로
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

/// 핸들러 panic → 500 `INTERNAL_ERROR` (`CatchPanicLayer`용)
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    ApiError::Internal(message).into_response()
}
