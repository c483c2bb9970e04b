//! Health Check Endpoint
//!
//! # Interview Q&A
//!
//! Q: 왜 웨어하우스 연결은 체크하지 않는가?
//! A: 얕은 헬스체크(shallow health check)
//!    - Snowflake 세션 하나 = 로그인 + 컴퓨트 웨어하우스 기동 비용
//!    - 로드밸런서가 몇 초마다 호출 → 비용/지연 낭비
//!    - 웨어하우스 장애는 각 API의 `UPSTREAM_*` 에러 코드로 드러남

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Health check 응답
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

/// GET /
///
/// 프로세스 상태 확인 (웨어하우스 접근 없음)
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.config.api_title.clone(),
        version: state.config.api_version.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
