//! Cost Reporting API Library
//!
//! # Overview
//!
//! 원가 리포팅 대시보드용 읽기 전용 API.
//! 필터 파라미터로 Snowflake 쿼리를 만들어 실행하고, 결과 row를 타입이 있는
//! JSON 응답으로 변환합니다.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                         API                              │
//! │                                                          │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐    │
//! │  │ Routes  │  │ Queries │  │   DB    │  │  Types  │    │
//! │  └────┬────┘  └────┬────┘  └────┬────┘  └────┬────┘    │
//! │       │            │            │            │          │
//! │       └────────────┴────────────┴────────────┘          │
//! │                         │                                │
//! └─────────────────────────┼────────────────────────────────┘
//!                           │
//!                           ▼
//!                  ┌────────────────┐
//!                  │   Snowflake    │
//!                  └────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 및 HTTP 매핑
//! - `routes`: HTTP 엔드포인트 핸들러
//! - `queries`: SQL 템플릿 및 statement 빌더
//! - `db`: 웨어하우스 클라이언트
//! - `types`: 응답 스키마
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cost_report_api::{config::Config, db::SnowflakeClient, routes, AppState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let warehouse = SnowflakeClient::new(config.snowflake.clone())?;
//!
//!     // ... AppState 구성 후 routes::create_router로 서버 시작
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod config;
pub mod db;
pub mod error;
pub mod queries;
pub mod routes;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use db::{SnowflakeClient, Warehouse};
pub use error::ApiError;

/// 애플리케이션 전역 상태 (읽기 전용)
#[derive(Clone)]
pub struct AppState {
    pub warehouse: Arc<dyn Warehouse>,
    pub config: Arc<Config>,
}
