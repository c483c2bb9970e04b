//! Cost Reporting API Server
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Client (Dashboard Frontend)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum Web Server                         │
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                      Routes Layer                        ││
//! │  │  /  /api/cost-data  /api/districts  /api/projects       ││
//! │  │  /api/filters                                           ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Queries Layer                         ││
//! │  │  SQL templates    ProjectNumbers validation             ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Data Layer                            ││
//! │  │  Warehouse trait    SnowflakeClient (session per query) ││
//! │  └─────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Snowflake (source of truth)               │
//! │  CR_CUBE_DATA_WBS    PROJECT_EXPLORER_KDS                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// 라이브러리에서 가져오기
use cost_report_api::{routes, AppState, Config, SnowflakeClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    // RUST_LOG=debug,reqwest=warn 형태로 레벨 제어 가능
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "cost_report_api=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!(
        title = %config.api_title,
        version = %config.api_version,
        environment = ?config.environment,
        "Starting cost reporting API"
    );

    // 웨어하우스 클라이언트 (연결은 쿼리마다 생성)
    let warehouse = SnowflakeClient::new(config.snowflake.clone())?;
    tracing::info!(
        host = %config.snowflake.host,
        database = %config.snowflake.database,
        schema = %config.snowflake.schema,
        "Warehouse client configured"
    );

    // 앱 상태 구성
    let state = AppState {
        warehouse: Arc::new(warehouse),
        config: Arc::new(config.clone()),
    };

    // 라우터 구성
    let app = routes::create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
