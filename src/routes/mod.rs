//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Routes
//! - `/`, `/health` - 헬스 체크
//! - `/api/cost-data` - 원가 데이터
//! - `/api/districts` - 지역 목록
//! - `/api/projects` - 프로젝트 목록
//! - `/api/filters` - UI 필터 옵션

pub mod cost_data;
pub mod districts;
pub mod filters;
pub mod health;
pub mod projects;

use axum::{extract::FromRequestParts, http::HeaderValue, routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{panic_response, ApiError};
use crate::AppState;

/// `Query` + JSON 에러 응답
///
/// 역직렬화 실패(중복 필드 등)를 text/plain 대신 400 `INVALID_INPUT`으로 반환
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// 라우터 생성
///
/// # Route Structure
///
/// ```text
/// GET  /                 - 서버 상태 확인
/// GET  /health           - 서버 상태 확인 (alias)
///
/// GET  /api/cost-data    - 프로젝트별 원가 지표
/// GET  /api/districts    - 지역 목록
/// GET  /api/projects     - 프로젝트 목록 (지역 필터 선택)
/// GET  /api/filters      - 지역 + 최근 회계 월
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health::health_check))
        .route("/health", get(health::health_check))

        // Cost reporting
        .route("/api/cost-data", get(cost_data::get_cost_data))
        .route("/api/districts", get(districts::get_districts))
        .route("/api/projects", get(projects::get_projects))
        .route("/api/filters", get(filters::get_filter_options))

        // 미들웨어
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))

        // 상태 주입
        .with_state(state)
}

/// CORS 설정
///
/// 설정된 origin만 허용, 메서드/헤더는 전부 허용
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use rust_decimal::Decimal;
    use serde_json::{json, Value as Json};
    use tokio_test::{assert_err, assert_ok};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::{mock::MockWarehouse, Row, Value, WarehouseError};
    use crate::queries::{ALL_PROJECTS_QUERY, PROJECTS_BY_DISTRICT_QUERY};

    fn test_config() -> Config {
        Config::from_lookup(|key| match key {
            "API_TITLE" => Some("Cost Scraper API".to_string()),
            "CORS_ORIGINS" => Some("http://localhost:5173".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn app(warehouse: Arc<MockWarehouse>) -> Router {
        create_router(AppState {
            warehouse,
            config: Arc::new(test_config()),
        })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Json) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn cost_row(project: &str, district: Option<&str>, amount: Option<&str>) -> Row {
        Row::from_pairs([
            ("FISCAL_YEAR_MONTH_NO", Value::Text("202101".into())),
            (
                "LEAD_DISTRICT_ID",
                district.map_or(Value::Null, |d| Value::Text(d.into())),
            ),
            ("LEAD_DISTRICT", Value::Null),
            ("PROJECT_NUMBER", Value::Text(project.into())),
            ("WBS_ELEMENT", Value::Text(format!("{}-01", project))),
            (
                "CB_AMT",
                amount.map_or(Value::Null, |a| Value::Fixed(Decimal::from_str(a).unwrap())),
            ),
            ("PER_QTY", Value::Integer(3)),
            ("JTD_SPEND", Value::Null),
        ])
    }

    fn district_row(id: &str, name: &str) -> Row {
        Row::from_pairs([
            ("LEAD_DISTRICT_ID", Value::Text(id.into())),
            ("LEAD_DISTRICT", Value::Text(name.into())),
        ])
    }

    fn connection_refused() -> WarehouseError {
        WarehouseError::Unavailable {
            status: 503,
            message: "connection refused by xy12345.snowflakecomputing.com".into(),
        }
    }

    // ============ Health ============

    #[tokio::test]
    async fn test_health_check_skips_warehouse() {
        let warehouse = Arc::new(MockWarehouse::returning(vec![]));
        let (status, body) = get(app(warehouse.clone()), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "Cost Scraper API");
        assert_eq!(warehouse.call_count(), 0);
    }

    // ============ Cost Data ============

    #[tokio::test]
    async fn test_cost_data_parses_project_list() {
        let warehouse = Arc::new(MockWarehouse::returning(vec![]));
        let (status, body) = get(
            app(warehouse.clone()),
            "/api/cost-data?project_numbers=106049,%20,104831&start_month=202101",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filters_applied"]["project_numbers"], json!(["106049", "104831"]));

        let executed = warehouse.executed();
        assert_eq!(executed.len(), 1);
        assert!(executed[0].sql.contains("IN ('106049', '104831')"));
        assert_eq!(executed[0].binds, vec!["202101"]);
    }

    #[tokio::test]
    async fn test_cost_data_empty_list_never_queries() {
        let warehouse = Arc::new(MockWarehouse::returning(vec![]));

        for uri in ["/api/cost-data?project_numbers=", "/api/cost-data?project_numbers=%20,%20"] {
            let (status, body) = get(app(warehouse.clone()), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["code"], "INVALID_INPUT");
        }
        assert_eq!(warehouse.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cost_data_rejects_injection_token() {
        let warehouse = Arc::new(MockWarehouse::returning(vec![]));
        let (status, _) = get(
            app(warehouse.clone()),
            "/api/cost-data?project_numbers=106049,x'%20OR%20'1'='1",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(warehouse.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cost_data_defaults_and_echo_with_zero_rows() {
        let warehouse = Arc::new(MockWarehouse::returning(vec![]));
        let (status, body) = get(app(warehouse.clone()), "/api/cost-data").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 0);
        assert_eq!(body["data"], json!([]));
        assert_eq!(
            body["filters_applied"],
            json!({
                "project_numbers": [
                    "106049", "104831", "105553", "104834",
                    "106073", "106345", "105119", "104980"
                ],
                "start_month": "202101",
                "district_id": null
            })
        );
    }

    #[tokio::test]
    async fn test_cost_data_fixed_point_becomes_float_and_nulls_stay() {
        let warehouse = Arc::new(MockWarehouse::returning(vec![
            cost_row("106049", Some("D01"), Some("1250.75")),
            cost_row("104831", Some("D01"), None),
        ]));
        let (status, body) = get(app(warehouse), "/api/cost-data?project_numbers=106049,104831").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 2);

        let first = &body["data"][0];
        assert!(first["CB_AMT"].is_f64());
        assert_eq!(first["CB_AMT"], json!(1250.75));
        assert_eq!(first["PER_QTY"], json!(3.0));
        assert!(first["JTD_SPEND"].is_null());
        // 결과에 없는 지표 컬럼도 null로 존재
        assert!(first["SL_VARIANCE"].is_null());

        assert!(body["data"][1]["CB_AMT"].is_null());
    }

    #[tokio::test]
    async fn test_cost_data_district_filter_is_bound() {
        let warehouse = Arc::new(MockWarehouse::new(|stmt| {
            // 바인드된 지역 ID를 그대로 따르는 웨어하우스 흉내
            let district = stmt.binds.get(1).cloned();
            Ok(vec![cost_row("106049", district.as_deref(), Some("1.00"))])
        }));
        let (status, body) = get(
            app(warehouse.clone()),
            "/api/cost-data?project_numbers=106049&start_month=202203&district_id=D07",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filters_applied"]["district_id"], "D07");
        assert_eq!(body["filters_applied"]["start_month"], "202203");
        for row in body["data"].as_array().unwrap() {
            assert_eq!(row["LEAD_DISTRICT_ID"], "D07");
        }

        let executed = warehouse.executed();
        assert!(executed[0].sql.contains("LEAD_DISTRICT_ID = ?"));
        assert_eq!(executed[0].binds, vec!["202203", "D07"]);
    }

    #[tokio::test]
    async fn test_cost_data_empty_district_means_no_filter() {
        let warehouse = Arc::new(MockWarehouse::returning(vec![]));
        let (_, body) = get(
            app(warehouse.clone()),
            "/api/cost-data?project_numbers=106049&district_id=",
        )
        .await;

        assert_eq!(body["filters_applied"]["district_id"], "");
        assert!(!warehouse.executed()[0].sql.contains("LEAD_DISTRICT_ID = ?"));
        assert_eq!(warehouse.executed()[0].binds.len(), 1);
    }

    #[tokio::test]
    async fn test_cost_data_repeated_param_is_json_400() {
        let warehouse = Arc::new(MockWarehouse::returning(vec![]));
        let (status, body) = get(
            app(warehouse.clone()),
            "/api/cost-data?project_numbers=1&project_numbers=2",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
        assert!(body["error"].as_str().unwrap().contains("project_numbers"));
        assert_eq!(warehouse.call_count(), 0);
    }

    #[tokio::test]
    async fn test_handler_panic_is_json_500() {
        let warehouse = Arc::new(MockWarehouse::new(|_| panic!("unexpected statement")));
        let (status, body) = get(app(warehouse), "/api/districts").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_cost_data_schema_mismatch_is_500() {
        let warehouse = Arc::new(MockWarehouse::returning(vec![Row::from_pairs([(
            "PROJECT_NUMBER",
            Value::Text("106049".into()),
        )])]));
        let (status, body) = get(app(warehouse), "/api/cost-data?project_numbers=106049").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "UPSTREAM_QUERY_FAILED");
    }

    // ============ Districts ============

    #[tokio::test]
    async fn test_districts_list() {
        let warehouse = Arc::new(MockWarehouse::returning(vec![
            district_row("D01", "North"),
            district_row("D02", "South"),
        ]));
        let (status, body) = get(app(warehouse), "/api/districts").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"LEAD_DISTRICT": "North", "LEAD_DISTRICT_ID": "D01"},
                {"LEAD_DISTRICT": "South", "LEAD_DISTRICT_ID": "D02"}
            ])
        );
    }

    #[tokio::test]
    async fn test_districts_connection_error_is_500_with_driver_text() {
        let warehouse = Arc::new(MockWarehouse::failing(connection_refused));
        let (status, body) = get(app(warehouse), "/api/districts").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "UPSTREAM_UNAVAILABLE");
        let details = body["details"].as_str().unwrap();
        assert!(details.contains("connection refused"));
        assert!(!details.contains("stack backtrace"));
    }

    // ============ Projects ============

    #[tokio::test]
    async fn test_projects_with_and_without_district() {
        let warehouse = Arc::new(MockWarehouse::returning(vec![Row::from_pairs([
            ("PROJECT_NUMBER", Value::Integer(106049)),
            ("LEAD_DISTRICT_ID", Value::Null),
            ("LEAD_DISTRICT", Value::Null),
        ])]));

        let (status, body) = get(app(warehouse.clone()), "/api/projects").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{"PROJECT_NUMBER": "106049", "LEAD_DISTRICT_ID": null, "LEAD_DISTRICT": null}])
        );

        let (status, _) = get(app(warehouse.clone()), "/api/projects?district_id=D01").await;
        assert_eq!(status, StatusCode::OK);

        let executed = warehouse.executed();
        assert_eq!(executed[0].sql, ALL_PROJECTS_QUERY);
        assert!(executed[0].binds.is_empty());
        assert_eq!(executed[1].sql, PROJECTS_BY_DISTRICT_QUERY);
        assert_eq!(executed[1].binds, vec!["D01"]);
    }

    #[tokio::test]
    async fn test_projects_query_error() {
        let warehouse = Arc::new(MockWarehouse::failing(|| WarehouseError::Query {
            code: "002003".into(),
            message: "Object does not exist".into(),
        }));
        let (status, body) = get(app(warehouse), "/api/projects").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "UPSTREAM_QUERY_FAILED");
    }

    // ============ Filters ============

    #[tokio::test]
    async fn test_filter_options_bundle() {
        let warehouse = Arc::new(MockWarehouse::new(|stmt| {
            if stmt.sql.contains("FISCAL_YEAR_MONTH_NO") {
                Ok((0..50)
                    .map(|i| Row::from_pairs([("FISCAL_YEAR_MONTH_NO", Value::Integer(202001 + i))]))
                    .collect())
            } else {
                Ok(vec![district_row("D01", "North")])
            }
        }));
        let (status, body) = get(app(warehouse.clone()), "/api/filters").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["districts"][0]["LEAD_DISTRICT_ID"], "D01");

        let months: Vec<&str> = body["fiscal_months"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m.as_str().unwrap())
            .collect();
        assert_eq!(months.len(), 48);
        assert!(months.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(warehouse.call_count(), 2);
    }

    #[tokio::test]
    async fn test_filter_options_error() {
        let warehouse = Arc::new(MockWarehouse::failing(connection_refused));
        let (status, _) = get(app(warehouse), "/api/filters").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    // ============ CORS ============

    #[tokio::test]
    async fn test_cors_allows_configured_origin_only() {
        let warehouse = Arc::new(MockWarehouse::returning(vec![]));

        let allowed = app(warehouse.clone())
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_ok!(allowed
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .ok_or("missing allow-origin"));

        let denied = app(warehouse)
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::ORIGIN, "http://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_err!(denied
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .ok_or("missing allow-origin"));
    }
}
