//! Cost Data Endpoint
//!
//! Returns per-WBS cost metrics for a set of projects from a start month onward,
//! optionally narrowed to one district.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    error::ApiError,
    queries,
    routes::ApiQuery,
    types::{CostDataResponse, CostDataRow, FiltersApplied, ProjectNumbers},
    AppState,
};

/// 기본 데모 프로젝트 목록
pub const DEFAULT_PROJECT_NUMBERS: &str =
    "106049,104831,105553,104834,106073,106345,105119,104980";

/// 기본 시작 회계 월
pub const DEFAULT_START_MONTH: &str = "202101";

// ============ Request Types ============

/// 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct CostDataParams {
    /// 콤마 구분 프로젝트 번호 목록
    #[serde(default = "default_project_numbers")]
    pub project_numbers: String,
    /// 시작 회계 월 (YYYYMM)
    #[serde(default = "default_start_month")]
    pub start_month: String,
    /// 지역 ID (빈 문자열 = 필터 없음)
    pub district_id: Option<String>,
}

fn default_project_numbers() -> String {
    DEFAULT_PROJECT_NUMBERS.to_string()
}

fn default_start_month() -> String {
    DEFAULT_START_MONTH.to_string()
}

// ============ Handlers ============

/// GET /api/cost-data
///
/// # Flow
///
/// 1. 프로젝트 번호 파싱/검증 (비어 있으면 400, 쿼리 실행 안 함)
/// 2. statement 생성 (시작 월, 지역 ID는 바인드)
/// 3. 실행 → 고정소수점을 f64로 정규화 → `CostDataRow`로 변환
/// 4. 적용된 필터와 함께 응답
pub async fn get_cost_data(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CostDataParams>,
) -> Result<Json<CostDataResponse>, ApiError> {
    let projects = ProjectNumbers::parse(&params.project_numbers)?;
    // 빈 문자열은 필터 없음. 응답에는 받은 값 그대로 echo
    let district_filter = params
        .district_id
        .as_deref()
        .filter(|id| !id.trim().is_empty());

    let statement = queries::cost_data(&projects, &params.start_month, district_filter);
    let mut rows = state.warehouse.execute(&statement).await?;

    let data = rows
        .iter_mut()
        .map(|row| {
            row.normalize_numbers();
            row.deserialize::<CostDataRow>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        projects = projects.as_slice().len(),
        start_month = %params.start_month,
        district_id = ?district_filter,
        rows = data.len(),
        "cost data fetched"
    );

    Ok(Json(CostDataResponse {
        total_count: data.len(),
        data,
        filters_applied: FiltersApplied {
            project_numbers: projects.as_slice().to_vec(),
            start_month: params.start_month,
            district_id: params.district_id,
        },
    }))
}
