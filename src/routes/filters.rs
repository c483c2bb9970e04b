//! Filter Options Endpoint
//!
//! Bundles everything the dashboard needs to populate its filter controls.

use axum::{extract::State, Json};

use crate::{
    db::{decode_rows, Row, Value},
    error::ApiError,
    queries::{self, FISCAL_MONTH_LIMIT},
    types::FilterOptions,
    AppState,
};

/// GET /api/filters
///
/// 지역 목록 + 최근 회계 월 48개 (내림차순, 문자열)
pub async fn get_filter_options(State(state): State<AppState>) -> Result<Json<FilterOptions>, ApiError> {
    let districts = state.warehouse.execute(&queries::districts()).await?;
    let months = state.warehouse.execute(&queries::fiscal_months()).await?;

    Ok(Json(FilterOptions {
        districts: decode_rows(&districts)?,
        fiscal_months: recent_months(&months),
    }))
}

/// 회계 월 컬럼을 문자열로 펼침
///
/// SQL의 ORDER BY/LIMIT와 별개로 내림차순, 중복 제거, 개수 제한을 다시 보장
fn recent_months(rows: &[Row]) -> Vec<String> {
    let mut months: Vec<String> = rows
        .iter()
        .filter_map(|row| row.get("FISCAL_YEAR_MONTH_NO").and_then(Value::as_text))
        .collect();

    months.sort_by(|a, b| b.cmp(a));
    months.dedup();
    months.truncate(FISCAL_MONTH_LIMIT);
    months
}
