//! District Endpoint

use axum::{extract::State, Json};

use crate::{db::decode_rows, error::ApiError, queries, types::District, AppState};

/// GET /api/districts
///
/// 전체 지역 목록 (ID, 이름)
pub async fn get_districts(State(state): State<AppState>) -> Result<Json<Vec<District>>, ApiError> {
    let rows = state.warehouse.execute(&queries::districts()).await?;
    Ok(Json(decode_rows(&rows)?))
}
