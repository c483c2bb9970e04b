//! Project Endpoint

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{db::decode_rows, error::ApiError, queries, routes::ApiQuery, types::Project, AppState};

#[derive(Debug, Deserialize)]
pub struct ProjectParams {
    pub district_id: Option<String>,
}

/// GET /api/projects
///
/// - `district_id` 있음: 해당 지역 프로젝트만
/// - 없음: 전체 프로젝트 (지역 미배정 포함, 프로젝트 번호 순)
pub async fn get_projects(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ProjectParams>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let district_id = params.district_id.filter(|id| !id.trim().is_empty());

    let rows = state
        .warehouse
        .execute(&queries::projects(district_id.as_deref()))
        .await?;

    Ok(Json(decode_rows(&rows)?))
}
