//! Query Templates
//!
//! SQL 문장과 statement 빌더
//!
//! # Bind vs Interpolation
//!
//! - 시작 월, 지역 ID: 드라이버 바인드 파라미터 (`?`)
//! - 프로젝트 번호 목록: `IN (...)` 리터럴로 삽입 (유일한 삽입 지점)
//!   → `ProjectNumbers`가 허용 목록 패턴을 통과한 값만 담고 있음

use crate::db::Statement;
use crate::types::ProjectNumbers;

/// `/api/filters`가 반환하는 최근 회계 월 개수
pub const FISCAL_MONTH_LIMIT: usize = 48;

/// 원가 데이터 (전체 row 스키마)
///
/// `{project_numbers}`: 검증된 리터럴 목록, `{district_filter}`: 지역 조건 (선택)
pub const COST_DATA_QUERY: &str = r#"
SELECT
    c.FISCAL_YEAR_MONTH_NO,
    p.LEAD_DISTRICT_ID,
    p.LEAD_DISTRICT,
    c.PROJECT_NUMBER,
    c.CBS_HIERARCHY,
    c.WBS_ELEMENT,
    c.WBS_DESCRIPTION,
    c.ACCOUNT_CODE,
    c.UNIT_OF_MEASURE_ID,
    c.CE_QTY,
    c.CB_QTY,
    c.CB_MHF,
    c.CB_AMT,
    c.CB_UNIT_COST,
    c.PER_QTY,
    c.PER_PERC_COMP,
    c.PER_MH,
    c.PER_MHF,
    c.PER_MH_GL,
    c.PER_UOM_MH,
    c.PER_PF,
    c.PER_CF,
    c.PER_LEI,
    c.PER_SPEND,
    c.PER_UNIT_COST,
    c.ACTUAL_COST_G_PER_L,
    c.JTD_QTY,
    c.JTD_PERC_COMP,
    c.JTD_MH,
    c.JTD_MHF,
    c.JTD_MH_GL,
    c.JTD_UOM_MH,
    c.JTD_PF,
    c.JTD_CF,
    c.JTD_LEI,
    c.JTD_SPEND,
    c.JTD_UNIT_COST,
    c.JTD_COST_G_PER_L,
    c.FORECAST_REMAINING_QUANTITY,
    c.HD_FORECAST_METHOD,
    c.FORECAST_REMAINING_MHF,
    c.FORECAST_MHF,
    c.FORECAST_REMAINING_MH,
    c.FORECAST_MH,
    c.FORECAST_MH_G_PER_L,
    c.FORECAST_REMAINING_PF,
    c.FORECAST_PF,
    c.FORECAST_REMAINING_CF,
    c.FORECAST_CF,
    c.FORECAST_REMAINING_LEI,
    c.FORECAST_LEI,
    c.FORECAST_REMAINING_UNIT_COST,
    c.FORECAST_UNIT_COST,
    c.FORECAST_REMAINING_AMOUNT,
    c.FORECAST_AMOUNT,
    c.FORECAST_AMOUNT_G_PER_L,
    c.FORECAST_CHANGE,
    c.SL_VARIANCE
FROM PROD_ENT_CONSUMPTION.SEM_VW.CR_CUBE_DATA_WBS c
LEFT JOIN (
    SELECT DISTINCT PROJECT_NUMBER, LEAD_DISTRICT_ID, LEAD_DISTRICT
    FROM PROD_KDS_CONSUMPTION.SEM.PROJECT_EXPLORER_KDS
) p ON p.PROJECT_NUMBER = c.PROJECT_NUMBER
WHERE c.PROJECT_NUMBER IN ({project_numbers})
  AND c.FISCAL_YEAR_MONTH_NO >= ?{district_filter}
ORDER BY c.PROJECT_NUMBER, c.WBS_ELEMENT, c.FISCAL_YEAR_MONTH_NO
"#;

const DISTRICT_FILTER: &str = "\n  AND p.LEAD_DISTRICT_ID = ?";

/// 지역 목록 (파라미터 없음)
pub const DISTRICTS_QUERY: &str = r#"
SELECT DISTINCT LEAD_DISTRICT_ID, LEAD_DISTRICT
FROM PROD_KDS_CONSUMPTION.SEM.PROJECT_EXPLORER_KDS
WHERE LEAD_DISTRICT_ID IS NOT NULL
  AND LEAD_DISTRICT IS NOT NULL
ORDER BY LEAD_DISTRICT
"#;

/// 지역별 프로젝트 목록
pub const PROJECTS_BY_DISTRICT_QUERY: &str = r#"
SELECT DISTINCT PROJECT_NUMBER, LEAD_DISTRICT_ID, LEAD_DISTRICT
FROM PROD_KDS_CONSUMPTION.SEM.PROJECT_EXPLORER_KDS
WHERE LEAD_DISTRICT_ID = ?
ORDER BY PROJECT_NUMBER
"#;

/// 전체 프로젝트 목록
///
/// 지역별 쿼리에 NULL 파라미터를 넘기는 대신 별도 문장을 유지.
/// 지역 미배정 프로젝트(LEAD_DISTRICT_ID IS NULL)도 포함됨
pub const ALL_PROJECTS_QUERY: &str = r#"
SELECT DISTINCT PROJECT_NUMBER, LEAD_DISTRICT_ID, LEAD_DISTRICT
FROM PROD_KDS_CONSUMPTION.SEM.PROJECT_EXPLORER_KDS
ORDER BY PROJECT_NUMBER
"#;

/// 최근 회계 월 (내림차순, 48개)
pub const FISCAL_MONTHS_QUERY: &str = r#"
SELECT DISTINCT FISCAL_YEAR_MONTH_NO
FROM PROD_ENT_CONSUMPTION.SEM_VW.CR_CUBE_DATA_WBS
ORDER BY FISCAL_YEAR_MONTH_NO DESC
LIMIT 48
"#;

// ============ Builders ============

/// 원가 데이터 statement
///
/// 바인드 순서: 시작 월, (지역 ID)
pub fn cost_data(projects: &ProjectNumbers, start_month: &str, district_id: Option<&str>) -> Statement {
    let sql = COST_DATA_QUERY
        .replace("{project_numbers}", &projects.to_sql_list())
        .replace(
            "{district_filter}",
            if district_id.is_some() { DISTRICT_FILTER } else { "" },
        );

    let statement = Statement::new(sql).bind(start_month);
    match district_id {
        Some(id) => statement.bind(id),
        None => statement,
    }
}

pub fn districts() -> Statement {
    Statement::new(DISTRICTS_QUERY)
}

pub fn projects(district_id: Option<&str>) -> Statement {
    match district_id {
        Some(id) => Statement::new(PROJECTS_BY_DISTRICT_QUERY).bind(id),
        None => Statement::new(ALL_PROJECTS_QUERY),
    }
}

pub fn fiscal_months() -> Statement {
    Statement::new(FISCAL_MONTHS_QUERY)
}
