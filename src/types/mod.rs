//! Response Schemas
//!
//! 엔드포인트별 응답 타입 + 입력 검증 타입
//!
//! 웨어하우스 컬럼 이름을 그대로 JSON 키로 사용 (대문자 snake case).
//! 대시보드 프론트엔드가 이 키에 의존함.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============ Input Types ============

/// 검증된 프로젝트 번호 목록 (순서 유지)
///
/// # Design Decision
///
/// 프로젝트 번호 목록은 `IN (...)` 절에 문자열로 직접 들어감
/// (드라이버 바인드는 스칼라 값만 지원). 그래서 생성 시점에 허용 목록
/// 패턴으로 모든 토큰을 검사하고, 통과한 값만 SQL 리터럴로 렌더링함.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProjectNumbers(Vec<String>);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectNumbersError {
    #[error("At least one project number is required")]
    Empty,

    #[error("Invalid project number: {0:?}")]
    InvalidToken(String),
}

/// 영숫자로 시작, 영숫자/`.`/`_`/`-`만 허용, 최대 32자
fn project_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,31}$").expect("project number pattern is valid")
    })
}

impl ProjectNumbers {
    /// 콤마 구분 문자열 파싱
    ///
    /// - 각 토큰 앞뒤 공백 제거
    /// - 빈 토큰 무시
    /// - 남은 토큰이 없으면 `Empty`
    /// - 패턴에 맞지 않는 토큰이 있으면 `InvalidToken`
    pub fn parse(raw: &str) -> Result<Self, ProjectNumbersError> {
        let tokens: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        if tokens.is_empty() {
            return Err(ProjectNumbersError::Empty);
        }

        if let Some(bad) = tokens.iter().find(|t| !project_token_pattern().is_match(t)) {
            return Err(ProjectNumbersError::InvalidToken(bad.clone()));
        }

        Ok(Self(tokens))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// `'106049', '104831'` 형태의 SQL 리터럴 목록
    pub fn to_sql_list(&self) -> String {
        self.0
            .iter()
            .map(|p| format!("'{}'", p))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ============ Response Types ============

/// 원가 데이터 한 줄: (프로젝트, WBS element, 회계 월) 단위
///
/// 식별 컬럼(회계 월, 프로젝트 번호, WBS element)은 필수.
/// 지표 컬럼은 모두 optional → NULL은 `null`로 직렬화 (0 아님)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CostDataRow {
    #[serde(deserialize_with = "de::string_or_number")]
    pub fiscal_year_month_no: String,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub lead_district_id: Option<String>,
    #[serde(default)]
    pub lead_district: Option<String>,
    #[serde(deserialize_with = "de::string_or_number")]
    pub project_number: String,
    #[serde(default)]
    pub cbs_hierarchy: Option<String>,
    #[serde(deserialize_with = "de::string_or_number")]
    pub wbs_element: String,
    #[serde(default)]
    pub wbs_description: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub account_code: Option<String>,
    #[serde(default)]
    pub unit_of_measure_id: Option<String>,

    // Current Estimates/Budget
    pub ce_qty: Option<f64>,
    pub cb_qty: Option<f64>,
    pub cb_mhf: Option<f64>,
    pub cb_amt: Option<f64>,
    pub cb_unit_cost: Option<f64>,

    // Period
    pub per_qty: Option<f64>,
    pub per_perc_comp: Option<f64>,
    pub per_mh: Option<f64>,
    pub per_mhf: Option<f64>,
    pub per_mh_gl: Option<f64>,
    pub per_uom_mh: Option<f64>,
    pub per_pf: Option<f64>,
    pub per_cf: Option<f64>,
    pub per_lei: Option<f64>,
    pub per_spend: Option<f64>,
    pub per_unit_cost: Option<f64>,
    pub actual_cost_g_per_l: Option<f64>,

    // Job-to-date
    pub jtd_qty: Option<f64>,
    pub jtd_perc_comp: Option<f64>,
    pub jtd_mh: Option<f64>,
    pub jtd_mhf: Option<f64>,
    pub jtd_mh_gl: Option<f64>,
    pub jtd_uom_mh: Option<f64>,
    pub jtd_pf: Option<f64>,
    pub jtd_cf: Option<f64>,
    pub jtd_lei: Option<f64>,
    pub jtd_spend: Option<f64>,
    pub jtd_unit_cost: Option<f64>,
    pub jtd_cost_g_per_l: Option<f64>,

    // Forecast
    pub forecast_remaining_quantity: Option<f64>,
    #[serde(default)]
    pub hd_forecast_method: Option<String>,
    pub forecast_remaining_mhf: Option<f64>,
    pub forecast_mhf: Option<f64>,
    pub forecast_remaining_mh: Option<f64>,
    pub forecast_mh: Option<f64>,
    pub forecast_mh_g_per_l: Option<f64>,
    pub forecast_remaining_pf: Option<f64>,
    pub forecast_pf: Option<f64>,
    pub forecast_remaining_cf: Option<f64>,
    pub forecast_cf: Option<f64>,
    pub forecast_remaining_lei: Option<f64>,
    pub forecast_lei: Option<f64>,
    pub forecast_remaining_unit_cost: Option<f64>,
    pub forecast_unit_cost: Option<f64>,
    pub forecast_remaining_amount: Option<f64>,
    pub forecast_amount: Option<f64>,
    pub forecast_amount_g_per_l: Option<f64>,
    pub forecast_change: Option<f64>,
    pub sl_variance: Option<f64>,
}

/// 적용된 필터 (요청 확인용 echo)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiltersApplied {
    pub project_numbers: Vec<String>,
    pub start_month: String,
    pub district_id: Option<String>,
}

/// GET /api/cost-data 응답
#[derive(Debug, Serialize)]
pub struct CostDataResponse {
    pub data: Vec<CostDataRow>,
    pub total_count: usize,
    pub filters_applied: FiltersApplied,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct District {
    pub lead_district: String,
    #[serde(deserialize_with = "de::string_or_number")]
    pub lead_district_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Project {
    #[serde(deserialize_with = "de::string_or_number")]
    pub project_number: String,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub lead_district_id: Option<String>,
    #[serde(default)]
    pub lead_district: Option<String>,
}

/// GET /api/filters 응답 (UI 드롭다운 채우기용)
#[derive(Debug, Serialize)]
pub struct FilterOptions {
    pub districts: Vec<District>,
    pub fiscal_months: Vec<String>,
}

/// 웨어하우스가 식별자를 NUMBER로 돌려주는 경우가 있어서 숫자도 문자열로 받음
mod de {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!(
                "expected string or number, got {}",
                other
            ))),
        }
    }

    pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(D::Error::custom(format!(
                "expected string, number or null, got {}",
                other
            ))),
        }
    }
}
