//! Warehouse Row Models
//!
//! Rows are materialized eagerly into ordered column → value pairs, keeping the
//! column names exactly as the warehouse declared them.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value as Json};

use super::WarehouseError;

/// 실행할 SQL + 위치 기반 바인드 파라미터 (`?` 순서대로)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub binds: Vec<String>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            binds: Vec::new(),
        }
    }

    /// 다음 `?` 자리에 들어갈 값 추가
    pub fn bind(mut self, value: impl Into<String>) -> Self {
        self.binds.push(value.into());
        self
    }
}

/// 셀 값
///
/// # Design Decision
///
/// `NUMBER(p, s)` (s > 0)은 `Fixed`로 정확히 보존하고, JSON 변환 직전에
/// `Row::normalize_numbers`로 `Real`(f64)로 바꿈.
/// NULL은 끝까지 `Null` → JSON `null` (0으로 바꾸지 않음)
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Fixed(Decimal),
    Real(f64),
    Boolean(bool),
}

impl Value {
    /// 고정소수점 → 부동소수점. 나머지는 그대로
    pub fn into_float(self) -> Self {
        match self {
            Value::Fixed(d) => match d.to_f64() {
                Some(f) => Value::Real(f),
                None => Value::Fixed(d),
            },
            other => other,
        }
    }

    /// 문자열 표현 (NULL이면 None)
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Fixed(d) => Some(d.to_string()),
            Value::Real(f) => Some(f.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Text(s) => Json::String(s.clone()),
            Value::Integer(i) => Json::Number((*i).into()),
            // 정규화되지 않은 고정소수점은 정밀도 손실 없이 문자열로
            Value::Fixed(d) => Json::String(d.to_string()),
            // NaN/inf는 JSON 숫자로 표현 불가 → null
            Value::Real(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
            Value::Boolean(b) => Json::Bool(*b),
        }
    }
}

/// 결과 row 한 줄
///
/// 컬럼 이름 목록은 같은 결과 집합의 모든 row가 공유 (`Arc`)
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// (컬럼, 값) 목록으로 row 생성
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(c, v)| (c.into(), v)).unzip();
        Self::new(columns.into(), values)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// 선언된 순서대로 (컬럼, 값) 순회
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// 모든 `Fixed` 값을 `Real`로 변환
    pub fn normalize_numbers(&mut self) {
        for value in self.values.iter_mut() {
            if matches!(value, Value::Fixed(_)) {
                *value = std::mem::replace(value, Value::Null).into_float();
            }
        }
    }

    pub fn to_json(&self) -> Map<String, Json> {
        self.iter()
            .map(|(column, value)| (column.to_string(), value.to_json()))
            .collect()
    }

    /// row를 응답 스키마 타입으로 변환 (검증 + 타입 강제)
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, WarehouseError> {
        serde_json::from_value(Json::Object(self.to_json()))
            .map_err(|e| WarehouseError::Schema(e.to_string()))
    }
}

/// 결과 집합 전체를 스키마 타입으로 변환
pub fn decode_rows<T: DeserializeOwned>(rows: &[Row]) -> Result<Vec<T>, WarehouseError> {
    rows.iter().map(Row::deserialize).collect()
}
