//! Snowflake Client
//!
//! Speaks the REST session protocol used by the official connectors:
//! log in with user/password, run one statement, fetch any result chunks,
//! then delete the session.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Map, Value as Json};
use uuid::Uuid;

use super::{Row, Statement, Value, Warehouse, WarehouseError};
use crate::config::SnowflakeConfig;

const SNOWFLAKE_ACCEPT: &str = "application/snowflake";

/// "쿼리 실행 중" 응답 코드 (결과 URL을 폴링해야 함)
const QUERY_IN_PROGRESS: &str = "333333";
const QUERY_IN_PROGRESS_ASYNC: &str = "333334";

/// 웨어하우스 연결 팩토리
///
/// 커넥션 풀 없음: `execute` 호출마다 세션을 새로 열고 닫음
pub struct SnowflakeClient {
    http: reqwest::Client,
    config: SnowflakeConfig,
}

/// 열린 세션 (세션 토큰 보유)
struct Session<'a> {
    client: &'a SnowflakeClient,
    token: String,
}

impl SnowflakeClient {
    const CLIENT_APP_ID: &'static str = "cost-report-api";
    /// 결과 폴링 간격
    const POLL_INTERVAL: Duration = Duration::from_millis(500);

    pub fn new(config: SnowflakeConfig) -> Result<Self, WarehouseError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cost-report-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    /// 로그인 → 세션 토큰 획득
    async fn connect(&self) -> Result<Session<'_>, WarehouseError> {
        let cfg = &self.config;
        let url = format!("{}/session/v1/login-request", cfg.host);

        let response = self
            .http
            .post(url)
            .query(&login_params(cfg))
            .header(ACCEPT, SNOWFLAKE_ACCEPT)
            .json(&login_body(cfg))
            .send()
            .await?;

        let envelope: Envelope<LoginData> = check_status(response).await?.json().await?;
        if !envelope.success {
            return Err(WarehouseError::Authentication {
                code: envelope.code.unwrap_or_default(),
                message: envelope.message.unwrap_or_default(),
            });
        }

        let token = envelope
            .data
            .and_then(|d| d.token)
            .ok_or_else(|| WarehouseError::Protocol("login response missing session token".into()))?;

        tracing::debug!(account = %cfg.account, "snowflake session opened");
        Ok(Session { client: self, token })
    }
}

#[async_trait]
impl Warehouse for SnowflakeClient {
    async fn execute(&self, statement: &Statement) -> Result<Vec<Row>, WarehouseError> {
        let session = self.connect().await?;
        let result = session.run(statement).await;
        // 쿼리 성공/실패와 무관하게 세션 종료
        session.close().await;
        result
    }
}

impl Session<'_> {
    fn auth_header(&self) -> String {
        format!("Snowflake Token=\"{}\"", self.token)
    }

    async fn run(&self, statement: &Statement) -> Result<Vec<Row>, WarehouseError> {
        let host = &self.client.config.host;
        let url = format!("{}/queries/v1/query-request?requestId={}", host, Uuid::new_v4());
        let body = json!({
            "sqlText": statement.sql,
            "asyncExec": false,
            "sequenceId": 1,
            "isInternal": false,
            "bindings": bindings(&statement.binds),
        });

        let started = std::time::Instant::now();
        let response = self
            .client
            .http
            .post(url)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, SNOWFLAKE_ACCEPT)
            .json(&body)
            .send()
            .await?;
        let mut envelope: Envelope<QueryData> = check_status(response).await?.json().await?;

        // 오래 걸리는 쿼리는 "진행 중" 응답 → 결과 URL 폴링 (타임아웃 없음)
        while envelope.in_progress() {
            let path = envelope
                .data
                .as_ref()
                .and_then(|d| d.get_result_url.clone())
                .ok_or_else(|| WarehouseError::Protocol("query in progress without result url".into()))?;

            tokio::time::sleep(SnowflakeClient::POLL_INTERVAL).await;

            let response = self
                .client
                .http
                .get(format!("{}{}", host, path))
                .header(AUTHORIZATION, self.auth_header())
                .header(ACCEPT, SNOWFLAKE_ACCEPT)
                .send()
                .await?;
            envelope = check_status(response).await?.json().await?;
        }

        if !envelope.success {
            return Err(WarehouseError::Query {
                code: envelope.code.unwrap_or_default(),
                message: envelope.message.unwrap_or_default(),
            });
        }

        let data = envelope
            .data
            .ok_or_else(|| WarehouseError::Protocol("query response missing data".into()))?;
        let query_id = data.query_id.clone().unwrap_or_default();
        let rows = self.materialize(data).await?;

        tracing::debug!(
            query_id = %query_id,
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "snowflake query completed"
        );
        Ok(rows)
    }

    /// 첫 rowset + 추가 chunk를 모두 읽어서 row로 변환
    async fn materialize(&self, data: QueryData) -> Result<Vec<Row>, WarehouseError> {
        if let Some(format) = &data.query_result_format {
            if !format.eq_ignore_ascii_case("json") {
                return Err(WarehouseError::Protocol(format!(
                    "unsupported result format: {}",
                    format
                )));
            }
        }

        let mut raw_rows = data.rowset;
        for chunk in &data.chunks {
            raw_rows.extend(
                self.fetch_chunk(chunk, &data.chunk_headers, data.qrmk.as_deref())
                    .await?,
            );
        }

        decode_rowset(&data.rowtype, raw_rows)
    }

    async fn fetch_chunk(
        &self,
        chunk: &Chunk,
        headers: &HashMap<String, String>,
        qrmk: Option<&str>,
    ) -> Result<Vec<Vec<Json>>, WarehouseError> {
        let mut request = self.client.http.get(&chunk.url);
        if !headers.is_empty() {
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }
        } else if let Some(key) = qrmk {
            // 서버 측 암호화 chunk (SSE-C)
            request = request
                .header("x-amz-server-side-encryption-customer-algorithm", "AES256")
                .header("x-amz-server-side-encryption-customer-key", key);
        }

        let body = check_status(request.send().await?).await?.text().await?;
        parse_chunk(&body)
    }

    /// 세션 삭제. 실패해도 쿼리 결과를 덮어쓰지 않도록 로그만 남김
    async fn close(self) {
        let url = format!(
            "{}/session?delete=true&requestId={}",
            self.client.config.host,
            Uuid::new_v4()
        );

        let result = self
            .client
            .http
            .post(url)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, SNOWFLAKE_ACCEPT)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!("snowflake session closed");
            }
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "snowflake session close rejected");
            }
            Err(err) => {
                tracing::warn!(error = %err.without_url(), "snowflake session close failed");
            }
        }
    }
}

// ============ Wire Types ============

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    success: bool,
    code: Option<String>,
    message: Option<String>,
}

impl<T> Envelope<T> {
    fn in_progress(&self) -> bool {
        matches!(
            self.code.as_deref(),
            Some(QUERY_IN_PROGRESS) | Some(QUERY_IN_PROGRESS_ASYNC)
        )
    }
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryData {
    #[serde(default)]
    rowtype: Vec<ColumnType>,
    #[serde(default)]
    rowset: Vec<Vec<Json>>,
    query_id: Option<String>,
    query_result_format: Option<String>,
    get_result_url: Option<String>,
    #[serde(default)]
    chunks: Vec<Chunk>,
    #[serde(default)]
    chunk_headers: HashMap<String, String>,
    qrmk: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ColumnType {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    scale: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Chunk {
    url: String,
}

// ============ Helpers ============

fn login_params(cfg: &SnowflakeConfig) -> Vec<(&'static str, String)> {
    let mut params = vec![("requestId", Uuid::new_v4().to_string())];
    let optional = [
        ("warehouse", &cfg.warehouse),
        ("databaseName", &cfg.database),
        ("schemaName", &cfg.schema),
        ("roleName", &cfg.role),
    ];
    for (key, value) in optional {
        if !value.is_empty() {
            params.push((key, value.clone()));
        }
    }
    params
}

fn login_body(cfg: &SnowflakeConfig) -> Json {
    // 계정 식별자에서 region 부분 제거 (`xy12345.us-east-1` → `xy12345`)
    let account_name = cfg.account.split('.').next().unwrap_or_default();

    json!({
        "data": {
            "CLIENT_APP_ID": SnowflakeClient::CLIENT_APP_ID,
            "CLIENT_APP_VERSION": env!("CARGO_PKG_VERSION"),
            "ACCOUNT_NAME": account_name,
            "LOGIN_NAME": cfg.user,
            "PASSWORD": cfg.password,
            "SESSION_PARAMETERS": {
                "CLIENT_VALIDATE_DEFAULT_PARAMETERS": true,
            },
        }
    })
}

/// 위치 기반 바인드 → `{"1": {"type": "TEXT", "value": ..}, ...}`
fn bindings(binds: &[String]) -> Json {
    let map: Map<String, Json> = binds
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            (
                (idx + 1).to_string(),
                json!({ "type": "TEXT", "value": value }),
            )
        })
        .collect();
    Json::Object(map)
}

/// 상태 코드 검사: 401/403 → 인증, 429/5xx → 사용 불가, 그 외 실패 → 프로토콜
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, WarehouseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => WarehouseError::Authentication {
            code: status.as_u16().to_string(),
            message,
        },
        429 | 500..=599 => WarehouseError::Unavailable {
            status: status.as_u16(),
            message,
        },
        code => WarehouseError::Protocol(format!("HTTP {}: {}", code, message)),
    })
}

/// chunk 본문은 대괄호 없이 row 배열이 콤마로 이어진 형태: `["a","b"],["c","d"]`
fn parse_chunk(body: &str) -> Result<Vec<Vec<Json>>, WarehouseError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&format!("[{}]", body))
        .map_err(|e| WarehouseError::Protocol(format!("malformed result chunk: {}", e)))
}

fn decode_rowset(rowtype: &[ColumnType], raw_rows: Vec<Vec<Json>>) -> Result<Vec<Row>, WarehouseError> {
    let columns: Arc<[String]> = rowtype.iter().map(|c| c.name.clone()).collect();

    raw_rows
        .into_iter()
        .map(|cells| {
            if cells.len() != rowtype.len() {
                return Err(WarehouseError::Protocol(format!(
                    "row has {} cells, expected {}",
                    cells.len(),
                    rowtype.len()
                )));
            }
            let values = rowtype
                .iter()
                .zip(cells)
                .map(|(column, cell)| decode_cell(column, cell))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Row::new(columns.clone(), values))
        })
        .collect()
}

/// JSON 결과의 셀은 문자열 또는 null. 컬럼 타입에 따라 변환
fn decode_cell(column: &ColumnType, cell: Json) -> Result<Value, WarehouseError> {
    let raw = match cell {
        Json::Null => return Ok(Value::Null),
        Json::String(s) => s,
        other => other.to_string(),
    };

    let invalid = |e: &dyn std::fmt::Display| {
        WarehouseError::Protocol(format!(
            "invalid {} value {:?} in column {}: {}",
            column.kind, raw, column.name, e
        ))
    };

    match column.kind.to_ascii_lowercase().as_str() {
        "fixed" => {
            if column.scale.unwrap_or(0) == 0 {
                if let Ok(i) = raw.parse::<i64>() {
                    return Ok(Value::Integer(i));
                }
            }
            // NUMBER(38, s)는 Decimal 범위(28자리)를 넘을 수 있음 → f64로 대체
            Decimal::from_str(&raw)
                .or_else(|_| Decimal::from_scientific(&raw))
                .map(Value::Fixed)
                .or_else(|e| raw.parse::<f64>().map(Value::Real).map_err(|_| invalid(&e)))
        }
        "real" => raw.parse::<f64>().map(Value::Real).map_err(|e| invalid(&e)),
        "boolean" => Ok(Value::Boolean(matches!(
            raw.to_ascii_lowercase().as_str(),
            "1" | "true"
        ))),
        _ => Ok(Value::Text(raw)),
    }
}
