//! Configuration Module
//!
//! # Interview Q&A
//!
//! Q: 설정은 어디서 읽고, 언제 읽는가?
//! A: 환경변수 (+ `.env` 파일, main에서 dotenvy로 로드)
//!    - 프로세스 시작 시 한 번만 읽음 → 이후 `Arc<Config>`로 공유
//!    - 요청 도중 환경변수를 다시 읽지 않음 (불변 설정)
//!    - 전역 변수 대신 AppState로 주입 → 테스트에서 임의 설정 사용 가능
//!
//! Q: Snowflake 비밀번호가 없으면 시작을 막아야 하나?
//! A: 막지 않음
//!    - 타입 변환(PORT 등)만 검증
//!    - 자격 증명 누락은 첫 쿼리의 로그인 단계에서 에러로 드러남
//!    - 헬스 체크(`/`)는 웨어하우스 없이도 응답 가능

use std::env;
use std::fmt;

use anyhow::{Context, Result};

/// 기본 CORS 허용 origin (Vite dev server, 대체 포트)
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

/// 애플리케이션 설정
#[derive(Clone)]
pub struct Config {
    /// 서버 포트 (기본값: 8000)
    pub port: u16,

    /// Snowflake 접속 정보
    pub snowflake: SnowflakeConfig,

    /// API 제목 (헬스 체크 `service` 필드)
    pub api_title: String,

    /// API 버전
    pub api_version: String,

    /// CORS 허용 origin 목록
    pub cors_origins: Vec<String>,

    /// 환경 (development, staging, production)
    pub environment: Environment,
}

/// 웨어하우스 접속 설정
#[derive(Clone)]
pub struct SnowflakeConfig {
    /// 계정 식별자 (예: `xy12345.us-east-1`)
    pub account: String,
    pub user: String,
    pub password: String,
    /// 컴퓨트 웨어하우스 이름
    pub warehouse: String,
    pub database: String,
    pub schema: String,
    pub role: String,
    /// REST 엔드포인트 base URL
    /// 기본값: `https://{account}.snowflakecomputing.com`
    pub host: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Config {
    /// 환경변수에서 설정 로드
    ///
    /// # Environment Variables
    ///
    /// - `SNOWFLAKE_ACCOUNT`, `SNOWFLAKE_USER`, `SNOWFLAKE_PASSWORD`
    /// - `SNOWFLAKE_WAREHOUSE`, `SNOWFLAKE_ROLE`
    /// - `SNOWFLAKE_DATABASE` (기본값: PROD_ENT_CONSUMPTION)
    /// - `SNOWFLAKE_SCHEMA` (기본값: SEM_VW)
    /// - `SNOWFLAKE_HOST`: REST 엔드포인트 override
    /// - `API_TITLE`, `API_VERSION`
    /// - `CORS_ORIGINS`: 콤마 구분 origin 목록
    /// - `PORT`: 서버 포트 (기본값: 8000)
    /// - `ENVIRONMENT`: development | staging | production
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 key → value 조회 함수로 설정 생성
    ///
    /// `from_env`는 이 함수에 `std::env::var`를 넘긴 것. 테스트는 프로세스
    /// 환경변수를 건드리지 않고 HashMap 등으로 주입한다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let environment = match var("ENVIRONMENT", "development").to_lowercase().as_str() {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        let account = var("SNOWFLAKE_ACCOUNT", "");
        let host = lookup("SNOWFLAKE_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| format!("https://{}.snowflakecomputing.com", account));

        Ok(Config {
            port: var("PORT", "8000")
                .parse()
                .context("PORT must be a valid number")?,

            snowflake: SnowflakeConfig {
                account,
                user: var("SNOWFLAKE_USER", ""),
                password: var("SNOWFLAKE_PASSWORD", ""),
                warehouse: var("SNOWFLAKE_WAREHOUSE", ""),
                database: var("SNOWFLAKE_DATABASE", "PROD_ENT_CONSUMPTION"),
                schema: var("SNOWFLAKE_SCHEMA", "SEM_VW"),
                role: var("SNOWFLAKE_ROLE", ""),
                host: host.trim_end_matches('/').to_string(),
            },

            api_title: var("API_TITLE", "Cost Scraper API"),
            api_version: var("API_VERSION", "1.0.0"),
            cors_origins: parse_origins(&var("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)),

            environment,
        })
    }

    /// 프로덕션 환경인지 확인
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// 콤마 구분 origin 목록 파싱 (공백 제거, 빈 항목 무시)
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// 비밀번호가 로그에 찍히지 않도록 Debug 직접 구현
impl fmt::Debug for SnowflakeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeConfig")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("role", &self.role)
            .field("host", &self.host)
            .finish()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("snowflake", &self.snowflake)
            .field("api_title", &self.api_title)
            .field("api_version", &self.api_version)
            .field("cors_origins", &self.cors_origins)
            .field("environment", &self.environment)
            .finish()
    }
}
