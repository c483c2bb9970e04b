//! Warehouse Module
//!
//! # Interview Q&A
//!
//! Q: 왜 PostgreSQL이 아니라 Snowflake인가?
//! A: 원가 데이터의 원본(source of truth)이 Snowflake에 있음
//!
//!    1. 이 API는 읽기 전용 → 로컬 저장소 없음
//!    2. 쿼리 결과를 타입이 있는 JSON으로 변환해서 전달만 함
//!    3. 마이그레이션, 쓰기, 캐시 없음
//!
//! Q: Rust용 Snowflake 드라이버가 없는데 어떻게 연결하는가?
//! A: 공식 커넥터들이 쓰는 REST 세션 프로토콜을 reqwest로 직접 호출
//!
//!    ```text
//!    POST /session/v1/login-request   → session token
//!    POST /queries/v1/query-request   → rowtype + rowset (+ chunks)
//!    POST /session?delete=true        → 세션 종료
//!    ```
//!
//! Q: 커넥션 풀은?
//! A: 없음. 쿼리 1개 = 세션 1개
//!    - 세션은 쿼리가 끝나면 성공/실패와 무관하게 항상 닫음
//!    - 재시도, 백오프 없음 → 에러는 그대로 호출자에게 전달
//!
//! Q: 핸들러 테스트는 어떻게 하는가?
//! A: `Warehouse` trait 뒤에 숨김
//!    - 운영: `SnowflakeClient`
//!    - 테스트: `repository::mock::MockWarehouse` (호출 횟수, 실행된 SQL 기록)

mod error;
mod models;
mod repository;
mod snowflake;

pub use error::WarehouseError;
pub use models::*;
pub use repository::Warehouse;
pub use snowflake::SnowflakeClient;

#[cfg(test)]
pub use repository::mock;
