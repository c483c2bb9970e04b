//! Warehouse Abstraction
//!
//! # Interview Q&A
//!
//! Q: 왜 trait으로 분리했는가?
//! A: 핸들러를 Snowflake 없이 테스트하기 위해
//!
//!    ```rust,ignore
//!    // 핸들러는 trait object만 앎
//!    let rows = state.warehouse.execute(&statement).await?;
//!
//!    // 운영: SnowflakeClient
//!    // 테스트: MockWarehouse (호출 횟수 + 실행된 statement 기록)
//!    ```
//!
//!    - "빈 프로젝트 목록이면 웨어하우스를 호출하지 않는다"를 호출 횟수로 검증
//!    - 실행된 SQL/바인드 값을 그대로 검사 가능

use async_trait::async_trait;

use super::{Row, Statement, WarehouseError};

/// 쿼리 실행기 인터페이스
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// statement 실행 후 전체 결과를 row 목록으로 반환
    ///
    /// 구현체는 호출마다 연결을 열고, 결과와 무관하게 반드시 닫아야 함
    async fn execute(&self, statement: &Statement) -> Result<Vec<Row>, WarehouseError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    type Responder = dyn Fn(&Statement) -> Result<Vec<Row>, WarehouseError> + Send + Sync;

    pub struct MockWarehouse {
        responder: Box<Responder>,
        executed: Mutex<Vec<Statement>>,
    }

    impl MockWarehouse {
        pub fn new<F>(responder: F) -> Self
        where
            F: Fn(&Statement) -> Result<Vec<Row>, WarehouseError> + Send + Sync + 'static,
        {
            Self {
                responder: Box::new(responder),
                executed: Mutex::new(Vec::new()),
            }
        }

        /// 모든 statement에 같은 row 반환
        pub fn returning(rows: Vec<Row>) -> Self {
            Self::new(move |_| Ok(rows.clone()))
        }

        /// 모든 statement에 에러 반환
        pub fn failing<F>(make_error: F) -> Self
        where
            F: Fn() -> WarehouseError + Send + Sync + 'static,
        {
            Self::new(move |_| Err(make_error()))
        }

        pub fn call_count(&self) -> usize {
            self.executed.lock().unwrap().len()
        }

        pub fn executed(&self) -> Vec<Statement> {
            self.executed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Warehouse for MockWarehouse {
        async fn execute(&self, statement: &Statement) -> Result<Vec<Row>, WarehouseError> {
            self.executed.lock().unwrap().push(statement.clone());
            (self.responder)(statement)
        }
    }
}
