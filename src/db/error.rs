//! Warehouse error types.

use thiserror::Error;

/// 웨어하우스 호출 중 발생하는 에러
///
/// 드라이버 레벨 에러를 그대로 담아서 올림. HTTP 상태 코드 매핑은
/// `crate::error::ApiError`에서 담당.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// 네트워크/전송 에러 (DNS, TLS, connection refused 등)
    #[error("connection failed: {0}")]
    Connection(reqwest::Error),

    /// 웨어하우스가 5xx/429로 응답
    #[error("warehouse unavailable (HTTP {status}): {message}")]
    Unavailable { status: u16, message: String },

    /// 로그인 거부 (잘못된 계정/비밀번호, 권한 없음)
    #[error("authentication failed ({code}): {message}")]
    Authentication { code: String, message: String },

    /// SQL 컴파일/실행 에러
    #[error("query failed ({code}): {message}")]
    Query { code: String, message: String },

    /// 예상하지 못한 응답 형식
    #[error("unexpected warehouse response: {0}")]
    Protocol(String),

    /// 결과 row가 응답 스키마와 맞지 않음
    #[error("row does not match response schema: {0}")]
    Schema(String),
}

// reqwest 에러 메시지에서 URL 제거 (계정 호스트, 쿼리 파라미터 노출 방지)
impl From<reqwest::Error> for WarehouseError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_decode() {
            // 연결은 됐지만 응답 본문이 JSON이 아님
            WarehouseError::Protocol(err.to_string())
        } else {
            WarehouseError::Connection(err)
        }
    }
}
