//! 에러 타입 -- 최상위 에러 정의
//!
//! 도메인 크레이트(`ironsbom-catalog` 등)는 자체 에러 enum을 가지며,
//! `From` 구현을 통해 [`IronsbomError`]로 전파됩니다.

/// ironsbom 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum IronsbomError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 카탈로그/해석/투영 에러
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogFailure),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 카탈로그 도메인 에러의 최상위 표현
///
/// 도메인 크레이트의 세부 에러를 카테고리별로 보존합니다.
#[derive(Debug, thiserror::Error)]
pub enum CatalogFailure {
    /// 잘못된 패키지 입력
    #[error("invalid package: {0}")]
    InvalidPackage(String),

    /// 위치 해석 실패 (투영 단계)
    #[error("unresolved location: {0}")]
    UnresolvedLocation(String),

    /// 디스커버리 작업 실패
    #[error("cataloger failed: {0}")]
    Cataloger(String),
}
