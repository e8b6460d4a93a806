//! 카탈로그 에러 타입
//!
//! [`CatalogError`]는 카탈로그, 투영, 디스커버리 실행 중 발생하는 에러를 나타냅니다.
//! [`ResolveError`]는 위치 해석 단계의 실패이며, 투영 단계에서
//! `CatalogError::UnresolvedLocation`의 source로 보존됩니다.
//! `From<CatalogError> for IronsbomError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **입력 검증**: `InvalidPackage`, `Metadata`
//! - **위치 해석**: `ResolveError::LocationNotFound`, `ResolveError::BrokenLink`
//! - **투영**: `UnresolvedLocation`
//! - **설정**: `Config`
//! - **디스커버리 작업**: `Cataloger`

use ironsbom_core::error::{CatalogFailure, ConfigError, IronsbomError};

/// 위치 해석 에러
///
/// 해석은 메모리 내 계산이므로 재시도 대상이 아닙니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// 참조 경로가 파일 트리에 없음
    #[error("location not found: {path}")]
    LocationNotFound {
        /// 조회한 경로
        path: String,
    },

    /// 링크 대상이 없거나 홉 한도를 초과함
    #[error("broken link: {path} (after {hops} hops)")]
    BrokenLink {
        /// 마지막으로 따라간 링크 경로
        path: String,
        /// 실패 시점까지 소비한 홉 수
        hops: u32,
    },
}

impl ResolveError {
    /// 메트릭 레이블용 실패 사유를 반환합니다.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::LocationNotFound { .. } => "not_found",
            Self::BrokenLink { .. } => "broken_link",
        }
    }
}

/// 카탈로그 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// 잘못된 패키지 후보 (카탈로그에 추가되지 않음)
    #[error("invalid package: {reason}")]
    InvalidPackage {
        /// 거부 사유
        reason: String,
    },

    /// 패키지의 위치를 해석할 수 없어 투영 실패
    #[error("unresolved location for {package}: {path}: {source}")]
    UnresolvedLocation {
        /// 패키지 표시 문자열 (`name@version (type)`)
        package: String,
        /// 해석에 실패한 참조 경로
        path: String,
        /// 원인 해석 에러
        source: ResolveError,
    },

    /// 메타데이터 직렬화 실패
    #[error("metadata error: {0}")]
    Metadata(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 디스커버리 작업 실패
    #[error("cataloger '{cataloger}' failed: {reason}")]
    Cataloger {
        /// 작업 이름
        cataloger: String,
        /// 실패 사유
        reason: String,
    },
}

impl CatalogError {
    /// `UnresolvedLocation`인 경우 원인 해석 에러를 반환합니다.
    pub fn resolve_error(&self) -> Option<&ResolveError> {
        match self {
            Self::UnresolvedLocation { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<CatalogError> for IronsbomError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidPackage { reason } => {
                IronsbomError::Catalog(CatalogFailure::InvalidPackage(reason))
            }
            err @ CatalogError::UnresolvedLocation { .. } => {
                IronsbomError::Catalog(CatalogFailure::UnresolvedLocation(err.to_string()))
            }
            CatalogError::Metadata(msg) => {
                IronsbomError::Catalog(CatalogFailure::InvalidPackage(msg))
            }
            CatalogError::Config { field, reason } => {
                IronsbomError::Config(ConfigError::InvalidValue { field, reason })
            }
            err @ CatalogError::Cataloger { .. } => {
                IronsbomError::Catalog(CatalogFailure::Cataloger(err.to_string()))
            }
        }
    }
}
