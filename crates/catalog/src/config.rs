//! 카탈로그 설정
//!
//! [`CatalogConfig`]는 core의 [`CatalogSection`](ironsbom_core::config::CatalogSection)에서
//! 파생되며, 문자열 설정을 타입이 있는 값([`LinkPolicy`])으로 변환합니다.
//!
//! # 사용 예시
//!
//! ```
//! use ironsbom_catalog::{CatalogConfigBuilder, LinkPolicy};
//!
//! let config = CatalogConfigBuilder::new()
//!     .shard_count(8)
//!     .link_policy(LinkPolicy::FullPath)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.shard_count, 8);
//! ```

use tracing::warn;

use crate::error::CatalogError;
use crate::resolver::{DEFAULT_MAX_LINK_HOPS, LinkPolicy};

/// 설정 상한값 상수
const MAX_SHARD_COUNT: usize = 1024;
const MAX_LINK_HOPS_LIMIT: u32 = 255;

/// 카탈로그 설정
///
/// # 필드
///
/// - **shard_count**: 식별 인덱스 샤드 수 (서로 다른 키의 동시 추가가 경합하지 않도록 분할)
/// - **max_link_hops**: 한 번의 해석에서 따라갈 수 있는 최대 링크 홉 수
/// - **link_policy**: 링크 대상 매칭 정책
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// 식별 인덱스 샤드 수
    pub shard_count: usize,
    /// 최대 링크 홉 수
    pub max_link_hops: u32,
    /// 링크 대상 매칭 정책
    pub link_policy: LinkPolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            shard_count: 16,
            max_link_hops: DEFAULT_MAX_LINK_HOPS,
            link_policy: LinkPolicy::BasenameFallback,
        }
    }
}

impl CatalogConfig {
    /// core의 `CatalogSection`에서 카탈로그 설정을 생성합니다.
    ///
    /// 알 수 없는 정책 문자열은 경고 후 기본 정책을 사용합니다.
    pub fn from_core(core: &ironsbom_core::config::CatalogSection) -> Self {
        let link_policy = LinkPolicy::from_str_loose(&core.link_resolution).unwrap_or_else(|| {
            warn!(
                value = %core.link_resolution,
                "unknown link resolution policy, using default"
            );
            LinkPolicy::default()
        });

        Self {
            shard_count: core.shard_count,
            max_link_hops: core.max_link_hops,
            link_policy,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `shard_count`: 1-1024
    /// - `max_link_hops`: 1-255
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.shard_count == 0 || self.shard_count > MAX_SHARD_COUNT {
            return Err(CatalogError::Config {
                field: "shard_count".to_owned(),
                reason: format!("must be 1-{MAX_SHARD_COUNT}"),
            });
        }

        if self.max_link_hops == 0 || self.max_link_hops > MAX_LINK_HOPS_LIMIT {
            return Err(CatalogError::Config {
                field: "max_link_hops".to_owned(),
                reason: format!("must be 1-{MAX_LINK_HOPS_LIMIT}"),
            });
        }

        Ok(())
    }
}

/// [`CatalogConfig`] 빌더
#[derive(Default)]
pub struct CatalogConfigBuilder {
    config: CatalogConfig,
}

impl CatalogConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 샤드 수를 설정합니다.
    pub fn shard_count(mut self, count: usize) -> Self {
        self.config.shard_count = count;
        self
    }

    /// 최대 링크 홉 수를 설정합니다.
    pub fn max_link_hops(mut self, hops: u32) -> Self {
        self.config.max_link_hops = hops;
        self
    }

    /// 링크 정책을 설정합니다.
    pub fn link_policy(mut self, policy: LinkPolicy) -> Self {
        self.config.link_policy = policy;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `CatalogError::Config` 반환
    pub fn build(self) -> Result<CatalogConfig, CatalogError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
