//! 설정 관리 -- ironsbom.toml 파싱 및 런타임 설정
//!
//! [`IronsbomConfig`]는 워크스페이스 전체 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`IRONSBOM_CATALOG_MAX_LINK_HOPS=16` 형식)
//! 3. 설정 파일 (`ironsbom.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), ironsbom_core::error::IronsbomError> {
//! use ironsbom_core::config::IronsbomConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = IronsbomConfig::load("ironsbom.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = IronsbomConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, IronsbomError};

/// 링크 해석 정책 문자열 (설정 파일 표현)
pub const LINK_RESOLUTION_BASENAME_FALLBACK: &str = "basename-fallback";
/// 전체 경로 매칭만 허용하는 링크 해석 정책
pub const LINK_RESOLUTION_FULL_PATH: &str = "full-path";

/// ironsbom 통합 설정
///
/// `ironsbom.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IronsbomConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 카탈로그/해석기 설정
    #[serde(default)]
    pub catalog: CatalogSection,
}

impl IronsbomConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, IronsbomError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 있으면 로드하고, 없으면 기본값에 환경변수만 적용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, IronsbomError> {
        match Self::load(path.as_ref()).await {
            Err(IronsbomError::Config(ConfigError::FileNotFound { path })) => {
                tracing::debug!(path = %path, "config file not found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, IronsbomError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IronsbomError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                IronsbomError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, IronsbomError> {
        toml::from_str(toml_str).map_err(|e| {
            IronsbomError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `IRONSBOM_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "IRONSBOM_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "IRONSBOM_GENERAL_LOG_FORMAT");

        // Catalog
        override_usize(
            &mut self.catalog.shard_count,
            "IRONSBOM_CATALOG_SHARD_COUNT",
        );
        override_u32(
            &mut self.catalog.max_link_hops,
            "IRONSBOM_CATALOG_MAX_LINK_HOPS",
        );
        override_string(
            &mut self.catalog.link_resolution,
            "IRONSBOM_CATALOG_LINK_RESOLUTION",
        );
        override_usize(
            &mut self.catalog.max_index_entries,
            "IRONSBOM_CATALOG_MAX_INDEX_ENTRIES",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), IronsbomError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        let valid_policies = [LINK_RESOLUTION_BASENAME_FALLBACK, LINK_RESOLUTION_FULL_PATH];
        if !valid_policies.contains(&self.catalog.link_resolution.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "catalog.link_resolution".to_owned(),
                reason: format!("must be one of: {}", valid_policies.join(", ")),
            }
            .into());
        }

        if self.catalog.max_index_entries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "catalog.max_index_entries".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        // shard_count / max_link_hops 범위는 catalog 크레이트의 CatalogConfig가 검증
        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 카탈로그 설정 섹션 (`[catalog]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// 식별 인덱스 샤드 수
    pub shard_count: usize,
    /// 심볼릭 링크 최대 홉 수
    pub max_link_hops: u32,
    /// 링크 해석 정책 (basename-fallback, full-path)
    pub link_resolution: String,
    /// 디렉토리 인덱싱 시 최대 엔트리 수
    pub max_index_entries: usize,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            shard_count: 16,
            max_link_hops: 40,
            link_resolution: LINK_RESOLUTION_BASENAME_FALLBACK.to_owned(),
            max_index_entries: 1_000_000,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}
