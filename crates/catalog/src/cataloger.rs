//! 디스커버리 작업 실행기
//!
//! [`Cataloger`] trait은 생태계별 디스커버리 작업이 구현하는 인터페이스입니다.
//! [`run_catalogers`]는 작업들을 blocking 스레드에서 동시에 실행하고
//! 발견된 후보를 공유 카탈로그에 추가합니다.
//!
//! 작업 실패나 잘못된 후보는 기록 후 집계만 하며 전체 실행을 중단하지 않습니다.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::source::Source;
use crate::types::Package;

/// 디스커버리 작업 trait
///
/// 소스의 파일 트리를 읽기 전용으로 스캔하여 원시 패키지 후보를 생성합니다.
/// 실행기는 각 작업을 `spawn_blocking` 안에서 호출합니다.
pub trait Cataloger: Send + Sync {
    /// 작업 이름 (`found_by`에 기록되는 값)
    fn name(&self) -> &str;

    /// 소스를 스캔하여 패키지 후보를 반환합니다.
    fn catalog(&self, source: &dyn Source) -> Result<Vec<Package>, CatalogError>;
}

/// 실행 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogRunSummary {
    /// 카탈로그에 반영된 후보 수 (새 엔트리 + 병합)
    pub added: usize,
    /// 검증 실패로 거부된 후보 수
    pub rejected: usize,
    /// 실패한 작업 수
    pub failed_catalogers: usize,
}

/// 디스커버리 작업들을 동시에 실행하고 결과를 카탈로그에 추가합니다.
pub async fn run_catalogers(
    source: Arc<dyn Source>,
    catalogers: Vec<Arc<dyn Cataloger>>,
    catalog: Arc<Catalog>,
) -> CatalogRunSummary {
    let mut tasks = Vec::with_capacity(catalogers.len());

    for cataloger in catalogers {
        let name = cataloger.name().to_owned();
        let source = Arc::clone(&source);
        let catalog = Arc::clone(&catalog);
        let handle = tokio::task::spawn_blocking(move || {
            let candidates = cataloger.catalog(source.as_ref())?;
            let mut summary = CatalogRunSummary::default();
            for candidate in candidates {
                match catalog.add(candidate) {
                    Ok(_) => summary.added += 1,
                    Err(e) => {
                        warn!(cataloger = %cataloger.name(), error = %e, "skipping invalid package");
                        summary.rejected += 1;
                    }
                }
            }
            Ok::<_, CatalogError>(summary)
        });
        tasks.push((name, handle));
    }

    let mut total = CatalogRunSummary::default();
    for (name, handle) in tasks {
        match handle.await {
            Ok(Ok(summary)) => {
                debug!(
                    cataloger = %name,
                    added = summary.added,
                    rejected = summary.rejected,
                    "cataloger finished"
                );
                total.added += summary.added;
                total.rejected += summary.rejected;
            }
            Ok(Err(e)) => {
                warn!(cataloger = %name, error = %e, "cataloger failed");
                total.failed_catalogers += 1;
            }
            Err(e) => {
                warn!(cataloger = %name, error = %e, "spawn_blocking failed");
                total.failed_catalogers += 1;
            }
        }
    }

    info!(
        packages = catalog.count(),
        added = total.added,
        rejected = total.rejected,
        failed_catalogers = total.failed_catalogers,
        "cataloging run completed"
    );
    total
}
