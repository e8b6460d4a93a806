//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `ironsbom_`
//! - 컴포넌트명: `catalog_`, `resolver_`, `projection_`
//! - 접미어: `_total` (counter), 없음 (histogram)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 패키지 타입 레이블 키 (deb, rpm, npm, ...)
pub const LABEL_PACKAGE_TYPE: &str = "package_type";

/// 소스 종류 레이블 키 (directory, image)
pub const LABEL_SOURCE_KIND: &str = "source_kind";

/// 실패 사유 레이블 키 (not_found, broken_link)
pub const LABEL_REASON: &str = "reason";

// ─── Catalog 메트릭 ────────────────────────────────────────────────

/// Catalog: 새로 생성된 엔트리 수 (counter, label: package_type)
pub const CATALOG_PACKAGES_ADDED_TOTAL: &str = "ironsbom_catalog_packages_added_total";

/// Catalog: 기존 엔트리에 병합된 후보 수 (counter)
pub const CATALOG_PACKAGES_MERGED_TOTAL: &str = "ironsbom_catalog_packages_merged_total";

/// Catalog: 검증 실패로 거부된 후보 수 (counter)
pub const CATALOG_PACKAGES_REJECTED_TOTAL: &str = "ironsbom_catalog_packages_rejected_total";

// ─── Resolver / Projection 메트릭 ───────────────────────────────────

/// Resolver: 한 번의 해석에서 따라간 링크 홉 수 (histogram)
pub const RESOLVER_LINK_HOPS: &str = "ironsbom_resolver_link_hops";

/// Projection: 실패한 패키지 투영 수 (counter, labels: reason, source_kind)
pub const PROJECTION_FAILURES_TOTAL: &str = "ironsbom_projection_failures_total";

/// 메트릭 설명을 등록합니다.
///
/// recorder가 설치되지 않은 경우 아무 동작도 하지 않습니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        CATALOG_PACKAGES_ADDED_TOTAL,
        "Number of new catalog entries created"
    );
    describe_counter!(
        CATALOG_PACKAGES_MERGED_TOTAL,
        "Number of candidates merged into an existing catalog entry"
    );
    describe_counter!(
        CATALOG_PACKAGES_REJECTED_TOTAL,
        "Number of candidates rejected as invalid"
    );
    describe_histogram!(
        RESOLVER_LINK_HOPS,
        "Symlink hops followed while resolving a single location"
    );
    describe_counter!(
        PROJECTION_FAILURES_TOTAL,
        "Number of packages whose projection failed"
    );
}
