//! 패키지 카탈로그 -- 동시 추가를 지원하는 패키지 저장소
//!
//! [`Catalog`]는 한 번의 카탈로그 실행 범위에서 생성되어 모든 디스커버리 작업에
//! 참조로 전달됩니다. 실행 간 상태를 공유하지 않습니다.
//!
//! # 식별자와 병합
//!
//! 엔트리 식별 키는 `(name, version, type)`이며 `found_by`는 집합입니다.
//! 같은 키의 후보가 다시 추가되면 새 엔트리를 만들지 않고 병합합니다:
//!
//! - `locations`, `found_by`, `alternate_identifiers`는 합집합
//! - `vendor`, `metadata`는 비어 있으면 채우고, 서로 다르면 작은 값을 유지
//!
//! 병합 결과는 추가 순서와 무관합니다.
//!
//! # 동시성
//!
//! 식별 인덱스는 `shard_count`개의 샤드로 나뉘고 각 샤드가 자신의 `RwLock`을 가집니다.
//! 한 키의 조회-병합-기록은 해당 샤드의 쓰기 잠금 안에서 일어나므로
//! 같은 키에 대한 경쟁 추가도 중복 엔트리나 유실된 병합을 만들지 않습니다.
//! 잠금 순서는 항상 샤드 -> id 인덱스입니다.

use std::collections::{BTreeSet, HashMap};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, trace};

use ironsbom_core::metrics as m;

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::types::{Package, PackageId, PackageType};

/// 카탈로그 엔트리 식별 키
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PackageKey {
    name: String,
    version: String,
    package_type: PackageType,
}

impl PackageKey {
    fn of(package: &Package) -> Self {
        Self {
            name: package.name.clone(),
            version: package.version.clone(),
            package_type: package.package_type,
        }
    }
}

#[derive(Debug)]
struct Entry {
    id: PackageId,
    package: Package,
}

type Shard = RwLock<HashMap<PackageKey, Entry>>;

/// 패키지 카탈로그
#[derive(Debug)]
pub struct Catalog {
    shards: Vec<Shard>,
    ids: RwLock<HashMap<PackageId, PackageKey>>,
    next_id: AtomicU64,
    count: AtomicUsize,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// 기본 설정으로 빈 카탈로그를 생성합니다.
    pub fn new() -> Self {
        Self::with_config(&CatalogConfig::default())
    }

    /// 설정의 샤드 수로 빈 카탈로그를 생성합니다.
    pub fn with_config(config: &CatalogConfig) -> Self {
        let shard_count = config.shard_count.max(1);
        Self {
            shards: (0..shard_count).map(|_| RwLock::new(HashMap::new())).collect(),
            ids: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            count: AtomicUsize::new(0),
        }
    }

    /// 후보를 추가하거나 기존 엔트리에 병합하고 엔트리 id를 반환합니다.
    ///
    /// # Errors
    ///
    /// 이름이 비었거나, 타입이 `Unknown`이거나, 위치가 없으면
    /// `CatalogError::InvalidPackage`를 반환하며 카탈로그는 변경되지 않습니다.
    pub fn add(&self, mut candidate: Package) -> Result<PackageId, CatalogError> {
        if let Err(e) = validate(&candidate) {
            metrics::counter!(m::CATALOG_PACKAGES_REJECTED_TOTAL).increment(1);
            debug!(package = %candidate, error = %e, "rejected package candidate");
            return Err(e);
        }
        normalize(&mut candidate);

        let key = PackageKey::of(&candidate);
        let package_type = key.package_type;
        let shard = &self.shards[self.shard_index(&key)];
        let mut entries = shard.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get_mut(&key) {
            merge_into(&mut entry.package, candidate);
            metrics::counter!(m::CATALOG_PACKAGES_MERGED_TOTAL).increment(1);
            trace!(id = %entry.id, package = %entry.package, "merged package candidate");
            return Ok(entry.id);
        }

        let id = PackageId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.ids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, key.clone());
        debug!(id = %id, package = %candidate, "added package");
        entries.insert(
            key,
            Entry {
                id,
                package: candidate,
            },
        );
        self.count.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(
            m::CATALOG_PACKAGES_ADDED_TOTAL,
            m::LABEL_PACKAGE_TYPE => package_type.as_str()
        )
        .increment(1);

        Ok(id)
    }

    /// 엔트리를 `(name, version, type, found_by)` 순서로 반환합니다.
    ///
    /// `filter`가 있으면 해당 타입의 엔트리만 반환합니다.
    /// 추가 순서나 인터리빙과 무관하게 같은 결과를 냅니다.
    pub fn enumerate(&self, filter: Option<PackageType>) -> Vec<Package> {
        let mut packages: Vec<Package> = Vec::with_capacity(self.count());
        for shard in &self.shards {
            let entries = shard.read().unwrap_or_else(PoisonError::into_inner);
            packages.extend(
                entries
                    .values()
                    .filter(|e| filter.is_none_or(|t| e.package.package_type == t))
                    .map(|e| e.package.clone()),
            );
        }
        packages.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        packages
    }

    /// 엔트리 수
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// id로 엔트리를 조회합니다. 없으면 `None`.
    pub fn get(&self, id: PackageId) -> Option<Package> {
        // id 인덱스 잠금을 해제한 뒤 샤드를 잠근다
        let key = self
            .ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()?;
        let shard = &self.shards[self.shard_index(&key)];
        shard
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .map(|e| e.package.clone())
    }

    /// 카탈로그에 존재하는 패키지 타입을 정렬하여 반환합니다.
    pub fn package_types(&self) -> Vec<PackageType> {
        let mut types = BTreeSet::new();
        for shard in &self.shards {
            let entries = shard.read().unwrap_or_else(PoisonError::into_inner);
            types.extend(entries.keys().map(|k| k.package_type));
        }
        types.into_iter().collect()
    }

    fn shard_index(&self, key: &PackageKey) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }
}

fn validate(candidate: &Package) -> Result<(), CatalogError> {
    if candidate.name.trim().is_empty() {
        return Err(CatalogError::InvalidPackage {
            reason: "package name must not be empty".to_owned(),
        });
    }
    if candidate.package_type == PackageType::Unknown {
        return Err(CatalogError::InvalidPackage {
            reason: format!("package '{}' has no type", candidate.name),
        });
    }
    if candidate.locations.is_empty() {
        return Err(CatalogError::InvalidPackage {
            reason: format!("package '{candidate}' has no locations"),
        });
    }
    Ok(())
}

fn normalize(candidate: &mut Package) {
    candidate.found_by.retain(|f| !f.is_empty());
    candidate.alternate_identifiers.sort();
    candidate.alternate_identifiers.dedup();
}

fn merge_into(existing: &mut Package, candidate: Package) {
    existing.found_by.extend(candidate.found_by);
    existing.locations.extend(candidate.locations);

    if !candidate.alternate_identifiers.is_empty() {
        existing
            .alternate_identifiers
            .extend(candidate.alternate_identifiers);
        existing.alternate_identifiers.sort();
        existing.alternate_identifiers.dedup();
    }

    existing.vendor = match (existing.vendor.take(), candidate.vendor) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };

    if let Some(new) = candidate.metadata {
        let replace = match &existing.metadata {
            None => true,
            Some(current) => !current.ptr_eq(&new) && new.canonical() < current.canonical(),
        };
        if replace {
            existing.metadata = Some(new);
        }
    }
}
