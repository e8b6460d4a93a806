//! 위치 해석기 -- 원시 참조를 실제 위치로 변환
//!
//! [`LocationResolver`]는 디스커버리 작업이 기록한 원시 경로를 소스의 파일 트리에서
//! 찾아 완전히 역참조된 [`Location`]으로 변환합니다.
//!
//! # 해석 순서
//!
//! 1. 경로의 중간 디렉토리 구성요소 중 링크인 것을 왼쪽부터 역참조합니다 (각 1홉).
//! 2. 링크 엔트리는 대상 경로(상대 경로는 링크의 부모 기준)를 전체 경로로 조회합니다.
//!    이 조회도 1번 규칙을 따릅니다.
//! 3. 전체 경로 조회가 실패하고 정책이 [`LinkPolicy::BasenameFallback`]이면
//!    대상의 마지막 구성요소와 같은 basename의 엔트리를 찾습니다.
//!    대상 경로 중간의 디렉토리 링크가 끊어진 경우도 조회 실패입니다.
//!    링크가 아닌 엔트리가 우선이고, 그다음 가장 높은 레이어,
//!    같으면 사전순으로 작은 경로가 선택됩니다.
//! 4. 홉 수가 `max_link_hops`를 넘거나 링크 대상이 없으면 `BrokenLink`입니다.
//! 5. 트리에 없는 참조는 `LocationNotFound`입니다.
//!
//! 해석은 순수한 메모리 내 계산이며 트리를 변경하지 않습니다.

use tracing::trace;

use ironsbom_core::config::{LINK_RESOLUTION_BASENAME_FALLBACK, LINK_RESOLUTION_FULL_PATH};
use ironsbom_core::metrics as m;

use crate::config::CatalogConfig;
use crate::error::ResolveError;
use crate::location::{Location, SourceKind};
use crate::source::{FileTree, Source, TreeEntry, normalize_path};

/// 기본 최대 링크 홉 수
pub const DEFAULT_MAX_LINK_HOPS: u32 = 40;

/// 링크 대상 매칭 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkPolicy {
    /// 전체 경로 매칭 실패 시 basename 매칭 허용
    #[default]
    BasenameFallback,
    /// 전체 경로 매칭만 허용
    FullPath,
}

impl LinkPolicy {
    /// 설정 문자열에서 정책을 파싱합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            LINK_RESOLUTION_BASENAME_FALLBACK | "basename" => Some(Self::BasenameFallback),
            LINK_RESOLUTION_FULL_PATH | "full" | "strict" => Some(Self::FullPath),
            _ => None,
        }
    }

    /// 설정 문자열 표현
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BasenameFallback => LINK_RESOLUTION_BASENAME_FALLBACK,
            Self::FullPath => LINK_RESOLUTION_FULL_PATH,
        }
    }
}

/// 위치 해석기
///
/// 상태가 없으므로 여러 스레드에서 공유할 수 있습니다.
#[derive(Debug, Clone, Copy)]
pub struct LocationResolver {
    policy: LinkPolicy,
    max_link_hops: u32,
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new(LinkPolicy::default(), DEFAULT_MAX_LINK_HOPS)
    }
}

impl LocationResolver {
    /// 정책과 홉 한도로 해석기를 생성합니다.
    pub fn new(policy: LinkPolicy, max_link_hops: u32) -> Self {
        Self {
            policy,
            max_link_hops,
        }
    }

    /// 카탈로그 설정에서 해석기를 생성합니다.
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(config.link_policy, config.max_link_hops)
    }

    /// 링크 정책
    pub fn policy(&self) -> LinkPolicy {
        self.policy
    }

    /// 최대 링크 홉 수
    pub fn max_link_hops(&self) -> u32 {
        self.max_link_hops
    }

    /// 원시 참조를 소스 기준의 완전히 역참조된 위치로 해석합니다.
    ///
    /// 결과 위치의 `virtual_path`는 원래 참조 경로, `real_path`는
    /// 링크가 아닌 최종 엔트리의 경로입니다.
    pub fn resolve(
        &self,
        location: &Location,
        source: &dyn Source,
    ) -> Result<Location, ResolveError> {
        let reference = location.virtual_path.as_str();

        match source.kind() {
            SourceKind::Directory => {
                let relative = normalize_path(strip_root(source.root(), reference));
                let real_path = match source.tree() {
                    Some(tree) => self.resolve_entry(tree, &relative)?.path.clone(),
                    None => relative,
                };
                Ok(Location::in_directory(reference, real_path))
            }
            SourceKind::Image => {
                let tree = source
                    .tree()
                    .ok_or_else(|| ResolveError::LocationNotFound {
                        path: reference.to_owned(),
                    })?;
                let entry = self.resolve_entry(tree, reference)?;
                Ok(Location::in_image(
                    reference,
                    entry.path.clone(),
                    source.layer_of(entry),
                ))
            }
        }
    }

    /// 경로 문자열을 원시 참조로 보고 해석합니다.
    pub fn resolve_path(&self, path: &str, source: &dyn Source) -> Result<Location, ResolveError> {
        self.resolve(&Location::new(path), source)
    }

    /// 링크 엔트리가 가리키는 다음 엔트리를 반환합니다.
    ///
    /// 링크가 아니면 엔트리 자신을, 대상을 찾지 못하면 `None`을 반환합니다.
    /// 대상 경로의 중간 링크 역참조도 홉 한도의 적용을 받습니다.
    pub fn follow_link<'t>(
        &self,
        tree: &'t FileTree,
        entry: &'t TreeEntry,
    ) -> Result<Option<&'t TreeEntry>, ResolveError> {
        let mut hops = 0;
        self.step(tree, entry, &mut hops)
    }

    fn resolve_entry<'t>(&self, tree: &'t FileTree, path: &str) -> Result<&'t TreeEntry, ResolveError> {
        let mut hops = 0;
        let entry = self
            .lookup(tree, path, &mut hops)?
            .ok_or_else(|| ResolveError::LocationNotFound {
                path: path.to_owned(),
            })?;
        let resolved = self.dereference(tree, entry, &mut hops)?;

        metrics::histogram!(m::RESOLVER_LINK_HOPS).record(f64::from(hops));
        if hops > 0 {
            trace!(path, real_path = %resolved.path, hops, "followed symlinks");
        }
        Ok(resolved)
    }

    /// 중간 디렉토리 링크를 역참조하며 경로를 조회합니다.
    fn lookup<'t>(
        &self,
        tree: &'t FileTree,
        path: &str,
        hops: &mut u32,
    ) -> Result<Option<&'t TreeEntry>, ResolveError> {
        let normalized = normalize_path(path);
        let components: Vec<&str> = normalized.split('/').filter(|c| !c.is_empty()).collect();
        let Some((last, parents)) = components.split_last() else {
            return Ok(tree.lookup("/"));
        };

        let mut prefix = String::new();
        for component in parents {
            let candidate = format!("{prefix}/{component}");
            prefix = match tree.lookup(&candidate) {
                Some(entry) if entry.is_symlink() => {
                    let target = self.dereference(tree, entry, hops)?;
                    if target.path == "/" {
                        String::new()
                    } else {
                        target.path.clone()
                    }
                }
                _ => candidate,
            };
        }

        Ok(tree.lookup(&format!("{prefix}/{last}")))
    }

    /// 링크가 아닌 엔트리에 도달할 때까지 링크를 따라갑니다.
    fn dereference<'t>(
        &self,
        tree: &'t FileTree,
        entry: &'t TreeEntry,
        hops: &mut u32,
    ) -> Result<&'t TreeEntry, ResolveError> {
        let mut current = entry;
        while current.is_symlink() {
            match self.step(tree, current, hops)? {
                Some(next) => current = next,
                None => {
                    return Err(ResolveError::BrokenLink {
                        path: current.path.clone(),
                        hops: *hops,
                    });
                }
            }
        }
        Ok(current)
    }

    /// 링크 한 홉을 따라갑니다.
    fn step<'t>(
        &self,
        tree: &'t FileTree,
        link: &'t TreeEntry,
        hops: &mut u32,
    ) -> Result<Option<&'t TreeEntry>, ResolveError> {
        let Some(target) = tree.link_target(link) else {
            return Ok(Some(link));
        };

        if *hops >= self.max_link_hops {
            return Err(ResolveError::BrokenLink {
                path: link.path.clone(),
                hops: *hops,
            });
        }
        *hops += 1;

        let found = match self.lookup(tree, &target, hops) {
            Ok(found) => found,
            // 대상 경로 중간의 끊어진 디렉토리 링크는 전체 경로 조회 실패로 취급
            Err(ResolveError::BrokenLink { .. })
                if self.policy == LinkPolicy::BasenameFallback && *hops < self.max_link_hops =>
            {
                None
            }
            Err(e) => return Err(e),
        };
        if let Some(found) = found {
            return Ok(Some(found));
        }

        match self.policy {
            LinkPolicy::BasenameFallback => Ok(tree.basename_match(&target, &link.path)),
            LinkPolicy::FullPath => Ok(None),
        }
    }
}

/// 디렉토리 참조에서 스캔 루트 접두어를 제거합니다.
fn strip_root<'a>(root: &str, reference: &'a str) -> &'a str {
    let root = root.trim_end_matches('/');
    if root.is_empty() || root == "." {
        return reference;
    }
    match reference.strip_prefix(root) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => reference,
    }
}
