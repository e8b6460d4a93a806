//! 메모리 내 파일 트리 -- 정규화된 절대 경로 인덱스
//!
//! [`FileTree`]는 소스의 파일시스템 뷰를 읽기 전용 인덱스로 보관합니다.
//! 이미지 소스의 경우 [`FileTree::squash`]로 레이어를 순서대로 적용한
//! 합집합 뷰를 만듭니다.
//!
//! 경로 정규화는 어휘적으로만 수행됩니다 (파일시스템 접근 없음):
//! 구분자 중복 제거, `.` 제거, `..`는 상위로 이동하지만 `/` 위로는 나가지 않습니다.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::LayerMetadata;

/// 경로를 정규화된 절대 경로로 변환합니다.
///
/// ```
/// use ironsbom_catalog::source::normalize_path;
///
/// assert_eq!(normalize_path("usr//lib/./x/../libc.so"), "/usr/lib/libc.so");
/// assert_eq!(normalize_path("/../.."), "/");
/// ```
pub fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return "/".to_owned();
    }

    let mut normalized = String::with_capacity(path.len() + 1);
    for part in parts {
        normalized.push('/');
        normalized.push_str(part);
    }
    normalized
}

/// 링크 대상을 링크 위치 기준의 절대 경로로 변환합니다.
///
/// 상대 대상은 링크의 부모 디렉토리에 이어 붙입니다.
pub fn join_link_target(link_path: &str, target: &str) -> String {
    if target.starts_with('/') {
        return normalize_path(target);
    }
    let link_path = normalize_path(link_path);
    let parent = parent_of(&link_path);
    normalize_path(&format!("{parent}/{target}"))
}

/// 정규화된 경로의 부모 디렉토리를 반환합니다.
fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

/// 경로의 마지막 구성요소를 반환합니다.
pub(crate) fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// 트리 엔트리 종류
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// 일반 파일
    File,
    /// 디렉토리
    Dir,
    /// 심볼릭 링크 (대상은 기록된 그대로, 상대 경로일 수 있음)
    Symlink {
        /// 링크 대상
        target: String,
    },
}

/// 파일 트리 엔트리
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// 정규화된 절대 경로
    pub path: String,
    /// 엔트리 종류
    pub kind: EntryKind,
    /// 이 엔트리를 제공한 레이어 순서 (디렉토리 소스는 None)
    pub layer: Option<usize>,
}

impl TreeEntry {
    /// 일반 파일 엔트리를 생성합니다.
    pub fn file(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            kind: EntryKind::File,
            layer: None,
        }
    }

    /// 디렉토리 엔트리를 생성합니다.
    pub fn dir(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            kind: EntryKind::Dir,
            layer: None,
        }
    }

    /// 심볼릭 링크 엔트리를 생성합니다.
    pub fn symlink(path: &str, target: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path),
            kind: EntryKind::Symlink {
                target: target.into(),
            },
            layer: None,
        }
    }

    /// 소유 레이어를 지정합니다.
    pub fn in_layer(mut self, layer: usize) -> Self {
        self.layer = Some(layer);
        self
    }

    /// 심볼릭 링크인지 확인합니다.
    pub fn is_symlink(&self) -> bool {
        matches!(self.kind, EntryKind::Symlink { .. })
    }
}

/// 레이어 diff 엔트리 종류
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayerEntryKind {
    /// 일반 파일
    File,
    /// 디렉토리
    Dir,
    /// 심볼릭 링크
    Symlink {
        /// 링크 대상
        target: String,
    },
    /// 하위 레이어의 경로와 그 아래 전체를 삭제
    Whiteout,
}

/// 레이어 diff의 한 엔트리
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerEntry {
    /// 경로
    pub path: String,
    /// 엔트리 종류
    #[serde(flatten)]
    pub kind: LayerEntryKind,
}

impl LayerEntry {
    /// 파일 엔트리
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: LayerEntryKind::File,
        }
    }

    /// 디렉토리 엔트리
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: LayerEntryKind::Dir,
        }
    }

    /// 심볼릭 링크 엔트리
    pub fn symlink(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: LayerEntryKind::Symlink {
                target: target.into(),
            },
        }
    }

    /// whiteout 엔트리
    pub fn whiteout(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: LayerEntryKind::Whiteout,
        }
    }
}

/// 이미지 레이어 하나 (메타데이터 + diff 엔트리)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// 레이어 메타데이터
    pub metadata: LayerMetadata,
    /// diff 엔트리 (적용 순서대로)
    pub entries: Vec<LayerEntry>,
}

/// 읽기 전용 파일 트리 인덱스
///
/// 경로 -> 엔트리 맵과 basename -> 경로 집합 보조 인덱스를 유지합니다.
/// 구성이 끝난 뒤에는 공유 참조로만 사용되므로 스레드 간 동기화가 필요 없습니다.
#[derive(Debug, Clone, Default)]
pub struct FileTree {
    entries: BTreeMap<String, TreeEntry>,
    by_basename: HashMap<String, BTreeSet<String>>,
}

impl FileTree {
    /// 빈 트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 레이어를 순서대로 적용하여 합집합 뷰를 만듭니다.
    ///
    /// - 나중 레이어의 엔트리가 같은 경로의 이전 엔트리를 대체합니다.
    /// - 디렉토리가 아닌 엔트리가 경로를 대체하면 그 아래 엔트리도 가려집니다.
    /// - whiteout은 경로와 그 아래 전체를 제거합니다.
    ///
    /// 남은 엔트리는 자신을 마지막으로 기록한 레이어의 순서를 가집니다.
    pub fn squash(layers: &[Layer]) -> Self {
        let mut tree = Self::new();
        for layer in layers {
            let index = layer.metadata.index;
            for entry in &layer.entries {
                let path = normalize_path(&entry.path);
                let kind = match &entry.kind {
                    LayerEntryKind::Whiteout => {
                        tree.remove_subtree(&path);
                        continue;
                    }
                    LayerEntryKind::File => EntryKind::File,
                    LayerEntryKind::Dir => EntryKind::Dir,
                    LayerEntryKind::Symlink { target } => EntryKind::Symlink {
                        target: target.clone(),
                    },
                };
                if kind != EntryKind::Dir {
                    tree.remove_subtree(&path);
                }
                tree.insert(TreeEntry {
                    path,
                    kind,
                    layer: Some(index),
                });
            }
        }
        tree
    }

    /// 엔트리를 추가합니다. 같은 경로의 기존 엔트리는 대체됩니다.
    pub fn insert(&mut self, mut entry: TreeEntry) {
        entry.path = normalize_path(&entry.path);
        let name = basename(&entry.path);
        if !name.is_empty() {
            self.by_basename
                .entry(name.to_owned())
                .or_default()
                .insert(entry.path.clone());
        }
        self.entries.insert(entry.path.clone(), entry);
    }

    /// 경로와 그 아래의 모든 엔트리를 제거합니다.
    pub fn remove_subtree(&mut self, path: &str) {
        let path = normalize_path(path);
        let prefix = if path == "/" {
            "/".to_owned()
        } else {
            format!("{path}/")
        };

        let mut doomed: Vec<String> = self
            .entries
            .range(prefix.clone()..)
            .take_while(|(p, _)| p.starts_with(&prefix))
            .map(|(p, _)| p.clone())
            .collect();
        if self.entries.contains_key(&path) {
            doomed.push(path);
        }

        for p in doomed {
            self.entries.remove(&p);
            let name = basename(&p);
            if let Some(paths) = self.by_basename.get_mut(name) {
                paths.remove(&p);
                if paths.is_empty() {
                    self.by_basename.remove(name);
                }
            }
        }
    }

    /// 경로로 엔트리를 조회합니다 (링크는 따라가지 않음).
    pub fn lookup(&self, path: &str) -> Option<&TreeEntry> {
        self.entries.get(&normalize_path(path))
    }

    /// 링크 엔트리의 대상을 절대 경로로 반환합니다. 링크가 아니면 None.
    pub fn link_target(&self, entry: &TreeEntry) -> Option<String> {
        match &entry.kind {
            EntryKind::Symlink { target } => Some(join_link_target(&entry.path, target)),
            _ => None,
        }
    }

    /// 대상 경로의 마지막 구성요소와 basename이 같은 엔트리 중 하나를 고릅니다.
    ///
    /// 링크가 아닌 엔트리가 링크보다 우선입니다. 그다음 가장 높은(나중) 레이어,
    /// 같은 레이어면 사전순으로 가장 작은 경로를 고릅니다.
    /// `exclude` 경로는 후보에서 제외됩니다.
    pub fn basename_match(&self, target_path: &str, exclude: &str) -> Option<&TreeEntry> {
        let paths = self.by_basename.get(basename(target_path))?;
        let rank = |entry: &TreeEntry| (!entry.is_symlink(), entry.layer);
        let mut best: Option<&TreeEntry> = None;
        // BTreeSet 순회는 경로 오름차순이므로 순위가 더 높을 때만 교체
        for path in paths {
            if path == exclude {
                continue;
            }
            let Some(candidate) = self.entries.get(path) else {
                continue;
            };
            match best {
                Some(current) if rank(candidate) <= rank(current) => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

    /// basename이 같은 모든 엔트리를 경로 순서로 반환합니다.
    pub fn find_by_basename(&self, name: &str) -> Vec<&TreeEntry> {
        self.by_basename
            .get(name)
            .map(|paths| paths.iter().filter_map(|p| self.entries.get(p)).collect())
            .unwrap_or_default()
    }

    /// 모든 엔트리를 경로 순서로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.values()
    }

    /// 엔트리 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
