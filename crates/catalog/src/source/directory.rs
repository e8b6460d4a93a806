//! 디렉토리 소스

use crate::location::{LayerRef, SourceKind};

use super::{FileTree, Source, SourceMetadata, TreeEntry};

/// 파일시스템 디렉토리 소스
///
/// 트리 인덱스가 없으면 해석은 어휘적으로만 수행되며 실패하지 않습니다.
/// 인덱스가 있으면 이미지와 같은 규칙(레이어 제외)으로 링크를 따라갑니다.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: String,
    tree: Option<FileTree>,
}

impl DirectorySource {
    /// 인덱스 없는 디렉토리 소스를 생성합니다.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            tree: None,
        }
    }

    /// 미리 구성한 트리 인덱스와 함께 생성합니다.
    pub fn with_index(root: impl Into<String>, tree: FileTree) -> Self {
        Self {
            root: root.into(),
            tree: Some(tree),
        }
    }
}

impl Source for DirectorySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Directory
    }

    fn root(&self) -> &str {
        &self.root
    }

    fn tree(&self) -> Option<&FileTree> {
        self.tree.as_ref()
    }

    fn layer_of(&self, _entry: &TreeEntry) -> Option<LayerRef> {
        None
    }

    fn metadata(&self) -> SourceMetadata {
        SourceMetadata {
            kind: SourceKind::Directory,
            target: self.root.clone(),
            layers: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_source_has_no_layers() {
        let source = DirectorySource::new("/scan/root");
        assert_eq!(source.kind(), SourceKind::Directory);
        assert!(source.tree().is_none());
        assert!(source.layer_of(&TreeEntry::file("/a")).is_none());
        assert!(source.metadata().layers.is_empty());
        assert_eq!(source.metadata().target, "/scan/root");
    }

    #[test]
    fn indexed_directory_exposes_tree() {
        let mut tree = FileTree::new();
        tree.insert(TreeEntry::file("/etc/os-release"));
        let source = DirectorySource::with_index("/scan/root", tree);
        assert_eq!(source.tree().map(FileTree::len), Some(1));
    }
}
