//! 컨테이너 이미지 소스

use crate::location::{LayerRef, SourceKind};

use super::{FileTree, Layer, LayerMetadata, Source, SourceMetadata, TreeEntry};

/// 컨테이너 이미지 소스
///
/// 레이어 목록과 squash된 파일 트리를 보관합니다.
/// 레이어 추출은 외부 작업이며 여기서는 결과만 받습니다.
#[derive(Debug, Clone)]
pub struct ImageSource {
    user_input: String,
    layers: Vec<LayerMetadata>,
    tree: FileTree,
}

impl ImageSource {
    /// 이미 squash된 트리로 생성합니다.
    pub fn new(user_input: impl Into<String>, layers: Vec<LayerMetadata>, tree: FileTree) -> Self {
        Self {
            user_input: user_input.into(),
            layers,
            tree,
        }
    }

    /// 레이어 diff를 squash하여 생성합니다.
    pub fn from_layers(user_input: impl Into<String>, layers: &[Layer]) -> Self {
        let tree = FileTree::squash(layers);
        let metadata = layers.iter().map(|l| l.metadata.clone()).collect();
        Self::new(user_input, metadata, tree)
    }

    /// 레이어 메타데이터 목록
    pub fn layers(&self) -> &[LayerMetadata] {
        &self.layers
    }
}

impl Source for ImageSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Image
    }

    fn root(&self) -> &str {
        &self.user_input
    }

    fn tree(&self) -> Option<&FileTree> {
        Some(&self.tree)
    }

    fn layer_of(&self, entry: &TreeEntry) -> Option<LayerRef> {
        let index = entry.layer?;
        self.layers
            .iter()
            .find(|l| l.index == index)
            .map(LayerMetadata::to_ref)
    }

    fn metadata(&self) -> SourceMetadata {
        SourceMetadata {
            kind: SourceKind::Image,
            target: self.user_input.clone(),
            layers: self.layers.clone(),
        }
    }
}
