//! 콘텐츠 소스 -- 디렉토리와 컨테이너 이미지
//!
//! [`Source`] trait은 해석기가 소비하는 소스 계약입니다.
//! 소스와 파일 트리는 외부에서 구성되며, 카탈로그 실행 동안 읽기 전용입니다.
//!
//! # 구현
//!
//! - [`DirectorySource`]: 파일시스템 디렉토리 (선택적 트리 인덱스)
//! - [`ImageSource`]: 레이어 squash 트리를 가진 컨테이너 이미지

mod directory;
mod image;
mod tree;

pub use directory::DirectorySource;
pub use image::ImageSource;
pub use tree::{
    EntryKind, FileTree, Layer, LayerEntry, LayerEntryKind, TreeEntry, join_link_target,
    normalize_path,
};

use serde::{Deserialize, Serialize};

use crate::location::{LayerRef, SourceKind};

/// 이미지 레이어 메타데이터
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerMetadata {
    /// 레이어 순서 (0이 가장 아래)
    pub index: usize,
    /// 레이어 다이제스트
    pub digest: String,
    /// 미디어 타입
    #[serde(default)]
    pub media_type: String,
    /// 압축 크기 (바이트)
    #[serde(default)]
    pub size: u64,
}

impl LayerMetadata {
    /// 위치에 기록할 레이어 참조를 만듭니다.
    pub fn to_ref(&self) -> LayerRef {
        LayerRef {
            index: self.index,
            digest: self.digest.clone(),
        }
    }
}

/// 출력기가 아티팩트와 함께 읽는 소스 설명
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMetadata {
    /// 소스 종류
    pub kind: SourceKind,
    /// 스캔 대상 (디렉토리 경로 또는 이미지 참조)
    pub target: String,
    /// 이미지 레이어 목록 (디렉토리는 비어 있음)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<LayerMetadata>,
}

/// 콘텐츠 소스 trait
///
/// 해석 중 여러 작업 스레드에서 공유되므로 `Send + Sync`가 필요합니다.
pub trait Source: Send + Sync {
    /// 소스 종류를 반환합니다.
    fn kind(&self) -> SourceKind;

    /// 스캔 루트 (디렉토리 경로 또는 이미지 참조)
    fn root(&self) -> &str;

    /// 파일 트리 뷰를 반환합니다. 인덱스가 없는 디렉토리 소스는 None.
    fn tree(&self) -> Option<&FileTree>;

    /// 엔트리를 제공한 레이어를 반환합니다.
    fn layer_of(&self, entry: &TreeEntry) -> Option<LayerRef>;

    /// 출력용 소스 설명을 반환합니다.
    fn metadata(&self) -> SourceMetadata;
}
