//! 파일 위치 타입 -- 패키지 탐지의 출처
//!
//! [`Location`]은 패키지를 만들어낸 파일의 위치입니다.
//! `virtual_path`는 탐지에 사용된 경로(심볼릭 링크일 수 있음),
//! `real_path`는 실제 바이트가 있는 역참조된 경로입니다.
//!
//! 식별자와 정렬 순서는 `(virtual_path, real_path, layer)`이며
//! `source_kind`는 비교에 참여하지 않습니다.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// 콘텐츠 소스 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// 파일시스템 디렉토리
    Directory,
    /// 컨테이너 이미지 (레이어 squash 뷰)
    Image,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// 해석된 파일을 제공하는 이미지 레이어
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerRef {
    /// 레이어 순서 (0이 가장 아래)
    pub index: usize,
    /// 레이어 다이제스트 (`sha256:...`)
    pub digest: String,
}

impl fmt::Display for LayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer[{}] {}", self.index, self.digest)
    }
}

/// 패키지 탐지 위치
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// 탐지에 사용된 경로 (링크일 수 있음)
    #[serde(rename = "path")]
    pub virtual_path: String,
    /// 역참조된 실제 경로
    pub real_path: String,
    /// 소스 종류
    pub source_kind: SourceKind,
    /// 이미지 소스에서 파일을 제공한 레이어
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<LayerRef>,
}

impl Location {
    /// 디스커버리 작업이 기록하는 원시 참조를 생성합니다.
    ///
    /// 아직 해석 전이므로 `real_path`는 `path`와 같고 레이어 정보가 없습니다.
    /// 투영 시 해석기가 실제 소스 기준의 위치로 대체합니다.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            real_path: path.clone(),
            virtual_path: path,
            source_kind: SourceKind::Directory,
            layer: None,
        }
    }

    /// 디렉토리 소스에서 해석된 위치를 생성합니다.
    pub fn in_directory(virtual_path: impl Into<String>, real_path: impl Into<String>) -> Self {
        Self {
            virtual_path: virtual_path.into(),
            real_path: real_path.into(),
            source_kind: SourceKind::Directory,
            layer: None,
        }
    }

    /// 이미지 소스에서 해석된 위치를 생성합니다.
    pub fn in_image(
        virtual_path: impl Into<String>,
        real_path: impl Into<String>,
        layer: Option<LayerRef>,
    ) -> Self {
        Self {
            virtual_path: virtual_path.into(),
            real_path: real_path.into(),
            source_kind: SourceKind::Image,
            layer,
        }
    }

    fn identity(&self) -> (&str, &str, Option<&LayerRef>) {
        (&self.virtual_path, &self.real_path, self.layer.as_ref())
    }

    /// 아티팩트 출력 순서 `(real_path, layer, virtual_path)`로 비교합니다.
    pub fn cmp_by_real_path(&self, other: &Self) -> Ordering {
        (&self.real_path, self.layer.as_ref(), &self.virtual_path).cmp(&(
            &other.real_path,
            other.layer.as_ref(),
            &other.virtual_path,
        ))
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.virtual_path == self.real_path {
            write!(f, "{}", self.real_path)?;
        } else {
            write!(f, "{} -> {}", self.virtual_path, self.real_path)?;
        }
        if let Some(layer) = &self.layer {
            write!(f, " ({layer})")?;
        }
        Ok(())
    }
}
