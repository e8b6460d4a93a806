//! 도메인 타입 -- 패키지, 패키지 타입, 메타데이터, 식별자
//!
//! 디스커버리 작업이 생성하고 카탈로그가 저장하는 패키지 관련 타입을 정의합니다.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CatalogError;
use crate::location::Location;

/// 패키지 생태계 종류 (닫힌 열거형)
///
/// 변형 선언 순서는 문자열 표현의 사전순과 같으며, 파생된 `Ord`가 그 순서를 따릅니다.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PackageType {
    /// Alpine (apk)
    Apk,
    /// Debian (dpkg)
    Deb,
    /// Ruby gem
    Gem,
    /// Go 모듈
    GoModule,
    /// Java 아카이브 (jar, war, ear)
    JavaArchive,
    /// JavaScript (npm)
    Npm,
    /// Python (egg, wheel, dist-info)
    Python,
    /// RPM
    Rpm,
    /// Rust crate
    RustCrate,
    /// 알 수 없음 -- 카탈로그에 추가할 수 없음
    Unknown,
}

impl PackageType {
    /// 타입 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apk => "apk",
            Self::Deb => "deb",
            Self::Gem => "gem",
            Self::GoModule => "go-module",
            Self::JavaArchive => "java-archive",
            Self::Npm => "npm",
            Self::Python => "python",
            Self::Rpm => "rpm",
            Self::RustCrate => "rust-crate",
            Self::Unknown => "unknown",
        }
    }

    /// 문자열에서 패키지 타입을 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "apk" | "alpine" => Some(Self::Apk),
            "deb" | "dpkg" | "debian" => Some(Self::Deb),
            "gem" | "bundle" | "ruby" => Some(Self::Gem),
            "go-module" | "go" | "golang" => Some(Self::GoModule),
            "java-archive" | "java" | "jar" | "maven" => Some(Self::JavaArchive),
            "npm" | "node" | "javascript" => Some(Self::Npm),
            "python" | "pypi" | "wheel" | "egg" => Some(Self::Python),
            "rpm" => Some(Self::Rpm),
            "rust-crate" | "cargo" | "rust" | "crate" => Some(Self::RustCrate),
            "" | "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 카탈로그 엔트리 식별자
///
/// 실행 범위 안에서 단조 증가하며 재사용되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId(pub u64);

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pkg-{}", self.0)
    }
}

/// 생태계별 메타데이터 (불투명 값)
///
/// 코어는 내용을 해석하지 않습니다. 내부 값은 `Arc`로 공유되므로
/// 복제해도 같은 값을 참조합니다.
#[derive(Debug, Clone)]
pub struct PackageMetadata(Arc<serde_json::Value>);

impl PackageMetadata {
    /// JSON 값으로 메타데이터를 생성합니다.
    pub fn new(value: serde_json::Value) -> Self {
        Self(Arc::new(value))
    }

    /// 직렬화 가능한 임의의 값으로 메타데이터를 생성합니다.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, CatalogError> {
        serde_json::to_value(value)
            .map(Self::new)
            .map_err(|e| CatalogError::Metadata(e.to_string()))
    }

    /// 내부 JSON 값을 반환합니다.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// 두 메타데이터가 같은 값을 참조하는지 확인합니다.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// 병합 시 결정적 선택에 쓰는 정규 문자열
    pub(crate) fn canonical(&self) -> String {
        self.0.to_string()
    }
}

impl PartialEq for PackageMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl Serialize for PackageMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PackageMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::new)
    }
}

/// 보조 식별자 체계
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierScheme {
    /// Common Platform Enumeration
    Cpe,
    /// Package URL
    Purl,
}

/// 보조 식별자 (CPE, PURL 등)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageIdentifier {
    /// 식별자 체계
    #[serde(rename = "type")]
    pub scheme: IdentifierScheme,
    /// 식별자 값
    pub value: String,
}

impl PackageIdentifier {
    /// CPE 식별자를 생성합니다.
    pub fn cpe(value: impl Into<String>) -> Self {
        Self {
            scheme: IdentifierScheme::Cpe,
            value: value.into(),
        }
    }

    /// PURL 식별자를 생성합니다.
    pub fn purl(value: impl Into<String>) -> Self {
        Self {
            scheme: IdentifierScheme::Purl,
            value: value.into(),
        }
    }
}

/// 발견된 소프트웨어 패키지
///
/// 디스커버리 작업이 후보로 생성하고, 카탈로그가 병합하여 저장합니다.
/// `found_by`는 이 엔트리에 기여한 디스커버리 작업 이름의 집합입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// 패키지 이름 (생태계 범위)
    pub name: String,
    /// 패키지 버전
    pub version: String,
    /// 패키지 타입
    #[serde(rename = "type")]
    pub package_type: PackageType,
    /// 기여한 디스커버리 작업 이름
    #[serde(default)]
    pub found_by: BTreeSet<String>,
    /// 원시 위치 참조
    #[serde(default)]
    pub locations: BTreeSet<Location>,
    /// 생태계별 메타데이터
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PackageMetadata>,
    /// 벤더
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// 보조 식별자 (정렬, 중복 제거 상태로 유지)
    #[serde(default)]
    pub alternate_identifiers: Vec<PackageIdentifier>,
}

impl Package {
    /// 단일 디스커버리 작업이 만든 패키지 후보를 생성합니다.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        package_type: PackageType,
        found_by: impl Into<String>,
    ) -> Self {
        let found_by: String = found_by.into();
        let mut found = BTreeSet::new();
        if !found_by.is_empty() {
            found.insert(found_by);
        }
        Self {
            name: name.into(),
            version: version.into(),
            package_type,
            found_by: found,
            locations: BTreeSet::new(),
            metadata: None,
            vendor: None,
            alternate_identifiers: Vec::new(),
        }
    }

    /// 원시 위치 참조를 추가합니다.
    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.insert(location);
        self
    }

    /// 메타데이터를 설정합니다.
    pub fn with_metadata(mut self, metadata: PackageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// 벤더를 설정합니다.
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    /// 보조 식별자를 추가합니다.
    pub fn with_identifier(mut self, identifier: PackageIdentifier) -> Self {
        self.alternate_identifiers.push(identifier);
        self
    }

    /// 열거 정렬 키 `(name, version, type, found_by)`
    pub(crate) fn sort_key(&self) -> (&str, &str, PackageType, &BTreeSet<String>) {
        (&self.name, &self.version, self.package_type, &self.found_by)
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.name, self.version, self.package_type)
    }
}
