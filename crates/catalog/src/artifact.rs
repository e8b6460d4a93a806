//! 아티팩트 투영 -- 카탈로그 엔트리를 직렬화 가능한 출력 모델로 변환
//!
//! [`Projector`]는 `(Package, Source)`에서 [`Artifact`]로의 순수하고 결정적인 변환입니다.
//!
//! - 모든 원시 위치 참조를 [`LocationResolver`]로 해석합니다.
//! - 해석된 위치는 중복 제거 후 `(real_path, layer)` 순서로 정렬됩니다.
//! - 메타데이터는 해석하지 않고 그대로 전달합니다 (같은 `Arc` 공유).
//! - 위치 하나라도 해석에 실패하면 해당 패키지의 투영 전체가 실패합니다.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ironsbom_core::metrics as m;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::location::Location;
use crate::resolver::LocationResolver;
use crate::source::Source;
use crate::types::{Package, PackageIdentifier, PackageMetadata};

/// 직렬화 가능한 패키지 투영
///
/// 투영 호출마다 새로 만들어지며, 카탈로그를 역참조하지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// 패키지 이름
    pub name: String,
    /// 패키지 버전
    pub version: String,
    /// 패키지 타입 문자열
    #[serde(rename = "type")]
    pub package_type: String,
    /// 기여한 디스커버리 작업 이름 (정렬, 중복 제거)
    pub found_by: Vec<String>,
    /// 해석된 위치 (`real_path`, `layer` 순)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    /// 생태계별 메타데이터 (불투명)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PackageMetadata>,
    /// 벤더 (없으면 빈 문자열)
    #[serde(default)]
    pub vendor: String,
    /// 보조 식별자
    #[serde(default)]
    pub alternate_identifiers: Vec<PackageIdentifier>,
}

/// 아티팩트 투영기
#[derive(Debug, Clone, Copy, Default)]
pub struct Projector {
    resolver: LocationResolver,
}

impl Projector {
    /// 해석기로 투영기를 생성합니다.
    pub fn new(resolver: LocationResolver) -> Self {
        Self { resolver }
    }

    /// 사용 중인 해석기
    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    /// 패키지 하나를 아티팩트로 투영합니다.
    ///
    /// # Errors
    ///
    /// 위치 하나라도 해석하지 못하면 `CatalogError::UnresolvedLocation`을 반환합니다.
    /// 부분적인 위치 집합을 가진 아티팩트는 만들지 않습니다.
    pub fn project(&self, package: &Package, source: &dyn Source) -> Result<Artifact, CatalogError> {
        let mut locations = Vec::with_capacity(package.locations.len());
        for raw in &package.locations {
            match self.resolver.resolve(raw, source) {
                Ok(resolved) => locations.push(resolved),
                Err(e) => {
                    metrics::counter!(
                        m::PROJECTION_FAILURES_TOTAL,
                        m::LABEL_REASON => e.reason(),
                        m::LABEL_SOURCE_KIND => source.kind().to_string()
                    )
                    .increment(1);
                    debug!(
                        package = %package,
                        path = %raw.virtual_path,
                        error = %e,
                        "failed to resolve package location"
                    );
                    return Err(CatalogError::UnresolvedLocation {
                        package: package.to_string(),
                        path: raw.virtual_path.clone(),
                        source: e,
                    });
                }
            }
        }
        locations.sort_by(Location::cmp_by_real_path);
        locations.dedup();

        Ok(Artifact {
            name: package.name.clone(),
            version: package.version.clone(),
            package_type: package.package_type.to_string(),
            found_by: package.found_by.iter().cloned().collect(),
            locations,
            metadata: package.metadata.clone(),
            vendor: package.vendor.clone().unwrap_or_default(),
            alternate_identifiers: package.alternate_identifiers.clone(),
        })
    }

    /// 카탈로그 전체를 열거 순서대로 투영합니다.
    ///
    /// # Errors
    ///
    /// 한 패키지라도 실패하면 그 에러를 반환하고 아티팩트는 반환하지 않습니다.
    /// 부분 결과가 필요하면 패키지마다 [`Projector::project`]를 호출하세요.
    pub fn project_all(
        &self,
        catalog: &Catalog,
        source: &dyn Source,
    ) -> Result<Vec<Artifact>, CatalogError> {
        let packages = catalog.enumerate(None);
        let mut artifacts = Vec::with_capacity(packages.len());
        for package in &packages {
            match self.project(package, source) {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => {
                    warn!(error = %e, "projection aborted");
                    return Err(e);
                }
            }
        }
        debug!(count = artifacts.len(), source = %source.root(), "projected catalog");
        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::location::SourceKind;
    use crate::source::{DirectorySource, ImageSource, Layer, LayerEntry, LayerMetadata};
    use crate::types::PackageType;

    /// 등록된 메트릭 키와 레이블을 기록하는 테스트 recorder
    #[derive(Default)]
    struct KeyCapture {
        keys: std::sync::Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl metrics::Recorder for KeyCapture {
        fn describe_counter(&self, _: metrics::KeyName, _: Option<metrics::Unit>, _: metrics::SharedString) {}
        fn describe_gauge(&self, _: metrics::KeyName, _: Option<metrics::Unit>, _: metrics::SharedString) {}
        fn describe_histogram(&self, _: metrics::KeyName, _: Option<metrics::Unit>, _: metrics::SharedString) {}

        fn register_counter(&self, key: &metrics::Key, _: &metrics::Metadata<'_>) -> metrics::Counter {
            let labels = key
                .labels()
                .map(|l| (l.key().to_owned(), l.value().to_owned()))
                .collect();
            self.keys.lock().unwrap().push((key.name().to_owned(), labels));
            metrics::Counter::noop()
        }

        fn register_gauge(&self, _: &metrics::Key, _: &metrics::Metadata<'_>) -> metrics::Gauge {
            metrics::Gauge::noop()
        }

        fn register_histogram(&self, _: &metrics::Key, _: &metrics::Metadata<'_>) -> metrics::Histogram {
            metrics::Histogram::noop()
        }
    }

    fn image() -> ImageSource {
        let layers = vec![
            Layer {
                metadata: LayerMetadata {
                    index: 0,
                    digest: "sha256:aaaa".to_owned(),
                    media_type: String::new(),
                    size: 10,
                },
                entries: vec![
                    LayerEntry::file("/usr/lib/libz.so.1.3"),
                    LayerEntry::symlink("/usr/lib/libz.so.1", "libz.so.1.3"),
                ],
            },
            Layer {
                metadata: LayerMetadata {
                    index: 1,
                    digest: "sha256:bbbb".to_owned(),
                    media_type: String::new(),
                    size: 20,
                },
                entries: vec![LayerEntry::file("/var/lib/dpkg/status")],
            },
        ];
        ImageSource::from_layers("debian:12", &layers)
    }

    #[test]
    fn project_resolves_and_orders_locations() {
        let pkg = Package::new("zlib1g", "1.3", PackageType::Deb, "dpkg")
            .with_location(Location::new("/var/lib/dpkg/status"))
            .with_location(Location::new("/usr/lib/libz.so.1"));
        let artifact = Projector::default().project(&pkg, &image()).unwrap();

        let reals: Vec<_> = artifact.locations.iter().map(|l| l.real_path.as_str()).collect();
        assert_eq!(reals, vec!["/usr/lib/libz.so.1.3", "/var/lib/dpkg/status"]);
        assert_eq!(artifact.locations[0].virtual_path, "/usr/lib/libz.so.1");
        assert_eq!(artifact.locations[0].source_kind, SourceKind::Image);
        assert_eq!(artifact.locations[1].layer.as_ref().map(|l| l.index), Some(1));
        assert_eq!(artifact.package_type, "deb");
        assert_eq!(artifact.found_by, vec!["dpkg"]);
    }

    #[test]
    fn project_fails_fast_on_missing_location() {
        let pkg = Package::new("ghost", "0.1", PackageType::Deb, "dpkg")
            .with_location(Location::new("/var/lib/dpkg/status"))
            .with_location(Location::new("/nope"));
        let err = Projector::default().project(&pkg, &image()).unwrap_err();
        assert!(matches!(
            err.resolve_error(),
            Some(ResolveError::LocationNotFound { path }) if path == "/nope"
        ));
    }

    #[test]
    fn project_passes_metadata_through() {
        let meta = PackageMetadata::new(serde_json::json!({"nested": {"list": [1, 2, null]}}));
        let pkg = Package::new("a", "1", PackageType::Deb, "dpkg")
            .with_location(Location::new("/var/lib/dpkg/status"))
            .with_metadata(meta.clone());
        let artifact = Projector::default().project(&pkg, &image()).unwrap();
        assert!(artifact.metadata.unwrap().ptr_eq(&meta));
    }

    #[test]
    fn project_directory_locations_have_no_layer() {
        let pkg = Package::new("a", "1", PackageType::Python, "python")
            .with_location(Location::new("/srv/app/requirements.txt"));
        let artifact = Projector::default()
            .project(&pkg, &DirectorySource::new("/srv/app"))
            .unwrap();
        assert_eq!(artifact.locations[0].real_path, "/requirements.txt");
        assert!(artifact.locations[0].layer.is_none());
    }

    #[test]
    fn project_all_is_all_or_nothing() {
        let catalog = Catalog::new();
        catalog
            .add(
                Package::new("ok", "1", PackageType::Deb, "dpkg")
                    .with_location(Location::new("/var/lib/dpkg/status")),
            )
            .unwrap();
        catalog
            .add(
                Package::new("bad", "1", PackageType::Deb, "dpkg")
                    .with_location(Location::new("/missing")),
            )
            .unwrap();
        let result = Projector::default().project_all(&catalog, &image());
        assert!(matches!(result, Err(CatalogError::UnresolvedLocation { .. })));
    }

    #[test]
    fn artifact_json_keys() {
        let pkg = Package::new("a", "1", PackageType::JavaArchive, "java")
            .with_location(Location::new("/var/lib/dpkg/status"));
        let artifact = Projector::default().project(&pkg, &image()).unwrap();
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["type"], "java-archive");
        assert_eq!(json["foundBy"][0], "java");
        assert_eq!(json["vendor"], "");
        assert!(json.get("metadata").is_none());
        assert!(json["alternateIdentifiers"].as_array().unwrap().is_empty());
    }

    #[test]
    fn projection_failure_counter_carries_reason_and_source_kind() {
        let pkg = Package::new("ghost", "0.1", PackageType::Deb, "dpkg")
            .with_location(Location::new("/nope"));
        let recorder = KeyCapture::default();

        metrics::with_local_recorder(&recorder, || {
            assert!(Projector::default().project(&pkg, &image()).is_err());
        });

        let keys = recorder.keys.lock().unwrap();
        let (_, labels) = keys
            .iter()
            .find(|(name, _)| name == m::PROJECTION_FAILURES_TOTAL)
            .expect("failure counter registered");
        assert!(labels.contains(&(m::LABEL_REASON.to_owned(), "not_found".to_owned())));
        assert!(labels.contains(&(m::LABEL_SOURCE_KIND.to_owned(), "image".to_owned())));
    }
}
