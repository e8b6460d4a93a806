//! Integration tests for the catalog
//!
//! Tests the full flow: discovery candidates -> Catalog -> Projector -> Artifact list

use std::sync::Arc;

use ironsbom_catalog::{
    Catalog, CatalogError, Cataloger, DirectorySource, ImageSource, Layer, LayerEntry,
    LayerMetadata, Location, Package, PackageMetadata, PackageType, Projector, ResolveError,
    Source, SourceKind, run_catalogers,
};

fn layer(index: usize, entries: Vec<LayerEntry>) -> Layer {
    Layer {
        metadata: LayerMetadata {
            index,
            digest: format!("sha256:{index:064x}"),
            media_type: "application/vnd.docker.image.rootfs.diff.tar.gzip".to_owned(),
            size: 2048,
        },
        entries,
    }
}

fn two_file_image() -> ImageSource {
    ImageSource::from_layers(
        "image-simple:latest",
        &[
            layer(0, vec![LayerEntry::file("/somefile-1.txt")]),
            layer(1, vec![LayerEntry::file("/somefile-2.txt")]),
        ],
    )
}

/// Directory source with two distinct packages
#[test]
fn test_directory_source_two_packages() {
    let source = DirectorySource::new("/scan");
    let catalog = Catalog::new();

    catalog
        .add(
            Package::new("package-2", "2.0.1", PackageType::Deb, "dpkg")
                .with_location(Location::new("/scan/some/path/pkg2")),
        )
        .unwrap();
    catalog
        .add(
            Package::new("package-1", "1.0.1", PackageType::Deb, "dpkg")
                .with_location(Location::new("/scan/some/path/pkg1")),
        )
        .unwrap();

    let names: Vec<_> = catalog.enumerate(None).into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["package-1", "package-2"]);

    let artifacts = Projector::default().project_all(&catalog, &source).unwrap();
    assert_eq!(artifacts.len(), 2);
    assert_eq!(artifacts[0].name, "package-1");
    assert_eq!(artifacts[0].locations[0].real_path, "/some/path/pkg1");
    for artifact in &artifacts {
        for loc in &artifact.locations {
            assert!(loc.layer.is_none());
            assert_eq!(loc.source_kind, SourceKind::Directory);
        }
    }
}

/// Image source where one package carries ecosystem metadata
#[test]
fn test_image_source_metadata_passthrough() {
    let source = two_file_image();
    let catalog = Catalog::new();
    let metadata = PackageMetadata::new(serde_json::json!({
        "Name": "package-2",
        "Version": "1.0.2",
    }));

    catalog
        .add(
            Package::new("package-1", "1.0.1", PackageType::Python, "python")
                .with_location(Location::new("/somefile-1.txt")),
        )
        .unwrap();
    catalog
        .add(
            Package::new("package-2", "2.0.1", PackageType::Deb, "dpkg")
                .with_location(Location::new("/somefile-2.txt"))
                .with_metadata(metadata.clone()),
        )
        .unwrap();

    let artifacts = Projector::default().project_all(&catalog, &source).unwrap();
    assert_eq!(artifacts.len(), 2);

    let pkg2 = &artifacts[1];
    assert_eq!(pkg2.name, "package-2");
    assert_eq!(pkg2.version, "2.0.1");
    assert!(pkg2.metadata.as_ref().unwrap().ptr_eq(&metadata));
    assert_eq!(pkg2.metadata.as_ref().unwrap().as_value()["Version"], "1.0.2");

    let layer = pkg2.locations[0].layer.as_ref().unwrap();
    assert_eq!(layer.index, 1);
    assert_eq!(pkg2.locations[0].real_path, "/somefile-2.txt");
    assert!(artifacts[0].metadata.is_none());
}

/// Two discovery tasks agree on the same package
#[test]
fn test_two_catalogers_same_package() {
    let source = two_file_image();
    let catalog = Catalog::new();

    let dpkg = catalog
        .add(
            Package::new("package-1", "1.0.1", PackageType::Deb, "dpkg")
                .with_location(Location::new("/somefile-1.txt")),
        )
        .unwrap();
    let apk = catalog
        .add(
            Package::new("package-1", "1.0.1", PackageType::Deb, "apk")
                .with_location(Location::new("/somefile-1.txt")),
        )
        .unwrap();

    assert_eq!(dpkg, apk);
    assert_eq!(catalog.count(), 1);

    let artifacts = Projector::default().project_all(&catalog, &source).unwrap();
    assert_eq!(artifacts[0].found_by, vec!["apk", "dpkg"]);
    assert_eq!(artifacts[0].locations.len(), 1);
}

/// A reference absent from the image tree
#[test]
fn test_missing_location_fails_projection() {
    let source = two_file_image();
    let catalog = Catalog::new();

    catalog
        .add(
            Package::new("package-1", "1.0.1", PackageType::Deb, "dpkg")
                .with_location(Location::new("/somefile-1.txt")),
        )
        .unwrap();
    let ghost = Package::new("ghost", "0.0.1", PackageType::Deb, "dpkg")
        .with_location(Location::new("/does/not/exist"));
    catalog.add(ghost.clone()).unwrap();

    let projector = Projector::default();
    let err = projector.project(&ghost, &source).unwrap_err();
    assert_eq!(
        err.resolve_error(),
        Some(&ResolveError::LocationNotFound {
            path: "/does/not/exist".to_owned()
        })
    );

    let all = projector.project_all(&catalog, &source);
    match all {
        Err(CatalogError::UnresolvedLocation { source, path, .. }) => {
            assert_eq!(path, "/does/not/exist");
            assert!(matches!(source, ResolveError::LocationNotFound { .. }));
        }
        other => panic!("expected UnresolvedLocation, got {other:?}"),
    }
}

/// Per-package projection lets callers opt into partial results
#[test]
fn test_partial_projection_per_package() {
    let source = two_file_image();
    let catalog = Catalog::new();
    for (name, path) in [("a", "/somefile-1.txt"), ("b", "/missing"), ("c", "/somefile-2.txt")] {
        catalog
            .add(Package::new(name, "1", PackageType::Npm, "npm").with_location(Location::new(path)))
            .unwrap();
    }

    let projector = Projector::default();
    let (ok, failed): (Vec<_>, Vec<_>) = catalog
        .enumerate(None)
        .iter()
        .map(|p| projector.project(p, &source))
        .partition(Result::is_ok);
    assert_eq!(ok.len(), 2);
    assert_eq!(failed.len(), 1);
}

/// Layered image: whiteouts, overrides and links across layers
#[test]
fn test_layered_image_resolution() {
    let source = ImageSource::from_layers(
        "app:1.0",
        &[
            layer(
                0,
                vec![
                    LayerEntry::dir("/usr/lib"),
                    LayerEntry::file("/usr/lib/libssl.so.3"),
                    LayerEntry::symlink("/lib", "usr/lib"),
                    LayerEntry::file("/tmp/build.log"),
                ],
            ),
            layer(
                1,
                vec![
                    LayerEntry::file("/usr/lib/libssl.so.3"),
                    LayerEntry::symlink("/usr/lib/libssl.so", "libssl.so.3"),
                    LayerEntry::whiteout("/tmp"),
                ],
            ),
        ],
    );

    let catalog = Catalog::new();
    catalog
        .add(
            Package::new("openssl", "3.0.13", PackageType::Deb, "dpkg")
                .with_location(Location::new("/lib/libssl.so")),
        )
        .unwrap();
    let artifacts = Projector::default().project_all(&catalog, &source).unwrap();
    let loc = &artifacts[0].locations[0];
    assert_eq!(loc.virtual_path, "/lib/libssl.so");
    assert_eq!(loc.real_path, "/usr/lib/libssl.so.3");
    assert_eq!(loc.layer.as_ref().map(|l| l.index), Some(1));

    let tmp = Package::new("log", "1", PackageType::Deb, "dpkg")
        .with_location(Location::new("/tmp/build.log"));
    assert!(Projector::default().project(&tmp, &source).is_err());
}

struct ImageFileCataloger {
    name: &'static str,
    package_type: PackageType,
}

impl Cataloger for ImageFileCataloger {
    fn name(&self) -> &str {
        self.name
    }

    fn catalog(&self, source: &dyn Source) -> Result<Vec<Package>, CatalogError> {
        let Some(tree) = source.tree() else {
            return Ok(Vec::new());
        };
        Ok(tree
            .iter()
            .filter(|e| e.path.ends_with(".txt"))
            .map(|e| {
                let name = e.path.trim_start_matches('/').trim_end_matches(".txt");
                Package::new(name, "1.0.0", self.package_type, self.name)
                    .with_location(Location::new(e.path.clone()))
            })
            .collect())
    }
}

/// Concurrent discovery tasks feeding one run-scoped catalog
#[tokio::test]
async fn test_run_catalogers_end_to_end() {
    let source: Arc<dyn Source> = Arc::new(two_file_image());
    let catalog = Arc::new(Catalog::new());
    let catalogers: Vec<Arc<dyn Cataloger>> = vec![
        Arc::new(ImageFileCataloger {
            name: "dpkg",
            package_type: PackageType::Deb,
        }),
        Arc::new(ImageFileCataloger {
            name: "apk",
            package_type: PackageType::Deb,
        }),
    ];

    let summary = run_catalogers(Arc::clone(&source), catalogers, Arc::clone(&catalog)).await;
    assert_eq!(summary.added, 4);
    assert_eq!(catalog.count(), 2);

    let artifacts = Projector::default()
        .project_all(&catalog, source.as_ref())
        .unwrap();
    assert_eq!(artifacts.len(), 2);
    for artifact in &artifacts {
        assert_eq!(artifact.found_by, vec!["apk", "dpkg"]);
    }
}
