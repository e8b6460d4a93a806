//! Determinism and symlink-chain property tests
//!
//! - Add order and thread interleaving never change `enumerate` / `project_all` output
//! - Symlink chains up to the hop limit resolve to the terminal entry
//! - Cyclic chains always end in `BrokenLink`

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use ironsbom_catalog::{
    Catalog, ImageSource, Layer, LayerEntry, LayerMetadata, LinkPolicy, Location,
    LocationResolver, Package, PackageIdentifier, PackageMetadata, PackageType, Projector,
    ResolveError,
};

const FILES: [&str; 4] = ["/a.txt", "/b.txt", "/c/d.txt", "/link.txt"];
const FINDERS: [&str; 3] = ["apk", "dpkg", "rpmdb"];

fn fixture_image() -> ImageSource {
    ImageSource::from_layers(
        "determinism:test",
        &[
            Layer {
                metadata: LayerMetadata {
                    index: 0,
                    digest: "sha256:00".to_owned(),
                    media_type: String::new(),
                    size: 0,
                },
                entries: vec![
                    LayerEntry::file("/a.txt"),
                    LayerEntry::file("/b.txt"),
                    LayerEntry::file("/c/d.txt"),
                ],
            },
            Layer {
                metadata: LayerMetadata {
                    index: 1,
                    digest: "sha256:01".to_owned(),
                    media_type: String::new(),
                    size: 0,
                },
                entries: vec![LayerEntry::symlink("/link.txt", "c/d.txt")],
            },
        ],
    )
}

/// (name index, version index, finder index, file index, vendor?, metadata?, identifier?)
type Spec = (u8, u8, usize, usize, Option<u8>, Option<u8>, Option<u8>);

fn candidate(spec: &Spec) -> Package {
    let (name, version, finder, file, vendor, meta, ident) = *spec;
    let mut pkg = Package::new(
        format!("pkg-{name}"),
        format!("1.{version}"),
        if name % 2 == 0 {
            PackageType::Deb
        } else {
            PackageType::Npm
        },
        FINDERS[finder],
    )
    .with_location(Location::new(FILES[file]));
    if let Some(v) = vendor {
        pkg = pkg.with_vendor(format!("vendor-{v}"));
    }
    if let Some(m) = meta {
        pkg = pkg.with_metadata(PackageMetadata::new(serde_json::json!({ "rev": m })));
    }
    if let Some(i) = ident {
        pkg = pkg.with_identifier(PackageIdentifier::purl(format!("pkg:generic/x@{i}")));
    }
    pkg
}

fn spec_strategy() -> impl Strategy<Value = Spec> {
    (
        0u8..4,
        0u8..2,
        0usize..FINDERS.len(),
        0usize..FILES.len(),
        proptest::option::of(0u8..3),
        proptest::option::of(0u8..3),
        proptest::option::of(0u8..3),
    )
}

fn render(catalog: &Catalog) -> String {
    let artifacts = Projector::default()
        .project_all(catalog, &fixture_image())
        .unwrap();
    serde_json::to_string(&artifacts).unwrap()
}

fn chain_image(length: usize, cyclic: bool) -> ImageSource {
    let mut entries = Vec::with_capacity(length + 1);
    for i in 0..length {
        entries.push(LayerEntry::symlink(format!("/l{i}"), format!("/l{}", i + 1)));
    }
    if cyclic {
        entries.push(LayerEntry::symlink(format!("/l{length}"), "/l0"));
    } else {
        entries.push(LayerEntry::file(format!("/l{length}")));
    }
    ImageSource::from_layers(
        "chain:test",
        &[Layer {
            metadata: LayerMetadata {
                index: 0,
                digest: "sha256:ch".to_owned(),
                media_type: String::new(),
                size: 0,
            },
            entries,
        }],
    )
}

proptest! {
    #[test]
    fn add_order_does_not_change_output(
        (specs, shuffled) in prop::collection::vec(spec_strategy(), 1..40)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let forward = Catalog::new();
        for spec in &specs {
            forward.add(candidate(spec)).unwrap();
        }
        let reordered = Catalog::new();
        for spec in &shuffled {
            reordered.add(candidate(spec)).unwrap();
        }

        prop_assert_eq!(forward.count(), reordered.count());
        prop_assert_eq!(forward.enumerate(None), reordered.enumerate(None));
        prop_assert_eq!(render(&forward), render(&reordered));
    }

    #[test]
    fn re_adding_is_idempotent(specs in prop::collection::vec(spec_strategy(), 1..20)) {
        let catalog = Catalog::new();
        for spec in &specs {
            catalog.add(candidate(spec)).unwrap();
        }
        let count = catalog.count();
        let before = render(&catalog);
        for spec in &specs {
            catalog.add(candidate(spec)).unwrap();
        }
        prop_assert_eq!(catalog.count(), count);
        prop_assert_eq!(render(&catalog), before);
    }

    #[test]
    fn chain_within_limit_resolves_to_terminal(length in 0usize..=40) {
        let source = chain_image(length, false);
        let loc = LocationResolver::default().resolve_path("/l0", &source).unwrap();
        prop_assert_eq!(loc.real_path, format!("/l{length}"));
        prop_assert_eq!(loc.virtual_path, "/l0");
    }

    #[test]
    fn cyclic_chain_is_broken_link(length in 0usize..60, policy in prop_oneof![
        Just(LinkPolicy::BasenameFallback),
        Just(LinkPolicy::FullPath),
    ]) {
        let source = chain_image(length, true);
        let err = LocationResolver::new(policy, 40).resolve_path("/l0", &source).unwrap_err();
        let is_broken = matches!(err, ResolveError::BrokenLink { .. });
        prop_assert!(is_broken);
    }
}

#[test]
fn chain_beyond_limit_is_broken_link() {
    let source = chain_image(41, false);
    let err = LocationResolver::default()
        .resolve_path("/l0", &source)
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::BrokenLink {
            path: "/l40".to_owned(),
            hops: 40
        }
    );
}

#[test]
fn concurrent_adds_match_sequential_adds() {
    let specs: Vec<Spec> = (0..200u32)
        .map(|i| {
            (
                (i % 7) as u8,
                (i % 3) as u8,
                (i % 3) as usize,
                (i % 4) as usize,
                (i % 5 == 0).then_some((i % 3) as u8),
                (i % 4 == 0).then_some((i % 2) as u8),
                (i % 6 == 0).then_some((i % 3) as u8),
            )
        })
        .collect();

    let sequential = Catalog::new();
    for spec in &specs {
        sequential.add(candidate(spec)).unwrap();
    }

    for _ in 0..5 {
        let shared = Arc::new(Catalog::new());
        let handles: Vec<_> = specs
            .chunks(17)
            .map(|chunk| {
                let catalog = Arc::clone(&shared);
                let chunk = chunk.to_vec();
                thread::spawn(move || {
                    for spec in chunk.iter().rev() {
                        catalog.add(candidate(spec)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.count(), sequential.count());
        assert_eq!(render(&shared), render(&sequential));
    }
}
