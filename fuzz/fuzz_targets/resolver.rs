#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use ironsbom_catalog::{
    FileTree, ImageSource, LayerMetadata, LinkPolicy, LocationResolver, ResolveError, TreeEntry,
};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 트리 엔트리 (최대 32개로 제한)
    entries: Vec<FuzzEntry>,
    /// 해석할 참조 경로
    queries: Vec<String>,
    full_path_only: bool,
    max_link_hops: u8,
}

#[derive(Arbitrary, Debug)]
struct FuzzEntry {
    path: String,
    kind: FuzzKind,
    layer: u8,
}

#[derive(Arbitrary, Debug)]
enum FuzzKind {
    File,
    Dir,
    Symlink(String),
}

fuzz_target!(|input: FuzzInput| {
    let mut tree = FileTree::new();
    for entry in input.entries.iter().take(32) {
        let tree_entry = match &entry.kind {
            FuzzKind::File => TreeEntry::file(&entry.path),
            FuzzKind::Dir => TreeEntry::dir(&entry.path),
            FuzzKind::Symlink(target) => TreeEntry::symlink(&entry.path, target.clone()),
        };
        tree.insert(tree_entry.in_layer(usize::from(entry.layer % 4)));
    }

    let layers = (0..4)
        .map(|index| LayerMetadata {
            index,
            digest: format!("sha256:{index}"),
            media_type: String::new(),
            size: 0,
        })
        .collect();
    let source = ImageSource::new("fuzz:latest", layers, tree);

    let policy = if input.full_path_only {
        LinkPolicy::FullPath
    } else {
        LinkPolicy::BasenameFallback
    };
    let max_link_hops = u32::from(input.max_link_hops.max(1));
    let resolver = LocationResolver::new(policy, max_link_hops);

    for query in input.queries.iter().take(8) {
        match resolver.resolve_path(query, &source) {
            Ok(location) => assert_eq!(&location.virtual_path, query),
            Err(ResolveError::BrokenLink { hops, .. }) => assert!(hops <= max_link_hops),
            Err(ResolveError::LocationNotFound { .. }) => {}
        }
    }
});
