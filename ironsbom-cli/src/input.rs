//! Input loading: discovery records, image layouts, and directory indexing.
//!
//! The CLI does not run ecosystem-specific discovery itself. It reads
//! package records produced elsewhere and replays them through the
//! catalog, grouped by the discovery job named in `foundBy`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use ironsbom_catalog::{
    FileTree, Layer, LayerEntry, LayerMetadata, Location, Package, PackageIdentifier,
    PackageMetadata, PackageType, TreeEntry,
};

use crate::error::CliError;

/// One package record from a discovery results file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(rename = "type")]
    pub package_type: String,
    pub found_by: String,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub alternate_identifiers: Vec<PackageIdentifier>,
}

impl PackageRecord {
    /// Convert into a raw package candidate.
    ///
    /// Unrecognized type strings become `Unknown`, which the catalog rejects.
    pub fn into_package(self) -> Package {
        let package_type = PackageType::from_str_loose(&self.package_type).unwrap_or_else(|| {
            warn!(package = %self.name, package_type = %self.package_type, "unknown package type");
            PackageType::Unknown
        });

        let mut package = Package::new(self.name, self.version, package_type, self.found_by);
        for path in self.locations {
            package = package.with_location(Location::new(path));
        }
        if let Some(metadata) = self.metadata {
            package = package.with_metadata(PackageMetadata::new(metadata));
        }
        if let Some(vendor) = self.vendor {
            package = package.with_vendor(vendor);
        }
        for identifier in self.alternate_identifiers {
            package = package.with_identifier(identifier);
        }
        package
    }
}

/// Read a discovery results file and group candidates by discovery job name.
pub async fn load_packages(path: &Path) -> Result<BTreeMap<String, Vec<Package>>, CliError> {
    let content = tokio::fs::read_to_string(path).await?;
    let records: Vec<PackageRecord> =
        serde_json::from_str(&content).map_err(|e| CliError::Input {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let mut grouped: BTreeMap<String, Vec<Package>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.found_by.clone())
            .or_default()
            .push(record.into_package());
    }
    debug!(path = %path.display(), groups = grouped.len(), "loaded package records");
    Ok(grouped)
}

/// Container image layout: layer metadata plus per-layer diff entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLayout {
    pub user_input: String,
    #[serde(default)]
    pub layers: Vec<LayerLayout>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerLayout {
    pub digest: String,
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub entries: Vec<LayerEntry>,
}

impl ImageLayout {
    /// Convert into ordered layers; the position in the file is the layer index.
    pub fn into_layers(self) -> (String, Vec<Layer>) {
        let layers = self
            .layers
            .into_iter()
            .enumerate()
            .map(|(index, layer)| Layer {
                metadata: LayerMetadata {
                    index,
                    digest: layer.digest,
                    media_type: layer.media_type,
                    size: layer.size,
                },
                entries: layer.entries,
            })
            .collect();
        (self.user_input, layers)
    }
}

/// Read an image layout file.
pub async fn load_image_layout(path: &Path) -> Result<ImageLayout, CliError> {
    let content = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&content).map_err(|e| CliError::Input {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Build a tree index of a directory.
///
/// Paths are recorded relative to `root` as `/a/b`. Symlinks are recorded
/// with their raw targets and never followed. Fails once more than
/// `max_entries` entries would be indexed.
pub fn index_directory(root: &Path, max_entries: usize) -> Result<FileTree, CliError> {
    let mut tree = FileTree::new();
    let mut stack: Vec<(PathBuf, String)> = vec![(root.to_path_buf(), String::new())];
    let mut count = 0usize;

    tree.insert(TreeEntry::dir("/"));

    while let Some((dir, prefix)) = stack.pop() {
        let read_dir = std::fs::read_dir(&dir)?;
        for item in read_dir {
            let item = item?;
            let name = item.file_name().to_string_lossy().into_owned();
            let rel = format!("{prefix}/{name}");
            let file_type = std::fs::symlink_metadata(item.path())?.file_type();

            count += 1;
            if count > max_entries {
                return Err(CliError::Input {
                    path: root.display().to_string(),
                    reason: format!("directory has more than {max_entries} entries"),
                });
            }

            if file_type.is_symlink() {
                let target = std::fs::read_link(item.path())?;
                tree.insert(TreeEntry::symlink(&rel, target.to_string_lossy().into_owned()));
            } else if file_type.is_dir() {
                tree.insert(TreeEntry::dir(&rel));
                stack.push((item.path(), rel));
            } else {
                tree.insert(TreeEntry::file(&rel));
            }
        }
    }

    debug!(root = %root.display(), entries = count, "indexed directory");
    Ok(tree)
}
