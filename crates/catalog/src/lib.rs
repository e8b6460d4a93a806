#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`CatalogError`, `ResolveError`)
//! - [`config`]: Catalog configuration (`CatalogConfig`, builder)
//! - [`types`]: Domain types (`Package`, `PackageType`, `PackageId`, `PackageMetadata`)
//! - [`location`]: Provenance-tagged file locations (`Location`, `LayerRef`, `SourceKind`)
//! - [`source`]: Source contract and in-memory file tree (`Source`, `FileTree`, `DirectorySource`, `ImageSource`)
//! - [`resolver`]: Symlink-aware location resolution (`LocationResolver`, `LinkPolicy`)
//! - [`catalog`]: Sharded concurrent package store (`Catalog`)
//! - [`artifact`]: Deterministic projection (`Artifact`, `Projector`)
//! - [`cataloger`]: Discovery-task runner (`Cataloger`, `run_catalogers`)

pub mod artifact;
pub mod catalog;
pub mod cataloger;
pub mod config;
pub mod error;
pub mod location;
pub mod resolver;
pub mod source;
pub mod types;

// --- Public API Re-exports ---

// Catalog
pub use catalog::Catalog;

// Configuration
pub use config::{CatalogConfig, CatalogConfigBuilder};

// Error
pub use error::{CatalogError, ResolveError};

// Types
pub use location::{LayerRef, Location, SourceKind};
pub use types::{
    IdentifierScheme, Package, PackageId, PackageIdentifier, PackageMetadata, PackageType,
};

// Source
pub use source::{
    DirectorySource, FileTree, ImageSource, Layer, LayerEntry, LayerMetadata, Source,
    SourceMetadata, TreeEntry,
};

// Resolution and projection
pub use artifact::{Artifact, Projector};
pub use resolver::{DEFAULT_MAX_LINK_HOPS, LinkPolicy, LocationResolver};

// Discovery tasks
pub use cataloger::{CatalogRunSummary, Cataloger, run_catalogers};
