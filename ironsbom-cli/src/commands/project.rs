//! `ironsbom project` command handler

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use ironsbom_catalog::{
    Artifact, Catalog, CatalogConfig, CatalogError, Cataloger, DirectorySource, ImageSource,
    LocationResolver, Package, Projector, Source, SourceMetadata, run_catalogers,
};
use ironsbom_core::config::IronsbomConfig;

use crate::cli::ProjectArgs;
use crate::error::CliError;
use crate::input;
use crate::output::{OutputWriter, Render};

/// Replays pre-computed discovery records as a discovery job.
struct RecordCataloger {
    name: String,
    packages: Vec<Package>,
}

impl Cataloger for RecordCataloger {
    fn name(&self) -> &str {
        &self.name
    }

    fn catalog(&self, _source: &dyn Source) -> Result<Vec<Package>, CatalogError> {
        Ok(self.packages.clone())
    }
}

/// Execute the `project` command.
pub async fn execute(
    args: ProjectArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = IronsbomConfig::load_or_default(config_path).await?;
    let catalog_config = CatalogConfig::from_core(&config.catalog);
    catalog_config.validate()?;

    let source = build_source(&args, config.catalog.max_index_entries).await?;
    let grouped = input::load_packages(&args.packages).await?;

    let catalogers: Vec<Arc<dyn Cataloger>> = grouped
        .into_iter()
        .map(|(name, packages)| Arc::new(RecordCataloger { name, packages }) as Arc<dyn Cataloger>)
        .collect();

    info!(
        source = %source.root(),
        kind = %source.kind(),
        catalogers = catalogers.len(),
        "starting catalog run"
    );

    let catalog = Arc::new(Catalog::with_config(&catalog_config));
    let summary = run_catalogers(Arc::clone(&source), catalogers, Arc::clone(&catalog)).await;

    let projector = Projector::new(LocationResolver::from_config(&catalog_config));
    let (artifacts, failures) = if args.partial {
        project_partial(&projector, &catalog, source.as_ref())
    } else {
        (projector.project_all(&catalog, source.as_ref())?, Vec::new())
    };

    let report = ProjectReport {
        source: source.metadata(),
        summary: RunSummary {
            packages: catalog.count(),
            rejected: summary.rejected,
            failed_catalogers: summary.failed_catalogers,
        },
        artifacts,
        failures,
    };

    writer.render(&report)?;

    Ok(())
}

async fn build_source(args: &ProjectArgs, max_entries: usize) -> Result<Arc<dyn Source>, CliError> {
    if let Some(dir) = &args.dir {
        let root = dir.clone();
        let tree = tokio::task::spawn_blocking(move || input::index_directory(&root, max_entries))
            .await
            .map_err(|e| CliError::Command(format!("directory indexing task failed: {}", e)))??;
        return Ok(Arc::new(DirectorySource::with_index(
            dir.display().to_string(),
            tree,
        )));
    }

    if let Some(image) = &args.image {
        let layout = input::load_image_layout(image).await?;
        let (user_input, layers) = layout.into_layers();
        return Ok(Arc::new(ImageSource::from_layers(user_input, &layers)));
    }

    Err(CliError::Command(
        "either --dir or --image is required".to_owned(),
    ))
}

/// Project every package on its own, collecting failures instead of aborting.
fn project_partial(
    projector: &Projector,
    catalog: &Catalog,
    source: &dyn Source,
) -> (Vec<Artifact>, Vec<ProjectionFailure>) {
    let mut artifacts = Vec::new();
    let mut failures = Vec::new();

    for package in catalog.enumerate(None) {
        match projector.project(&package, source) {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => {
                warn!(package = %package, error = %e, "skipping unprojectable package");
                failures.push(ProjectionFailure {
                    package: package.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    (artifacts, failures)
}

/// Catalog run counters shown alongside the artifacts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub packages: usize,
    pub rejected: usize,
    pub failed_catalogers: usize,
}

/// A package that could not be projected in partial mode.
#[derive(Debug, Serialize)]
pub struct ProjectionFailure {
    pub package: String,
    pub reason: String,
}

/// Projection result.
#[derive(Debug, Serialize)]
pub struct ProjectReport {
    pub source: SourceMetadata,
    pub summary: RunSummary,
    pub artifacts: Vec<Artifact>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ProjectionFailure>,
}

impl Render for ProjectReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Source: {} ({})",
            self.source.target.bold(),
            self.source.kind
        )?;
        if !self.source.layers.is_empty() {
            writeln!(w, "Layers: {}", self.source.layers.len())?;
        }
        writeln!(w, "Packages: {}", self.summary.packages)?;
        if self.summary.rejected > 0 {
            writeln!(
                w,
                "Rejected candidates: {}",
                self.summary.rejected.to_string().yellow()
            )?;
        }
        if self.summary.failed_catalogers > 0 {
            writeln!(
                w,
                "Failed catalogers: {}",
                self.summary.failed_catalogers.to_string().red()
            )?;
        }
        writeln!(w)?;

        if self.artifacts.is_empty() {
            writeln!(w, "{}", "No packages projected.".dimmed())?;
        } else {
            writeln!(
                w,
                "{:<30} {:<20} {:<14} Location",
                "NAME", "VERSION", "TYPE"
            )?;
            writeln!(w, "{}", "-".repeat(80))?;
            for artifact in &self.artifacts {
                let location = artifact
                    .locations
                    .first()
                    .map(|l| l.real_path.as_str())
                    .unwrap_or("-");
                let extra = artifact.locations.len().saturating_sub(1);
                let location = if extra > 0 {
                    format!("{} (+{})", location, extra)
                } else {
                    location.to_owned()
                };
                writeln!(
                    w,
                    "{:<30} {:<20} {:<14} {}",
                    artifact.name, artifact.version, artifact.package_type, location
                )?;
            }
        }

        if !self.failures.is_empty() {
            writeln!(w)?;
            writeln!(
                w,
                "Projection failures: {}",
                self.failures.len().to_string().red().bold()
            )?;
            for failure in &self.failures {
                writeln!(w, "  {}: {}", failure.package, failure.reason.red())?;
            }
        }

        Ok(())
    }
}
