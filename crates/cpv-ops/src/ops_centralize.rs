//! Operation: move every package version into `Directory.Packages.props`.

use std::path::{Path, PathBuf};

use cpv_core::aggregate::Aggregate;
use cpv_core::config::CpvConfig;
use cpv_core::manifest::{self, ExistingManifest};
use cpv_core::transform::{self, CentralizedReference, RejectedReference, Transformed};
use cpv_util::errors::{CpvError, CpvResult};
use cpv_util::fs::{collect_files_with_extensions, relative_display};
use cpv_util::progress::{self, plural};

/// Options for [`centralize`] and [`crate::ops_scan::scan`].
#[derive(Debug, Clone)]
pub struct CentralizeOptions {
    pub root: PathBuf,
    pub config: CpvConfig,
    /// Ignore an existing manifest instead of merging its entries.
    pub fresh: bool,
    /// Record unparseable descriptors and continue instead of aborting.
    pub keep_going: bool,
    /// Print every centralized reference.
    pub verbose: bool,
}

impl CentralizeOptions {
    pub fn new(root: PathBuf, config: CpvConfig) -> Self {
        Self {
            root,
            config,
            fresh: false,
            keep_going: false,
            verbose: false,
        }
    }
}

/// What happened to one descriptor.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub changed: bool,
    pub centralized: Vec<CentralizedReference>,
    pub rejected: Vec<RejectedReference>,
    pub skipped: usize,
}

/// A descriptor that could not be processed under `--keep-going`.
#[derive(Debug, Clone)]
pub struct FailedDocument {
    pub path: PathBuf,
    pub message: String,
}

/// Summary of a whole run.
#[derive(Debug, Clone)]
pub struct CentralizeReport {
    pub files: Vec<FileReport>,
    pub failed: Vec<FailedDocument>,
    /// Entries rejected while reading the existing manifest.
    pub manifest_rejected: Vec<RejectedReference>,
    /// Entries carried over from the existing manifest.
    pub seeded: usize,
    pub manifest_path: PathBuf,
    pub manifest: String,
    pub packages: usize,
}

impl CentralizeReport {
    pub fn references(&self) -> usize {
        self.files.iter().map(|f| f.centralized.len()).sum()
    }

    pub fn rejected(&self) -> usize {
        self.files.iter().map(|f| f.rejected.len()).sum::<usize>() + self.manifest_rejected.len()
    }

    pub fn changed_files(&self) -> usize {
        self.files.iter().filter(|f| f.changed).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Write,
    DryRun,
}

/// Rewrite every descriptor under the root and write the manifest.
///
/// Every descriptor is transformed in memory before the first one is
/// written, so a malformed document aborts the run with nothing on disk
/// changed. A failure while writing the manifest does not undo the
/// rewritten descriptors.
pub fn centralize(options: &CentralizeOptions) -> CpvResult<CentralizeReport> {
    run(options, Mode::Write)
}

/// A descriptor transformed in memory, waiting to be written.
struct Pending {
    path: PathBuf,
    shown: String,
    transformed: Transformed,
}

pub(crate) fn run(options: &CentralizeOptions, mode: Mode) -> CpvResult<CentralizeReport> {
    let root = &options.root;
    let config = &options.config;
    let dialect = &config.dialect;

    let exclude = config.exclude_set()?;
    let manifest_path = config.manifest_path(root);
    let mut files = collect_files_with_extensions(root, &config.extensions, &exclude)?;
    files.retain(|f| f != &manifest_path);
    tracing::info!("Found {} project files under {}", files.len(), root.display());
    progress::status_info(
        "Found",
        &format!("{} project file{}", files.len(), plural(files.len())),
    );

    let mut aggregate = Aggregate::new();
    let existing = if options.fresh {
        ExistingManifest::default()
    } else {
        seed(&manifest_path, options, &mut aggregate)?
    };

    let mut pending = Vec::new();
    let mut failed = Vec::new();
    for path in &files {
        let content = std::fs::read_to_string(path).map_err(|e| CpvError::Generic {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        match transform::transform_document(path, &content, dialect, &mut aggregate) {
            Ok(transformed) => pending.push(Pending {
                path: path.clone(),
                shown: relative_display(root, path),
                transformed,
            }),
            Err(e @ CpvError::DocumentParse { .. }) if options.keep_going => {
                progress::status_error("Failed", &e.to_string());
                failed.push(FailedDocument {
                    path: path.clone(),
                    message: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }
    }

    let mut reports = Vec::with_capacity(pending.len());
    for Pending {
        path,
        shown,
        transformed,
    } in pending
    {
        for rejected in &transformed.rejected {
            progress::status_warn(
                "Skipped",
                &format!(
                    "{shown}: {} {} ({}); handle it manually",
                    rejected.name, rejected.version, rejected.reason
                ),
            );
        }
        if options.verbose {
            for reference in &transformed.centralized {
                progress::status_info(
                    "Package",
                    &format!("{} {}", reference.name, reference.version),
                );
            }
        }

        if transformed.changed {
            if mode == Mode::Write {
                std::fs::write(&path, &transformed.content).map_err(|e| CpvError::Generic {
                    message: format!("Failed to write {}: {e}", path.display()),
                })?;
                progress::status("Rewrote", &shown);
            } else {
                progress::status_info("Would rewrite", &shown);
            }
        } else {
            tracing::debug!("{shown}: no versioned references");
        }

        reports.push(FileReport {
            path,
            changed: transformed.changed,
            centralized: transformed.centralized,
            rejected: transformed.rejected,
            skipped: transformed.skipped,
        });
    }

    let manifest = manifest::render_manifest(&aggregate, dialect);
    if mode == Mode::Write {
        manifest::write_manifest(&manifest_path, &manifest)?;
        progress::status("Wrote", &relative_display(root, &manifest_path));
    }

    Ok(CentralizeReport {
        files: reports,
        failed,
        manifest_rejected: existing.rejected,
        seeded: existing.declarations.len(),
        manifest_path,
        manifest,
        packages: aggregate.len(),
    })
}

fn seed(
    manifest_path: &Path,
    options: &CentralizeOptions,
    aggregate: &mut Aggregate,
) -> CpvResult<ExistingManifest> {
    if !manifest_path.is_file() {
        return Ok(ExistingManifest::default());
    }
    let xml = std::fs::read_to_string(manifest_path).map_err(|e| CpvError::Generic {
        message: format!("Failed to read {}: {e}", manifest_path.display()),
    })?;
    let existing =
        manifest::seed_from_manifest(manifest_path, &xml, &options.config.dialect, aggregate)?;
    tracing::info!(
        "Seeded {} entries from {}",
        existing.declarations.len(),
        manifest_path.display()
    );
    for rejected in &existing.rejected {
        progress::status_warn(
            "Dropped",
            &format!(
                "{} {} from existing manifest ({})",
                rejected.name, rejected.version, rejected.reason
            ),
        );
    }
    Ok(existing)
}
