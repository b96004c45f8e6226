use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::error::{Error, FileIssue};
use crate::mapping::{self, FingerprintMapping};
use crate::progress::ProgressReporter;
use crate::reconcile::{self, SyncResult};
use crate::scanner::{self, ScanFilter};

/// Entry points for the two operations: `scan` a source tree into a mapping,
/// `sync` a target tree against a mapping.
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    config: AppConfig,
}

#[derive(Debug)]
pub struct ScanResult {
    pub mapping: FingerprintMapping,
    pub mapping_path: PathBuf,
    pub files_fingerprinted: usize,
    pub files_filtered: usize,
    pub duplicates: usize,
    pub issues: Vec<FileIssue>,
    pub elapsed: Duration,
}

impl SyncEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Scan `source_dir` and write its fingerprint mapping to `mapping_path`,
    /// replacing any existing file.
    pub fn scan(
        &self,
        source_dir: &Path,
        mapping_path: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<ScanResult, Error> {
        let result = self.run_scan(source_dir, mapping_path, reporter);
        report_fatal(&result, reporter);
        result
    }

    /// Move files under `target_dir` to the paths recorded in the mapping at
    /// `mapping_path`. With `dry_run` the filesystem is left untouched.
    pub fn sync(
        &self,
        target_dir: &Path,
        mapping_path: &Path,
        dry_run: bool,
        reporter: &dyn ProgressReporter,
    ) -> Result<SyncResult, Error> {
        let result = self.run_sync(target_dir, mapping_path, dry_run, reporter);
        report_fatal(&result, reporter);
        result
    }

    fn run_scan(
        &self,
        source_dir: &Path,
        mapping_path: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<ScanResult, Error> {
        let root = resolve_dir(source_dir, "Source")?;
        let mut filter = ScanFilter::new(&self.config.ignore_patterns)?;
        if let Some(output) = resolve_output(mapping_path) {
            filter = filter.exclude_path(output);
        }
        info!("Scanning {}", root.display());

        let outcome = scanner::scan_tree(&root, &filter, &self.config, reporter);

        mapping::save(&outcome.mapping, mapping_path)?;
        reporter.on_status(&format!("[OK] Mapping saved to: {}", mapping_path.display()));
        info!(
            "Saved {} entries ({} duplicates, {} issues) to {}",
            outcome.mapping.len(),
            outcome.duplicates,
            outcome.issues.len(),
            mapping_path.display()
        );

        Ok(ScanResult {
            mapping: outcome.mapping,
            mapping_path: mapping_path.to_path_buf(),
            files_fingerprinted: outcome.files_fingerprinted,
            files_filtered: outcome.files_filtered,
            duplicates: outcome.duplicates,
            issues: outcome.issues,
            elapsed: outcome.elapsed,
        })
    }

    fn run_sync(
        &self,
        target_dir: &Path,
        mapping_path: &Path,
        dry_run: bool,
        reporter: &dyn ProgressReporter,
    ) -> Result<SyncResult, Error> {
        let root = resolve_dir(target_dir, "Target")?;
        let mapping = mapping::load(mapping_path)?;
        info!(
            "Syncing {} against {} mapping entries (dry run: {})",
            root.display(),
            mapping.len(),
            dry_run
        );

        Ok(reconcile::reconcile(
            &root,
            &mapping,
            dry_run,
            &self.config,
            reporter,
        ))
    }
}

fn report_fatal<T>(result: &Result<T, Error>, reporter: &dyn ProgressReporter) {
    if let Err(err) = result {
        error!("{}", err);
        reporter.on_status(&format!("[error] {}", err));
    }
}

fn resolve_dir(dir: &Path, role: &str) -> Result<PathBuf, Error> {
    if !dir.is_dir() {
        return Err(Error::Config(format!(
            "{} directory does not exist or is not a directory: {}",
            role,
            dir.display()
        )));
    }
    let root = fs::canonicalize(dir).map_err(|e| {
        Error::Config(format!("{} directory {} is not accessible: {}", role, dir.display(), e))
    })?;
    // The walk treats an unreadable root like any other bad entry.
    fs::read_dir(&root).map_err(|e| {
        Error::Config(format!("{} directory {} is not readable: {}", role, dir.display(), e))
    })?;
    Ok(root)
}

/// Absolute location the mapping will be written to, if it can be determined.
fn resolve_output(mapping_path: &Path) -> Option<PathBuf> {
    let file_name = mapping_path.file_name()?;
    let parent = match mapping_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let resolved = fs::canonicalize(parent).ok()?.join(file_name);
    debug!("Mapping output resolves to {}", resolved.display());
    Some(resolved)
}
