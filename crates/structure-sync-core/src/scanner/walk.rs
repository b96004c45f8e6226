use std::path::Path;
use tracing::{trace, warn};
use walkdir::WalkDir;

use super::filter::ScanFilter;
use crate::error::FileIssue;
use crate::fingerprint::FileDescriptor;
use crate::progress::ProgressReporter;

#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Regular files in traversal order.
    pub files: Vec<FileDescriptor>,
    pub filtered: usize,
    pub issues: Vec<FileIssue>,
}

/// Recursively list regular files under `root`.
///
/// Entries are sorted by file name within each directory so traversal order
/// is stable between runs. Symlinks are neither followed nor listed. Entries
/// that cannot be read are reported and skipped.
pub fn collect_files(
    root: &Path,
    filter: Option<&ScanFilter>,
    reporter: &dyn ProgressReporter,
) -> WalkOutcome {
    let mut outcome = WalkOutcome::default();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                record(&mut outcome, FileIssue::Walk(err), reporter);
                continue;
            }
        };

        let file_type = entry.file_type();
        if !file_type.is_file() {
            if file_type.is_symlink() {
                trace!("Skipping symlink {}", entry.path().display());
            }
            continue;
        }

        if filter.is_some_and(|filter| filter.excludes(root, entry.path())) {
            trace!("Filtered {}", entry.path().display());
            outcome.filtered += 1;
            continue;
        }

        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(err) => {
                record(&mut outcome, FileIssue::Walk(err), reporter);
                continue;
            }
        };

        outcome.files.push(FileDescriptor {
            path: entry.into_path(),
            size,
        });
    }

    outcome
}

fn record(outcome: &mut WalkOutcome, issue: FileIssue, reporter: &dyn ProgressReporter) {
    warn!("{}", issue);
    reporter.on_status(&format!("[warn] {}", issue));
    outcome.issues.push(issue);
}
