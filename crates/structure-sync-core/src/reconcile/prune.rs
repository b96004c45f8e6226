use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::FileIssue;
use crate::progress::ProgressReporter;

#[derive(Debug, Default)]
pub struct PruneOutcome {
    pub removed: usize,
    pub issues: Vec<FileIssue>,
}

/// Remove every empty directory below `root`, deepest first.
///
/// Children are visited before their parent, so removing the last child makes
/// the parent eligible in the same pass. `root` itself is kept.
pub fn prune_empty_dirs(root: &Path, reporter: &dyn ProgressReporter) -> PruneOutcome {
    let mut outcome = PruneOutcome::default();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .contents_first(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let issue = FileIssue::Walk(err);
                warn!("{}", issue);
                reporter.on_status(&format!("[warn] {}", issue));
                outcome.issues.push(issue);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        match is_empty_dir(path).and_then(|empty| {
            if empty {
                fs::remove_dir(path).map(|_| true)
            } else {
                Ok(false)
            }
        }) {
            Ok(true) => {
                debug!("Removed empty directory {}", path.display());
                outcome.removed += 1;
            }
            Ok(false) => {}
            Err(error) => {
                let issue = FileIssue::Prune {
                    path: path.to_path_buf(),
                    error,
                };
                warn!("{}", issue);
                reporter.on_status(&format!("[warn] {}", issue));
                outcome.issues.push(issue);
            }
        }
    }

    outcome
}

fn is_empty_dir(path: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}
