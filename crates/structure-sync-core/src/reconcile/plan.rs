use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::index::TargetIndex;
use crate::error::FileIssue;
use crate::fingerprint::Fingerprint;
use crate::mapping::FingerprintMapping;
use crate::paths;
use crate::progress::ProgressReporter;

/// A relocation of one target file to where the mapping says it belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveAction {
    /// Current location inside the target tree.
    pub source: PathBuf,
    pub destination: PathBuf,
    /// `destination` relative to the target root, as written in the mapping.
    pub relative: String,
}

#[derive(Debug, Default)]
pub struct MovePlan {
    pub moves: Vec<MoveAction>,
    pub already_in_place: usize,
    pub unmatched: Vec<Fingerprint>,
    pub issues: Vec<FileIssue>,
}

impl MovePlan {
    /// Mapping entries whose content was found in the target.
    pub fn matched(&self) -> usize {
        self.moves.len() + self.already_in_place
    }
}

/// Pair every mapping entry with the indexed target file of the same content.
pub fn plan_moves(
    root: &Path,
    mapping: &FingerprintMapping,
    index: &TargetIndex,
    reporter: &dyn ProgressReporter,
) -> MovePlan {
    let mut plan = MovePlan::default();

    for (fingerprint, relative) in mapping.iter() {
        let Some(current) = index.get(fingerprint) else {
            debug!("No target file for {} ({})", fingerprint, relative);
            plan.unmatched.push(*fingerprint);
            continue;
        };

        let Some(relative_path) = paths::from_relative_key(relative) else {
            let issue = FileIssue::UnsafePath(relative.to_string());
            warn!("{}", issue);
            reporter.on_status(&format!("[warn] {}", issue));
            plan.issues.push(issue);
            continue;
        };

        let destination = root.join(relative_path);
        if current == destination {
            plan.already_in_place += 1;
            continue;
        }

        plan.moves.push(MoveAction {
            source: current.to_path_buf(),
            destination,
            relative: relative.to_string(),
        });
    }

    plan
}
