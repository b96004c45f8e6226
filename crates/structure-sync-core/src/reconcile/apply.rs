use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use super::plan::MoveAction;
use crate::error::FileIssue;
use crate::progress::ProgressReporter;

#[derive(Debug, Default)]
pub struct MoveOutcome {
    /// Moves performed, or in dry-run the moves a real run would perform.
    pub moved: Vec<MoveAction>,
    pub conflicts: usize,
    pub issues: Vec<FileIssue>,
}

/// Tracks which paths this run has emptied or filled, on top of what is on disk.
///
/// Both real and dry runs consult it, so a dry run sees the same occupied
/// destinations a real run would.
#[derive(Debug, Default)]
struct Occupancy {
    vacated: HashSet<PathBuf>,
    filled: HashSet<PathBuf>,
}

impl Occupancy {
    fn is_occupied(&self, path: &Path) -> bool {
        if self.filled.contains(path) {
            return true;
        }
        !self.vacated.contains(path) && fs::symlink_metadata(path).is_ok()
    }

    fn record(&mut self, action: &MoveAction) {
        self.filled.remove(&action.source);
        self.vacated.insert(action.source.clone());
        self.vacated.remove(&action.destination);
        self.filled.insert(action.destination.clone());
    }
}

/// Carry out `actions` one at a time.
///
/// A move whose destination is occupied is retried after the rest of the
/// pass, since the occupant may itself be moved away. Once a pass makes no
/// progress, whatever is still blocked is reported as a conflict. Existing
/// files are never overwritten.
pub fn apply_moves(
    actions: Vec<MoveAction>,
    dry_run: bool,
    reporter: &dyn ProgressReporter,
) -> MoveOutcome {
    let mut outcome = MoveOutcome::default();
    let mut occupancy = Occupancy::default();
    let mut pending = actions;

    while !pending.is_empty() {
        let mut deferred = Vec::new();
        let mut progressed = false;

        for action in pending {
            if occupancy.is_occupied(&action.destination) {
                deferred.push(action);
                continue;
            }

            if !dry_run {
                if let Err(issue) = move_file(&action) {
                    error!("{}", issue);
                    reporter.on_status(&format!("[error] {}", issue));
                    outcome.issues.push(issue);
                    continue;
                }
            }

            reporter.on_status(&format!(
                "[{}] {} -> {}",
                if dry_run { "preview" } else { "move" },
                file_name(&action.source),
                action.relative
            ));
            occupancy.record(&action);
            outcome.moved.push(action);
            progressed = true;
        }

        if !progressed {
            for action in deferred {
                let issue = FileIssue::MoveConflict {
                    from: action.source,
                    to: action.destination,
                };
                warn!("{}", issue);
                reporter.on_status(&format!("[conflict] {}", issue));
                outcome.conflicts += 1;
                outcome.issues.push(issue);
            }
            break;
        }

        if !deferred.is_empty() {
            debug!("Retrying {} moves blocked by occupied destinations", deferred.len());
        }
        pending = deferred;
    }

    outcome
}

fn move_file(action: &MoveAction) -> Result<(), FileIssue> {
    if let Some(parent) = action.destination.parent() {
        fs::create_dir_all(parent).map_err(|error| FileIssue::CreateDir {
            path: parent.to_path_buf(),
            error,
        })?;
    }

    fs::rename(&action.source, &action.destination).map_err(|error| FileIssue::Move {
        from: action.source.clone(),
        to: action.destination.clone(),
        error,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
