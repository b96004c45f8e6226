pub mod apply;
pub mod index;
pub mod plan;
pub mod prune;

use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::AppConfig;
use crate::error::FileIssue;
use crate::fingerprint::Fingerprint;
use crate::mapping::FingerprintMapping;
use crate::progress::ProgressReporter;

pub use index::TargetIndex;
pub use plan::MoveAction;

#[derive(Debug)]
pub struct SyncResult {
    pub dry_run: bool,
    pub files_indexed: usize,
    pub mapping_entries: usize,
    /// Mapping entries whose content exists somewhere in the target.
    pub matched: usize,
    /// Moves performed, or in dry-run the moves that would be performed.
    pub moves: Vec<MoveAction>,
    pub already_in_place: usize,
    pub unmatched: Vec<Fingerprint>,
    pub conflicts: usize,
    pub dirs_pruned: usize,
    pub issues: Vec<FileIssue>,
    pub elapsed: Duration,
}

impl SyncResult {
    pub fn moved(&self) -> usize {
        self.moves.len()
    }

    /// Mapping entries that did not lead to a move, for whatever reason.
    pub fn skipped(&self) -> usize {
        self.mapping_entries - self.moves.len()
    }
}

/// Rearrange the target tree under `root` so files sit at their mapped paths.
///
/// `root` should already be canonical; destinations are compared against
/// indexed paths built from it.
pub fn reconcile(
    root: &Path,
    mapping: &FingerprintMapping,
    dry_run: bool,
    config: &AppConfig,
    reporter: &dyn ProgressReporter,
) -> SyncResult {
    let start = Instant::now();

    // Phase 1: Index
    let (target_index, mut issues) = index::build_index(root, config, reporter);

    // Phase 2: Match
    reporter.on_status("[*] Matching files and restructuring...");
    if dry_run {
        reporter.on_status("Note: preview mode, no files will be moved.");
    }
    let move_plan = plan::plan_moves(root, mapping, &target_index, reporter);
    let matched = move_plan.matched();
    let already_in_place = move_plan.already_in_place;
    let unmatched = move_plan.unmatched;
    issues.extend(move_plan.issues);
    info!(
        "{} of {} mapping entries found in target, {} already in place",
        matched,
        mapping.len(),
        already_in_place
    );

    // Phase 3: Move
    let moved = apply::apply_moves(move_plan.moves, dry_run, reporter);
    issues.extend(moved.issues);

    // Phase 4: Prune
    let mut dirs_pruned = 0;
    if !dry_run && config.prune_empty_dirs {
        reporter.on_status("[*] Removing empty directories...");
        let pruned = prune::prune_empty_dirs(root, reporter);
        dirs_pruned = pruned.removed;
        issues.extend(pruned.issues);
    }

    let elapsed = start.elapsed();
    reporter.on_status(&format!(
        "[OK] {}: {} files {}, {} already in place, {} unmatched, {} conflicts, {} errors, {} empty directories removed ({:.2}s)",
        if dry_run { "Preview complete" } else { "Sync complete" },
        moved.moved.len(),
        if dry_run { "to move" } else { "moved" },
        already_in_place,
        unmatched.len(),
        moved.conflicts,
        issues.len() - moved.conflicts,
        dirs_pruned,
        elapsed.as_secs_f64()
    ));

    SyncResult {
        dry_run,
        files_indexed: target_index.files_indexed,
        mapping_entries: mapping.len(),
        matched,
        moves: moved.moved,
        already_in_place,
        unmatched,
        conflicts: moved.conflicts,
        dirs_pruned,
        issues,
        elapsed,
    }
}
