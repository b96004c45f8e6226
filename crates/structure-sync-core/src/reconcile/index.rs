use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::FileIssue;
use crate::fingerprint::Fingerprint;
use crate::progress::ProgressReporter;
use crate::scanner::{fingerprint_all, walk};

/// Where each piece of content currently lives in the target tree.
#[derive(Debug, Default)]
pub struct TargetIndex {
    entries: BTreeMap<Fingerprint, PathBuf>,
    pub files_indexed: usize,
    pub duplicates: usize,
}

impl TargetIndex {
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&Path> {
        self.entries.get(fingerprint).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fingerprint every file under `root`. Unlike a source scan nothing is
/// filtered out: hidden files and thumbnail caches are indexed too.
pub fn build_index(
    root: &Path,
    config: &AppConfig,
    reporter: &dyn ProgressReporter,
) -> (TargetIndex, Vec<FileIssue>) {
    reporter.on_status(&format!(
        "[*] Indexing target directory (this may take a while): {}",
        root.display()
    ));

    let walked = walk::collect_files(root, None, reporter);
    let mut issues = walked.issues;
    let mut index = TargetIndex::default();

    for (file, result) in fingerprint_all(walked.files, config.progress_every, "Indexed", reporter)
    {
        let fingerprint = match result {
            Ok(fingerprint) => fingerprint,
            Err(err) => {
                issues.push(err.into());
                continue;
            }
        };

        index.files_indexed += 1;
        if let Some(dropped) =
            config
                .duplicate_policy
                .insert(&mut index.entries, fingerprint, file.path)
        {
            index.duplicates += 1;
            let kept = index.entries.get(&fingerprint).map(PathBuf::as_path);
            info!(
                "Duplicate content {} in target: keeping {:?}, ignoring {}",
                fingerprint,
                kept,
                dropped.display()
            );
            reporter.on_status(&format!(
                "[dup] {} has the same content as another target file, ignored",
                dropped.display()
            ));
        }
    }

    debug!(
        "Indexed {} files, {} distinct fingerprints",
        index.files_indexed,
        index.len()
    );
    (index, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicatePolicy;
    use crate::fingerprint::fingerprint_file;
    use crate::progress::SilentReporter;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_index_includes_hidden_and_thumbnail_files() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join(".DS_Store"), "finder").unwrap();
        fs::write(root.join("Thumbs.db"), "thumbs").unwrap();
        fs::write(root.join("x.txt"), "hello").unwrap();

        let (index, issues) = build_index(root, &AppConfig::default(), &SilentReporter);
        assert!(issues.is_empty());
        assert_eq!(index.files_indexed, 3);
        assert_eq!(index.len(), 3);

        let hidden = fingerprint_file(&root.join(".DS_Store")).unwrap();
        assert_eq!(index.get(&hidden), Some(root.join(".DS_Store").as_path()));
    }

    #[test]
    fn test_index_duplicates_follow_policy() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("first.txt"), "same").unwrap();
        fs::write(root.join("second.txt"), "same").unwrap();
        let fp = fingerprint_file(&root.join("first.txt")).unwrap();

        let (last, _) = build_index(root, &AppConfig::default(), &SilentReporter);
        assert_eq!(last.duplicates, 1);
        assert_eq!(last.get(&fp), Some(root.join("second.txt").as_path()));

        let config = AppConfig {
            duplicate_policy: DuplicatePolicy::KeepFirst,
            ..AppConfig::default()
        };
        let (first, _) = build_index(root, &config, &SilentReporter);
        assert_eq!(first.get(&fp), Some(root.join("first.txt").as_path()));
    }
}
