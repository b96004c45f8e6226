pub mod filter;
pub mod walk;

use rayon::prelude::*;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{FileIssue, HashError};
use crate::fingerprint::{fingerprint_file, FileDescriptor, Fingerprint};
use crate::mapping::FingerprintMapping;
use crate::paths;
use crate::progress::ProgressReporter;

pub use filter::ScanFilter;

/// Files hashed per parallel batch when periodic progress is disabled.
const DEFAULT_BATCH: usize = 64;

#[derive(Debug)]
pub struct ScanOutcome {
    pub mapping: FingerprintMapping,
    pub files_fingerprinted: usize,
    pub files_filtered: usize,
    /// Files whose fingerprint was already taken by another file.
    pub duplicates: usize,
    pub issues: Vec<FileIssue>,
    pub elapsed: Duration,
}

/// Build a fingerprint → relative path mapping for everything under `root`.
pub fn scan_tree(
    root: &Path,
    filter: &ScanFilter,
    config: &AppConfig,
    reporter: &dyn ProgressReporter,
) -> ScanOutcome {
    let start = Instant::now();
    reporter.on_status(&format!("[*] Scanning source directory: {}", root.display()));

    let walked = walk::collect_files(root, Some(filter), reporter);
    let mut issues = walked.issues;
    debug!(
        "Walk found {} files, {} filtered",
        walked.files.len(),
        walked.filtered
    );

    let mut mapping = FingerprintMapping::new();
    let mut files_fingerprinted = 0;
    let mut duplicates = 0;

    let hashed = fingerprint_all(walked.files, config.progress_every, "Processed", reporter);
    for (file, result) in hashed {
        let fingerprint = match result {
            Ok(fingerprint) => fingerprint,
            Err(err) => {
                issues.push(err.into());
                continue;
            }
        };

        let Some(relative) = paths::to_relative_key(root, &file.path) else {
            let issue = FileIssue::NonUtf8Path(file.path);
            warn!("{}", issue);
            reporter.on_status(&format!("[warn] {}", issue));
            issues.push(issue);
            continue;
        };

        if paths::reads_as_windows_path(&relative) {
            let issue = FileIssue::AmbiguousName(relative);
            warn!("{}", issue);
            reporter.on_status(&format!("[warn] {}", issue));
            issues.push(issue);
            continue;
        }

        files_fingerprinted += 1;
        if let Some(dropped) =
            mapping.insert_with_policy(fingerprint, relative, config.duplicate_policy)
        {
            duplicates += 1;
            let kept = mapping.get(&fingerprint).unwrap_or_default();
            info!("Duplicate content {}: keeping {}, dropping {}", fingerprint, kept, dropped);
            reporter.on_status(&format!(
                "[dup] {} has the same content as {}, not mapped",
                dropped, kept
            ));
        }
    }

    let elapsed = start.elapsed();
    reporter.on_status(&format!(
        "[OK] Scan complete: {} files in {:.2}s",
        files_fingerprinted,
        elapsed.as_secs_f64()
    ));

    ScanOutcome {
        mapping,
        files_fingerprinted,
        files_filtered: walked.filtered,
        duplicates,
        issues,
        elapsed,
    }
}

/// Fingerprint `files` in parallel batches, preserving input order.
///
/// Progress lines (`"<verb> N files..."`) come from the calling thread after
/// each batch of `progress_every` files, so counts only ever increase. Hash
/// failures are reported as they are collected.
pub(crate) fn fingerprint_all(
    files: Vec<FileDescriptor>,
    progress_every: usize,
    verb: &str,
    reporter: &dyn ProgressReporter,
) -> Vec<(FileDescriptor, Result<Fingerprint, HashError>)> {
    let batch = if progress_every == 0 {
        DEFAULT_BATCH
    } else {
        progress_every
    };

    let mut results = Vec::with_capacity(files.len());
    for chunk in files.chunks(batch) {
        let hashed: Vec<_> = chunk
            .par_iter()
            .map(|file| (file.clone(), fingerprint_file(&file.path)))
            .collect();

        for (_, result) in &hashed {
            if let Err(err) = result {
                warn!("{}", err);
                reporter.on_status(&format!("[error] {}", err));
            }
        }
        results.extend(hashed);

        if progress_every > 0 && chunk.len() == batch {
            reporter.on_status(&format!("    {} {} files...", verb, results.len()));
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicatePolicy;
    use crate::progress::SilentReporter;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[test]
    fn test_progress_lines_are_monotonic() {
        let tmp = tempdir().unwrap();
        let mut files = Vec::new();
        for i in 0..25 {
            let path = tmp.path().join(format!("f{i:02}.txt"));
            fs::write(&path, format!("content {i}")).unwrap();
            files.push(FileDescriptor { path, size: 0 });
        }

        let lines = Mutex::new(Vec::new());
        let reporter = |m: &str| lines.lock().unwrap().push(m.to_string());
        let results = fingerprint_all(files, 10, "Processed", &reporter);

        assert_eq!(results.len(), 25);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
        assert_eq!(
            *lines.lock().unwrap(),
            vec!["    Processed 10 files...", "    Processed 20 files..."]
        );
    }

    #[test]
    fn test_results_keep_input_order() {
        let tmp = tempdir().unwrap();
        let files: Vec<_> = (0..7)
            .map(|i| {
                let path = tmp.path().join(format!("{i}.txt"));
                fs::write(&path, i.to_string()).unwrap();
                FileDescriptor { path, size: 1 }
            })
            .collect();

        let results = fingerprint_all(files.clone(), 3, "Indexed", &SilentReporter);
        let paths: Vec<_> = results.iter().map(|(f, _)| f.path.clone()).collect();
        let expected: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_hash_failure_is_reported_not_fatal() {
        let tmp = tempdir().unwrap();
        let good = tmp.path().join("good.txt");
        fs::write(&good, "good").unwrap();
        let files = vec![
            FileDescriptor {
                path: tmp.path().join("vanished.txt"),
                size: 3,
            },
            FileDescriptor { path: good, size: 4 },
        ];

        let lines = Mutex::new(Vec::new());
        let reporter = |m: &str| lines.lock().unwrap().push(m.to_string());
        let results = fingerprint_all(files, 0, "Processed", &reporter);

        assert!(results[0].1.is_err());
        assert!(results[1].1.is_ok());
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("[error] cannot fingerprint"));
    }

    #[cfg(unix)]
    #[test]
    fn test_top_level_backslash_name_is_not_mapped() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("a\\b.txt"), "odd").unwrap();
        fs::create_dir_all(root.join("dir")).unwrap();
        fs::write(root.join("dir").join("c\\d.txt"), "nested").unwrap();
        let filter = ScanFilter::new(&[]).unwrap();

        let outcome = scan_tree(root, &filter, &AppConfig::default(), &SilentReporter);

        assert_eq!(outcome.mapping.len(), 1);
        assert_eq!(outcome.mapping.values().next(), Some("dir/c\\d.txt"));
        assert!(matches!(
            outcome.issues.as_slice(),
            [FileIssue::AmbiguousName(name)] if name == "a\\b.txt"
        ));
    }

    #[test]
    fn test_duplicate_policy_decides_survivor() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("a").join("copy.txt"), "same").unwrap();
        fs::write(root.join("b").join("copy.txt"), "same").unwrap();
        let filter = ScanFilter::new(&[]).unwrap();

        let keep_last = scan_tree(root, &filter, &AppConfig::default(), &SilentReporter);
        assert_eq!(keep_last.duplicates, 1);
        assert_eq!(keep_last.mapping.len(), 1);
        assert_eq!(keep_last.mapping.values().next(), Some("b/copy.txt"));

        let config = AppConfig {
            duplicate_policy: DuplicatePolicy::KeepFirst,
            ..AppConfig::default()
        };
        let keep_first = scan_tree(root, &filter, &config, &SilentReporter);
        assert_eq!(keep_first.mapping.values().next(), Some("a/copy.txt"));
    }
}
