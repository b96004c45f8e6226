use glob::Pattern;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Decides which files a source scan leaves out of the mapping.
#[derive(Debug, Default)]
pub struct ScanFilter {
    ignore_patterns: Vec<Pattern>,
    excluded_paths: Vec<PathBuf>,
}

impl ScanFilter {
    /// Compile glob patterns; a bad pattern is a configuration error.
    pub fn new(ignore_globs: &[String]) -> Result<Self, Error> {
        let ignore_patterns = ignore_globs
            .iter()
            .map(|glob| {
                Pattern::new(glob)
                    .map_err(|e| Error::Config(format!("invalid ignore pattern '{}': {}", glob, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            ignore_patterns,
            excluded_paths: Vec::new(),
        })
    }

    /// Never include this exact path (for example the mapping being written).
    pub fn exclude_path(mut self, path: PathBuf) -> Self {
        self.excluded_paths.push(path);
        self
    }

    pub fn excludes(&self, root: &Path, path: &Path) -> bool {
        let noise = path
            .file_name()
            .map(|name| is_noise_file_name(&name.to_string_lossy()))
            .unwrap_or(false);
        if noise {
            return true;
        }

        if self.excluded_paths.iter().any(|excluded| excluded == path) {
            return true;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative))
    }
}

/// Hidden files and Windows thumbnail caches never describe user content.
pub fn is_noise_file_name(name: &str) -> bool {
    name.starts_with('.') || name.eq_ignore_ascii_case("thumbs.db")
}
