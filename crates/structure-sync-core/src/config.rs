use config::{Config, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::PathBuf;

use crate::error::Error;
use crate::fingerprint::Fingerprint;

pub const DEFAULT_MAP_PATH: &str = "file_map.json";
pub const DEFAULT_PROGRESS_EVERY: usize = 10;

/// Runtime settings passed explicitly into every entry point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Mapping file used when the caller does not name one.
    pub map_path: PathBuf,
    /// Emit a progress line after this many files. Zero disables progress lines.
    pub progress_every: usize,
    /// Extra glob patterns, matched against source-relative paths, excluded from scans.
    pub ignore_patterns: Vec<String>,
    pub duplicate_policy: DuplicatePolicy,
    /// Remove empty directories under the target after a real sync.
    pub prune_empty_dirs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            map_path: PathBuf::from(DEFAULT_MAP_PATH),
            progress_every: DEFAULT_PROGRESS_EVERY,
            ignore_patterns: Vec::new(),
            duplicate_policy: DuplicatePolicy::default(),
            prune_empty_dirs: true,
        }
    }
}

/// What happens when two files share a fingerprint during a scan or index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The file visited last replaces earlier ones.
    #[default]
    KeepLast,
    /// The first file visited is kept; later ones are dropped.
    KeepFirst,
}

impl DuplicatePolicy {
    /// Insert `value` under `key`, returning the value that did not make it
    /// into the map when the key was already present.
    pub fn insert<V>(
        self,
        map: &mut BTreeMap<Fingerprint, V>,
        key: Fingerprint,
        value: V,
    ) -> Option<V> {
        match map.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                None
            }
            Entry::Occupied(mut slot) => match self {
                DuplicatePolicy::KeepLast => Some(slot.insert(value)),
                DuplicatePolicy::KeepFirst => Some(value),
            },
        }
    }
}

/// Load settings from an optional `StructureSync.toml` in the working
/// directory, then `STRUCTURE_SYNC_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, Error> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("StructureSync").required(false))
        .add_source(
            Environment::with_prefix("STRUCTURE_SYNC")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;
    Ok(builder.try_deserialize::<AppConfig>()?)
}
