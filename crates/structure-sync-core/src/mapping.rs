use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::config::DuplicatePolicy;
use crate::error::Error;
use crate::fingerprint::Fingerprint;

/// Persisted fingerprint → source-relative path table.
///
/// Serialises as a flat JSON object. Iteration follows fingerprint order, so a
/// given mapping always produces the same file and the same sync plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerprintMapping {
    entries: BTreeMap<Fingerprint, String>,
}

impl FingerprintMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, replacing any previous path for the same fingerprint.
    pub fn insert(&mut self, fingerprint: Fingerprint, relative_path: String) -> Option<String> {
        self.entries.insert(fingerprint, relative_path)
    }

    /// Insert under `policy`; returns the path that lost out on a collision.
    pub fn insert_with_policy(
        &mut self,
        fingerprint: Fingerprint,
        relative_path: String,
        policy: DuplicatePolicy,
    ) -> Option<String> {
        policy.insert(&mut self.entries, fingerprint, relative_path)
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&str> {
        self.entries.get(fingerprint).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &str)> {
        self.entries.iter().map(|(fp, path)| (fp, path.as_str()))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Fingerprint, String)> for FingerprintMapping {
    fn from_iter<I: IntoIterator<Item = (Fingerprint, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Write `mapping` as pretty-printed UTF-8 JSON.
///
/// The document goes to a sibling `.tmp` file first and is renamed over `path`,
/// so an interrupted save never leaves a truncated mapping behind.
pub fn save(mapping: &FingerprintMapping, path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    {
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        mapping
            .serialize(&mut serializer)
            .map_err(io::Error::from)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    fs::rename(&tmp_path, path)?;
    debug!("Saved {} mapping entries to {}", mapping.len(), path.display());
    Ok(())
}

/// Read a mapping written by [`save`] (or any JSON object of hex fingerprint → path).
pub fn load(path: &Path) -> Result<FingerprintMapping, Error> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::MappingNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    let mapping: FingerprintMapping =
        serde_json::from_str(&content).map_err(|source| Error::Format {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded {} mapping entries from {}", mapping.len(), path.display());
    Ok(mapping)
}
