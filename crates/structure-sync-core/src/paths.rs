use std::path::{Component, Path, PathBuf};

/// Render `path` relative to `root` as a `/`-separated string.
///
/// Returns `None` when `path` is not under `root` or a component is not valid UTF-8.
pub fn to_relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => continue,
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Turn a mapping value back into a relative path.
///
/// Values are `/`-separated; a value without any `/` but with `\` is treated as
/// a Windows-style path. Absolute paths, drive prefixes, `.`/`..` and empty
/// components are rejected so a mapping can never point outside the target root.
pub fn from_relative_key(key: &str) -> Option<PathBuf> {
    let separator = if reads_as_windows_path(key) {
        '\\'
    } else {
        '/'
    };

    let mut path = PathBuf::new();
    for (index, part) in key.split(separator).enumerate() {
        if part.is_empty() || part == "." || part == ".." {
            return None;
        }
        if index == 0 && is_drive(part) {
            return None;
        }
        path.push(part);
    }

    // A part may still parse as a root or prefix on some platforms.
    if path
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        Some(path)
    } else {
        None
    }
}

/// True when [`from_relative_key`] would split `key` on `\`. A Unix file
/// name like `a\b.txt` at the top of a tree cannot be stored as a key.
pub fn reads_as_windows_path(key: &str) -> bool {
    !key.contains('/') && key.contains('\\')
}

fn is_drive(part: &str) -> bool {
    let bytes = part.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
