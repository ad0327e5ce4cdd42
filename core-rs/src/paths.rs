//! Project-relative paths.
//!
//! Descriptors and generated project files address everything relative to the
//! solution root using backslash separators (`ImageMagick\coders\`). These
//! helpers keep that representation as plain strings and only convert to host
//! paths at the filesystem boundary.

use std::path::{Path, PathBuf};

/// Separator used in descriptors and generated files
pub const SEPARATOR: char = '\\';

/// Resolve a backslash-separated relative path against a host directory.
///
/// Both `\` and `/` are accepted as separators and empty segments are ignored,
/// so `"Dependencies\\zlib\\"` and `"Dependencies/zlib"` resolve identically.
pub fn to_host(root: &Path, relative: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in relative.split(|c| c == '\\' || c == '/') {
        if !segment.is_empty() {
            path.push(segment);
        }
    }
    path
}

/// Append `child` to a relative directory, inserting a separator when needed.
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else if parent.ends_with(SEPARATOR) {
        format!("{}{}", parent, child)
    } else {
        format!("{}{}{}", parent, SEPARATOR, child)
    }
}

/// Ensure a relative directory carries its trailing separator.
pub fn as_directory(directory: &str) -> String {
    if directory.is_empty() || directory.ends_with(SEPARATOR) {
        directory.to_string()
    } else {
        format!("{}{}", directory, SEPARATOR)
    }
}

/// Strip the extension (everything from the last `.` in the last segment).
pub fn strip_extension(name: &str) -> &str {
    let segment_start = name.rfind(SEPARATOR).map(|i| i + 1).unwrap_or(0);
    match name[segment_start..].rfind('.') {
        Some(dot) => &name[..segment_start + dot],
        None => name,
    }
}

/// Last segment of a relative path.
pub fn file_name(name: &str) -> &str {
    match name.rfind(SEPARATOR) {
        Some(index) => &name[index + 1..],
        None => name,
    }
}

/// Directory part of a relative path, if the path has one.
pub fn parent(name: &str) -> Option<&str> {
    name.rfind(SEPARATOR).map(|index| &name[..index])
}

/// First segment of a relative path.
pub fn first_segment(name: &str) -> &str {
    match name.find(SEPARATOR) {
        Some(index) => &name[..index],
        None => name,
    }
}

/// Convert a host path below `root` into the backslash form.
pub fn from_host(root: &Path, path: &Path) -> Option<String> {
    let relative = pathdiff::diff_paths(path, root)?;
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(segments.join("\\"))
}

/// True for C and C++ translation units.
pub fn is_source_file(name: &str) -> bool {
    name.ends_with(".c") || name.ends_with(".cc") || name.ends_with(".cpp")
}
