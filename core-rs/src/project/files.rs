//! Source file discovery for one project directory.

use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

use crate::errors::{ConfigureError, Result};
use crate::paths;

/// Metadata directories that never contribute sources
pub const RESERVED_DIRECTORIES: [&str; 3] = [".git\\", ".github\\", ".ImageMagick\\"];

/// Extensions picked up by the walk
pub const SOURCE_EXTENSIONS: [&str; 5] = ["asm", "c", "cc", "cpp", "h"];

/// Prefix exclusion check that remembers which entries fired
#[derive(Debug)]
pub struct ExcludeTracker<'e> {
    excludes: &'e BTreeSet<String>,
    found: BTreeSet<String>,
}

impl<'e> ExcludeTracker<'e> {
    pub fn new(excludes: &'e BTreeSet<String>) -> Self {
        ExcludeTracker {
            excludes,
            found: BTreeSet::new(),
        }
    }

    /// Whether `name` (relative, directories with a trailing separator) is excluded.
    ///
    /// A header follows its translation unit: `x.h` is excluded when `x.c`,
    /// `x.cc`, or `x.cpp` would be.
    pub fn is_excluded(&mut self, name: &str) -> bool {
        if RESERVED_DIRECTORIES.iter().any(|reserved| name.starts_with(reserved)) {
            return true;
        }

        if name.ends_with(".h") {
            let stem = paths::strip_extension(name);
            return ["c", "cc", "cpp"]
                .iter()
                .any(|extension| self.is_excluded(&format!("{}.{}", stem, extension)));
        }

        let excludes = self.excludes;
        match excludes.iter().find(|exclude| name.starts_with(exclude.as_str())) {
            Some(exclude) => {
                self.found.insert(exclude.clone());
                true
            }
            None => false,
        }
    }

    /// Exclusion entries that never matched anything
    pub fn unmatched(&self) -> impl Iterator<Item = &String> {
        self.excludes.iter().filter(move |exclude| !self.found.contains(*exclude))
    }
}

/// Walk `base` and collect the relative names of all source files.
///
/// Fails when an entry of `excludes` matched nothing, which catches stale or
/// misspelled exclusions.
pub fn discover(base: &Path, excludes: &BTreeSet<String>, project: &str) -> Result<BTreeSet<String>> {
    let mut tracker = ExcludeTracker::new(excludes);
    let mut files = BTreeSet::new();

    let mut walker = WalkDir::new(base).min_depth(1).sort_by_file_name().into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        let Some(name) = paths::from_host(base, entry.path()) else {
            continue;
        };

        if entry.file_type().is_dir() {
            if tracker.is_excluded(&format!("{}\\", name)) {
                walker.skip_current_dir();
            }
            continue;
        }

        let has_source_extension = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SOURCE_EXTENSIONS.contains(&e))
            .unwrap_or(false);
        if !has_source_extension {
            continue;
        }

        if !tracker.is_excluded(&name) {
            files.insert(name);
        }
    }

    if let Some(exclude) = tracker.unmatched().next() {
        return Err(ConfigureError::InvalidExcludePath {
            exclude: exclude.clone(),
            project: project.to_string(),
        });
    }

    Ok(files)
}
