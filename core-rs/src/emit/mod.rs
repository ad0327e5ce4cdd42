/**
 * emit module
 * Serialization of projects and the solution to disk
 */

pub mod artifacts;
pub mod filters;
pub mod guid;
pub mod project;
pub mod solution;

use std::fs;
use std::path::Path;

use crate::errors::{ConfigureError, Result};
use crate::project::ProjectModel;

pub use guid::create_guid;

/// Write `content` to `path`, creating missing parent directories
pub(crate) fn write_file(path: &Path, content: &str) -> Result<()> {
    let write_failed = |source| ConfigureError::WriteFailed {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }
    fs::write(path, content).map_err(write_failed)
}

/// Write the project file, its filters file, and its config header for
/// every project. Returns the number of projects written.
pub fn write_projects(projects: &[ProjectModel<'_>]) -> Result<usize> {
    for project in projects {
        project::write(project, projects)?;
        filters::write(project)?;
        artifacts::write_magick_baseconfig_define(project)?;
    }
    Ok(projects.len())
}
