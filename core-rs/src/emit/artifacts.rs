//! Files written into the `Artifacts` tree outside the project files.

use std::fs;
use std::path::PathBuf;

use crate::errors::{ConfigureError, Result};
use crate::options::BuildOptions;
use crate::project::ProjectModel;

use super::write_file;

/// Output folders rebuilt from scratch on every run
pub const TRANSIENT_DIRECTORIES: [&str; 2] = ["Artifacts\\demo", "Artifacts\\fuzz"];

/// Destination of the injected preprocessor blobs
pub const CONFIG_HEADER_DIRECTORY: &str = "Artifacts\\config";

/// Remove the transient output folders; missing folders are fine
pub fn clean(options: &BuildOptions) -> Result<()> {
    for directory in TRANSIENT_DIRECTORIES {
        let path = options.resolve(directory);
        if !path.exists() {
            continue;
        }

        fs::remove_dir_all(&path).map_err(|source| ConfigureError::WriteFailed {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!("Removed {}", path.display());
    }
    Ok(())
}

/// Write the project's `[MAGICK_BASECONFIG_DEFINE]` blob to
/// `Artifacts\config\<name>.h`. Returns `None` when the project has none.
pub fn write_magick_baseconfig_define(project: &ProjectModel<'_>) -> Result<Option<PathBuf>> {
    let define = project.config().magick_baseconfig_define();
    if define.is_empty() {
        return Ok(None);
    }

    let path = project
        .options()
        .resolve(&format!("{}\\{}.h", CONFIG_HEADER_DIRECTORY, project.name()));
    write_file(&path, define)?;
    Ok(Some(path))
}
