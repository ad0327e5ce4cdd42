/**
 * pipeline.rs
 * One configure run: load descriptors, derive projects, write everything
 *
 * Stages run strictly in order and the first error aborts the run. Files
 * written before a failure are left in place; the next successful run
 * rewrites the full set.
 */

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{ConfigSet, ProjectKind};
use crate::emit::{self, artifacts, solution};
use crate::errors::{ConfigureError, Result};
use crate::options::BuildOptions;
use crate::project::{ProjectModel, ProjectSet};

/// Name of the directory the tool lives in, directly below the root
pub const CONFIGURE_DIRECTORY: &str = "Configure";

/// Root directory for a run started in `start`: the parent of the closest
/// ancestor (or `start` itself) named `Configure`
pub fn find_root_directory(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .find(|directory| directory.file_name().map(|n| n == CONFIGURE_DIRECTORY).unwrap_or(false))
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| ConfigureError::RootDirectoryNotFound(start.display().to_string()))
}

/// What `list` reports per project
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub full_name: String,
    pub kind: ProjectKind,
    pub guid: String,
    pub directory: String,
    pub project_file: String,
    pub file_count: usize,
}

impl ProjectSummary {
    pub fn from_project(project: &ProjectModel<'_>) -> Self {
        ProjectSummary {
            full_name: project.full_name(),
            kind: project.kind(),
            guid: project.guid(),
            directory: project.directory().to_string(),
            project_file: project.file_name(),
            file_count: project.files().len(),
        }
    }
}

/// Outcome of a full run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub configs: usize,
    pub projects: usize,
    pub solution: PathBuf,
}

/// A configure run over frozen options
#[derive(Debug, Clone)]
pub struct Configure {
    options: BuildOptions,
}

impl Configure {
    pub fn new(options: BuildOptions) -> Self {
        Configure { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn load_configs(&self) -> Result<ConfigSet> {
        ConfigSet::load(&self.options)
    }

    pub fn create_projects(&self, configs: &ConfigSet) -> Result<ProjectSet<'_>> {
        ProjectSet::create(&self.options, configs)
    }

    /// Resolve everything without writing
    pub fn plan(&self) -> Result<Vec<ProjectSummary>> {
        let configs = self.load_configs()?;
        let projects = self.create_projects(&configs)?;
        Ok(projects.iter().map(ProjectSummary::from_project).collect())
    }

    /// Run every stage and write all output
    pub fn run(&self) -> Result<RunSummary> {
        tracing::info!(
            "Configuring {} ({}, {})",
            self.options.root_directory.display(),
            self.options.architecture_name(),
            if self.options.is_static_build { "static" } else { "dynamic" }
        );

        artifacts::clean(&self.options)?;

        tracing::info!("Loading configs");
        let configs = self.load_configs()?;

        tracing::info!("Creating projects");
        let projects = self.create_projects(&configs)?;

        tracing::info!("Writing {} project files", projects.len());
        emit::write_projects(projects.projects())?;

        tracing::info!("Writing solution");
        let solution = solution::write(&self.options, projects.projects())?;

        Ok(RunSummary {
            configs: configs.len(),
            projects: projects.len(),
            solution,
        })
    }
}
