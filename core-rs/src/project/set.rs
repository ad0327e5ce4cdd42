//! Derivation of every output project from the resolved descriptors.
//!
//! Most descriptors become exactly one project. Plugins, demos, filters, fuzz
//! targets, and the command-line utilities are aggregate descriptors whose
//! projects are derived by the rules below.

use std::collections::BTreeSet;

use crate::config::{ConfigDescriptor, ConfigSet, ProjectKind};
use crate::errors::Result;
use crate::options::BuildOptions;

use super::model::ProjectModel;

/// Command-line tools that get their own front-end project
pub const UTILITY_ALIASES: [&str; 7] = [
    "compare",
    "composite",
    "conjure",
    "identify",
    "mogrify",
    "montage",
    "stream",
];

/// Shared driver compiled into every fuzz target
pub const FUZZ_DRIVER: &str = "main.cc";

const CODERS_CONFIG: &str = "coders";
const FILTERS_CONFIG: &str = "filters";
const UTILITIES_CONFIG: &str = "utilities";

/// All projects of one run, in derivation order
#[derive(Debug, Clone, Default)]
pub struct ProjectSet<'a> {
    projects: Vec<ProjectModel<'a>>,
}

impl<'a> ProjectSet<'a> {
    /// Derive the projects for `configs`
    ///
    /// # Arguments
    /// * `options` - Shared build options
    /// * `configs` - Resolved and validated descriptors
    pub fn create(options: &'a BuildOptions, configs: &ConfigSet) -> Result<Self> {
        let mut set = ProjectSet::default();

        for config in configs.iter() {
            if is_derived_separately(config) {
                continue;
            }
            set.projects.push(ProjectModel::create(config, options)?);
        }
        tracing::debug!("Created {} one-to-one project(s)", set.projects.len());

        set.create_coder_projects(options, configs)?;
        set.create_demo_projects(options, configs)?;
        set.create_filter_projects(options, configs)?;
        set.create_fuzz_projects(options, configs)?;
        set.create_utility_projects(options, configs)?;

        for full_name in set.duplicate_full_names() {
            tracing::warn!("Project name {} is derived more than once", full_name);
        }

        tracing::info!("Derived {} projects", set.projects.len());
        Ok(set)
    }

    fn create_coder_projects(&mut self, options: &'a BuildOptions, configs: &ConfigSet) -> Result<()> {
        let Some(coders_config) = configs.get_kind(CODERS_CONFIG, ProjectKind::Coder) else {
            return Ok(());
        };

        let mut coders_project = ProjectModel::create(coders_config, options)?;

        if options.is_static_build {
            for config in configs.iter() {
                if config.kind() == ProjectKind::Coder && config.name() != CODERS_CONFIG {
                    coders_project.merge_config_info(config);
                }
            }
            self.projects.push(coders_project);
            return Ok(());
        }

        for mut coder_project in coders_project.split_to_files(&[]) {
            if let Some(config) = configs.get_kind(coder_project.name(), ProjectKind::Coder) {
                tracing::debug!("Applying coder config {}", config.name());
                coder_project.merge_config_info(config);
            }
            self.projects.push(coder_project);
        }

        Ok(())
    }

    fn create_demo_projects(&mut self, options: &'a BuildOptions, configs: &ConfigSet) -> Result<()> {
        let Some(demo_config) = configs.find_kind(ProjectKind::Demo) else {
            return Ok(());
        };

        let demo_project = ProjectModel::create(demo_config, options)?;
        self.projects.extend(demo_project.split_to_files(&[]));
        Ok(())
    }

    fn create_filter_projects(&mut self, options: &'a BuildOptions, configs: &ConfigSet) -> Result<()> {
        let Some(filters_config) = configs.get(FILTERS_CONFIG) else {
            return Ok(());
        };

        let filters_project = ProjectModel::create(filters_config, options)?;
        if options.is_static_build {
            self.projects.push(filters_project);
        } else {
            self.projects.extend(filters_project.split_to_files(&[]));
        }
        Ok(())
    }

    fn create_fuzz_projects(&mut self, options: &'a BuildOptions, configs: &ConfigSet) -> Result<()> {
        let Some(fuzz_config) = configs.find_kind(ProjectKind::Fuzz) else {
            return Ok(());
        };

        let fuzz_project = ProjectModel::create(fuzz_config, options)?;
        self.projects.extend(fuzz_project.split_to_files(&[FUZZ_DRIVER]));
        Ok(())
    }

    fn create_utility_projects(&mut self, options: &'a BuildOptions, configs: &ConfigSet) -> Result<()> {
        let Some(utilities_config) = configs.get(UTILITIES_CONFIG) else {
            return Ok(());
        };

        let utilities_project = ProjectModel::create(utilities_config, options)?;

        for alias in UTILITY_ALIASES {
            if options.is_imagemagick7 {
                if !options.only_magick {
                    self.push_utility(&utilities_project, alias, "magick");
                }
            } else {
                self.push_utility(&utilities_project, alias, alias);
            }
        }

        if options.is_imagemagick7 {
            self.push_utility(&utilities_project, "magick", "magick");
        } else {
            self.push_utility(&utilities_project, "convert", "convert");
        }

        Ok(())
    }

    fn push_utility(&mut self, utilities_project: &ProjectModel<'a>, name: &str, source: &str) {
        let mut utility_project = utilities_project.clone();
        utility_project.rename(name);
        utility_project.set_files([format!("{}.c", source)]);
        self.projects.push(utility_project);
    }

    pub fn projects(&self) -> &[ProjectModel<'a>] {
        &self.projects
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProjectModel<'a>> {
        self.projects.iter()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Full names shared by more than one project, in derivation order
    pub fn duplicate_full_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut duplicates = Vec::new();
        for project in &self.projects {
            let full_name = project.full_name();
            if !seen.insert(full_name.clone()) && !duplicates.contains(&full_name) {
                duplicates.push(full_name);
            }
        }
        duplicates
    }

    /// Project by full name (`CORE_zlib`)
    pub fn get(&self, full_name: &str) -> Option<&ProjectModel<'a>> {
        self.projects.iter().find(|project| project.full_name() == full_name)
    }
}

impl<'a> From<Vec<ProjectModel<'a>>> for ProjectSet<'a> {
    fn from(projects: Vec<ProjectModel<'a>>) -> Self {
        ProjectSet { projects }
    }
}

impl<'s, 'a> IntoIterator for &'s ProjectSet<'a> {
    type Item = &'s ProjectModel<'a>;
    type IntoIter = std::slice::Iter<'s, ProjectModel<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.projects.iter()
    }
}

/// Aggregate descriptors handled by a dedicated derivation rule
fn is_derived_separately(config: &ConfigDescriptor) -> bool {
    matches!(
        config.kind(),
        ProjectKind::Coder | ProjectKind::Demo | ProjectKind::Filter | ProjectKind::Fuzz
    ) || config.name() == UTILITIES_CONFIG
}
