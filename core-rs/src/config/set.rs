//! Discovery and resolution of every module descriptor under a root.
//!
//! Loading runs in a fixed order: discovery with the selection filter, the
//! legacy rename for major version 6, dropping unresolvable references, then
//! validation. The steps run once; nothing is iterated to a fixed point.

use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ConfigureError, Result};
use crate::options::{Architecture, BuildOptions};
use crate::paths;

use super::descriptor::{ConfigDescriptor, ProjectKind};

/// Directory (relative to the root) holding the named descriptors
pub const CONFIGS_DIRECTORY: &str = "Configure\\Configs";

/// Published header tree that satisfies cross-module references
pub const ARTIFACT_INCLUDE_DIRECTORY: &str = "Artifacts\\include";

/// Plugin source directory of the product tree
pub const CODERS_DIRECTORY: &str = "ImageMagick\\coders\\";

/// Group name used for the plugin aggregate descriptor
pub const CODERS_GROUP: &str = "coders";

/// Length of the fixed prefix stripped from plugin descriptor file names
const CODER_FILE_PREFIX_LENGTH: usize = 6;

/// Descriptor location inside a dependency directory
const DEPENDENCY_CONFIG_FILE: &str = ".ImageMagick\\Config.txt";

/// Names are unique within a scope; a plugin descriptor may share its name
/// with the library it wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameScope {
    Library,
    Coder,
    Other,
}

impl NameScope {
    pub fn of(kind: ProjectKind) -> Self {
        match kind {
            ProjectKind::DynamicLibrary | ProjectKind::StaticLibrary => NameScope::Library,
            ProjectKind::Coder => NameScope::Coder,
            _ => NameScope::Other,
        }
    }
}

type ConfigKey = (NameScope, String);

/// Resolved descriptors keyed by scope and name, in discovery order
#[derive(Debug, Clone, Default)]
pub struct ConfigSet {
    configs: IndexMap<ConfigKey, ConfigDescriptor>,
}

impl ConfigSet {
    /// Discover, filter, resolve, and validate every descriptor under the root
    pub fn load(options: &BuildOptions) -> Result<Self> {
        let mut discovered = Vec::new();

        load_directory(options, "Dependencies", &mut discovered)?;
        load_directory(options, "OptionalDependencies", &mut discovered)?;

        if options.resolve("ImageMagick").exists() {
            load_imagemagick(options, &mut discovered)?;
        }

        if !options.is_imagemagick7 {
            for config in discovered.iter_mut() {
                config.update_for_imagemagick6();
            }
        }

        let mut set = ConfigSet::from_configs(discovered)?;

        let removed = set.remove_invalid_references(options);
        if removed > 0 {
            tracing::info!("Removed {} unresolvable reference(s)", removed);
        }

        set.validate(options)?;

        for cycle in set.reference_cycles() {
            tracing::warn!("Reference cycle between configs: {}", cycle.join(" -> "));
        }

        tracing::info!("Loaded {} configs", set.len());
        Ok(set)
    }

    /// Key `configs` by scope and name; two descriptors with one name in
    /// the same scope are fatal
    pub fn from_configs<I>(configs: I) -> Result<Self>
    where
        I: IntoIterator<Item = ConfigDescriptor>,
    {
        let mut set = ConfigSet::default();
        for config in configs {
            set.insert(config)?;
        }
        Ok(set)
    }

    fn insert(&mut self, config: ConfigDescriptor) -> Result<()> {
        let key = (NameScope::of(config.kind()), config.name().to_string());
        if self.configs.contains_key(&key) {
            return Err(ConfigureError::DuplicateConfig(key.1));
        }

        self.configs.insert(key, config);
        Ok(())
    }

    /// First descriptor named `name` in discovery order
    pub fn get(&self, name: &str) -> Option<&ConfigDescriptor> {
        self.configs.values().find(|config| config.name() == name)
    }

    /// Descriptor named `name` with exactly `kind`
    pub fn get_kind(&self, name: &str, kind: ProjectKind) -> Option<&ConfigDescriptor> {
        self.configs
            .get(&(NameScope::of(kind), name.to_string()))
            .filter(|config| config.kind() == kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// First descriptor of `kind` in discovery order
    pub fn find_kind(&self, kind: ProjectKind) -> Option<&ConfigDescriptor> {
        self.configs.values().find(|config| config.kind() == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigDescriptor> {
        self.configs.values()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Drop every reference that names neither another config nor a
    /// published artifact directory. Returns the number of dropped references.
    ///
    /// A descriptor never satisfies its own reference, but a descriptor of
    /// another scope with the same name does.
    pub fn remove_invalid_references(&mut self, options: &BuildOptions) -> usize {
        let mut invalid: Vec<(ConfigKey, BTreeSet<String>)> = Vec::new();

        for (key, config) in &self.configs {
            let missing: BTreeSet<String> = config
                .references()
                .iter()
                .filter(|reference| {
                    !self.names_other_config(key, reference) && !artifact_include_exists(options, reference)
                })
                .cloned()
                .collect();

            if !missing.is_empty() {
                invalid.push((key.clone(), missing));
            }
        }

        let mut removed = 0;
        for (key, references) in invalid {
            if let Some(config) = self.configs.get_mut(&key) {
                for reference in references {
                    tracing::warn!("Dropping unresolved reference {} from {}", reference, key.1);
                    if config.remove_reference(&reference) {
                        removed += 1;
                    }
                }
            }
        }

        removed
    }

    fn names_other_config(&self, own_key: &ConfigKey, reference: &str) -> bool {
        self.configs
            .iter()
            .any(|(key, config)| key != own_key && config.name() == reference)
    }

    /// Include directories must exist and static libraries must not reference anything
    pub fn validate(&self, options: &BuildOptions) -> Result<()> {
        for config in self.configs.values() {
            for include in config.includes() {
                let include_directory = resolve_include(options, config, include);
                if !include_directory.is_dir() {
                    return Err(ConfigureError::IncludeDirectoryNotFound(
                        include_directory.display().to_string(),
                    ));
                }
            }

            if config.kind() == ProjectKind::StaticLibrary && !config.references().is_empty() {
                return Err(ConfigureError::StaticLibraryReferences(config.name().to_string()));
            }
        }

        Ok(())
    }

    /// Cycles in the reference graph, each listed from its first config back to itself
    pub fn reference_cycles(&self) -> Vec<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            set: &ConfigSet,
            index: usize,
            marks: &mut BTreeMap<usize, Mark>,
            stack: &mut Vec<usize>,
            cycles: &mut Vec<Vec<String>>,
        ) {
            marks.insert(index, Mark::Visiting);
            stack.push(index);

            if let Some((key, config)) = set.configs.get_index(index) {
                for reference in config.references() {
                    let targets = set
                        .configs
                        .iter()
                        .enumerate()
                        .filter(|(_, (other_key, other))| *other_key != key && other.name() == reference.as_str())
                        .map(|(target, _)| target)
                        .collect::<Vec<_>>();

                    for target in targets {
                        match marks.get(&target) {
                            Some(Mark::Visiting) => {
                                if let Some(start) = stack.iter().position(|n| *n == target) {
                                    let mut cycle: Vec<String> =
                                        stack[start..].iter().map(|n| set.name_at(*n)).collect();
                                    cycle.push(set.name_at(target));
                                    cycles.push(cycle);
                                }
                            }
                            Some(Mark::Done) => {}
                            None => visit(set, target, marks, stack, cycles),
                        }
                    }
                }
            }

            stack.pop();
            marks.insert(index, Mark::Done);
        }

        let mut marks = BTreeMap::new();
        let mut cycles = Vec::new();
        for index in 0..self.configs.len() {
            if !marks.contains_key(&index) {
                let mut stack = Vec::new();
                visit(self, index, &mut marks, &mut stack, &mut cycles);
            }
        }
        cycles
    }

    fn name_at(&self, index: usize) -> String {
        self.configs
            .get_index(index)
            .map(|((_, name), _)| name.clone())
            .unwrap_or_default()
    }
}

impl IntoIterator for ConfigSet {
    type Item = ConfigDescriptor;
    type IntoIter = indexmap::map::IntoValues<ConfigKey, ConfigDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.configs.into_values()
    }
}

/// Selection filter applied to every discovered descriptor
pub fn is_selected(config: &ConfigDescriptor, options: &BuildOptions) -> bool {
    if config.is_optional() && !options.include_optional {
        return false;
    }

    if config.has_incompatible_license() && !options.include_incompatible_license {
        return false;
    }

    if config.disabled_for_arm64() && options.architecture == Architecture::Arm64 {
        return false;
    }

    if config.is_imagemagick7_only() && !options.is_imagemagick7 {
        return false;
    }

    true
}

/// Host directory an include entry points at
pub fn resolve_include(options: &BuildOptions, config: &ConfigDescriptor, include: &str) -> PathBuf {
    match include.strip_prefix('\\') {
        Some(from_root) => options.resolve(from_root),
        None => options.resolve(&paths::join(config.directory(), include)),
    }
}

fn artifact_include_exists(options: &BuildOptions, reference: &str) -> bool {
    options
        .resolve(&paths::join(ARTIFACT_INCLUDE_DIRECTORY, reference))
        .exists()
}

fn add_config(config: ConfigDescriptor, options: &BuildOptions, configs: &mut Vec<ConfigDescriptor>) {
    if is_selected(&config, options) {
        configs.push(config);
    } else {
        tracing::debug!("Skipping config {} for the current options", config.name());
    }
}

fn sorted_entries(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(directory)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();
    Ok(entries)
}

fn load_directory(options: &BuildOptions, directory: &str, configs: &mut Vec<ConfigDescriptor>) -> Result<()> {
    let full_directory = options.resolve(directory);
    if !full_directory.is_dir() {
        return Ok(());
    }

    for entry in sorted_entries(&full_directory)? {
        if !entry.is_dir() {
            continue;
        }

        let name = match entry.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => continue,
        };
        let project_directory = format!("{}\\{}\\", directory, name);
        let config_file = options.resolve(&paths::join(&project_directory, DEPENDENCY_CONFIG_FILE));

        let config = ConfigDescriptor::load(&name, &project_directory, config_file)?;
        add_config(config, options, configs);
    }

    Ok(())
}

fn load_named(options: &BuildOptions, name: &str, directory: &str, configs: &mut Vec<ConfigDescriptor>) -> Result<()> {
    let project_directory = options.resolve(&paths::join(CONFIGS_DIRECTORY, name));
    if !project_directory.is_dir() {
        return Err(ConfigureError::ProjectDirectoryNotFound(
            project_directory.display().to_string(),
        ));
    }

    let config = ConfigDescriptor::load(name, directory, project_directory.join("Config.txt"))?;
    add_config(config, options, configs);
    Ok(())
}

fn load_imagemagick(options: &BuildOptions, configs: &mut Vec<ConfigDescriptor>) -> Result<()> {
    if options.is_imagemagick7 {
        load_named(options, "MagickCore", "ImageMagick\\MagickCore", configs)?;
        load_named(options, "MagickWand", "ImageMagick\\MagickWand", configs)?;
        load_named(options, "oss-fuzz", "ImageMagick\\oss-fuzz", configs)?;
    } else {
        load_named(options, "MagickCore", "ImageMagick\\magick", configs)?;
        load_named(options, "wand", "ImageMagick\\wand", configs)?;
    }

    load_coders(options, configs)?;
    load_named(options, "Magick++", "ImageMagick\\Magick++", configs)?;
    load_named(options, "demos", "ImageMagick\\Magick++\\demo", configs)?;
    load_named(options, "filters", "ImageMagick\\filters", configs)?;
    load_named(options, "utilities", "ImageMagick\\utilities", configs)?;
    load_directory(options, "OptionalApplications", configs)?;

    Ok(())
}

fn load_coders(options: &BuildOptions, configs: &mut Vec<ConfigDescriptor>) -> Result<()> {
    let coder_directory = options.resolve(CODERS_DIRECTORY);
    if !coder_directory.is_dir() {
        return Err(ConfigureError::CodersDirectoryNotFound(
            coder_directory.display().to_string(),
        ));
    }

    let coder_configs = options.resolve(&paths::join(CONFIGS_DIRECTORY, CODERS_GROUP));
    if !coder_configs.is_dir() {
        return Err(ConfigureError::ProjectDirectoryNotFound(
            coder_configs.display().to_string(),
        ));
    }

    for entry in sorted_entries(&coder_configs)? {
        if !entry.is_file() || entry.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }

        let stem = entry
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let Some(rest) = stem.get(CODER_FILE_PREFIX_LENGTH..) else {
            tracing::warn!("Ignoring coder config with a short name: {}", entry.display());
            continue;
        };

        let name = coder_name(rest);
        let config = ConfigDescriptor::load(&name, CODERS_DIRECTORY, &entry)?;
        add_config(config, options, configs);
    }

    Ok(())
}

/// Plugin name from a descriptor file stem with the fixed prefix removed
fn coder_name(rest: &str) -> String {
    let mut chars = rest.chars();
    match chars.next() {
        None => CODERS_GROUP.to_string(),
        Some(_) => chars.as_str().to_string(),
    }
}
