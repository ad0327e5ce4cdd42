/**
 * descriptor.rs
 * Parser for per-module Config.txt descriptors
 *
 * Format:
 * ```text
 * [DYNAMIC_LIBRARY]
 *
 * [REFERENCES]
 * zlib
 * lzma
 *
 * [INCLUDE_ARTIFACTS]
 * include -> .
 * src\png.h -> png
 * ```
 *
 * A section tag is followed by zero or more lines up to the next blank line.
 * Repeated set sections accumulate; scalar sections overwrite.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ConfigureError, Result};
use crate::options::Architecture;
use crate::paths;

/// Resource script picked up when it sits next to the descriptor
pub const RESOURCE_FILE_NAME: &str = "ImageMagick.rc";

static SECTION_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[[A-Z0-9_+]+\]$").expect("section tag pattern is valid")
});

/// Classification of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectKind {
    Undefined,
    Application,
    Coder,
    Demo,
    Filter,
    Fuzz,
    DynamicLibrary,
    StaticLibrary,
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProjectKind::Undefined => "undefined",
            ProjectKind::Application => "application",
            ProjectKind::Coder => "coder",
            ProjectKind::Demo => "demo",
            ProjectKind::Filter => "filter",
            ProjectKind::Fuzz => "fuzz",
            ProjectKind::DynamicLibrary => "dynamic library",
            ProjectKind::StaticLibrary => "static library",
        };
        f.write_str(name)
    }
}

/// One module's declarative configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDescriptor {
    name: String,
    directory: String,
    kind: ProjectKind,
    coder_references: BTreeSet<String>,
    disabled_for_arm64: bool,
    dynamic_defines: BTreeSet<String>,
    excludes_arm64: BTreeSet<String>,
    excludes_x64: BTreeSet<String>,
    excludes_x86: BTreeSet<String>,
    has_incompatible_license: bool,
    includes: BTreeSet<String>,
    includes_nasm_x64: BTreeSet<String>,
    includes_nasm_x86: BTreeSet<String>,
    include_artifacts: BTreeMap<String, String>,
    is_imagemagick7_only: bool,
    is_magick_project: bool,
    is_optional: bool,
    licenses: BTreeSet<String>,
    magick_baseconfig_define: String,
    module_definition_file: Option<String>,
    references: BTreeSet<String>,
    resource_file: Option<PathBuf>,
    static_defines: BTreeSet<String>,
    use_nasm: bool,
    use_opencl: bool,
    use_unicode: bool,
}

impl ConfigDescriptor {
    /// Empty descriptor of undefined kind
    pub fn new(name: &str, directory: &str) -> Self {
        ConfigDescriptor {
            name: name.to_string(),
            directory: paths::as_directory(directory),
            kind: ProjectKind::Undefined,
            coder_references: BTreeSet::new(),
            disabled_for_arm64: false,
            dynamic_defines: BTreeSet::new(),
            excludes_arm64: BTreeSet::new(),
            excludes_x64: BTreeSet::new(),
            excludes_x86: BTreeSet::new(),
            has_incompatible_license: false,
            includes: BTreeSet::new(),
            includes_nasm_x64: BTreeSet::new(),
            includes_nasm_x86: BTreeSet::new(),
            include_artifacts: BTreeMap::new(),
            is_imagemagick7_only: false,
            is_magick_project: false,
            is_optional: false,
            licenses: BTreeSet::new(),
            magick_baseconfig_define: String::new(),
            module_definition_file: None,
            references: BTreeSet::new(),
            resource_file: None,
            static_defines: BTreeSet::new(),
            use_nasm: false,
            use_opencl: false,
            use_unicode: false,
        }
    }

    /// Load a descriptor file
    ///
    /// # Arguments
    /// * `name` - Module name
    /// * `directory` - Source directory relative to the root
    /// * `config_file` - Host path of the descriptor file
    pub fn load<P: AsRef<Path>>(name: &str, directory: &str, config_file: P) -> Result<Self> {
        let config_file = config_file.as_ref();

        if !config_file.is_file() {
            return Err(ConfigureError::ConfigFileNotFound(
                config_file.display().to_string(),
            ));
        }

        let content = fs::read_to_string(config_file)?;
        let mut config = Self::parse(name, directory, &config_file.display().to_string(), &content)?;

        if let Some(parent) = config_file.parent() {
            let resource_file = parent.join(RESOURCE_FILE_NAME);
            if resource_file.is_file() {
                config.resource_file = Some(resource_file);
            }
        }

        tracing::debug!("Loaded config {} ({}) from {}", config.name, config.kind, config_file.display());

        Ok(config)
    }

    /// Parse descriptor text; `source` only names the input in errors
    pub fn parse(name: &str, directory: &str, source: &str, content: &str) -> Result<Self> {
        let mut config = ConfigDescriptor::new(name, directory);

        let mut defines = BTreeSet::new();
        let mut excludes = BTreeSet::new();
        let mut includes_nasm = BTreeSet::new();

        let mut lines = content.lines().map(str::trim);
        while let Some(line) = lines.next() {
            match line {
                "" => {}
                "[APPLICATION]" => config.kind = ProjectKind::Application,
                "[CODER]" => config.kind = ProjectKind::Coder,
                "[CODER_REFERENCES]" => config.coder_references.extend(read_lines(&mut lines)),
                "[DEFINES]" => defines.extend(read_lines(&mut lines)),
                "[DEMO]" => config.kind = ProjectKind::Demo,
                "[DIRECTORY]" => {
                    config.directory = paths::as_directory(lines.next().unwrap_or_default())
                }
                "[DISABLED_ARM64]" => config.disabled_for_arm64 = true,
                "[DYNAMIC_DEFINES]" => config.dynamic_defines.extend(read_lines(&mut lines)),
                "[DYNAMIC_LIBRARY]" => config.kind = ProjectKind::DynamicLibrary,
                "[EXCLUDES]" => excludes.extend(read_lines(&mut lines)),
                "[EXCLUDES_ARM64]" => config.excludes_arm64.extend(read_lines(&mut lines)),
                "[EXCLUDES_X64]" => config.excludes_x64.extend(read_lines(&mut lines)),
                "[EXCLUDES_X86]" => config.excludes_x86.extend(read_lines(&mut lines)),
                "[FILTER]" => config.kind = ProjectKind::Filter,
                "[FUZZ]" => config.kind = ProjectKind::Fuzz,
                "[INCLUDES]" => config.includes.extend(read_includes(&mut lines)),
                "[INCLUDES_NASM]" => includes_nasm.extend(read_includes(&mut lines)),
                "[INCLUDES_NASM_X64]" => config.includes_nasm_x64.extend(read_includes(&mut lines)),
                "[INCLUDES_NASM_X86]" => config.includes_nasm_x86.extend(read_includes(&mut lines)),
                "[INCLUDE_ARTIFACTS]" => {
                    for artifact in read_lines(&mut lines) {
                        config.add_include_artifact(&artifact)?;
                    }
                }
                "[INCOMPATIBLE_LICENSE]" => config.has_incompatible_license = true,
                "[LICENSE]" => config.licenses.extend(read_lines(&mut lines)),
                "[MAGICK_BASECONFIG_DEFINE]" => {
                    for define in read_lines(&mut lines) {
                        config.magick_baseconfig_define.push_str(&define);
                        config.magick_baseconfig_define.push('\n');
                    }
                }
                "[MAGICK_PROJECT]" => config.is_magick_project = true,
                "[MODULE_DEFINITION_FILE]" => {
                    let file = lines.next().unwrap_or_default();
                    config.module_definition_file = (!file.is_empty()).then(|| file.to_string());
                }
                "[NASM]" => config.use_nasm = true,
                "[ONLY_IMAGEMAGICK7]" => config.is_imagemagick7_only = true,
                "[OPENCL]" => config.use_opencl = true,
                "[OPTIONAL]" => config.is_optional = true,
                "[REFERENCES]" => config.references.extend(read_lines(&mut lines)),
                "[STATIC_DEFINES]" => config.static_defines.extend(read_lines(&mut lines)),
                "[STATIC_LIBRARY]" => config.kind = ProjectKind::StaticLibrary,
                "[UNICODE]" => config.use_unicode = true,
                other if SECTION_TAG.is_match(other) => {
                    return Err(ConfigureError::UnknownSection {
                        file: source.to_string(),
                        section: other.to_string(),
                    });
                }
                other => {
                    return Err(ConfigureError::UnexpectedLine {
                        file: source.to_string(),
                        line: other.to_string(),
                    });
                }
            }
        }

        config.dynamic_defines.extend(defines.iter().cloned());
        config.static_defines.extend(defines);

        config.excludes_arm64.extend(excludes.iter().cloned());
        config.excludes_x64.extend(excludes.iter().cloned());
        config.excludes_x86.extend(excludes);

        config.includes_nasm_x64.extend(includes_nasm.iter().cloned());
        config.includes_nasm_x86.extend(includes_nasm);

        Ok(config)
    }

    fn add_include_artifact(&mut self, artifact: &str) -> Result<()> {
        let (source, target) = artifact
            .split_once(" -> ")
            .ok_or_else(|| ConfigureError::InvalidIncludeArtifact(artifact.to_string()))?;

        let source = format!("{}{}", self.directory, source);
        let target = if target == "." { String::new() } else { target.to_string() };
        self.include_artifacts.insert(source, target);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn kind(&self) -> ProjectKind {
        self.kind
    }

    pub fn coder_references(&self) -> &BTreeSet<String> {
        &self.coder_references
    }

    pub fn disabled_for_arm64(&self) -> bool {
        self.disabled_for_arm64
    }

    pub fn dynamic_defines(&self) -> &BTreeSet<String> {
        &self.dynamic_defines
    }

    pub fn static_defines(&self) -> &BTreeSet<String> {
        &self.static_defines
    }

    /// Exclusion prefixes for `architecture`
    pub fn excludes(&self, architecture: Architecture) -> &BTreeSet<String> {
        match architecture {
            Architecture::Arm64 => &self.excludes_arm64,
            Architecture::X64 => &self.excludes_x64,
            Architecture::X86 => &self.excludes_x86,
        }
    }

    /// Assembler include paths; NASM has no Arm64 target
    pub fn nasm_includes(&self, architecture: Architecture) -> Result<&BTreeSet<String>> {
        match architecture {
            Architecture::X64 => Ok(&self.includes_nasm_x64),
            Architecture::X86 => Ok(&self.includes_nasm_x86),
            Architecture::Arm64 => Err(ConfigureError::UnsupportedArchitecture(format!(
                "NASM is not supported for {} ({})",
                architecture, self.name
            ))),
        }
    }

    pub fn has_incompatible_license(&self) -> bool {
        self.has_incompatible_license
    }

    pub fn includes(&self) -> &BTreeSet<String> {
        &self.includes
    }

    /// Header re-export map: source path (root relative) to artifact subdirectory
    pub fn include_artifacts(&self) -> &BTreeMap<String, String> {
        &self.include_artifacts
    }

    pub fn is_imagemagick7_only(&self) -> bool {
        self.is_imagemagick7_only
    }

    pub fn is_library(&self) -> bool {
        matches!(self.kind, ProjectKind::DynamicLibrary | ProjectKind::StaticLibrary)
    }

    pub fn is_magick_project(&self) -> bool {
        self.is_magick_project
    }

    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    pub fn licenses(&self) -> &BTreeSet<String> {
        &self.licenses
    }

    pub fn magick_baseconfig_define(&self) -> &str {
        &self.magick_baseconfig_define
    }

    pub fn module_definition_file(&self) -> Option<&str> {
        self.module_definition_file.as_deref()
    }

    pub fn references(&self) -> &BTreeSet<String> {
        &self.references
    }

    pub fn resource_file(&self) -> Option<&Path> {
        self.resource_file.as_deref()
    }

    pub fn use_nasm(&self) -> bool {
        self.use_nasm
    }

    pub fn use_opencl(&self) -> bool {
        self.use_opencl
    }

    pub fn use_unicode(&self) -> bool {
        self.use_unicode
    }

    /// Copy of this descriptor with `other`'s defines and references unioned in
    pub fn merged_with(&self, other: &ConfigDescriptor) -> ConfigDescriptor {
        let mut merged = self.clone();
        merged.dynamic_defines.extend(other.dynamic_defines.iter().cloned());
        merged.static_defines.extend(other.static_defines.iter().cloned());
        merged.references.extend(other.references.iter().cloned());
        merged.coder_references.extend(other.coder_references.iter().cloned());
        merged
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Returns true when the reference was present
    pub fn remove_reference(&mut self, name: &str) -> bool {
        self.references.remove(name)
    }

    /// Apply the legacy (major version 6) library names
    pub fn update_for_imagemagick6(&mut self) {
        if self.name == "MagickCore" {
            self.name = "magick".to_string();
        }

        if self.references.remove("MagickCore") {
            self.references.insert("magick".to_string());
        }

        if self.references.remove("MagickWand") {
            self.references.insert("wand".to_string());
        }
    }
}

fn read_lines<'a, I>(lines: &mut I) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    lines
        .take_while(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_includes<'a, I>(lines: &mut I) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    read_lines(lines)
        .into_iter()
        .map(|include| if include == "." { String::new() } else { include })
        .collect()
}
