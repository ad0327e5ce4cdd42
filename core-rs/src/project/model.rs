/**
 * model.rs
 * One buildable project derived from a descriptor and the build options
 *
 * Every property the project writer needs is computed here from the
 * descriptor copy, the discovered file set, and the shared options. Nothing
 * in this module writes to disk.
 */

use std::collections::BTreeSet;

use crate::config::{ConfigDescriptor, ProjectKind};
use crate::emit::guid::create_guid;
use crate::errors::{ConfigureError, Result};
use crate::options::{Architecture, BuildOptions, VisualStudioVersion};
use crate::paths;

use super::files;

/// Baseline define every project targets
pub const WINDOWS_TARGET_DEFINE: &str = "_WIN32_WINNT=0x0601";

/// Define added to every statically linked project
pub const STATIC_LINKAGE_DEFINE: &str = "_LIB";

/// Accelerator API headers shipped with the configure tree
pub const OPENCL_INCLUDE_DIRECTORY: &str = "Configure\\OpenCL";

/// Output kind of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationType {
    Application,
    StaticLibrary,
    DynamicLibrary,
}

impl ConfigurationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigurationType::Application => "Application",
            ConfigurationType::StaticLibrary => "StaticLibrary",
            ConfigurationType::DynamicLibrary => "DynamicLibrary",
        }
    }
}

/// Language the compiler is told to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compiler {
    Default,
    Cpp,
}

/// A project derived from one descriptor
///
/// The descriptor is a private copy: renaming or merging into one project
/// never affects a sibling derived from the same descriptor.
#[derive(Debug, Clone)]
pub struct ProjectModel<'a> {
    config: ConfigDescriptor,
    files: BTreeSet<String>,
    options: &'a BuildOptions,
}

impl<'a> ProjectModel<'a> {
    /// Create a project and discover its source files
    ///
    /// # Arguments
    /// * `config` - Descriptor to copy
    /// * `options` - Shared build options
    pub fn create(config: &ConfigDescriptor, options: &'a BuildOptions) -> Result<Self> {
        if config.kind() == ProjectKind::Undefined {
            return Err(ConfigureError::UnsupportedProjectKind(config.name().to_string()));
        }

        let mut project = ProjectModel {
            config: config.clone(),
            files: BTreeSet::new(),
            options,
        };
        project.load_files()?;

        tracing::debug!("Created project {} with {} file(s)", project.full_name(), project.files.len());

        Ok(project)
    }

    fn load_files(&mut self) -> Result<()> {
        let base = self.options.resolve(self.config.directory());
        let excludes = self.config.excludes(self.options.architecture);
        self.files = files::discover(&base, excludes, self.config.name())?;
        Ok(())
    }

    pub fn config(&self) -> &ConfigDescriptor {
        &self.config
    }

    pub fn options(&self) -> &'a BuildOptions {
        self.options
    }

    /// Source files relative to the project directory
    pub fn files(&self) -> &BTreeSet<String> {
        &self.files
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn kind(&self) -> ProjectKind {
        self.config.kind()
    }

    pub fn directory(&self) -> &str {
        self.config.directory()
    }

    pub fn references(&self) -> &BTreeSet<String> {
        self.config.references()
    }

    pub fn is_library(&self) -> bool {
        self.config.is_library()
    }

    /// Final executables: applications, demos, and fuzz targets
    pub fn is_application(&self) -> bool {
        matches!(
            self.kind(),
            ProjectKind::Application | ProjectKind::Demo | ProjectKind::Fuzz
        )
    }

    /// Whether the project links statically, by option or by kind
    pub fn is_static(&self) -> bool {
        self.options.is_static_build || self.kind() == ProjectKind::StaticLibrary
    }

    /// Whether the project is split into one project per source file
    pub fn fans_out(&self) -> bool {
        match self.kind() {
            ProjectKind::Demo | ProjectKind::Fuzz => true,
            ProjectKind::Coder | ProjectKind::Filter => !self.options.is_static_build,
            _ => false,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self.kind() {
            ProjectKind::Application => "APP",
            ProjectKind::Coder if self.options.is_static_build => "CORE",
            ProjectKind::Coder => "IM_MOD",
            ProjectKind::DynamicLibrary => "CORE",
            ProjectKind::Demo => "DEMO",
            ProjectKind::Filter if self.options.is_static_build => "CORE",
            ProjectKind::Filter => "FILTER",
            ProjectKind::Fuzz => "FUZZ",
            ProjectKind::StaticLibrary => "CORE",
            ProjectKind::Undefined => unreachable!("undefined kinds are rejected by ProjectModel::create"),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}_{}", self.prefix(), self.name())
    }

    pub fn guid(&self) -> String {
        create_guid(&self.full_name())
    }

    /// Project file path relative to the root
    pub fn file_name(&self) -> String {
        let full_name = self.full_name();
        format!(
            "{}{}\\{}.vcxproj",
            self.options.projects_directory(),
            full_name,
            full_name
        )
    }

    pub fn configuration_type(&self) -> ConfigurationType {
        if self.is_application() {
            ConfigurationType::Application
        } else if self.is_static() {
            ConfigurationType::StaticLibrary
        } else {
            ConfigurationType::DynamicLibrary
        }
    }

    pub fn character_set(&self) -> &'static str {
        if self.config.use_unicode() {
            "Unicode"
        } else {
            "MultiByte"
        }
    }

    pub fn compiler(&self) -> Compiler {
        if self.config.is_magick_project()
            && self.options.visual_studio_version >= VisualStudioVersion::VS2022
        {
            Compiler::Cpp
        } else {
            Compiler::Default
        }
    }

    pub fn platform_toolset(&self) -> &'static str {
        match self.options.visual_studio_version {
            VisualStudioVersion::VS2022 => "v143",
            VisualStudioVersion::VS2019 => "v142",
            VisualStudioVersion::VS2017 => "v141",
        }
    }

    pub fn defines(&self) -> Vec<String> {
        let mut defines = vec![WINDOWS_TARGET_DEFINE.to_string()];

        if self.is_static() {
            defines.push(STATIC_LINKAGE_DEFINE.to_string());
            defines.extend(self.config.static_defines().iter().cloned());
        } else {
            defines.extend(self.config.dynamic_defines().iter().cloned());
        }

        defines
    }

    /// Include directories relative to the root
    pub fn include_directories(&self) -> Vec<String> {
        let mut directories = Vec::new();

        if self.config.includes().is_empty() {
            directories.push(self.directory().to_string());
        }

        for include in self.config.includes() {
            match include.strip_prefix(paths::SEPARATOR) {
                Some(from_root) => directories.push(from_root.to_string()),
                None => directories.push(format!("{}{}", self.directory(), include)),
            }
        }

        for reference in self.references() {
            directories.push(format!("Artifacts\\include\\{}", reference));
        }

        if self.options.use_opencl && self.config.use_opencl() {
            directories.push(OPENCL_INCLUDE_DIRECTORY.to_string());
        }

        directories
    }

    /// Import libraries for one build configuration
    pub fn additional_dependencies(&self, debug: bool) -> Vec<String> {
        let core_prefix = if debug { "CORE_DB_" } else { "CORE_RL_" };
        let mut dependencies: Vec<String> = self
            .references()
            .iter()
            .map(|reference| format!("{}{}_.lib", core_prefix, reference))
            .collect();

        if !self.options.is_static_build {
            let module_prefix = if debug { "IM_MOD_DB_" } else { "IM_MOD_RL_" };
            dependencies.extend(
                self.config
                    .coder_references()
                    .iter()
                    .map(|reference| format!("{}{}_.lib", module_prefix, reference)),
            );
        }

        dependencies
    }

    /// Prebuilt libraries linked into the release build of a static application
    pub fn pre_build_libs(&self) -> Vec<&str> {
        if self.options.is_static_build && self.is_application() {
            self.options.pre_build_libs.iter().map(String::as_str).collect()
        } else {
            Vec::new()
        }
    }

    pub fn output_directory(&self) -> &'static str {
        match self.kind() {
            ProjectKind::Application => "bin",
            ProjectKind::Coder | ProjectKind::DynamicLibrary | ProjectKind::Filter => {
                if self.options.is_static_build {
                    "lib"
                } else {
                    "bin"
                }
            }
            ProjectKind::Demo => "demo",
            ProjectKind::Fuzz => "fuzz",
            ProjectKind::StaticLibrary => "lib",
            ProjectKind::Undefined => unreachable!("undefined kinds are rejected by ProjectModel::create"),
        }
    }

    pub fn target_name(&self, debug: bool) -> String {
        if self.kind() == ProjectKind::Application {
            return self.name().to_string();
        }

        format!(
            "{}_{}{}_",
            self.prefix(),
            if debug { "DB_" } else { "RL_" },
            self.name()
        )
    }

    pub fn runtime_library(&self, debug: bool) -> String {
        let base = if debug { "MultiThreadedDebug" } else { "MultiThreaded" };
        if self.options.link_runtime {
            base.to_string()
        } else {
            format!("{}DLL", base)
        }
    }

    pub fn warning_level(&self) -> &'static str {
        if self.treat_warnings_as_errors() {
            "Level4"
        } else {
            "TurnOffAllWarnings"
        }
    }

    pub fn treat_warnings_as_errors(&self) -> bool {
        self.options.is_imagemagick7 && self.config.is_magick_project()
    }

    pub fn open_mp_support(&self) -> bool {
        self.options.use_openmp
    }

    pub fn has_asm_files(&self) -> bool {
        self.files.iter().any(|file| file.ends_with(".asm"))
    }

    /// MASM build customization is needed for plain assembly on Intel targets
    pub fn includes_masm(&self) -> bool {
        self.has_asm_files()
            && !self.config.use_nasm()
            && self.options.architecture != Architecture::Arm64
    }

    /// Librarian settings instead of linker settings
    pub fn uses_lib_properties(&self) -> bool {
        match self.kind() {
            ProjectKind::StaticLibrary => true,
            ProjectKind::DynamicLibrary | ProjectKind::Coder => self.options.is_static_build,
            _ => false,
        }
    }

    /// Assembler command-line options for the NASM custom build step
    pub fn nasm_options(&self) -> Result<String> {
        let includes = self.config.nasm_includes(self.options.architecture)?;

        let mut options = match self.options.architecture {
            Architecture::X64 => String::from(" -fwin64 -DWIN64 -D__x86_64__"),
            _ => String::from(" -fwin32 -DWIN32"),
        };

        for include in includes {
            options.push_str(&format!(" -i\"$(SolutionDir){}{}\"", self.directory(), include));
        }

        options.push_str(" -o \"$(IntDir)%(Filename).obj\" \"%(FullPath)\"");
        Ok(options)
    }

    /// Union another descriptor's defines and references into this project
    pub fn merge_config_info(&mut self, other: &ConfigDescriptor) {
        self.config = self.config.merged_with(other);
    }

    pub fn rename(&mut self, name: &str) {
        self.config.rename(name);
    }

    /// Replace the file set
    pub fn set_files<I, S>(&mut self, files: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
    }

    /// One project per translation unit of this project.
    ///
    /// Each child is renamed to the file path without its extension and owns
    /// exactly that file, its header when one exists on disk, and
    /// `additional_files`.
    pub fn split_to_files(&self, additional_files: &[&str]) -> Vec<ProjectModel<'a>> {
        self.files
            .iter()
            .filter(|file| paths::is_source_file(file))
            .map(|file| {
                let stem = paths::strip_extension(file);

                let mut child = self.clone();
                child.rename(stem);

                let mut files = BTreeSet::new();
                files.insert(file.clone());

                let header = format!("{}.h", stem);
                if self
                    .options
                    .resolve(&paths::join(self.directory(), &header))
                    .is_file()
                {
                    files.insert(header);
                }

                files.extend(additional_files.iter().map(|extra| extra.to_string()));
                child.files = files;
                child
            })
            .collect()
    }
}
