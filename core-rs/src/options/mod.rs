/**
 * options module
 * Process-wide build options for one configure run
 *
 * Defaults come from an `EnvironmentProbe`, then an optional YAML options
 * file, then command-line flags. Once built the options are only ever passed
 * around by shared reference.
 */

pub mod probe;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::{ConfigureError, Result};
use crate::paths;

pub use probe::{EnvironmentProbe, FixedProbe, HostProbe};

/// Relative location of the optional pre-build library list
pub const PRE_BUILD_LIBS_FILE: &str = "Artifacts\\pre-build-libs.txt";

/// Target architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    X86,
    X64,
    Arm64,
}

/// Pixel quantum depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantumDepth {
    Q8,
    Q16,
    Q32,
    Q64,
}

/// Security policy profile copied next to the binaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyConfig {
    Limited,
    Open,
    Secure,
    WebSafe,
}

/// Toolchain tier, ordered oldest to newest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualStudioVersion {
    VS2017,
    VS2019,
    VS2022,
}

impl VisualStudioVersion {
    pub const LATEST: VisualStudioVersion = VisualStudioVersion::VS2022;
}

impl Architecture {
    pub fn name(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Architecture {
    type Err = ConfigureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "x86" => Ok(Architecture::X86),
            "x64" => Ok(Architecture::X64),
            "arm64" => Ok(Architecture::Arm64),
            _ => Err(ConfigureError::InvalidOption(format!("architecture '{}'", s))),
        }
    }
}

impl FromStr for QuantumDepth {
    type Err = ConfigureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().trim_start_matches('Q') {
            "8" => Ok(QuantumDepth::Q8),
            "16" => Ok(QuantumDepth::Q16),
            "32" => Ok(QuantumDepth::Q32),
            "64" => Ok(QuantumDepth::Q64),
            _ => Err(ConfigureError::InvalidOption(format!("quantum depth '{}'", s))),
        }
    }
}

impl FromStr for PolicyConfig {
    type Err = ConfigureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "limited" => Ok(PolicyConfig::Limited),
            "open" => Ok(PolicyConfig::Open),
            "secure" => Ok(PolicyConfig::Secure),
            "websafe" => Ok(PolicyConfig::WebSafe),
            _ => Err(ConfigureError::InvalidOption(format!("policy '{}'", s))),
        }
    }
}

impl FromStr for VisualStudioVersion {
    type Err = ConfigureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().trim_start_matches("vs") {
            "2017" => Ok(VisualStudioVersion::VS2017),
            "2019" => Ok(VisualStudioVersion::VS2019),
            "2022" => Ok(VisualStudioVersion::VS2022),
            _ => Err(ConfigureError::InvalidOption(format!("Visual Studio version '{}'", s))),
        }
    }
}

/// Build options shared by every stage of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    pub architecture: Architecture,
    pub enable_dpc: bool,
    pub exclude_deprecated: bool,
    pub include_incompatible_license: bool,
    pub include_optional: bool,
    pub installed_support: bool,
    pub is_static_build: bool,
    pub link_runtime: bool,
    pub only_magick: bool,
    pub policy_config: PolicyConfig,
    pub quantum_depth: QuantumDepth,
    pub root_directory: PathBuf,
    pub use_hdri: bool,
    pub use_opencl: bool,
    pub use_openmp: bool,
    pub is_imagemagick7: bool,
    pub visual_studio_version: VisualStudioVersion,
    pub zero_configuration_support: bool,
    pub pre_build_libs: BTreeSet<String>,
}

impl BuildOptions {
    /// Options with the stock defaults and no environment probing
    pub fn new<P: Into<PathBuf>>(root_directory: P) -> Self {
        BuildOptions {
            architecture: Architecture::X64,
            enable_dpc: true,
            exclude_deprecated: true,
            include_incompatible_license: false,
            include_optional: false,
            installed_support: false,
            is_static_build: false,
            link_runtime: false,
            only_magick: false,
            policy_config: PolicyConfig::Open,
            quantum_depth: QuantumDepth::Q16,
            root_directory: root_directory.into(),
            use_hdri: true,
            use_opencl: true,
            use_openmp: true,
            is_imagemagick7: true,
            visual_studio_version: VisualStudioVersion::LATEST,
            zero_configuration_support: false,
            pre_build_libs: BTreeSet::new(),
        }
    }

    /// Defaults for `root_directory` as seen through `probe`
    ///
    /// Reads the pre-build library list when the root carries one.
    pub fn detect<P: Into<PathBuf>>(root_directory: P, probe: &dyn EnvironmentProbe) -> Result<Self> {
        let mut options = BuildOptions::new(root_directory);
        options.visual_studio_version = probe.visual_studio_version();

        if !probe.is_imagemagick7(&options.root_directory) {
            options.is_imagemagick7 = false;
            options.use_hdri = false;
        }

        options.pre_build_libs = load_pre_build_libs(&options.root_directory)?;

        tracing::debug!(
            "Detected options: vs={:?}, imagemagick7={}, pre-build libs={}",
            options.visual_studio_version,
            options.is_imagemagick7,
            options.pre_build_libs.len()
        );

        Ok(options)
    }

    pub fn architecture_name(&self) -> &'static str {
        self.architecture.name()
    }

    /// MSBuild platform name
    pub fn platform(&self) -> &'static str {
        match self.architecture {
            Architecture::X86 => "Win32",
            Architecture::X64 => "x64",
            Architecture::Arm64 => "ARM64",
        }
    }

    /// Directory (relative to the root) that receives the project files
    pub fn projects_directory(&self) -> String {
        format!("ProjectFiles\\{}\\", self.architecture_name())
    }

    /// Host path for a root-relative path
    pub fn resolve(&self, relative: &str) -> PathBuf {
        paths::to_host(&self.root_directory, relative)
    }
}

/// Partial options, as read from a YAML options file or the command line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OptionOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<Architecture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_dpc: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_incompatible_license: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_optional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_support: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_static_build: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_runtime: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_magick: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_config: Option<PolicyConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantum_depth: Option<QuantumDepth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_hdri: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_opencl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_openmp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_studio_version: Option<VisualStudioVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero_configuration_support: Option<bool>,
}

impl OptionOverrides {
    /// Load overrides from a YAML options file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigureError::ConfigFileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let overrides: OptionOverrides = serde_yaml::from_str(&content)?;
        Ok(overrides)
    }

    /// Overlay `other` on top of these overrides; values set in `other` win
    pub fn merge(self, other: OptionOverrides) -> OptionOverrides {
        OptionOverrides {
            architecture: other.architecture.or(self.architecture),
            enable_dpc: other.enable_dpc.or(self.enable_dpc),
            exclude_deprecated: other.exclude_deprecated.or(self.exclude_deprecated),
            include_incompatible_license: other
                .include_incompatible_license
                .or(self.include_incompatible_license),
            include_optional: other.include_optional.or(self.include_optional),
            installed_support: other.installed_support.or(self.installed_support),
            is_static_build: other.is_static_build.or(self.is_static_build),
            link_runtime: other.link_runtime.or(self.link_runtime),
            only_magick: other.only_magick.or(self.only_magick),
            policy_config: other.policy_config.or(self.policy_config),
            quantum_depth: other.quantum_depth.or(self.quantum_depth),
            use_hdri: other.use_hdri.or(self.use_hdri),
            use_opencl: other.use_opencl.or(self.use_opencl),
            use_openmp: other.use_openmp.or(self.use_openmp),
            visual_studio_version: other.visual_studio_version.or(self.visual_studio_version),
            zero_configuration_support: other
                .zero_configuration_support
                .or(self.zero_configuration_support),
        }
    }

    /// Produce the final options from `base`
    pub fn apply(&self, base: BuildOptions) -> BuildOptions {
        BuildOptions {
            architecture: self.architecture.unwrap_or(base.architecture),
            enable_dpc: self.enable_dpc.unwrap_or(base.enable_dpc),
            exclude_deprecated: self.exclude_deprecated.unwrap_or(base.exclude_deprecated),
            include_incompatible_license: self
                .include_incompatible_license
                .unwrap_or(base.include_incompatible_license),
            include_optional: self.include_optional.unwrap_or(base.include_optional),
            installed_support: self.installed_support.unwrap_or(base.installed_support),
            is_static_build: self.is_static_build.unwrap_or(base.is_static_build),
            link_runtime: self.link_runtime.unwrap_or(base.link_runtime),
            only_magick: self.only_magick.unwrap_or(base.only_magick),
            policy_config: self.policy_config.unwrap_or(base.policy_config),
            quantum_depth: self.quantum_depth.unwrap_or(base.quantum_depth),
            use_hdri: self.use_hdri.unwrap_or(base.use_hdri),
            use_opencl: self.use_opencl.unwrap_or(base.use_opencl),
            use_openmp: self.use_openmp.unwrap_or(base.use_openmp),
            visual_studio_version: self
                .visual_studio_version
                .unwrap_or(base.visual_studio_version),
            zero_configuration_support: self
                .zero_configuration_support
                .unwrap_or(base.zero_configuration_support),
            ..base
        }
    }
}

/// Read `Artifacts\pre-build-libs.txt` (trimmed, non-empty lines)
pub fn load_pre_build_libs(root_directory: &Path) -> Result<BTreeSet<String>> {
    let path = paths::to_host(root_directory, PRE_BUILD_LIBS_FILE);
    if !path.exists() {
        return Ok(BTreeSet::new());
    }

    let content = fs::read_to_string(&path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
