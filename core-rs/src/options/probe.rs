//! Environment probing behind a trait, so option defaults can be injected.

use std::env;
use std::path::{Path, PathBuf};

use super::VisualStudioVersion;
use crate::paths;

/// Source of the host-dependent option defaults
pub trait EnvironmentProbe {
    /// Newest installed toolchain tier
    fn visual_studio_version(&self) -> VisualStudioVersion;

    /// Whether the product tree under `root` is the newer major version
    fn is_imagemagick7(&self, root: &Path) -> bool;
}

/// Probes the real host: program-files directories and the product tree
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProbe;

impl HostProbe {
    fn has_visual_studio_directory(year: &str) -> bool {
        ["ProgramW6432", "ProgramFiles(x86)"].iter().any(|variable| {
            env::var_os(variable)
                .map(|base| {
                    PathBuf::from(base)
                        .join("Microsoft Visual Studio")
                        .join(year)
                        .exists()
                })
                .unwrap_or(false)
        })
    }
}

impl EnvironmentProbe for HostProbe {
    fn visual_studio_version(&self) -> VisualStudioVersion {
        if Self::has_visual_studio_directory("2022") {
            VisualStudioVersion::VS2022
        } else if Self::has_visual_studio_directory("2019") {
            VisualStudioVersion::VS2019
        } else if Self::has_visual_studio_directory("2017") {
            VisualStudioVersion::VS2017
        } else {
            VisualStudioVersion::LATEST
        }
    }

    fn is_imagemagick7(&self, root: &Path) -> bool {
        // The legacy tree keeps its core library in ImageMagick\magick
        !paths::to_host(root, "ImageMagick\\magick").exists()
    }
}

/// Fixed answers, for tests and reproducible runs
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe {
    pub visual_studio_version: VisualStudioVersion,
    pub is_imagemagick7: bool,
}

impl Default for FixedProbe {
    fn default() -> Self {
        FixedProbe {
            visual_studio_version: VisualStudioVersion::LATEST,
            is_imagemagick7: true,
        }
    }
}

impl EnvironmentProbe for FixedProbe {
    fn visual_studio_version(&self) -> VisualStudioVersion {
        self.visual_studio_version
    }

    fn is_imagemagick7(&self, _root: &Path) -> bool {
        self.is_imagemagick7
    }
}
