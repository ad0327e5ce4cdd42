//! # configure-rs
//!
//! Generates Visual Studio project files (`.vcxproj`, `.vcxproj.filters`) and
//! a solution (`.sln`) for a large multi-module native suite, driven by one
//! small sectioned `Config.txt` descriptor per module.
//!
//! ## Pipeline
//!
//! ```text
//! BuildOptions ──► ConfigSet::load ──► ProjectSet::create ──► emit::write_projects
//!                                                        └──► emit::solution::write
//! ```
//!
//! Build options are fixed before the run starts and shared by reference
//! with every stage. Everything is synchronous and single threaded.
//!
//! ## Layout of a root
//!
//! ```text
//! <root>\Configure\Configs\<name>\Config.txt     named descriptors
//! <root>\Configure\Configs\coders\*.txt          one descriptor per coder
//! <root>\Dependencies\<dir>\.ImageMagick\Config.txt
//! <root>\Artifacts\include\<name>\               published headers
//! <root>\ProjectFiles\<arch>\<project>\          generated projects
//! ```

pub mod config;
pub mod emit;
pub mod errors;
pub mod logging;
pub mod options;
pub mod paths;
pub mod pipeline;
pub mod project;

pub use config::{ConfigDescriptor, ConfigSet, ProjectKind};
pub use emit::create_guid;
pub use errors::ConfigureError;
pub use options::{
    Architecture, BuildOptions, EnvironmentProbe, FixedProbe, HostProbe, OptionOverrides, PolicyConfig,
    QuantumDepth, VisualStudioVersion,
};
pub use pipeline::{find_root_directory, Configure, ProjectSummary, RunSummary};
pub use project::{ProjectModel, ProjectSet};

/// Version of the generator
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
