//! Error types for configure-rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigureError {
    #[error("Unable to open config file: {0}")]
    ConfigFileNotFound(String),

    #[error("Cannot find project directory: {0}")]
    ProjectDirectoryNotFound(String),

    #[error("Cannot find coders directory: {0}")]
    CodersDirectoryNotFound(String),

    #[error("Cannot find root directory: {0}")]
    RootDirectoryNotFound(String),

    #[error("Unknown section in config file {file}: {section}")]
    UnknownSection { file: String, section: String },

    #[error("Unexpected line outside of a section in config file {file}: {line}")]
    UnexpectedLine { file: String, line: String },

    #[error("Invalid include artifact: {0}")]
    InvalidIncludeArtifact(String),

    #[error("Invalid exclude path {exclude} in {project}")]
    InvalidExcludePath { exclude: String, project: String },

    #[error("Include directory does not exist: {0}")]
    IncludeDirectoryNotFound(String),

    #[error("A static library should have no references: {0}")]
    StaticLibraryReferences(String),

    #[error("Duplicate config name: {0}")]
    DuplicateConfig(String),

    #[error("Unsupported project type for {0}")]
    UnsupportedProjectKind(String),

    #[error("Unsupported architecture: {0}")]
    UnsupportedArchitecture(String),

    #[error("Invalid option value: {0}")]
    InvalidOption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write file {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<std::fmt::Error> for ConfigureError {
    fn from(err: std::fmt::Error) -> Self {
        ConfigureError::Io(std::io::Error::new(std::io::ErrorKind::Other, err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigureError>;
