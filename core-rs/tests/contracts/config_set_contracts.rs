// Config Set Contract Tests
//
// Loading descriptors resolves the reference graph exactly once and then
// validates it. These tests pin the rules that decide which references
// survive and which descriptors are selected at all.

use configure_core::{Architecture, BuildOptions, ConfigDescriptor, ConfigSet, ConfigureError, ProjectKind};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn dependency(root: &Path, name: &str, config: &str) {
    let directory = root.join("Dependencies").join(name);
    fs::create_dir_all(directory.join(".ImageMagick")).unwrap();
    fs::write(directory.join(format!("{}.c", name)), "").unwrap();
    fs::write(directory.join(".ImageMagick").join("Config.txt"), config).unwrap();
}

fn descriptor(name: &str, content: &str) -> ConfigDescriptor {
    ConfigDescriptor::parse(name, name, "Config.txt", content).unwrap()
}

/// WHY: A reference to a module that is not part of this checkout is dropped,
///      not reported; the static library check runs on what remains
/// BREAKS: Partial checkouts that leave out optional dependencies
#[test]
fn unresolved_reference_of_static_library_is_dropped() {
    let temp_dir = TempDir::new().unwrap();
    dependency(temp_dir.path(), "png", "[STATIC_LIBRARY]\n\n[REFERENCES]\nzlib\n");

    let configs = ConfigSet::load(&BuildOptions::new(temp_dir.path())).unwrap();

    let png = configs.get("png").unwrap();
    assert!(png.references().is_empty());
}

/// WHY: Static libraries never link anything themselves
/// BREAKS: Link order in the consuming projects
#[test]
fn static_library_with_resolved_reference_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    dependency(temp_dir.path(), "png", "[STATIC_LIBRARY]\n\n[REFERENCES]\nzlib\n");
    dependency(temp_dir.path(), "zlib", "[STATIC_LIBRARY]\n");

    let err = ConfigSet::load(&BuildOptions::new(temp_dir.path())).unwrap_err();
    assert!(matches!(err, ConfigureError::StaticLibraryReferences(name) if name == "png"));
}

/// WHY: Published headers satisfy a reference without a descriptor
#[test]
fn artifact_include_directory_satisfies_reference() {
    let temp_dir = TempDir::new().unwrap();
    dependency(temp_dir.path(), "tiff", "[DYNAMIC_LIBRARY]\n\n[REFERENCES]\nzlib\njpeg\n");
    fs::create_dir_all(temp_dir.path().join("Artifacts").join("include").join("zlib")).unwrap();

    let configs = ConfigSet::load(&BuildOptions::new(temp_dir.path())).unwrap();

    let tiff = configs.get("tiff").unwrap();
    assert!(tiff.references().contains("zlib"));
    assert!(!tiff.references().contains("jpeg"));
}

/// WHY: A module referencing itself would reference its own project
#[test]
fn self_reference_is_dropped() {
    let temp_dir = TempDir::new().unwrap();
    dependency(temp_dir.path(), "zlib", "[DYNAMIC_LIBRARY]\n\n[REFERENCES]\nzlib\n");

    let configs = ConfigSet::load(&BuildOptions::new(temp_dir.path())).unwrap();
    assert!(configs.get("zlib").unwrap().references().is_empty());
}

/// WHY: Include directories are checked before any project is written
#[test]
fn dangling_include_directory_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    dependency(temp_dir.path(), "zlib", "[DYNAMIC_LIBRARY]\n\n[INCLUDES]\ninclude\n");

    let err = ConfigSet::load(&BuildOptions::new(temp_dir.path())).unwrap_err();
    assert!(matches!(err, ConfigureError::IncludeDirectoryNotFound(_)));

    fs::create_dir_all(temp_dir.path().join("Dependencies").join("zlib").join("include")).unwrap();
    assert!(ConfigSet::load(&BuildOptions::new(temp_dir.path())).is_ok());
}

/// WHY: Selection flags decide which modules exist for a run
/// RULES: optional, incompatible license, disabled on Arm64
#[test]
fn selection_follows_options() {
    let temp_dir = TempDir::new().unwrap();
    dependency(temp_dir.path(), "zlib", "[STATIC_LIBRARY]\n");
    dependency(temp_dir.path(), "jxl", "[STATIC_LIBRARY]\n\n[OPTIONAL]\n");
    dependency(temp_dir.path(), "raw", "[STATIC_LIBRARY]\n\n[INCOMPATIBLE_LICENSE]\n");
    dependency(temp_dir.path(), "simd", "[STATIC_LIBRARY]\n\n[DISABLED_ARM64]\n");

    let mut options = BuildOptions::new(temp_dir.path());
    let configs = ConfigSet::load(&options).unwrap();
    let names: Vec<&str> = configs.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["simd", "zlib"]);

    options.include_optional = true;
    options.include_incompatible_license = true;
    options.architecture = Architecture::Arm64;
    let configs = ConfigSet::load(&options).unwrap();
    let names: Vec<&str> = configs.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["jxl", "raw", "zlib"]);
}

/// WHY: Discovery order is directory order, independent of the file system
#[test]
fn discovery_order_is_sorted() {
    let temp_dir = TempDir::new().unwrap();
    for name in ["zlib", "bzlib", "lzma"] {
        dependency(temp_dir.path(), name, "[STATIC_LIBRARY]\n");
    }

    let configs = ConfigSet::load(&BuildOptions::new(temp_dir.path())).unwrap();
    let names: Vec<&str> = configs.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["bzlib", "lzma", "zlib"]);
}

/// WHY: Every dependency directory must carry a descriptor
#[test]
fn dependency_without_descriptor_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("Dependencies").join("zlib")).unwrap();

    let err = ConfigSet::load(&BuildOptions::new(temp_dir.path())).unwrap_err();
    assert!(matches!(err, ConfigureError::ConfigFileNotFound(_)));
}

/// WHY: Cleanup runs once per load; running it again must find nothing left
/// BREAKS: Reference sets that shrink depending on how often a caller resolves
#[test]
fn reference_cleanup_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("Artifacts").join("include").join("published")).unwrap();
    let options = BuildOptions::new(temp_dir.path());

    let mut configs = ConfigSet::from_configs(vec![
        descriptor("tiff", "[DYNAMIC_LIBRARY]\n\n[REFERENCES]\nzlib\npublished\nmissing\ntiff\n"),
        descriptor("zlib", "[DYNAMIC_LIBRARY]\n\n[REFERENCES]\ngone\n"),
    ])
    .unwrap();

    assert_eq!(configs.remove_invalid_references(&options), 3);
    let after_first: Vec<_> = configs.iter().map(|c| c.references().clone()).collect();

    assert_eq!(configs.remove_invalid_references(&options), 0);
    let after_second: Vec<_> = configs.iter().map(|c| c.references().clone()).collect();

    assert_eq!(after_first, after_second);
    assert_eq!(after_second[0].len(), 2);
    assert!(after_second[1].is_empty());
}

/// WHY: A plugin descriptor is named after the library it wraps
/// BREAKS: Plugins losing the reference to their own library
#[test]
fn coder_config_shares_name_with_library() {
    let temp_dir = TempDir::new().unwrap();
    let options = BuildOptions::new(temp_dir.path());

    let mut configs = ConfigSet::from_configs(vec![
        descriptor("png", "[DYNAMIC_LIBRARY]\n"),
        descriptor("png", "[CODER]\n\n[REFERENCES]\npng\n"),
    ])
    .unwrap();

    assert_eq!(configs.remove_invalid_references(&options), 0);
    assert_eq!(configs.len(), 2);
    let coder = configs.get_kind("png", ProjectKind::Coder).unwrap();
    assert!(coder.references().contains("png"));
    assert!(configs.validate(&options).is_ok());
}

/// WHY: Within one scope a name still identifies exactly one descriptor
#[test]
fn duplicate_library_name_is_fatal() {
    let err = ConfigSet::from_configs(vec![
        descriptor("zlib", "[STATIC_LIBRARY]\n"),
        descriptor("zlib", "[DYNAMIC_LIBRARY]\n"),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigureError::DuplicateConfig(name) if name == "zlib"));
}
