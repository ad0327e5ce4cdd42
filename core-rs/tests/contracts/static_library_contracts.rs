// Static Library Contract Tests
//
// Link mode decides configuration type, preprocessor defines, and whether
// a project gets a librarian or a linker section. Mixing the two produces
// objects that compile but fail to link.

use configure_core::emit;
use configure_core::project::ConfigurationType;
use configure_core::{BuildOptions, ConfigDescriptor, ConfigureError, ProjectModel};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ZLIB_CONFIG: &str = "[DYNAMIC_LIBRARY]\n\n[DYNAMIC_DEFINES]\nZLIB_DLL\n\n[STATIC_DEFINES]\nZLIB_STATIC\n\n[DEFINES]\nHAVE_STDARG_H\n";

fn source(root: &Path, directory: &str) {
    fs::create_dir_all(root.join(directory)).unwrap();
    fs::write(root.join(directory).join("main.c"), "").unwrap();
}

fn descriptor(name: &str, content: &str) -> ConfigDescriptor {
    ConfigDescriptor::parse(name, name, "Config.txt", content).unwrap()
}

/// WHY: Static builds compile every library with the static define set
/// RULE: `_LIB` plus static defines, never a dynamic define
#[test]
fn static_build_uses_static_defines_only() {
    let temp_dir = TempDir::new().unwrap();
    source(temp_dir.path(), "zlib");
    let mut options = BuildOptions::new(temp_dir.path());
    options.is_static_build = true;
    let config = descriptor("zlib", ZLIB_CONFIG);

    let project = ProjectModel::create(&config, &options).unwrap();
    let defines = project.defines();

    assert_eq!(defines[0], "_WIN32_WINNT=0x0601");
    assert!(defines.contains(&"_LIB".to_string()));
    assert!(defines.contains(&"ZLIB_STATIC".to_string()));
    assert!(defines.contains(&"HAVE_STDARG_H".to_string()));
    assert!(!defines.contains(&"ZLIB_DLL".to_string()));
    assert_eq!(project.configuration_type(), ConfigurationType::StaticLibrary);
}

/// WHY: Dynamic builds export symbols through the dynamic define set
#[test]
fn dynamic_build_uses_dynamic_defines_only() {
    let temp_dir = TempDir::new().unwrap();
    source(temp_dir.path(), "zlib");
    let options = BuildOptions::new(temp_dir.path());
    let config = descriptor("zlib", ZLIB_CONFIG);

    let project = ProjectModel::create(&config, &options).unwrap();
    let defines = project.defines();

    assert!(defines.contains(&"ZLIB_DLL".to_string()));
    assert!(defines.contains(&"HAVE_STDARG_H".to_string()));
    assert!(!defines.contains(&"_LIB".to_string()));
    assert!(!defines.contains(&"ZLIB_STATIC".to_string()));
    assert_eq!(project.configuration_type(), ConfigurationType::DynamicLibrary);
}

/// WHY: A static-only module stays static in a dynamic build
#[test]
fn static_library_kind_is_static_in_dynamic_build() {
    let temp_dir = TempDir::new().unwrap();
    source(temp_dir.path(), "lzma");
    let options = BuildOptions::new(temp_dir.path());
    let config = descriptor("lzma", "[STATIC_LIBRARY]\n\n[STATIC_DEFINES]\nLZMA_API_STATIC\n");

    let project = ProjectModel::create(&config, &options).unwrap();

    assert!(project.is_static());
    assert!(project.uses_lib_properties());
    assert!(project.defines().contains(&"_LIB".to_string()));

    let content = emit::project::render(&project, std::slice::from_ref(&project)).unwrap();
    assert!(content.contains("<ConfigurationType>StaticLibrary</ConfigurationType>"));
    assert!(content.contains("<Lib>"));
    assert!(!content.contains("<Link>"));
}

/// WHY: The writer refuses a static library with references even when the
///      descriptor never went through set validation
#[test]
fn writing_static_library_with_references_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    source(temp_dir.path(), "png");
    let options = BuildOptions::new(temp_dir.path());
    let config = descriptor("png", "[STATIC_LIBRARY]\n\n[REFERENCES]\nzlib\n");
    let project = ProjectModel::create(&config, &options).unwrap();

    let err = emit::project::write(&project, std::slice::from_ref(&project)).unwrap_err();
    assert!(matches!(err, ConfigureError::StaticLibraryReferences(name) if name == "png"));
    assert!(!temp_dir.path().join("ProjectFiles").exists());
}

/// WHY: Executables link statically in a static build but stay applications
#[test]
fn applications_keep_their_type_in_static_build() {
    let temp_dir = TempDir::new().unwrap();
    source(temp_dir.path(), "utilities");
    let mut options = BuildOptions::new(temp_dir.path());
    options.is_static_build = true;
    let config = descriptor("utilities", "[APPLICATION]\n");

    let project = ProjectModel::create(&config, &options).unwrap();

    assert_eq!(project.configuration_type(), ConfigurationType::Application);
    assert!(!project.uses_lib_properties());
    assert!(project.defines().contains(&"_LIB".to_string()));
}
