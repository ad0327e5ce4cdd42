//! Integration tests for a complete configure run
//!
//! Each test lays out a root in a temp directory and drives `Configure`
//! end to end:
//! - Descriptor discovery and validation
//! - Project derivation
//! - Project, filters, and solution output

mod common;

use common::Fixture;
use configure_core::{find_root_directory, Configure, ConfigureError};

fn fixture() -> Fixture {
    let fixture = Fixture::new();
    fixture.imagemagick();
    fixture.dependency("zlib", "[DYNAMIC_LIBRARY]\n\n[DYNAMIC_DEFINES]\nZLIB_DLL\n");
    fixture.coder_config("png", "[CODER]\n\n[REFERENCES]\nzlib\n");
    fixture
}

#[test]
fn test_complete_run() {
    let fixture = fixture();
    let configure = Configure::new(fixture.options());

    let summary = configure.run().unwrap();

    assert_eq!(summary.configs, 10);
    assert_eq!(summary.projects, 19);
    assert_eq!(summary.solution, fixture.root().join("IM7.Dynamic.x64.sln"));
    assert!(summary.solution.is_file());

    // Every planned project has its project and filters file on disk
    for project in configure.plan().unwrap() {
        assert!(fixture.exists(&project.project_file), "missing {}", project.project_file);
        assert!(fixture.exists(&format!("{}.filters", project.project_file)));
    }

    let zlib = fixture.read("ProjectFiles\\x64\\CORE_zlib\\CORE_zlib.vcxproj");
    assert!(zlib.contains("<ProjectName>CORE_zlib</ProjectName>"));
    assert!(zlib.contains("ZLIB_DLL"));
    assert!(zlib.contains("<ConfigurationType>DynamicLibrary</ConfigurationType>"));
}

#[test]
fn test_baseconfig_define_is_published() {
    let fixture = fixture();
    Configure::new(fixture.options()).run().unwrap();

    let header = fixture.read("Artifacts\\config\\MagickCore.h");
    assert_eq!(header, "#define MAGICKCORE_TEST 1\n");
    assert!(!fixture.exists("Artifacts\\config\\zlib.h"));
}

#[test]
fn test_applications_reference_libraries_and_plugins() {
    let fixture = fixture();
    Configure::new(fixture.options()).run().unwrap();

    let magick = fixture.read("ProjectFiles\\x64\\APP_magick\\APP_magick.vcxproj");
    assert!(magick.contains("<Name>CORE_MagickCore</Name>"));
    assert!(magick.contains("<Name>CORE_MagickWand</Name>"));
    assert!(magick.contains("<Name>IM_MOD_png</Name>"));
    assert!(magick.contains("<Name>FILTER_analyze</Name>"));
    assert!(magick.contains("<ConfigurationType>Application</ConfigurationType>"));
}

#[test]
fn test_transient_directories_are_cleaned_every_run() {
    let fixture = fixture();
    fixture.touch("Artifacts\\demo\\button.exe");
    fixture.touch("Artifacts\\fuzz\\encoder_fuzzer.exe");
    fixture.touch("Artifacts\\bin\\policy.xml");
    let configure = Configure::new(fixture.options());

    configure.run().unwrap();
    assert!(!fixture.exists("Artifacts\\demo"));
    assert!(!fixture.exists("Artifacts\\fuzz"));
    assert!(fixture.exists("Artifacts\\bin\\policy.xml"));

    configure.run().unwrap();
    assert!(!fixture.exists("Artifacts\\demo"));
}

#[test]
fn test_rerun_is_byte_identical() {
    let fixture = fixture();
    let configure = Configure::new(fixture.options());

    configure.run().unwrap();
    let first_solution = fixture.read("IM7.Dynamic.x64.sln");
    let first_project = fixture.read("ProjectFiles\\x64\\IM_MOD_png\\IM_MOD_png.vcxproj");

    configure.run().unwrap();
    assert_eq!(fixture.read("IM7.Dynamic.x64.sln"), first_solution);
    assert_eq!(
        fixture.read("ProjectFiles\\x64\\IM_MOD_png\\IM_MOD_png.vcxproj"),
        first_project
    );
}

#[test]
fn test_plan_writes_nothing() {
    let fixture = fixture();
    let projects = Configure::new(fixture.options()).plan().unwrap();

    assert_eq!(projects.len(), 19);
    assert_eq!(projects[0].full_name, "CORE_zlib");
    assert!(!fixture.exists("ProjectFiles"));
    assert!(!fixture.exists("IM7.Dynamic.x64.sln"));
}

#[test]
fn test_dangling_include_is_fatal() {
    let fixture = fixture();
    fixture.dependency("lzma", "[STATIC_LIBRARY]\n\n[INCLUDES]\nmissing\n");

    let err = Configure::new(fixture.options()).run().unwrap_err();
    match err {
        ConfigureError::IncludeDirectoryNotFound(path) => assert!(path.ends_with("missing")),
        other => panic!("Expected IncludeDirectoryNotFound, got {:?}", other),
    }
    assert!(!fixture.exists("IM7.Dynamic.x64.sln"));
}

#[test]
fn test_stale_exclude_is_fatal() {
    let fixture = fixture();
    fixture.dependency("lzma", "[STATIC_LIBRARY]\n\n[EXCLUDES]\nremoved.c\n");

    let err = Configure::new(fixture.options()).run().unwrap_err();
    match err {
        ConfigureError::InvalidExcludePath { exclude, project } => {
            assert_eq!(exclude, "removed.c");
            assert_eq!(project, "lzma");
        }
        other => panic!("Expected InvalidExcludePath, got {:?}", other),
    }
}

#[test]
fn test_unknown_section_is_fatal() {
    let fixture = fixture();
    fixture.dependency("lzma", "[STATIC_LIBRARY]\n\n[SHARED_LIBRARY]\n");

    let err = Configure::new(fixture.options()).run().unwrap_err();
    assert!(matches!(
        err,
        ConfigureError::UnknownSection { section, .. } if section == "[SHARED_LIBRARY]"
    ));
}

#[test]
fn test_missing_named_descriptor_is_fatal() {
    let fixture = Fixture::new();
    fixture.touch("ImageMagick\\coders\\png.c");

    let err = Configure::new(fixture.options()).run().unwrap_err();
    assert!(matches!(err, ConfigureError::ProjectDirectoryNotFound(_)));
}

#[test]
fn test_root_is_found_from_configure_directory() {
    let fixture = fixture();
    let configure_directory = fixture.root().join("Configure");

    let root = find_root_directory(&configure_directory).unwrap();
    assert_eq!(root, fixture.root());
}
