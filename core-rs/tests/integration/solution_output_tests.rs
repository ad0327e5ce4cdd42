//! Integration tests for the generated solution file

mod common;

use common::Fixture;
use configure_core::emit::solution;
use configure_core::{create_guid, Architecture, ConfigSet, Configure, ProjectSet, VisualStudioVersion};

fn fixture() -> Fixture {
    let fixture = Fixture::new();
    fixture.imagemagick();
    fixture.dependency("zlib", "[STATIC_LIBRARY]\n");
    fixture
}

#[test]
fn test_solution_lists_every_project_once() {
    let fixture = fixture();
    let options = fixture.options();
    let configs = ConfigSet::load(&options).unwrap();
    let projects = ProjectSet::create(&options, &configs).unwrap();

    let content = solution::render(&options, projects.projects()).unwrap();

    for project in &projects {
        let entry = format!(
            "Project(\"{{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}}\") = \"{}\", \"{}\", \"{{{}}}\"",
            project.full_name(),
            project.file_name(),
            project.guid()
        );
        assert_eq!(content.matches(&entry).count(), 1, "{}", entry);
    }
}

#[test]
fn test_projects_are_nested_under_their_folder() {
    let fixture = fixture();
    let options = fixture.options();
    let configs = ConfigSet::load(&options).unwrap();
    let projects = ProjectSet::create(&options, &configs).unwrap();

    let content = solution::render(&options, projects.projects()).unwrap();

    for folder in ["Applications", "Coders", "Demos", "Dependencies", "Filters", "Fuzz", "ImageMagick"] {
        let entry = format!(
            "Project(\"{{2150E333-8FDC-42A3-9474-1A3956D46DE8}}\") = \"{}\", \"{}\", \"{{{}}}\"",
            folder,
            folder,
            create_guid(folder)
        );
        assert!(content.contains(&entry), "missing folder {}", folder);
    }

    let zlib = projects.get("CORE_zlib").unwrap();
    assert!(content.contains(&format!(
        "\t\t{{{}}} = {{{}}}",
        zlib.guid(),
        create_guid("Dependencies")
    )));

    let png = projects.get("IM_MOD_png").unwrap();
    assert!(content.contains(&format!("\t\t{{{}}} = {{{}}}", png.guid(), create_guid("Coders"))));
}

#[test]
fn test_config_folder_lists_published_xml_files() {
    let fixture = fixture();
    fixture.touch("Artifacts\\bin\\type.xml");
    fixture.touch("Artifacts\\bin\\policy.xml");
    fixture.touch("Artifacts\\bin\\magick.exe");
    let options = fixture.options();

    let content = solution::render(&options, &[]).unwrap();

    let policy = content
        .find("\t\tArtifacts\\bin\\policy.xml = Artifacts\\bin\\policy.xml")
        .unwrap();
    let type_xml = content
        .find("\t\tArtifacts\\bin\\type.xml = Artifacts\\bin\\type.xml")
        .unwrap();
    assert!(policy < type_xml);
    assert!(!content.contains("magick.exe"));
}

#[test]
fn test_platform_names_follow_architecture() {
    let fixture = fixture();
    let mut options = fixture.options();
    options.architecture = Architecture::X86;
    let configs = ConfigSet::load(&options).unwrap();
    let projects = ProjectSet::create(&options, &configs).unwrap();

    let content = solution::render(&options, projects.projects()).unwrap();

    assert!(content.contains("\t\tDebug|x86 = Debug|x86"));
    assert!(content.contains("\t\tRelease|x86 = Release|x86"));

    let zlib = projects.get("CORE_zlib").unwrap();
    assert!(content.contains(&format!("\t\t{{{}}}.Debug|x86.ActiveCfg = Debug|Win32", zlib.guid())));
    assert!(content.contains(&format!("\t\t{{{}}}.Release|x86.Build.0 = Release|Win32", zlib.guid())));
    assert!(zlib.file_name().starts_with("ProjectFiles\\x86\\"));
}

#[test]
fn test_header_follows_toolchain() {
    let fixture = fixture();
    let mut options = fixture.options();

    let content = solution::render(&options, &[]).unwrap();
    assert!(content.starts_with("Microsoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio Version 17\n"));

    options.visual_studio_version = VisualStudioVersion::VS2019;
    let content = solution::render(&options, &[]).unwrap();
    assert!(content.contains("# Visual Studio Version 16\n"));
    assert!(content.ends_with("EndGlobal\n"));
}

#[test]
fn test_solution_name_from_options() {
    let fixture = fixture();
    let mut options = fixture.options();
    options.is_static_build = true;
    options.architecture = Architecture::Arm64;

    let summary = Configure::new(options).run().unwrap();
    assert_eq!(summary.solution, fixture.root().join("IM7.Static.arm64.sln"));
    assert!(fixture.exists("ProjectFiles\\arm64\\CORE_coders\\CORE_coders.vcxproj"));
}
