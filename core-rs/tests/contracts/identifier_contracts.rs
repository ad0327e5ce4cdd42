// Identifier Contract Tests
//
// Project, folder, and filter identifiers are written into every generated
// file. Regenerating must never change them, otherwise the IDE loses per-user
// state and every project file diff touches every reference.

use configure_core::emit::guid::NAMESPACE;
use configure_core::emit::solution;
use configure_core::{create_guid, BuildOptions, ConfigDescriptor, ProjectModel};
use std::fs;
use tempfile::TempDir;
use uuid::Uuid;

/// WHY: Identifiers are name-based, so a name always maps to one value
/// BREAKS: Solution diffs on every run if anything else feeds the identifier
#[test]
fn identifier_depends_only_on_name() {
    assert_eq!(create_guid("CORE_zlib"), create_guid("CORE_zlib"));
    assert_ne!(create_guid("CORE_zlib"), create_guid("CORE_zlib2"));
    assert_ne!(create_guid("CORE_zlib"), create_guid("core_zlib"));
}

/// WHY: Pinned values catch a change of namespace or hash version
/// BREAKS: Every existing solution when the derivation changes
#[test]
fn identifier_values_are_pinned() {
    assert_eq!(create_guid("CORE_zlib"), "BBF9A1B8-8806-5C2A-99E7-145A07EAAEF1");
    assert_eq!(create_guid("IM_MOD_png"), "2B37554D-C6DA-5676-B8F4-E442DF1E4DC0");
    assert_eq!(create_guid("Coders"), "59CB99E1-9E5E-5C46-BD94-84244EC22DF9");
    assert_eq!(NAMESPACE, Uuid::NAMESPACE_OID);
}

/// WHY: Project and solution files embed the identifier inside braces
/// FORMAT: 8-4-4-4-12 upper-case hex, no braces
#[test]
fn identifier_format_is_upper_case_hyphenated() {
    let guid = create_guid("FILTER_analyze");

    assert_eq!(guid.len(), 36);
    assert!(!guid.starts_with('{'));
    assert_eq!(guid, guid.to_uppercase());

    let groups: Vec<usize> = guid.split('-').map(str::len).collect();
    assert_eq!(groups, vec![8, 4, 4, 4, 12]);

    let parsed = Uuid::parse_str(&guid).unwrap();
    assert_eq!(parsed.get_version_num(), 5);
}

/// WHY: The project file and the solution must agree on each identifier
#[test]
fn project_identifier_is_derived_from_full_name() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("zlib")).unwrap();
    fs::write(temp_dir.path().join("zlib").join("zlib.c"), "").unwrap();
    let options = BuildOptions::new(temp_dir.path());

    let config = ConfigDescriptor::parse("zlib", "zlib", "Config.txt", "[STATIC_LIBRARY]\n").unwrap();
    let project = ProjectModel::create(&config, &options).unwrap();

    assert_eq!(project.full_name(), "CORE_zlib");
    assert_eq!(project.guid(), create_guid("CORE_zlib"));

    let content = solution::render(&options, std::slice::from_ref(&project)).unwrap();
    assert!(content.contains(&format!("\"{{{}}}\"", project.guid())));
}

/// WHY: Folder identifiers come from the folder name, not from its members
#[test]
fn folder_identifier_ignores_membership() {
    let temp_dir = TempDir::new().unwrap();
    let options = BuildOptions::new(temp_dir.path());

    let empty = solution::render(&options, &[]).unwrap();
    assert!(empty.contains(&format!("\"Config\", \"Config\", \"{{{}}}\"", create_guid("Config"))));
}
