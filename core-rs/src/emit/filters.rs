//! `.vcxproj.filters` writer: groups a project's sources by directory for
//! display in the IDE. Has no effect on the build.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::PathBuf;

use crate::errors::Result;
use crate::paths;
use crate::project::ProjectModel;

use super::guid::create_guid;
use super::write_file;

pub fn write(project: &ProjectModel<'_>) -> Result<PathBuf> {
    let content = render(project)?;
    let path = project
        .options()
        .resolve(&format!("{}.filters", project.file_name()));
    write_file(&path, &content)?;
    Ok(path)
}

/// Element name the project file uses for `file`
fn item_tag(project: &ProjectModel<'_>, file: &str) -> &'static str {
    if file.ends_with(".h") {
        "ClInclude"
    } else if file.ends_with(".asm") {
        if project.config().use_nasm() {
            "CustomBuild"
        } else {
            "MASM"
        }
    } else {
        "ClCompile"
    }
}

pub fn render(project: &ProjectModel<'_>) -> Result<String> {
    let mut out = String::new();
    let mut directories = BTreeSet::new();

    writeln!(out, "<?xml version=\"1.0\" encoding=\"utf-8\"?>")?;
    writeln!(
        out,
        "<Project ToolsVersion=\"4.0\" xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">"
    )?;
    writeln!(out, "  <ItemGroup>")?;

    for file in project.files() {
        // Top-level files stay ungrouped
        let Some(directory) = paths::parent(file) else {
            continue;
        };

        let mut ancestor = Some(directory);
        while let Some(current) = ancestor {
            directories.insert(current);
            ancestor = paths::parent(current);
        }

        let tag = item_tag(project, file);
        writeln!(out, "    <{} Include=\"$(SolutionDir){}{}\">", tag, project.directory(), file)?;
        writeln!(out, "      <Filter>{}</Filter>", directory)?;
        writeln!(out, "    </{}>", tag)?;
    }

    for directory in directories {
        writeln!(out, "    <Filter Include=\"{}\">", directory)?;
        writeln!(out, "      <UniqueIdentifier>{{{}}}</UniqueIdentifier>", create_guid(directory))?;
        writeln!(out, "    </Filter>")?;
    }

    writeln!(out, "  </ItemGroup>")?;
    writeln!(out, "</Project>")?;
    Ok(out)
}
