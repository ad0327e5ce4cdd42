/**
 * solution.rs
 * Solution (.sln) writer
 *
 * Lists every project, groups them into folders by kind, declares the
 * Debug/Release x platform axis, and nests each project under its folder.
 * Identifiers come from names only, so rewriting an unchanged solution
 * produces the same file.
 */

use std::collections::BTreeSet;
use std::fmt::Write;
use std::fs;
use std::path::PathBuf;

use crate::config::ProjectKind;
use crate::errors::Result;
use crate::options::{BuildOptions, VisualStudioVersion};
use crate::paths;
use crate::project::ProjectModel;

use super::guid::create_guid;
use super::write_file;

/// Project type identifier for C++ projects
pub const CPP_PROJECT_TYPE: &str = "8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942";

/// Project type identifier for solution folders
pub const FOLDER_PROJECT_TYPE: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

/// Folder holding the runtime configuration files
pub const CONFIG_FOLDER: &str = "Config";

const CONFIG_FILES_DIRECTORY: &str = "Artifacts\\bin";

/// Solution file name, e.g. `IM7.Dynamic.x64.sln`
pub fn solution_name(options: &BuildOptions) -> String {
    format!(
        "IM{}.{}.{}.sln",
        if options.is_imagemagick7 { "7" } else { "6" },
        if options.is_static_build { "Static" } else { "Dynamic" },
        options.architecture_name()
    )
}

/// Solution folder a project is listed under
pub fn solution_folder(project: &ProjectModel<'_>) -> String {
    match project.kind() {
        ProjectKind::Application => "Applications".to_string(),
        ProjectKind::Coder => "Coders".to_string(),
        ProjectKind::Demo => "Demos".to_string(),
        ProjectKind::Filter => "Filters".to_string(),
        ProjectKind::Fuzz => "Fuzz".to_string(),
        _ => paths::first_segment(project.directory()).to_string(),
    }
}

/// Write the solution under the root and return its host path
pub fn write(options: &BuildOptions, projects: &[ProjectModel<'_>]) -> Result<PathBuf> {
    let content = render(options, projects)?;
    let path = options.resolve(&solution_name(options));
    write_file(&path, &content)?;

    tracing::info!("Wrote solution {} with {} projects", path.display(), projects.len());
    Ok(path)
}

pub fn render(options: &BuildOptions, projects: &[ProjectModel<'_>]) -> Result<String> {
    let mut out = String::new();
    let architecture = options.architecture_name();

    writeln!(out, "Microsoft Visual Studio Solution File, Format Version 12.00")?;
    write_visual_studio_version(&mut out, options.visual_studio_version)?;

    for project in projects {
        writeln!(
            out,
            "Project(\"{{{}}}\") = \"{}\", \"{}\", \"{{{}}}\"",
            CPP_PROJECT_TYPE,
            project.full_name(),
            project.file_name(),
            project.guid()
        )?;
        writeln!(out, "EndProject")?;
    }

    write_config_folder(&mut out, options)?;

    let folders: BTreeSet<String> = projects.iter().map(solution_folder).collect();
    for folder in &folders {
        writeln!(
            out,
            "Project(\"{{{}}}\") = \"{}\", \"{}\", \"{{{}}}\"",
            FOLDER_PROJECT_TYPE,
            folder,
            folder,
            create_guid(folder)
        )?;
        writeln!(out, "EndProject")?;
    }

    writeln!(out, "Global")?;
    writeln!(out, "\tGlobalSection(SolutionConfigurationPlatforms) = preSolution")?;
    for configuration in ["Debug", "Release"] {
        writeln!(
            out,
            "\t\t{}|{} = {}|{}",
            configuration, architecture, configuration, architecture
        )?;
    }
    writeln!(out, "\tEndGlobalSection")?;

    writeln!(out, "\tGlobalSection(ProjectConfigurationPlatforms) = postSolution")?;
    for project in projects {
        let guid = project.guid();
        for configuration in ["Debug", "Release"] {
            for entry in ["ActiveCfg", "Build.0"] {
                writeln!(
                    out,
                    "\t\t{{{}}}.{}|{}.{} = {}|{}",
                    guid,
                    configuration,
                    architecture,
                    entry,
                    configuration,
                    options.platform()
                )?;
            }
        }
    }
    writeln!(out, "\tEndGlobalSection")?;

    writeln!(out, "\tGlobalSection(NestedProjects) = preSolution")?;
    for project in projects {
        writeln!(
            out,
            "\t\t{{{}}} = {{{}}}",
            project.guid(),
            create_guid(&solution_folder(project))
        )?;
    }
    writeln!(out, "\tEndGlobalSection")?;
    writeln!(out, "EndGlobal")?;

    Ok(out)
}

fn write_visual_studio_version(out: &mut String, version: VisualStudioVersion) -> Result<()> {
    let (major, full) = match version {
        VisualStudioVersion::VS2022 => ("17", "17.0.31903.59"),
        VisualStudioVersion::VS2019 => ("16", "16.0.28701.123"),
        VisualStudioVersion::VS2017 => ("15", "15.0.26124.0"),
    };

    writeln!(out, "# Visual Studio Version {}", major)?;
    writeln!(out, "VisualStudioVersion = {}", full)?;
    writeln!(out, "MinimumVisualStudioVersion = 10.0.40219.1")?;
    Ok(())
}

/// `Config` folder listing the xml files already published to `Artifacts\bin`
fn write_config_folder(out: &mut String, options: &BuildOptions) -> Result<()> {
    writeln!(
        out,
        "Project(\"{{{}}}\") = \"{}\", \"{}\", \"{{{}}}\"",
        FOLDER_PROJECT_TYPE,
        CONFIG_FOLDER,
        CONFIG_FOLDER,
        create_guid(CONFIG_FOLDER)
    )?;
    writeln!(out, "\tProjectSection(SolutionItems) = preProject")?;

    let directory = options.resolve(CONFIG_FILES_DIRECTORY);
    if directory.is_dir() {
        let mut names: Vec<String> = fs::read_dir(&directory)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| name.ends_with(".xml"))
            .collect();
        names.sort();

        for name in names {
            let relative = paths::join(CONFIG_FILES_DIRECTORY, &name);
            writeln!(out, "\t\t{} = {}", relative, relative)?;
        }
    } else {
        tracing::warn!("{} does not exist, the Config folder stays empty", directory.display());
    }

    writeln!(out, "\tEndProjectSection")?;
    writeln!(out, "EndProject")?;
    Ok(())
}
