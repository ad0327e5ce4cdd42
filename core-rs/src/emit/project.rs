/**
 * project.rs
 * MSBuild project (.vcxproj) writer
 *
 * Rendering is pure: `render` only reads the project and its siblings.
 * `write` adds the contract check and puts the file under the root.
 */

use std::collections::HashMap;
use std::fmt::Write;
use std::path::PathBuf;

use crate::config::ProjectKind;
use crate::errors::{ConfigureError, Result};
use crate::options::{Architecture, VisualStudioVersion};
use crate::paths;
use crate::project::{Compiler, ProjectModel};

use super::write_file;

const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

/// Write the project file and return its host path
///
/// A static library that still carries references is refused even when the
/// descriptor validation was skipped.
pub fn write(project: &ProjectModel<'_>, all_projects: &[ProjectModel<'_>]) -> Result<PathBuf> {
    if project.kind() == ProjectKind::StaticLibrary && !project.references().is_empty() {
        return Err(ConfigureError::StaticLibraryReferences(project.name().to_string()));
    }

    let content = render(project, all_projects)?;
    let path = project.options().resolve(&project.file_name());
    write_file(&path, &content)?;

    tracing::debug!("Wrote {}", path.display());
    Ok(path)
}

/// Project file content
pub fn render(project: &ProjectModel<'_>, all_projects: &[ProjectModel<'_>]) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "<?xml version=\"1.0\" encoding=\"utf-8\"?>")?;
    writeln!(
        out,
        "<Project DefaultTargets=\"Build\" ToolsVersion=\"4.0\" xmlns=\"{}\">",
        MSBUILD_NAMESPACE
    )?;
    write_configurations(&mut out, project)?;
    write_properties(&mut out, project)?;
    write_output_properties(&mut out, project)?;
    write_compilation(&mut out, project)?;
    write_props_imports(&mut out, project)?;
    if project.uses_lib_properties() {
        write_lib_properties(&mut out)?;
    } else {
        write_link_properties(&mut out, project)?;
    }
    write_files(&mut out, project)?;
    write_references(&mut out, project, all_projects)?;
    write_targets_imports(&mut out, project)?;
    write_copy_includes(&mut out, project)?;
    writeln!(out, "</Project>")?;

    Ok(out)
}

/// Sibling projects this project references, in emission order.
///
/// References name library projects, plugin references name coder projects,
/// and applications also depend on every coder and filter. Names that match
/// no sibling were excluded by the options and are skipped.
pub fn resolve_references<'p, 'a>(
    project: &ProjectModel<'a>,
    all_projects: &'p [ProjectModel<'a>],
) -> Vec<&'p ProjectModel<'a>> {
    let mut resolved = Vec::new();
    if project.references().is_empty() {
        return resolved;
    }

    for reference in project.references() {
        if let Some(target) = all_projects
            .iter()
            .find(|p| p.is_library() && p.name() == reference)
        {
            resolved.push(target);
        }
    }

    for reference in project.config().coder_references() {
        if let Some(target) = all_projects
            .iter()
            .find(|p| p.kind() == ProjectKind::Coder && p.name() == reference)
        {
            resolved.push(target);
        }
    }

    if project.is_application() {
        resolved.extend(
            all_projects
                .iter()
                .filter(|p| matches!(p.kind(), ProjectKind::Coder | ProjectKind::Filter)),
        );
    }

    resolved
}

fn write_configurations(out: &mut String, project: &ProjectModel<'_>) -> Result<()> {
    let platform = project.options().platform();

    writeln!(out, "  <ItemGroup Label=\"ProjectConfigurations\">")?;
    for configuration in ["Debug", "Release"] {
        writeln!(out, "    <ProjectConfiguration Include=\"{}|{}\">", configuration, platform)?;
        writeln!(out, "      <Configuration>{}</Configuration>", configuration)?;
        writeln!(out, "      <Platform>{}</Platform>", platform)?;
        writeln!(out, "    </ProjectConfiguration>")?;
    }
    writeln!(out, "  </ItemGroup>")?;
    Ok(())
}

fn write_properties(out: &mut String, project: &ProjectModel<'_>) -> Result<()> {
    writeln!(out, "  <PropertyGroup Label=\"Globals\">")?;
    writeln!(out, "    <ProjectName>{}</ProjectName>", project.full_name())?;
    writeln!(out, "    <ProjectGuid>{{{}}}</ProjectGuid>", project.guid())?;
    writeln!(out, "    <Keyword>{}Proj</Keyword>", project.options().platform())?;
    writeln!(out, "  </PropertyGroup>")?;
    writeln!(out, "  <Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.Default.props\" />")?;
    writeln!(out, "  <PropertyGroup Label=\"Configuration\">")?;
    writeln!(out, "    <CharacterSet>{}</CharacterSet>", project.character_set())?;
    writeln!(
        out,
        "    <ConfigurationType>{}</ConfigurationType>",
        project.configuration_type().as_str()
    )?;
    writeln!(out, "    <PlatformToolset>{}</PlatformToolset>", project.platform_toolset())?;
    writeln!(out, "    <UseOfMfc>false</UseOfMfc>")?;
    writeln!(out, "  </PropertyGroup>")?;
    writeln!(out, "  <Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.props\" />")?;
    Ok(())
}

fn write_output_properties(out: &mut String, project: &ProjectModel<'_>) -> Result<()> {
    writeln!(out, "  <PropertyGroup>")?;
    writeln!(out, "    <LinkIncremental>false</LinkIncremental>")?;
    writeln!(
        out,
        "    <OutDir>$(SolutionDir)Artifacts\\{}\\</OutDir>",
        project.output_directory()
    )?;
    writeln!(
        out,
        "    <TargetName Condition=\"'$(Configuration)'=='Debug'\">{}</TargetName>",
        project.target_name(true)
    )?;
    writeln!(
        out,
        "    <TargetName Condition=\"'$(Configuration)'=='Release'\">{}</TargetName>",
        project.target_name(false)
    )?;
    if project.options().visual_studio_version >= VisualStudioVersion::VS2019 {
        writeln!(
            out,
            "    <UseDebugLibraries Condition=\"'$(Configuration)'=='Debug'\">true</UseDebugLibraries>"
        )?;
    }
    writeln!(out, "  </PropertyGroup>")?;
    Ok(())
}

/// One element per configuration: `(name, debug value, release value)`
fn write_per_configuration(out: &mut String, name: &str, debug: &str, release: &str) -> Result<()> {
    writeln!(
        out,
        "      <{name} Condition=\"'$(Configuration)'=='Debug'\">{debug}</{name}>"
    )?;
    writeln!(
        out,
        "      <{name} Condition=\"'$(Configuration)'=='Release'\">{release}</{name}>"
    )?;
    Ok(())
}

fn write_compilation(out: &mut String, project: &ProjectModel<'_>) -> Result<()> {
    let include_directories: String = project
        .include_directories()
        .iter()
        .map(|directory| format!("$(SolutionDir){};", directory))
        .collect();

    writeln!(out, "  <ItemDefinitionGroup>")?;
    writeln!(out, "    <ClCompile>")?;
    writeln!(out, "      <AdditionalOptions>/source-charset:utf-8 %(AdditionalOptions)</AdditionalOptions>")?;
    writeln!(
        out,
        "      <AdditionalIncludeDirectories>{}%(AdditionalIncludeDirectories)</AdditionalIncludeDirectories>",
        include_directories
    )?;
    writeln!(out, "      <FunctionLevelLinking>true</FunctionLevelLinking>")?;
    writeln!(out, "      <LanguageStandard>stdcpp17</LanguageStandard>")?;
    writeln!(out, "      <LanguageStandard_C>stdc17</LanguageStandard_C>")?;
    writeln!(out, "      <MultiProcessorCompilation>true</MultiProcessorCompilation>")?;
    writeln!(out, "      <StringPooling>true</StringPooling>")?;
    writeln!(out, "      <SuppressStartupBanner>true</SuppressStartupBanner>")?;
    writeln!(out, "      <OpenMPSupport>{}</OpenMPSupport>", project.open_mp_support())?;
    writeln!(out, "      <WarningLevel>{}</WarningLevel>", project.warning_level())?;
    write_per_configuration(out, "DebugInformationFormat", "ProgramDatabase", "None")?;
    write_per_configuration(out, "BasicRuntimeChecks", "EnableFastChecks", "Default")?;
    write_per_configuration(out, "InlineFunctionExpansion", "Disabled", "AnySuitable")?;
    write_per_configuration(out, "OmitFramePointers", "false", "true")?;
    write_per_configuration(out, "Optimization", "Disabled", "MaxSpeed")?;
    writeln!(
        out,
        "      <PreprocessorDefinitions>{};%(PreprocessorDefinitions)</PreprocessorDefinitions>",
        project.defines().join(";")
    )?;
    write_per_configuration(
        out,
        "PreprocessorDefinitions",
        "_DEBUG;%(PreprocessorDefinitions)",
        "NDEBUG;%(PreprocessorDefinitions)",
    )?;
    write_per_configuration(
        out,
        "RuntimeLibrary",
        &project.runtime_library(true),
        &project.runtime_library(false),
    )?;
    if project.compiler() == Compiler::Cpp {
        writeln!(out, "      <CompileAs>CompileAsCpp</CompileAs>")?;
    }
    if project.treat_warnings_as_errors() {
        writeln!(out, "      <TreatWarningAsError>true</TreatWarningAsError>")?;
    }
    writeln!(out, "    </ClCompile>")?;
    writeln!(out, "  </ItemDefinitionGroup>")?;
    Ok(())
}

fn write_props_imports(out: &mut String, project: &ProjectModel<'_>) -> Result<()> {
    if project.includes_masm() {
        writeln!(out, "  <ImportGroup Label=\"ExtensionSettings\">")?;
        writeln!(out, "    <Import Project=\"$(VCTargetsPath)\\BuildCustomizations\\masm.props\" />")?;
        writeln!(out, "  </ImportGroup>")?;
    }
    Ok(())
}

fn write_lib_properties(out: &mut String) -> Result<()> {
    writeln!(out, "  <ItemDefinitionGroup>")?;
    writeln!(out, "    <Lib>")?;
    writeln!(out, "      <TreatLibWarningAsErrors>true</TreatLibWarningAsErrors>")?;
    writeln!(out, "    </Lib>")?;
    writeln!(out, "  </ItemDefinitionGroup>")?;
    Ok(())
}

fn write_link_properties(out: &mut String, project: &ProjectModel<'_>) -> Result<()> {
    let libraries = |debug: bool| -> String {
        project
            .additional_dependencies(debug)
            .iter()
            .map(|library| format!("{};", library))
            .collect()
    };
    let pre_build_libs: String = project
        .pre_build_libs()
        .iter()
        .map(|library| format!("{};", library))
        .collect();

    writeln!(out, "  <ItemDefinitionGroup>")?;
    writeln!(out, "    <Link>")?;
    writeln!(
        out,
        "      <AdditionalLibraryDirectories>$(SolutionDir)Artifacts\\lib;%(AdditionalLibraryDirectories)</AdditionalLibraryDirectories>"
    )?;
    writeln!(out, "      <TreatLinkerWarningAsErrors>true</TreatLinkerWarningAsErrors>")?;
    write_per_configuration(
        out,
        "AdditionalDependencies",
        &format!("{}%(AdditionalDependencies)", libraries(true)),
        &format!("{}{}%(AdditionalDependencies)", pre_build_libs, libraries(false)),
    )?;
    write_per_configuration(
        out,
        "ImportLibrary",
        &format!("$(SolutionDir)Artifacts\\lib\\{}.lib", project.target_name(true)),
        &format!("$(SolutionDir)Artifacts\\lib\\{}.lib", project.target_name(false)),
    )?;
    if project.config().use_unicode() {
        writeln!(out, "      <EntryPointSymbol>wWinMainCRTStartup</EntryPointSymbol>")?;
    }
    if let Some(module_definition_file) = project.config().module_definition_file() {
        writeln!(
            out,
            "      <ModuleDefinitionFile>$(SolutionDir){}{}</ModuleDefinitionFile>",
            project.directory(),
            module_definition_file
        )?;
    }
    writeln!(out, "    </Link>")?;
    writeln!(out, "  </ItemDefinitionGroup>")?;
    Ok(())
}

/// Output list for a custom build step; repeated object names get numbered
fn write_custom_build_outputs(out: &mut String, occurrence: usize) -> Result<()> {
    if occurrence == 1 {
        writeln!(out, "      <Outputs>$(IntDir)%(Filename).obj;%(Outputs)</Outputs>")?;
    } else {
        writeln!(
            out,
            "      <Outputs>$(IntDir)%(Filename).{}.obj;%(Outputs)</Outputs>",
            occurrence
        )?;
    }
    Ok(())
}

fn write_files(out: &mut String, project: &ProjectModel<'_>) -> Result<()> {
    let options = project.options();
    let directory = project.directory();
    let mut object_names: HashMap<&str, usize> = HashMap::new();

    writeln!(out, "  <ItemGroup>")?;
    for file in project.files() {
        let object_name = paths::file_name(file);

        if file.ends_with(".h") {
            writeln!(out, "    <ClInclude Include=\"$(SolutionDir){}{}\" />", directory, file)?;
            continue;
        }

        if file.ends_with(".asm") {
            if project.config().use_nasm() {
                let occurrence = bump(&mut object_names, object_name);
                writeln!(out, "    <CustomBuild Include=\"$(SolutionDir){}{}\">", directory, file)?;
                writeln!(out, "      <Command>$(SolutionDir)Configure\\nasm.exe{}</Command>", project.nasm_options()?)?;
                write_custom_build_outputs(out, occurrence)?;
                writeln!(out, "    </CustomBuild>")?;
            } else if options.architecture == Architecture::Arm64 {
                let occurrence = bump(&mut object_names, object_name);
                writeln!(out, "    <CustomBuild Include=\"$(SolutionDir){}{}\">", directory, file)?;
                writeln!(out, "      <Command>armasm64 \"%(FullPath)\" -o \"$(IntDir)%(Filename).obj\"</Command>")?;
                write_custom_build_outputs(out, occurrence)?;
                writeln!(out, "    </CustomBuild>")?;
            } else {
                writeln!(out, "    <MASM Include=\"$(SolutionDir){}{}\">", directory, file)?;
                writeln!(out, "      <FileType>Document</FileType>")?;
                if options.architecture == Architecture::X86 {
                    writeln!(out, "      <UseSafeExceptionHandlers>true</UseSafeExceptionHandlers>")?;
                }
                writeln!(out, "    </MASM>")?;
            }
            continue;
        }

        let occurrence = bump(&mut object_names, object_name);
        if occurrence == 1 {
            writeln!(out, "    <ClCompile Include=\"$(SolutionDir){}{}\" />", directory, file)?;
        } else {
            writeln!(out, "    <ClCompile Include=\"$(SolutionDir){}{}\">", directory, file)?;
            writeln!(
                out,
                "      <ObjectFileName>$(IntDir){}.{}.obj</ObjectFileName>",
                object_name, occurrence
            )?;
            writeln!(out, "    </ClCompile>")?;
        }
    }

    if let Some(resource_file) = project.config().resource_file() {
        if let Some(relative) = paths::from_host(&options.root_directory, resource_file) {
            writeln!(out, "    <ResourceCompile Include=\"$(SolutionDir){}\" />", relative)?;
        }
    }

    writeln!(out, "  </ItemGroup>")?;
    Ok(())
}

fn bump<'f>(counts: &mut HashMap<&'f str, usize>, name: &'f str) -> usize {
    let count = counts.entry(name).or_insert(0);
    *count += 1;
    *count
}

fn write_reference(out: &mut String, target: &ProjectModel<'_>) -> Result<()> {
    writeln!(out, "    <ProjectReference Include=\"$(SolutionDir){}\">", target.file_name())?;
    writeln!(out, "      <Project>{{{}}}</Project>", target.guid())?;
    writeln!(out, "      <Name>{}</Name>", target.full_name())?;
    writeln!(out, "    </ProjectReference>")?;
    Ok(())
}

fn write_references(
    out: &mut String,
    project: &ProjectModel<'_>,
    all_projects: &[ProjectModel<'_>],
) -> Result<()> {
    if project.references().is_empty() {
        return Ok(());
    }

    writeln!(out, "  <ItemGroup>")?;
    for target in resolve_references(project, all_projects) {
        write_reference(out, target)?;
    }
    writeln!(out, "  </ItemGroup>")?;
    Ok(())
}

fn write_targets_imports(out: &mut String, project: &ProjectModel<'_>) -> Result<()> {
    writeln!(out, "  <Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.targets\" />")?;
    if project.includes_masm() {
        writeln!(out, "  <ImportGroup Label=\"ExtensionTargets\">")?;
        writeln!(out, "    <Import Project=\"$(VCTargetsPath)\\BuildCustomizations\\masm.targets\" />")?;
        writeln!(out, "  </ImportGroup>")?;
    }
    Ok(())
}

/// Post-build target republishing headers into `Artifacts\include\<name>`
fn write_copy_includes(out: &mut String, project: &ProjectModel<'_>) -> Result<()> {
    let artifacts = project.config().include_artifacts();
    if artifacts.is_empty() {
        return Ok(());
    }

    let destination = format!("$(SolutionDir)Artifacts\\include\\{}", project.name());

    writeln!(out, "  <Target Name=\"CopyIncludes\" AfterTargets=\"Build\">")?;
    writeln!(
        out,
        "    <RemoveDir Directories=\"{}\" Condition=\"Exists('{}')\" />",
        destination, destination
    )?;
    writeln!(out, "    <ItemGroup>")?;
    for (index, source) in artifacts.keys().enumerate() {
        if source.ends_with(".h") {
            writeln!(out, "      <HeaderFiles{} Include=\"$(SolutionDir){}\" />", index, source)?;
        } else {
            writeln!(out, "      <HeaderFiles{} Include=\"$(SolutionDir){}\\*.h\" />", index, source)?;
        }
    }
    writeln!(out, "    </ItemGroup>")?;
    for (index, (source, target)) in artifacts.iter().enumerate() {
        writeln!(
            out,
            "    <Error Condition=\"'@(HeaderFiles{})' == ''\" Text=\"No header files found in: {}\" />",
            index, source
        )?;
        writeln!(
            out,
            "    <Copy SourceFiles=\"@(HeaderFiles{})\" DestinationFolder=\"{}\\{}\" SkipUnchangedFiles=\"true\" />",
            index, destination, target
        )?;
    }
    writeln!(out, "  </Target>")?;
    Ok(())
}
