//! configure - Visual Studio project generator
//!
//! Command-line interface over `configure_core`

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use configure_core::{
    create_guid, find_root_directory, Architecture, BuildOptions, Configure, HostProbe, OptionOverrides,
    PolicyConfig, ProjectSummary, QuantumDepth, VisualStudioVersion,
};

#[derive(Parser)]
#[command(name = "configure")]
#[command(version)]
#[command(about = "Generate Visual Studio projects and a solution from module descriptors", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every project file and the solution
    Generate {
        #[command(flatten)]
        build: BuildFlags,
    },
    /// Resolve descriptors and projects without writing anything
    List {
        #[command(flatten)]
        build: BuildFlags,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Print the identifier derived for a name
    Guid {
        /// Project full name, solution folder, or filter directory
        name: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Args, Debug, Default)]
struct BuildFlags {
    /// Root directory (default: parent of the enclosing Configure directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// YAML options file applied before the flags below
    #[arg(long)]
    options: Option<PathBuf>,

    /// Target architecture (x86, x64, arm64)
    #[arg(long)]
    arch: Option<Architecture>,

    /// Link everything statically
    #[arg(long = "static", conflicts_with = "dynamic")]
    static_build: bool,

    /// Build dynamic libraries and per-coder modules
    #[arg(long)]
    dynamic: bool,

    /// Quantum depth (Q8, Q16, Q32, Q64)
    #[arg(long)]
    quantum: Option<QuantumDepth>,

    /// Enable high dynamic range imaging
    #[arg(long, conflicts_with = "no_hdri")]
    hdri: bool,

    /// Disable high dynamic range imaging
    #[arg(long)]
    no_hdri: bool,

    /// Enable OpenCL
    #[arg(long)]
    opencl: bool,

    /// Disable OpenMP
    #[arg(long)]
    no_openmp: bool,

    /// Security policy (limited, open, secure, websafe)
    #[arg(long)]
    policy: Option<PolicyConfig>,

    /// Visual Studio version (2017, 2019, 2022)
    #[arg(long)]
    vs: Option<VisualStudioVersion>,

    /// Include optional dependencies
    #[arg(long)]
    include_optional: bool,

    /// Include dependencies with an incompatible license
    #[arg(long)]
    incompatible_license: bool,

    /// Keep deprecated APIs
    #[arg(long)]
    deprecated: bool,

    /// Support an installed layout
    #[arg(long)]
    installed_support: bool,

    /// Build with zero configuration support
    #[arg(long)]
    zero_configuration_support: bool,

    /// Link the C runtime statically
    #[arg(long)]
    link_runtime: bool,

    /// Only build the combined magick front end
    #[arg(long)]
    only_magick: bool,

    /// Disable distributed pixel cache
    #[arg(long)]
    no_dpc: bool,
}

impl BuildFlags {
    fn overrides(&self) -> OptionOverrides {
        let set = |flag: bool, value: bool| flag.then_some(value);

        OptionOverrides {
            architecture: self.arch,
            enable_dpc: set(self.no_dpc, false),
            exclude_deprecated: set(self.deprecated, false),
            include_incompatible_license: set(self.incompatible_license, true),
            include_optional: set(self.include_optional, true),
            installed_support: set(self.installed_support, true),
            is_static_build: set(self.static_build, true).or(set(self.dynamic, false)),
            link_runtime: set(self.link_runtime, true),
            only_magick: set(self.only_magick, true),
            policy_config: self.policy,
            quantum_depth: self.quantum,
            use_hdri: set(self.hdri, true).or(set(self.no_hdri, false)),
            use_opencl: set(self.opencl, true),
            use_openmp: set(self.no_openmp, false),
            visual_studio_version: self.vs,
            zero_configuration_support: set(self.zero_configuration_support, true),
        }
    }

    /// Probe defaults, then the options file, then the flags
    fn build_options(&self) -> Result<BuildOptions> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => {
                let current = std::env::current_dir().context("Failed to read the current directory")?;
                find_root_directory(&current)?
            }
        };

        if !root.is_dir() {
            anyhow::bail!("Root directory does not exist: {}", root.display());
        }

        let base = BuildOptions::detect(root, &HostProbe)?;

        let file_overrides = match &self.options {
            Some(path) => OptionOverrides::load(path)
                .with_context(|| format!("Failed to load options file {}", path.display()))?,
            None => OptionOverrides::default(),
        };

        Ok(file_overrides.merge(self.overrides()).apply(base))
    }
}

fn handle_generate(build: &BuildFlags) -> Result<()> {
    let options = build.build_options()?;
    let configure = Configure::new(options);

    let summary = configure.run()?;

    println!(
        "{} Generated {} project(s) from {} config(s)",
        "✓".green(),
        summary.projects,
        summary.configs
    );
    println!("  Solution: {}", summary.solution.display());
    Ok(())
}

fn handle_list(build: &BuildFlags, format: OutputFormat) -> Result<()> {
    let options = build.build_options()?;
    let projects = Configure::new(options).plan()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&projects)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&projects)?),
        OutputFormat::Table => print_table(&projects),
    }
    Ok(())
}

fn print_table(projects: &[ProjectSummary]) {
    if projects.is_empty() {
        println!("No projects found.");
        return;
    }

    println!(
        "\n{:<40} {:<16} {:<38} {:<6}",
        "PROJECT".bold(),
        "KIND".bold(),
        "GUID".bold(),
        "FILES".bold()
    );
    println!("{}", "-".repeat(102));
    for project in projects {
        println!(
            "{:<40} {:<16} {:<38} {:<6}",
            project.full_name,
            project.kind.to_string(),
            project.guid,
            project.file_count
        );
    }
    println!("\nTotal: {} project(s)", projects.len());
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = configure_core::logging::init(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = match &cli.command {
        Commands::Generate { build } => handle_generate(build),
        Commands::List { build, format } => handle_list(build, *format),
        Commands::Guid { name } => {
            println!("{{{}}}", create_guid(name));
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
