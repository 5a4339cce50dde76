use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};

use modkit::archive::{self, ArchiveVersion, PatchStatus};
use modkit::plugins;
use modkit::report::ScanReport;
use modkit::scanner::{AutoFixer, OwnerMap, ScanConfiguration, ScanCoordinator, ScanRules};
use modkit::utils;

#[derive(Parser, Debug)]
#[command(version, about = "Archive, plugin and data-tree tools for a Fallout 4 Data directory", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect or patch BA2 archive headers
    #[command(subcommand)]
    Archive(ArchiveCommand),
    /// Classify script extender plugins by their exports
    Plugins {
        dir: PathBuf,
        #[arg(short, long)]
        recursive: bool,
    },
    /// Scan a Data directory for structural problems
    Scan(ScanArgs),
}

#[derive(Subcommand, Debug)]
enum ArchiveCommand {
    /// Print the header of one archive
    Info {
        path: PathBuf,
        /// Also print the SHA-256 of the file
        #[arg(long)]
        checksum: bool,
    },
    /// Rewrite the version byte of one archive
    Patch {
        path: PathBuf,
        #[arg(short, long, value_enum)]
        target: TargetVersion,
    },
    /// Rewrite the version byte of every archive in a directory
    Batch {
        dir: PathBuf,
        #[arg(short, long, value_enum)]
        target: TargetVersion,
        #[arg(short, long)]
        recursive: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TargetVersion {
    V1,
    V7,
    V8,
}

impl From<TargetVersion> for ArchiveVersion {
    fn from(value: TargetVersion) -> Self {
        match value {
            TargetVersion::V1 => ArchiveVersion::V1,
            TargetVersion::V7 => ArchiveVersion::V7,
            TargetVersion::V8 => ArchiveVersion::V8,
        }
    }
}

#[derive(Args, Debug)]
struct ScanArgs {
    root: PathBuf,
    #[arg(long)]
    no_junk: bool,
    #[arg(long)]
    no_unexpected_folders: bool,
    #[arg(long)]
    no_previs: bool,
    #[arg(long)]
    no_anim_text: bool,
    #[arg(long)]
    no_wrong_formats: bool,
    #[arg(long)]
    no_config_regressions: bool,
    #[arg(long)]
    no_overrides: bool,
    /// Don't check for game master files (use when scanning a staging folder)
    #[arg(long)]
    no_required_files: bool,
    /// JSON object mapping relative paths to owner names
    #[arg(long)]
    owners: Option<PathBuf>,
    /// Write the report as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Delete junk files, packaging leftovers and problem overrides
    #[arg(long)]
    fix: bool,
    /// With --fix, only report what would be deleted
    #[arg(long, requires = "fix")]
    dry_run: bool,
}

impl ScanArgs {
    fn configuration(&self) -> ScanConfiguration {
        ScanConfiguration {
            skip_scan: false,
            junk_files: !self.no_junk,
            unexpected_folders: !self.no_unexpected_folders,
            loose_previs: !self.no_previs,
            anim_text_data: !self.no_anim_text,
            wrong_formats: !self.no_wrong_formats,
            config_regressions: !self.no_config_regressions,
            problem_overrides: !self.no_overrides,
            required_files: !self.no_required_files,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Command::Archive(cmd) => run_archive(cmd),
        Command::Plugins { dir, recursive } => run_plugins(&dir, recursive),
        Command::Scan(args) => run_scan(&args),
    }
}

fn run_archive(cmd: ArchiveCommand) -> Result<()> {
    match cmd {
        ArchiveCommand::Info { path, checksum } => {
            let info = archive::read_header(&path)
                .with_context(|| format!("No such archive: {}", path.display()))?;
            println!("{}", info.file_name);
            println!("  valid:     {}", info.is_valid());
            println!("  version:   {}", info.version);
            println!("  type:      {}", info.archive_type);
            println!("  size:      {} bytes", info.size);
            println!("  read-only: {}", info.read_only);
            if checksum {
                println!("  sha256:    {}", utils::file_checksum(&path)?);
            }
        }
        ArchiveCommand::Patch { path, target } => {
            let target = ArchiveVersion::from(target);
            match archive::try_patch_version(&path, target)
                .with_context(|| format!("Failed to patch {}", path.display()))?
            {
                PatchStatus::Patched => println!("Patched {} to {}", path.display(), target),
                PatchStatus::AlreadyAtTarget => println!("{} is already {}", path.display(), target),
            }
        }
        ArchiveCommand::Batch { dir, target, recursive } => {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                    .context("Invalid progress template")?,
            );
            let outcome = archive::batch_patch(&dir, target.into(), recursive, Some(&pb), None)?;
            pb.finish_and_clear();

            for result in &outcome.results {
                if let Some(message) = &result.message {
                    println!("{:?} {}: {}", result.status, result.path.display(), message);
                }
            }
            println!(
                "{} archives: {} patched, {} skipped, {} failed",
                outcome.total, outcome.succeeded, outcome.skipped, outcome.failed
            );
        }
    }
    Ok(())
}

fn run_plugins(dir: &Path, recursive: bool) -> Result<()> {
    for plugin in plugins::scan_directory(dir, recursive) {
        if !plugin.is_plugin {
            continue;
        }
        println!(
            "{:<40} {:<12} {}",
            plugin.file_name,
            plugin.compatibility,
            plugin.version.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn load_owners(path: &Path) -> Result<OwnerMap> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open owners file {}", path.display()))?;
    let entries: BTreeMap<String, String> = serde_json::from_reader(file)
        .with_context(|| format!("Invalid owners file {}", path.display()))?;

    let mut owners = OwnerMap::new();
    for (relative, owner) in entries {
        owners.insert(Path::new(&relative), owner);
    }
    info!("Loaded {} owner entries", owners.len());
    Ok(owners)
}

fn run_scan(args: &ScanArgs) -> Result<()> {
    let config = args.configuration();
    let rules = ScanRules::default();
    let owners = args.owners.as_deref().map(load_owners).transpose()?;

    let mut coordinator = ScanCoordinator::new(&args.root, &config, &rules);
    if let Some(owners) = &owners {
        coordinator = coordinator.with_owners(owners);
    }
    let mut diagnostics = coordinator.run()
        .with_context(|| format!("Scan of {} failed", args.root.display()))?;

    if args.fix {
        let summary = AutoFixer::new(args.dry_run).apply_all(&mut diagnostics);
        println!(
            "Fixes: {} applied, {} skipped, {} failed",
            summary.applied, summary.skipped, summary.failed
        );
    }

    for diagnostic in &diagnostics {
        println!("{}", diagnostic);
    }

    let report = ScanReport::new(&args.root, diagnostics);
    let stats = report.get_stats();
    println!(
        "{} problems: {} errors, {} warnings, {} info",
        stats.total, stats.error, stats.warning, stats.info
    );

    if let Some(output) = &args.output {
        report.save(output)?;
        println!("Report written to {}", output.display());
    }
    Ok(())
}
