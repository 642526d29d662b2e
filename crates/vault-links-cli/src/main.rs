use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::{env, fs};
use vault_links_config::Config;
use vault_links_engine::{
    Preset, RemapTable, RunSummary, WriteMode, io, is_markdown_file, process_files, process_vault,
};

mod report;

#[derive(Debug, Parser)]
#[command(
    name = "vault-links",
    version,
    about = "Convert [[bracket links]] to standard markdown links and repair their encoding"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file to use instead of ~/.config/vault-links/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show more detail (-v for progress, -vv for every document)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert bracket links, repair encoding, encode spaces (exits 2 when files changed)
    Convert(TargetArgs),
    /// Re-encode the document name of every relative link, then repair
    Normalize(TargetArgs),
    /// Collapse over-encoded links and encode remaining spaces
    Repair(TargetArgs),
    /// Normalization, bracket conversion and repair in one pass
    Full(TargetArgs),
    /// Point links at documents moved according to the [remap] config table
    Migrate(TargetArgs),
}

impl Command {
    fn into_parts(self) -> (Preset, TargetArgs) {
        match self {
            Command::Convert(args) => (Preset::Convert, args),
            Command::Normalize(args) => (Preset::Normalize, args),
            Command::Repair(args) => (Preset::Repair, args),
            Command::Full(args) => (Preset::Full, args),
            Command::Migrate(args) => (Preset::Migrate, args),
        }
    }
}

#[derive(Debug, Default, Args)]
struct TargetArgs {
    /// Markdown files to process; the whole vault when omitted
    files: Vec<PathBuf>,

    /// Vault root (defaults to the configured vault_path, then the current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,
}

/// Process exit status. `Changed` asks a git hook to stage the rewritten files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Status {
    Clean = 0,
    InvalidArgs = 1,
    Changed = 2,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    // RUST_LOG, when set, wins over the -v flags
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> Result<Status> {
    let config = load_config(cli.config.as_deref())?;

    let (preset, args) = match cli.command {
        Some(command) => command.into_parts(),
        None => (
            config
                .preset
                .parse::<Preset>()
                .context("Invalid preset in config file")?,
            TargetArgs::default(),
        ),
    };

    let root = resolve_root(args.root.as_deref(), config.vault_path.as_deref())?;
    log::info!("Running {preset} over {}", root.display());

    let remap = RemapTable::from_pairs(&config.remap).context("Invalid [remap] table in config")?;
    if preset == Preset::Migrate && remap.is_empty() {
        log::warn!("No [remap] entries configured; migrate will only repair encoding");
    }

    let mode = if args.dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Write
    };
    let pipeline = preset.pipeline(&remap);

    let summary = if args.files.is_empty() {
        process_vault(&root, &pipeline, mode)
            .with_context(|| format!("Failed to scan vault at {}", root.display()))?
    } else {
        let (targets, skipped) = resolve_targets(&args.files);
        for path in &skipped {
            eprintln!("Skipping {} (not a .md file)", path.display());
        }
        if targets.is_empty() {
            eprintln!("No valid .md files provided");
            return Ok(Status::InvalidArgs);
        }

        let mut summary = RunSummary::default();
        for (group_root, files) in group_by_root(targets, &root, args.root.is_some()) {
            summary.merge(process_files(&files, &group_root, &pipeline, mode));
        }
        summary
    };

    print!(
        "{}",
        report::Summary {
            summary: &summary,
            root: &root,
            preset,
            dry_run: args.dry_run,
        }
    );

    if summary.all_failed() {
        return Ok(Status::InvalidArgs);
    }
    Ok(exit_status(preset, &summary, mode))
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("Config file not found: {}", path.display()))?,
        None => Config::load()?.unwrap_or_default(),
    };
    Ok(config)
}

/// CLI flag, then config, then the current directory; canonicalized so file
/// arguments can be matched against it.
fn resolve_root(flag: Option<&Path>, configured: Option<&Path>) -> Result<PathBuf> {
    let root = match flag.or(configured) {
        Some(path) => path.to_path_buf(),
        None => env::current_dir().context("Cannot determine current directory")?,
    };
    io::validate_vault_dir(&root)
        .with_context(|| format!("Vault path '{}' is invalid", root.display()))?;
    fs::canonicalize(&root).with_context(|| format!("Cannot resolve {}", root.display()))
}

/// Split explicit file arguments into existing markdown files and skipped ones.
fn resolve_targets(files: &[PathBuf]) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut targets = Vec::new();
    let mut skipped = Vec::new();

    for file in files {
        match fs::canonicalize(file) {
            Ok(path) if path.is_file() && is_markdown_file(&path) => targets.push(path),
            _ => skipped.push(file.clone()),
        }
    }

    (targets, skipped)
}

/// Pair each file with the root it is processed against.
///
/// Files under `root` keep it. Unless the root was given with `--root`, a file
/// outside it is processed against its own folder.
fn group_by_root(
    targets: Vec<PathBuf>,
    root: &Path,
    root_is_explicit: bool,
) -> BTreeMap<PathBuf, Vec<PathBuf>> {
    let mut groups: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

    for target in targets {
        let group_root = match target.parent() {
            Some(folder) if !root_is_explicit && !target.starts_with(root) => folder.to_path_buf(),
            _ => root.to_path_buf(),
        };
        groups.entry(group_root).or_default().push(target);
    }

    groups
}

fn exit_status(preset: Preset, summary: &RunSummary, mode: WriteMode) -> Status {
    if preset == Preset::Convert && mode == WriteMode::Write && summary.has_changes() {
        Status::Changed
    } else {
        Status::Clean
    }
}
