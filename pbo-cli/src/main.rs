//! pbo CLI - create, list and extract PBO archives
//!
//! Flags follow the tar convention: exactly one of `-c`, `-t` or `-x`,
//! with the archive named by `-f` (`-` for standard input/output).

mod commands;
mod utils;

use clap::{ArgGroup, Parser};
use commands::{CreateArgs, ExtractArgs, ListArgs, cmd_create, cmd_extract, cmd_list};
use pbo_core::{PboError, ReadLimits};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use utils::{compile_patterns, parse_property};

#[derive(Parser, Debug)]
#[command(name = "pbo")]
#[command(author, version, about = "Create, list and extract PBO archives")]
#[command(long_about = "
pbo packs directory trees into PBO (\"packed bank of files\") archives and
unpacks them again.

Examples:
  pbo -cf addon.pbo addon/
  pbo -c -T --property prefix=x\\addon -f addon.pbo addon/
  pbo -tvf addon.pbo
  pbo -xf addon.pbo -C out/
  cat addon.pbo | pbo -tf -
")]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["list", "extract", "create"]),
))]
struct Cli {
    /// List the archive's files
    #[arg(short = 't', long)]
    list: bool,

    /// Extract the archive's files
    #[arg(short = 'x', long)]
    extract: bool,

    /// Create an archive from FILES
    #[arg(short = 'c', long)]
    create: bool,

    /// Archive file ("-" for standard input/output)
    #[arg(short = 'f', long = "file", value_name = "ARCHIVE")]
    file: PathBuf,

    /// Store (create) or restore (extract) modification times
    #[arg(short = 'T', long)]
    timestamps: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Directory to extract into
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    directory: PathBuf,

    /// Show a progress bar
    #[arg(short = 'P', long)]
    progress: bool,

    /// Output the listing as JSON (machine-readable)
    #[arg(long)]
    json: bool,

    /// Metadata property to store (repeatable)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_property)]
    properties: Vec<(String, String)>,

    /// Include only files matching pattern (glob syntax: *.paa, data/**/*)
    #[arg(short = 'I', long)]
    include: Vec<String>,

    /// Exclude files matching pattern (glob syntax)
    #[arg(short = 'X', long)]
    exclude: Vec<String>,

    /// Read header strings of any length instead of the fixed bounds
    #[arg(long)]
    unbounded: bool,

    /// Files and directories to archive
    files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    List,
    Extract,
    Create,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.create {
            Mode::Create
        } else if self.extract {
            Mode::Extract
        } else {
            Mode::List
        }
    }

    fn limits(&self) -> ReadLimits {
        if self.unbounded {
            ReadLimits::UNBOUNDED
        } else {
            ReadLimits::BOUNDED
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("pbo: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mode = cli.mode();
    tracing::debug!(?mode, archive = %cli.file.display(), "starting");

    if mode != Mode::Create && !cli.files.is_empty() {
        let err = PboError::invalid_argument("file operands are only valid with --create");
        return Err(err.into());
    }

    let include = compile_patterns(&cli.include)?;
    let exclude = compile_patterns(&cli.exclude)?;

    match mode {
        Mode::List => cmd_list(
            &cli.file,
            &ListArgs {
                verbose: cli.verbose,
                json: cli.json,
                include: &include,
                exclude: &exclude,
                limits: cli.limits(),
            },
        ),
        Mode::Extract => cmd_extract(
            &cli.file,
            &ExtractArgs {
                directory: &cli.directory,
                timestamps: cli.timestamps,
                verbose: cli.verbose,
                progress: cli.progress,
                include: &include,
                exclude: &exclude,
                limits: cli.limits(),
            },
        ),
        Mode::Create => cmd_create(
            &cli.file,
            &CreateArgs {
                files: &cli.files,
                timestamps: cli.timestamps,
                verbose: cli.verbose,
                progress: cli.progress,
                properties: &cli.properties,
            },
        ),
    }
}
