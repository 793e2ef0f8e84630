//! fedsplit: federated partitioning for VisDrone-style detection datasets.
//!
//! fedsplit takes a dataset with `images/{train,val}` and per-image
//! comma-separated `annotations/{train,val}` and produces a federated layout:
//! a `server` bucket holding the validation data and `client1..clientN`
//! buckets sharing the training data, each with YOLO label files, plus a
//! per-class, per-bucket object distribution CSV.
//!
//! # Modules
//!
//! - [`split`]: reproducible assignment of files to buckets
//! - [`annotation`]: source row parsing, filtering and YOLO conversion
//! - [`distribution`]: the per-class, per-bucket count table
//! - [`pipeline`]: orchestration and run reports
//! - [`layout`], [`classes`], [`geom`]: supporting types
//! - [`error`]: error types for fedsplit operations

pub mod annotation;
pub mod classes;
pub mod distribution;
pub mod error;
pub mod geom;
pub mod layout;
pub mod pipeline;
pub mod split;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

pub use error::FedsplitError;

use geom::{ImageSize, ResolutionPolicy, DEFAULT_RESOLUTION};
use layout::Subset;
use pipeline::ConvertOptions;
use split::DEFAULT_SEED;

/// The fedsplit CLI application.
#[derive(Parser)]
#[command(name = "fedsplit")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log debug messages, including one line per file.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Split and convert a dataset into server and client partitions.
    Convert(ConvertArgs),
    /// Print the bucket assignment for one subset without writing anything.
    Plan(PlanArgs),
}

/// Report format for the convert subcommand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Source dataset root; must contain images/ and annotations/.
    #[arg(long, env = "FEDSPLIT_SRC", default_value = "./VisDrone2019")]
    src: PathBuf,

    /// Output root; server/ and client<k>/ are created inside it.
    #[arg(long, env = "FEDSPLIT_DST", default_value = "./VisDrone")]
    dst: PathBuf,

    /// Class list: a data.yaml with `names`, or a classes.txt.
    #[arg(long, env = "FEDSPLIT_DATA", default_value = "../data/VisDrone.yaml")]
    data: PathBuf,

    /// Number of federated clients.
    #[arg(long, default_value_t = 10, value_parser = parse_client_count)]
    nclients: usize,

    /// Seed for the training shuffle.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Normalize every box against this size instead of reading image headers.
    #[arg(long, value_name = "WxH")]
    fixed_resolution: Option<ImageSize>,

    /// Size to use when an image header cannot be read.
    #[arg(long, value_name = "WxH", default_value_t = DEFAULT_RESOLUTION)]
    fallback_resolution: ImageSize,

    /// Report format.
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,
}

/// Arguments for the plan subcommand.
#[derive(clap::Args)]
struct PlanArgs {
    /// Source dataset root; must contain images/ and annotations/.
    #[arg(long, env = "FEDSPLIT_SRC", default_value = "./VisDrone2019")]
    src: PathBuf,

    /// Subset to plan.
    #[arg(long, value_enum, default_value = "train")]
    subset: Subset,

    /// Number of federated clients.
    #[arg(long, default_value_t = 10, value_parser = parse_client_count)]
    nclients: usize,

    /// Seed for the training shuffle.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

fn parse_client_count(raw: &str) -> Result<usize, String> {
    let n: usize = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a valid client count"))?;
    if n == 0 {
        return Err("at least one client is required".to_string());
    }
    Ok(n)
}

/// Run the fedsplit CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), FedsplitError> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Plan(args)) => run_plan(args),
        None => {
            println!("fedsplit {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Federated partitioning for VisDrone-style detection datasets.");
            println!();
            println!("Run 'fedsplit --help' for usage information.");
            Ok(())
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default level, the
/// `--verbose`/`--quiet` flags override both.
fn init_logging(verbose: bool, quiet: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(LevelFilter::Info).parse_default_env();

    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if quiet {
        builder.filter_level(LevelFilter::Warn);
    }

    // Already initialized when run() is called more than once in-process.
    let _ = builder.try_init();
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), FedsplitError> {
    let resolution = match args.fixed_resolution {
        Some(size) => ResolutionPolicy::Fixed(size),
        None => ResolutionPolicy::Measured {
            fallback: args.fallback_resolution,
        },
    };

    let opts = ConvertOptions {
        src: args.src,
        dst: args.dst,
        class_list: args.data,
        nclients: args.nclients,
        seed: args.seed,
        resolution,
    };

    let report = pipeline::convert_dataset(&opts)?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", report),
    }

    Ok(())
}

/// Execute the plan subcommand.
fn run_plan(args: PlanArgs) -> Result<(), FedsplitError> {
    let assignment = pipeline::plan_subset(&args.src, args.subset, args.nclients, args.seed)?;
    println!("{}", serde_json::to_string_pretty(&assignment)?);
    Ok(())
}
