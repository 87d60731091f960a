use clap::{Args, Parser, Subcommand};
use crop_scale::commands::{self, CommandError, Input, Pipeline};
use crop_scale::config::{self, RunConfig};
use crop_scale::footprint::{self, MEGABYTE, Thresholds};
use crop_scale::imaging::RustBackend;
use crop_scale::output;
use crop_scale::output_dir::OutputResolver;
use crop_scale::transform::TransformEvent;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, Sender};

#[derive(Parser)]
#[command(name = "crop-scale")]
#[command(about = "Batch crop, scale and shrink images to fit a memory footprint")]
#[command(long_about = "\
Batch crop, scale and shrink images to fit a memory footprint

Only .jpg, .jpeg and .png files are processed (case-sensitive); anything else
in a directory or list is skipped. Directories are not searched recursively.

Results are written to --output-directory, or to CropOutput/ / ScaleOutput/
next to the input (the working directory for file lists). Files with the same
name in the output directory are overwritten. Originals are never modified:
an output directory that would replace an input file is refused.

Examples:

  crop-scale crop --width 800 --height 600 dir ./photos
  crop-scale scale list --scale 50 a.jpg b.png
  crop-scale scale reduce-memory-footprint ./photos --limit-mb 1 --minimum-side 300
  crop-scale footprint 2 dir ./photos

Run 'crop-scale gen-config' to print a documented crop-scale.toml.")]
#[command(version = env!("CROP_SCALE_VERSION"))]
struct Cli {
    /// Print source and result dimensions for every file
    #[arg(long, global = true)]
    verbose: bool,

    /// Config file (default: ./crop-scale.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Center-crop images to a fixed width and height
    Crop(CropArgs),
    /// Scale images by a percentage, or to fit a byte budget
    Scale(ScaleArgs),
    /// List the files at or above a size limit in megabytes
    Footprint(FootprintArgs),
    /// Print a stock crop-scale.toml with all options documented
    GenConfig,
}

/// Where the images come from.
#[derive(Subcommand, Clone)]
enum Target {
    /// Absolute paths, or paths relative to the working directory
    List { files: Vec<PathBuf> },
    /// Every image directly inside a directory
    Dir { directory: PathBuf },
}

impl From<Target> for Input {
    fn from(target: Target) -> Self {
        match target {
            Target::List { files } => Input::Files(files),
            Target::Dir { directory } => Input::Directory(directory),
        }
    }
}

#[derive(Args)]
struct CropArgs {
    /// Crop width in pixels
    #[arg(long)]
    width: Option<u32>,
    /// Crop height in pixels
    #[arg(long)]
    height: Option<u32>,
    /// Output directory (default: CropOutput/ next to the input)
    #[arg(long)]
    output_directory: Option<PathBuf>,
    #[command(subcommand)]
    target: Target,
}

#[derive(Args)]
struct ScaleArgs {
    /// Output directory (default: ScaleOutput/ next to the input)
    #[arg(long)]
    output_directory: Option<PathBuf>,
    #[command(subcommand)]
    mode: ScaleMode,
}

#[derive(Subcommand)]
enum ScaleMode {
    /// Scale a list of files by a percentage
    List {
        /// Percentage to scale (50 = half size)
        #[arg(long)]
        scale: u32,
        files: Vec<PathBuf>,
    },
    /// Scale every image in a directory by a percentage
    Dir {
        directory: PathBuf,
        /// Percentage to scale (50 = half size)
        #[arg(long)]
        scale: u32,
    },
    /// Shrink images over a size limit; optionally grow images below a minimum side
    ReduceMemoryFootprint {
        directory: PathBuf,
        /// Limit in megabytes (1 MB = 1,000,000 bytes)
        #[arg(long)]
        limit_mb: u64,
        /// Width and height should each be at least this many pixels
        #[arg(long)]
        minimum_side: Option<u32>,
        /// Print the plan without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Print the plan as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct FootprintArgs {
    /// Limit in megabytes (1 MB = 1,000,000 bytes)
    limit: u64,
    /// Print the split as JSON
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    target: Target,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "crop_scale=debug" } else { "crop_scale=warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let backend = RustBackend::new();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Crop(args) => {
            let (cwd, run) = prepare(cli.config.as_deref(), cli.verbose)?;
            let size = commands::crop_size(args.width, args.height)?;
            let input = Input::from(args.target);
            let mut resolver = OutputResolver::new(args.output_directory);
            let out = with_printer(run.verbose, |tx| {
                Pipeline::new(&backend, &cwd, run)
                    .with_events(tx)
                    .crop(&input, size, &mut resolver)
            })?;
            println!("==> Cropped into {}", out.display());
        }
        Command::Scale(ScaleArgs {
            output_directory,
            mode,
        }) => {
            let (cwd, run) = prepare(cli.config.as_deref(), cli.verbose)?;
            let mut resolver = OutputResolver::new(output_directory);
            match mode {
                ScaleMode::List { scale, files } => {
                    scale_by_percent(&backend, &cwd, run, Input::Files(files), scale, &mut resolver)?;
                }
                ScaleMode::Dir { directory, scale } => {
                    let input = Input::Directory(directory);
                    scale_by_percent(&backend, &cwd, run, input, scale, &mut resolver)?;
                }
                ScaleMode::ReduceMemoryFootprint {
                    directory,
                    limit_mb,
                    minimum_side,
                    dry_run,
                    json,
                } => {
                    let thresholds = Thresholds::from_megabytes(limit_mb, minimum_side);
                    let partition =
                        Pipeline::new(&backend, &cwd, run).plan_footprint(&directory, thresholds)?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&partition)?);
                    } else {
                        output::print_partition_report(&partition);
                    }
                    if !dry_run {
                        let out = with_printer(run.verbose, |tx| {
                            Pipeline::new(&backend, &cwd, run)
                                .with_events(tx)
                                .apply_footprint(&partition, &directory, &mut resolver)
                        })?;
                        println!("==> Footprint reduced into {}", out.display());
                    }
                }
            }
        }
        Command::Footprint(args) => {
            let (cwd, run) = prepare(cli.config.as_deref(), cli.verbose)?;
            let byte_limit = args.limit.saturating_mul(MEGABYTE);
            let images = Pipeline::new(&backend, &cwd, run).footprint(&args.target.into(), byte_limit)?;
            let (above, below) = footprint::files_above(&images, byte_limit);
            if args.json {
                let report = serde_json::json!({
                    "byte_limit": byte_limit,
                    "above": above,
                    "below": below,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_footprint_report(&above, &below, byte_limit);
            }
        }
    }

    Ok(())
}

/// Load the config, merge the CLI flags and size the rayon pool.
fn prepare(
    config_path: Option<&std::path::Path>,
    verbose: bool,
) -> Result<(PathBuf, RunConfig), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let tool_config = config::load_config(config_path, &cwd)?;
    let run = RunConfig::new(&tool_config, verbose);
    init_thread_pool(run.threads);
    Ok((cwd, run))
}

fn scale_by_percent(
    backend: &RustBackend,
    cwd: &std::path::Path,
    run: RunConfig,
    input: Input,
    percent: u32,
    resolver: &mut OutputResolver,
) -> Result<(), Box<dyn std::error::Error>> {
    let ratio = commands::percent_ratio(percent)?;
    let out = with_printer(run.verbose, |tx| {
        Pipeline::new(backend, cwd, run)
            .with_events(tx)
            .scale(&input, ratio, resolver)
    })?;
    println!("==> Scaled into {}", out.display());
    Ok(())
}

/// Run `f` while a background thread prints its transform events.
///
/// The sender is moved into `f`, so the printer drains and exits once `f`
/// returns and drops its pipeline.
fn with_printer<T>(
    verbose: bool,
    f: impl FnOnce(Sender<TransformEvent>) -> Result<T, CommandError>,
) -> Result<T, Box<dyn std::error::Error>> {
    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_transform_event(&event, verbose) {
                println!("{}", line);
            }
        }
    });
    let result = f(tx);
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    Ok(result?)
}

/// Initialize the rayon thread pool with the configured worker count.
fn init_thread_pool(threads: usize) {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
