// qpcollate CLI - batch utilities for QuPath annotation exports

mod collate;
mod exit_codes;
mod rename;
mod report;
mod sum;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use qpcollate_io::IoError;
use qpcollate_pipeline::{DelimiterMode, PipelineConfig, PipelineError};

use exit_codes::{io_exit_code, pipeline_exit_code, EXIT_CONFIG, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "qpcollate")]
#[command(about = "Rename QuPath project images and collate measurement exports")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// TOML config with rename / collate / sum settings
    #[arg(long, global = true, env = "QPCOLLATE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug); QPCOLLATE_LOG overrides
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only print errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shorten image names in a QuPath project to <code>_<condition>
    #[command(after_help = "\
Examples:
  qpcollate rename
  qpcollate rename path/to/project.qpproj --dry-run
  qpcollate rename project.qpproj --strict-extension --json")]
    Rename {
        /// Project document to rewrite in place
        #[arg(default_value = "project.qpproj")]
        project: PathBuf,

        /// Only accept a literal `.ndpi` suffix
        #[arg(long)]
        strict_extension: bool,

        /// Report renames without writing the project
        #[arg(long)]
        dry_run: bool,

        /// Print the JSON report to stdout
        #[arg(long)]
        json: bool,
    },

    /// Merge measurement tables into one file using a column profile
    #[command(after_help = "\
Built-in profiles:
  collagen        Image, Region, Collagenarea_um2, Whitespace_um2, Other_um2, Area_um2
  positive-cells  Image, Region, Detections, Positive_cells, Positive_perc, Cells_per_area

Examples:
  qpcollate collate collagen
  qpcollate collate positive-cells --dir exports/ --output merged.csv
  qpcollate collate collagen --delimiter either --strict")]
    Collate {
        /// Profile name (built-in or from the config file)
        profile: String,

        #[command(flatten)]
        run: RunArgs,

        /// How each input file is split into fields
        #[arg(long, value_enum)]
        delimiter: Option<DelimiterArg>,

        /// Abort on the first malformed row or file instead of skipping it
        #[arg(long)]
        strict: bool,
    },

    /// Sum one numeric column per identifier across measurement tables
    #[command(after_help = "\
Examples:
  qpcollate sum
  qpcollate sum --dir exports/ --value-column 13
  qpcollate sum --id-column 0 --value-column 7 --delimiter comma --json")]
    Sum {
        #[command(flatten)]
        run: RunArgs,

        /// 0-based identifier column
        #[arg(long, value_name = "N")]
        id_column: Option<usize>,

        /// 0-based numeric column to sum
        #[arg(long, value_name = "N")]
        value_column: Option<usize>,

        /// How each input file is split into fields
        #[arg(long, value_enum)]
        delimiter: Option<DelimiterArg>,

        /// Treat the first line of each file as data
        #[arg(long)]
        no_header: bool,
    },

    /// List collate profiles (built-in and configured)
    Profiles,

    /// Config file tools
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Validate a config file without running anything
    Validate {
        /// Path to the TOML config
        file: PathBuf,
    },
}

/// Options shared by the table commands.
#[derive(Args)]
pub struct RunArgs {
    /// Directory holding the exported .csv files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Output file (default: profile output name inside --dir)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print the JSON report to stdout
    #[arg(long)]
    pub json: bool,

    /// Exit with code 6 when any row or file was skipped
    #[arg(long)]
    pub fail_on_skip: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DelimiterArg {
    /// Pick tab or comma per file
    Detect,
    Tab,
    Comma,
    /// Split on both tab and comma, no quoting
    Either,
}

impl From<DelimiterArg> for DelimiterMode {
    fn from(arg: DelimiterArg) -> Self {
        match arg {
            DelimiterArg::Detect => DelimiterMode::Detect,
            DelimiterArg::Tab => DelimiterMode::Tab,
            DelimiterArg::Comma => DelimiterMode::Comma,
            DelimiterArg::Either => DelimiterMode::Either,
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\npipeline: qpcollate-pipeline ", env!("CARGO_PKG_VERSION"),
        "\ntarget:   ", env!("TARGET"),
        "\nprofile:  ", env!("BUILD_PROFILE"),
    )
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_env("QPCOLLATE_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let quiet = cli.quiet;
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Rename { project, strict_extension, dry_run, json } => {
            let config = load_config(config_path)?;
            rename::cmd_rename(&config, project, strict_extension, dry_run, json, quiet)
        }
        Commands::Collate { profile, run, delimiter, strict } => {
            let config = load_config(config_path)?;
            collate::cmd_collate(&config, &profile, run, delimiter, strict, quiet)
        }
        Commands::Sum { run, id_column, value_column, delimiter, no_header } => {
            let config = load_config(config_path)?;
            sum::cmd_sum(&config, run, id_column, value_column, delimiter, no_header, quiet)
        }
        Commands::Profiles => cmd_profiles(&load_config(config_path)?),
        Commands::Config(ConfigCommands::Validate { file }) => cmd_config_validate(&file, quiet),
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Error from the transform engine, with its registry exit code.
    pub fn pipeline(err: PipelineError) -> Self {
        let code = pipeline_exit_code(&err);
        Self::new(code, err.to_string())
    }

    /// Error from file IO, with its registry exit code.
    pub fn io(err: IoError) -> Self {
        let code = io_exit_code(&err);
        Self::new(code, err.to_string())
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// config
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, CliError> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_CONFIG, format!("cannot read config {}: {e}", path.display()))
    })?;
    let config = PipelineConfig::from_toml(&raw)
        .map_err(|e| CliError::pipeline(e).with_hint(format!("check {}", path.display())))?;
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

fn cmd_config_validate(file: &Path, quiet: bool) -> Result<(), CliError> {
    let config = load_config(Some(file))?;
    if !quiet {
        eprintln!(
            "valid: {} collate profile(s), sum column {} by column {}",
            config.collate.profile_names().len(),
            config.sum.value_column,
            config.sum.id_column,
        );
    }
    Ok(())
}

fn cmd_profiles(config: &PipelineConfig) -> Result<(), CliError> {
    for name in config.collate.profile_names() {
        let profile = config.collate.profile(&name).map_err(CliError::pipeline)?;
        let columns: Vec<String> = profile
            .columns
            .iter()
            .zip(&profile.headers)
            .map(|(col, header)| format!("{col}:{header}"))
            .collect();
        println!("{name}\t{}\t{}", profile.output, columns.join(","));
    }
    Ok(())
}
