//! OxiTape CLI - The Oxidized Tape Reader
//!
//! Lists and restores Microsoft Tape Format backups from tape devices, raw
//! images and SIMH tape images.

mod commands;
mod utils;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use commands::{ExtractOptions, ListOptions, cmd_detect, cmd_extract, cmd_info, cmd_list};
use oxitape_core::CaseFolding;
use oxitape_mtf::{MAX_TAPE_BLOCK_SIZE, MIN_TAPE_BLOCK_SIZE, ReadOptions, TapeFormat};
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable holding default arguments.
const ENV_OPTIONS: &str = "MTF_OPTS";

/// Written after every block read in debug mode.
const LAST_BLOCK_DUMP: &str = "lastblock.dmp";

#[derive(Parser)]
#[command(name = "oxitape")]
#[command(
    author,
    version,
    about = "The Oxidized Tape Reader - Pure Rust MTF backup reader"
)]
#[command(long_about = "
OxiTape reads Microsoft Tape Format (MTF) backups, as written by Windows NT
Backup and compatible software, from tape devices and tape images.

Default arguments can be placed in the MTF_OPTS environment variable.

Examples:
  oxitape list /dev/nst0
  oxitape list backup.tap -s 2 --json
  oxitape extract /dev/nst0 -o restore 'docs/.*\\.txt$'
  oxitape extract backup.tap -c lower -b 16384
  oxitape info backup.tap
  oxitape detect backup.tap
")]
struct Cli {
    #[command(flatten)]
    read: ReadArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads a tape.
#[derive(Args)]
struct ReadArgs {
    /// Log blocks and names as they are read (-vv dumps every field)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Trace every block read and write each block to lastblock.dmp
    #[arg(short = 'D', long, global = true)]
    debug: bool,

    /// Physical block size in bytes (detected when omitted)
    #[arg(short = 'b', long = "block-size", global = true, value_parser = parse_block_size)]
    block_size: Option<usize>,

    /// Data set to read, or '*' for all
    #[arg(short = 's', long = "set", global = true, default_value = "*", value_parser = parse_set)]
    set: DataSetArg,

    /// Case folding applied to restored paths
    #[arg(short = 'c', long = "case", global = true, value_enum, default_value = "none")]
    case: CaseArg,

    /// Fail on descriptor and stream header checksum mismatches
    #[arg(long, global = true)]
    verify_checksums: bool,

    /// Tape image layout
    #[arg(short = 'f', long, global = true, value_enum, default_value = "auto")]
    format: FormatArg,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of a tape
    #[command(alias = "l")]
    List {
        /// Tape device or image
        tape: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Only list files whose path matches one of these regular expressions
        patterns: Vec<String>,
    },

    /// Extract files from a tape
    #[command(alias = "x")]
    Extract {
        /// Tape device or image
        tape: PathBuf,

        /// Output directory (must exist)
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Only extract files whose path matches one of these regular expressions
        patterns: Vec<String>,

        /// Hide the progress spinner
        #[arg(long)]
        no_progress: bool,

        /// Do not restore file timestamps
        #[arg(long)]
        no_times: bool,
    },

    /// Show information about a tape
    #[command(alias = "i")]
    Info {
        /// Tape device or image
        tape: PathBuf,
    },

    /// Detect tape image format
    Detect {
        /// File to detect
        file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Data set selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataSetArg {
    All,
    Number(u16),
}

/// Case folding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CaseArg {
    /// Keep names as recorded
    None,
    /// Fold to lower case
    Lower,
    /// Fold to upper case
    Upper,
}

impl From<CaseArg> for CaseFolding {
    fn from(arg: CaseArg) -> Self {
        match arg {
            CaseArg::None => Self::None,
            CaseArg::Lower => Self::Lower,
            CaseArg::Upper => Self::Upper,
        }
    }
}

/// Tape image layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Sniff regular files, read devices raw
    Auto,
    /// Raw MTF stream
    Raw,
    /// SIMH .tap image
    Simh,
}

impl FormatArg {
    fn tape_format(self) -> Option<TapeFormat> {
        match self {
            Self::Auto => None,
            Self::Raw => Some(TapeFormat::Mtf),
            Self::Simh => Some(TapeFormat::Simh),
        }
    }
}

fn parse_block_size(s: &str) -> Result<usize, String> {
    let size: usize = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if !(MIN_TAPE_BLOCK_SIZE..=MAX_TAPE_BLOCK_SIZE).contains(&size) {
        return Err(format!(
            "block size must be between {} and {}",
            MIN_TAPE_BLOCK_SIZE, MAX_TAPE_BLOCK_SIZE
        ));
    }
    Ok(size)
}

fn parse_set(s: &str) -> Result<DataSetArg, String> {
    if s == "*" {
        return Ok(DataSetArg::All);
    }
    match s.parse::<u16>() {
        Ok(n) if n >= 1 => Ok(DataSetArg::Number(n)),
        _ => Err(format!("'{}' is not a data set number or '*'", s)),
    }
}

impl ReadArgs {
    fn read_options(&self) -> ReadOptions {
        let mut options = ReadOptions::new()
            .case_folding(self.case.into())
            .verify_checksums(self.verify_checksums);
        if let Some(size) = self.block_size {
            options = options.block_size(size);
        }
        if let DataSetArg::Number(n) = self.set {
            options = options.data_set(n);
        }
        if self.debug {
            options = options.dump_last_block(LAST_BLOCK_DUMP);
        }
        options
    }

    fn log_level(&self) -> log::LevelFilter {
        if self.debug {
            return log::LevelFilter::Trace;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

/// Command line with the words of `MTF_OPTS` inserted after the program name.
fn args_with_env_defaults() -> Vec<OsString> {
    let mut args: Vec<OsString> = std::env::args_os().collect();
    if let Ok(extra) = std::env::var(ENV_OPTIONS) {
        let at = args.len().min(1);
        args.splice(at..at, extra.split_whitespace().map(OsString::from));
    }
    args
}

fn main() {
    let cli = Cli::parse_from(args_with_env_defaults());

    env_logger::Builder::new()
        .filter_level(cli.read.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    let format = cli.read.format.tape_format();
    let read = cli.read.read_options();
    let quiet = cli.read.verbose == 0 && !cli.read.debug;

    let result = match cli.command {
        Commands::List {
            tape,
            json,
            patterns,
        } => cmd_list(
            &tape,
            ListOptions {
                verbose: cli.read.verbose > 0,
                json,
                patterns: &patterns,
                format,
                read,
            },
        ),
        Commands::Extract {
            tape,
            output,
            patterns,
            no_progress,
            no_times,
        } => cmd_extract(
            &tape,
            ExtractOptions {
                output: &output,
                patterns: &patterns,
                progress: quiet && !no_progress,
                preserve_times: !no_times,
                format,
                read,
            },
        ),
        Commands::Info { tape } => cmd_info(&tape, format, read),
        Commands::Detect { file } => cmd_detect(&file),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "oxitape", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
