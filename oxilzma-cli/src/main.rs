//! OxiLZMA CLI - LZMA and LZMA2 decompression from the command line.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{cmd_decompress, cmd_info, cmd_test};
use std::path::PathBuf;
use tracing::Level;
use utils::InputFormat;

#[derive(Parser)]
#[command(name = "oxilzma")]
#[command(author, version, about = "Pure Rust LZMA / LZMA2 decompressor")]
#[command(long_about = "
OxiLZMA decodes .lzma (LZMA alone) files and raw LZMA2 streams.

Examples:
  oxilzma decompress data.lzma
  oxilzma decompress -k -o out/ a.lzma b.lzma c.lzma
  oxilzma decompress --format lzma2 --dict-size 8388608 chunk.bin
  oxilzma test --crc32 b24f3352 data.lzma
  oxilzma info --json data.lzma
")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompress one or more files
    #[command(alias = "d")]
    Decompress {
        /// Compressed input files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory (defaults to each input's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep input files after successful decompression
        #[arg(short, long)]
        keep: bool,

        /// Overwrite existing output files
        #[arg(short, long)]
        force: bool,

        /// Input format - detected from the extension if not specified
        #[arg(long, value_enum)]
        format: Option<InputFormat>,

        /// Dictionary size in bytes for raw LZMA2 input
        #[arg(long, default_value_t = utils::DEFAULT_LZMA2_DICT_SIZE)]
        dict_size: u32,
    },

    /// Decode files fully and check their integrity
    #[command(alias = "t")]
    Test {
        /// Compressed input files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Expected CRC-32 of the decoded data (hex)
        #[arg(long, value_parser = utils::parse_hex)]
        crc32: Option<u64>,

        /// Expected CRC-64/XZ of the decoded data (hex)
        #[arg(long, value_parser = utils::parse_hex)]
        crc64: Option<u64>,

        /// Input format - detected from the extension if not specified
        #[arg(long, value_enum)]
        format: Option<InputFormat>,

        /// Dictionary size in bytes for raw LZMA2 input
        #[arg(long, default_value_t = utils::DEFAULT_LZMA2_DICT_SIZE)]
        dict_size: u32,
    },

    /// Show stream parameters and checksums of the decoded data
    #[command(alias = "i")]
    Info {
        /// Compressed input file
        file: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Input format - detected from the extension if not specified
        #[arg(long, value_enum)]
        format: Option<InputFormat>,

        /// Dictionary size in bytes for raw LZMA2 input
        #[arg(long, default_value_t = utils::DEFAULT_LZMA2_DICT_SIZE)]
        dict_size: u32,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Decompress {
            files,
            output,
            keep,
            force,
            format,
            dict_size,
        } => cmd_decompress(&files, output.as_deref(), keep, force, format, dict_size),
        Commands::Test {
            files,
            crc32,
            crc64,
            format,
            dict_size,
        } => cmd_test(&files, crc32, crc64, format, dict_size),
        Commands::Info {
            file,
            json,
            format,
            dict_size,
        } => cmd_info(&file, json, format, dict_size),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
