//! Shared helpers: input format detection, file decoding and output naming.

use clap::ValueEnum;
use oxilzma::{LzmaHeader, decompress, decompress_lzma2};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Error type shared by all commands; `Send` so results cross rayon workers.
pub type CliError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for command functions.
pub type CliResult<T> = Result<T, CliError>;

/// LZMA2 streams carry no header, so the dictionary size has to be given.
/// 64 MiB covers every xz preset.
pub const DEFAULT_LZMA2_DICT_SIZE: u32 = 64 * 1024 * 1024;

/// Container format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// `.lzma` file: 13-byte header followed by an LZMA stream
    Lzma,
    /// Raw LZMA2 chunk stream
    Lzma2,
}

impl InputFormat {
    /// Detect from the file extension, falling back to `.lzma`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("lzma2") => Self::Lzma2,
            _ => Self::Lzma,
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Lzma => "lzma",
            Self::Lzma2 => "lzma2",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lzma => write!(f, "LZMA"),
            Self::Lzma2 => write!(f, "LZMA2"),
        }
    }
}

/// A fully decoded input file.
pub struct Decoded {
    pub format: InputFormat,
    /// Present for `.lzma` input only.
    pub header: Option<LzmaHeader>,
    pub compressed_size: u64,
    pub output: Vec<u8>,
}

impl Decoded {
    /// Compressed size as a percentage of the decoded size.
    pub fn ratio(&self) -> Option<f64> {
        if self.output.is_empty() {
            None
        } else {
            Some(self.compressed_size as f64 / self.output.len() as f64 * 100.0)
        }
    }
}

/// Read and decode one file.
pub fn decode_file(path: &Path, format: Option<InputFormat>, dict_size: u32) -> CliResult<Decoded> {
    let format = format.unwrap_or_else(|| InputFormat::from_path(path));
    let data = std::fs::read(path)?;
    info!(path = %path.display(), %format, size = data.len(), "decoding");

    let (header, output) = match format {
        InputFormat::Lzma => (Some(LzmaHeader::from_bytes(&data)?), decompress(&data)?),
        InputFormat::Lzma2 => (None, decompress_lzma2(&data, dict_size)?),
    };

    Ok(Decoded {
        format,
        header,
        compressed_size: data.len() as u64,
        output,
    })
}

/// Output path for `input`: the format suffix is stripped, or `.out`
/// appended when the name carries no such suffix.
pub fn output_path(input: &Path, format: InputFormat, dir: Option<&Path>) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    let has_suffix = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(format.extension()));

    let name = match (has_suffix, input.file_stem()) {
        (true, Some(stem)) => stem.to_string_lossy().into_owned(),
        _ => format!("{file_name}.out"),
    };

    match dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// Parse a hexadecimal checksum, with or without a `0x` prefix.
pub fn parse_hex(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value '{s}': {e}"))
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
