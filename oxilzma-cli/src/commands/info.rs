//! Info command implementation.

use crate::utils::{CliResult, Decoded, InputFormat, decode_file, format_size};
use oxilzma_core::checksum::ChecksumKind;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct HeaderInfo {
    lc: u32,
    lp: u32,
    pb: u32,
    dict_size: u32,
    /// `None` when the stream ends with a marker instead.
    declared_size: Option<u64>,
}

#[derive(Serialize)]
struct ChecksumInfo {
    algorithm: &'static str,
    value: String,
}

#[derive(Serialize)]
struct FileInfo {
    file: String,
    format: String,
    header: Option<HeaderInfo>,
    compressed_size: u64,
    decoded_size: u64,
    ratio_percent: Option<f64>,
    checksums: Vec<ChecksumInfo>,
}

impl FileInfo {
    fn new(path: &Path, decoded: &Decoded) -> Self {
        let header = decoded.header.map(|h| HeaderInfo {
            lc: h.props.lc,
            lp: h.props.lp,
            pb: h.props.pb,
            dict_size: h.dict_size,
            declared_size: h.unpacked_size.known(),
        });

        let checksums = ChecksumKind::ALL
            .into_iter()
            .map(|kind| {
                let value = kind.compute(&decoded.output);
                ChecksumInfo {
                    algorithm: kind.name(),
                    value: match kind {
                        ChecksumKind::Crc64 => format!("{value:016x}"),
                        _ => format!("{value:08x}"),
                    },
                }
            })
            .collect();

        Self {
            file: path.display().to_string(),
            format: decoded.format.to_string(),
            header,
            compressed_size: decoded.compressed_size,
            decoded_size: decoded.output.len() as u64,
            ratio_percent: decoded.ratio(),
            checksums,
        }
    }

    fn print(&self) {
        println!("Stream Information");
        println!("==================");
        println!("File: {}", self.file);
        println!("Format: {}", self.format);

        if let Some(header) = &self.header {
            println!();
            println!("Header:");
            println!(
                "  Properties: lc={} lp={} pb={}",
                header.lc, header.lp, header.pb
            );
            println!(
                "  Dictionary size: {} ({} bytes)",
                format_size(header.dict_size as u64),
                header.dict_size
            );
            match header.declared_size {
                Some(size) => println!("  Declared size: {} bytes", size),
                None => println!("  Declared size: unknown (end marker)"),
            }
        }

        println!();
        println!("Contents:");
        println!("  Compressed size: {} bytes", self.compressed_size);
        println!("  Decoded size: {} bytes", self.decoded_size);
        if let Some(ratio) = self.ratio_percent {
            println!("  Compression ratio: {:.1}%", ratio);
        }

        println!();
        println!("Checksums:");
        for checksum in &self.checksums {
            println!("  {:<12} {}", checksum.algorithm, checksum.value);
        }
    }
}

pub fn cmd_info(
    path: &Path,
    json: bool,
    format: Option<InputFormat>,
    dict_size: u32,
) -> CliResult<()> {
    let decoded = decode_file(path, format, dict_size)?;
    let info = FileInfo::new(path, &decoded);

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        info.print();
    }
    Ok(())
}
