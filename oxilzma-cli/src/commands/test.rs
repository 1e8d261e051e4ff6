//! Test command implementation.

use crate::utils::{CliResult, InputFormat, decode_file};
use oxilzma_core::checksum::ChecksumKind;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

fn test_one(
    input: &Path,
    checks: &[(ChecksumKind, u64)],
    format: Option<InputFormat>,
    dict_size: u32,
) -> CliResult<usize> {
    let decoded = decode_file(input, format, dict_size)?;
    for &(kind, expected) in checks {
        kind.verify(&decoded.output, expected)?;
    }
    Ok(decoded.output.len())
}

pub fn cmd_test(
    files: &[PathBuf],
    crc32: Option<u64>,
    crc64: Option<u64>,
    format: Option<InputFormat>,
    dict_size: u32,
) -> CliResult<()> {
    let checks: Vec<(ChecksumKind, u64)> = [
        crc32.map(|v| (ChecksumKind::Crc32, v)),
        crc64.map(|v| (ChecksumKind::Crc64, v)),
    ]
    .into_iter()
    .flatten()
    .collect();

    let results: Vec<CliResult<usize>> = files
        .par_iter()
        .map(|input| test_one(input, &checks, format, dict_size))
        .collect();

    let mut errors: Vec<(String, String)> = Vec::new();
    for (input, result) in files.iter().zip(results) {
        match result {
            Ok(size) => println!("  OK: {} ({} bytes)", input.display(), size),
            Err(e) => {
                println!("  FAILED: {} - {}", input.display(), e);
                errors.push((input.display().to_string(), e.to_string()));
            }
        }
    }

    println!();
    println!("Test results:");
    println!("  Total files: {}", files.len());
    println!("  OK: {}", files.len() - errors.len());
    println!("  Failed: {}", errors.len());

    if !errors.is_empty() {
        std::process::exit(1);
    }

    println!();
    println!("All files OK");
    Ok(())
}
