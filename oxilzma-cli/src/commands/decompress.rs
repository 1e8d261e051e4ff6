//! Decompress command implementation.

use crate::utils::{CliResult, InputFormat, decode_file, format_size, output_path};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

struct Written {
    output: PathBuf,
    size: u64,
}

pub fn cmd_decompress(
    files: &[PathBuf],
    output_dir: Option<&Path>,
    keep: bool,
    force: bool,
    format: Option<InputFormat>,
    dict_size: u32,
) -> CliResult<()> {
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;
    }

    // Every file is an independent decoding session
    let results: Vec<CliResult<Written>> = files
        .par_iter()
        .map(|input| decompress_one(input, output_dir, keep, force, format, dict_size))
        .collect();

    let mut failed = 0usize;
    for (input, result) in files.iter().zip(results) {
        match result {
            Ok(written) => println!(
                "{} -> {} ({})",
                input.display(),
                written.output.display(),
                format_size(written.size)
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}", input.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} file(s) failed", files.len()).into());
    }
    Ok(())
}

fn decompress_one(
    input: &Path,
    output_dir: Option<&Path>,
    keep: bool,
    force: bool,
    format: Option<InputFormat>,
    dict_size: u32,
) -> CliResult<Written> {
    let format = format.unwrap_or_else(|| InputFormat::from_path(input));
    let output = output_path(input, format, output_dir);

    if output.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            output.display()
        )
        .into());
    }

    let decoded = decode_file(input, Some(format), dict_size)?;
    std::fs::write(&output, &decoded.output)?;
    debug!(output = %output.display(), size = decoded.output.len(), "wrote");

    if !keep {
        if let Err(e) = std::fs::remove_file(input) {
            warn!(input = %input.display(), error = %e, "could not remove input");
        }
    }

    Ok(Written {
        output,
        size: decoded.output.len() as u64,
    })
}
