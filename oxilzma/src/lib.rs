//! # OxiLZMA
//!
//! LZMA (Lempel-Ziv-Markov chain Algorithm) decompression.
//!
//! LZMA is a lossless data compression algorithm that provides excellent
//! compression ratios. It's used in:
//! - 7-Zip archives (.7z)
//! - XZ compressed files (.xz, as LZMA2)
//! - LZMA-compressed files (.lzma)
//!
//! ## Features
//!
//! - **Pure Rust** implementation, no `unsafe`
//! - `.lzma` files with or without an end-of-stream marker
//! - Raw LZMA streams with caller-supplied parameters
//! - Raw LZMA2 chunk streams
//! - Typed errors for every way a stream can be malformed
//!
//! ## Usage
//!
//! ```ignore
//! use oxilzma::decompress;
//!
//! let compressed = include_bytes!("data.lzma");
//! let decompressed = decompress(compressed)?;
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! bytes -> RangeDecoder -> bit trees -> LzmaDecoder -> OutputWindow
//!                                          |
//!                           State, reps, LzmaModel probabilities
//! ```
//!
//! ## LZMA Format
//!
//! An LZMA stream consists of:
//! 1. Properties byte (lc, lp, pb encoded)
//! 2. Dictionary size (4 bytes, little-endian)
//! 3. Uncompressed size (8 bytes, little-endian, 0xFFFFFFFFFFFFFFFF = unknown)
//! 4. Compressed data

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bit_tree;
pub mod decoder;
pub mod distance;
pub mod header;
pub mod length;
pub mod literal;
pub mod lzma2;
pub mod model;
pub mod range_coder;
pub mod state;

// Re-exports
pub use bit_tree::BitTreeDecoder;
pub use decoder::{LzmaDecoder, StreamEnd, decompress_raw, decompress_raw_with_options};
pub use header::{HEADER_SIZE, LzmaHeader, decompress, decompress_with_options};
pub use lzma2::{
    ChunkKind, Lzma2Decoder, ResetLevel, decompress_lzma2, decompress_lzma2_with_options,
    dict_size_from_props,
};
pub use model::{DecoderOptions, EndMarker, LzmaModel, LzmaProperties, UnpackedSize};
pub use oxilzma_core::error::{ErrorKind, LzmaError, Result};
pub use range_coder::RangeDecoder;
pub use state::{State, Transition};

use std::io::Read;

/// Read a whole `.lzma` stream from `reader` and decompress it.
///
/// Read failures surface as [`LzmaError::Io`].
pub fn decompress_reader<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    decompress(&data)
}
