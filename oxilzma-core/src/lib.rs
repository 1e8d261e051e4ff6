//! # OxiLZMA Core
//!
//! Core components shared by the OxiLZMA decoder and its tools.
//!
//! - [`cursor`]: forward-only byte cursor over compressed input
//! - [`window`]: append-only output window used for back-references
//! - [`checksum`]: CRC-32, CRC-32/BZIP2, CRC-64 and Adler-32
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ CLI: decompress / test / info                           │
//! ├─────────────────────────────────────────────────────────┤
//! │ Framing: .lzma header, LZMA2 chunks                     │
//! ├─────────────────────────────────────────────────────────┤
//! │ Codec: range decoder, bit trees, state machine, loop    │
//! ├─────────────────────────────────────────────────────────┤
//! │ Core (this crate): ByteReader, OutputWindow, checksums  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxilzma_core::checksum::Crc32;
//! use oxilzma_core::window::OutputWindow;
//!
//! let mut window = OutputWindow::new(4096);
//! window.extend_stored(b"ab");
//! window.copy_match(0, 3).unwrap();
//! assert_eq!(window.as_slice(), b"abbbb");
//!
//! assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod checksum;
pub mod cursor;
pub mod error;
pub mod window;

// Re-exports for convenience
pub use checksum::{Adler32, ChecksumKind, Crc32, Crc32Bzip2, Crc64};
pub use cursor::ByteReader;
pub use error::{ErrorKind, LzmaError, Result};
pub use window::OutputWindow;
