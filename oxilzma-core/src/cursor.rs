//! Forward-only byte cursor over an in-memory buffer.
//!
//! The decoder never seeks backward in its input. `ByteReader` exposes the
//! two primitives it needs, "next byte or nothing" and "bytes remaining",
//! plus the fixed-width field reads used by container headers and LZMA2
//! chunk framing.
//!
//! # Example
//!
//! ```
//! use oxilzma_core::cursor::ByteReader;
//!
//! let data = [0x5D, 0x00, 0x00, 0x10, 0x00, 0xAA];
//! let mut reader = ByteReader::new(&data);
//!
//! assert_eq!(reader.read_byte().unwrap(), 0x5D);
//! assert_eq!(reader.read_u32_le().unwrap(), 0x0010_0000);
//! assert_eq!(reader.remaining(), 1);
//! ```

use crate::error::{LzmaError, Result};

/// A forward-only reader over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Next byte, or `None` once the input is exhausted.
    #[inline]
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    /// Next byte, failing with `UnexpectedEof` if the input is exhausted.
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        self.next_byte().ok_or(LzmaError::unexpected_eof(1))
    }

    /// Read exactly `N` bytes.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    /// Read a big-endian `u16`.
    pub fn read_u16_be(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian `u64`.
    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(LzmaError::unexpected_eof(len - remaining));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Number of bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether every byte has been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Number of bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unconsumed tail of the input.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}
