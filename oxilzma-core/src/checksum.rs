//! Checksums used by containers that embed LZMA streams.
//!
//! The decoder itself never computes these; callers run them over the
//! decoded output to verify integrity against a value stored by the
//! container:
//!
//! - **CRC-32 (ISO-HDLC)**: `.7z`, ZIP, gzip
//! - **CRC-32/BZIP2**: MSB-first variant of the same polynomial
//! - **CRC-64/XZ (ECMA-182)**: `.xz` stream checks
//! - **Adler-32**: zlib-style containers
//!
//! CRC-32 and CRC-64 use slicing-by-8 for inputs of 16 bytes or more.
//! All lookup tables are built at compile time.

use crate::error::{LzmaError, Result};
use std::fmt;

const CRC32_POLY: u32 = 0xEDB8_8320;
const CRC32_BZIP2_POLY: u32 = 0x04C1_1DB7;
const CRC64_POLY: u64 = 0xC96C_5795_D787_0F42;
const ADLER_MOD: u32 = 65521;
/// Largest block for which Adler-32 sums cannot overflow a `u32`.
const ADLER_NMAX: usize = 5552;

const CRC32_TABLE_SLICE: [[u32; 256]; 8] = {
    let mut tables = [[0u32; 256]; 8];

    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ CRC32_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        tables[0][i] = crc;
        i += 1;
    }

    let mut t = 1;
    while t < 8 {
        let mut i = 0usize;
        while i < 256 {
            let prev = tables[t - 1][i];
            tables[t][i] = tables[0][(prev & 0xFF) as usize] ^ (prev >> 8);
            i += 1;
        }
        t += 1;
    }

    tables
};

/// MSB-first table; index is the top byte of the register XOR the input.
const CRC32_BZIP2_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut j = 0;
        while j < 8 {
            if crc & 0x8000_0000 != 0 {
                crc = (crc << 1) ^ CRC32_BZIP2_POLY;
            } else {
                crc <<= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

const CRC64_TABLE_SLICE: [[u64; 256]; 8] = {
    let mut tables = [[0u64; 256]; 8];

    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u64;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ CRC64_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        tables[0][i] = crc;
        i += 1;
    }

    let mut t = 1;
    while t < 8 {
        let mut i = 0usize;
        while i < 256 {
            let prev = tables[t - 1][i];
            tables[t][i] = tables[0][(prev & 0xFF) as usize] ^ (prev >> 8);
            i += 1;
        }
        t += 1;
    }

    tables
};

/// CRC-32 calculator (ISO-HDLC).
///
/// # Example
///
/// ```
/// use oxilzma_core::checksum::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"Hello, ");
/// crc.update(b"World!");
/// assert_eq!(crc.finalize(), 0xEC4AC3D0);
/// ```
#[derive(Debug, Clone)]
pub struct Crc32 {
    crc: u32,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub fn new() -> Self {
        Self { crc: 0xFFFF_FFFF }
    }

    /// Update the CRC with more data.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        let mut c = self.crc;
        let tail = if data.len() >= 16 {
            let mut chunks = data.chunks_exact(8);
            for bytes in &mut chunks {
                let lo = c ^ u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                c = CRC32_TABLE_SLICE[7][(lo & 0xFF) as usize]
                    ^ CRC32_TABLE_SLICE[6][((lo >> 8) & 0xFF) as usize]
                    ^ CRC32_TABLE_SLICE[5][((lo >> 16) & 0xFF) as usize]
                    ^ CRC32_TABLE_SLICE[4][(lo >> 24) as usize]
                    ^ CRC32_TABLE_SLICE[3][bytes[4] as usize]
                    ^ CRC32_TABLE_SLICE[2][bytes[5] as usize]
                    ^ CRC32_TABLE_SLICE[1][bytes[6] as usize]
                    ^ CRC32_TABLE_SLICE[0][bytes[7] as usize];
            }
            chunks.remainder()
        } else {
            data
        };
        for &byte in tail {
            c = CRC32_TABLE_SLICE[0][((c ^ byte as u32) & 0xFF) as usize] ^ (c >> 8);
        }
        self.crc = c;
    }

    /// Finalize and return the CRC value.
    #[inline(always)]
    pub fn finalize(self) -> u32 {
        self.crc ^ 0xFFFF_FFFF
    }

    /// Compute CRC-32 for a slice in one call.
    pub fn compute(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// CRC-32/BZIP2 calculator (non-reflected, MSB-first).
#[derive(Debug, Clone)]
pub struct Crc32Bzip2 {
    crc: u32,
}

impl Crc32Bzip2 {
    /// Create a new calculator.
    pub fn new() -> Self {
        Self { crc: 0xFFFF_FFFF }
    }

    /// Update the CRC with more data.
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            let index = ((self.crc >> 24) ^ byte as u32) as usize;
            self.crc = (self.crc << 8) ^ CRC32_BZIP2_TABLE[index];
        }
    }

    /// Finalize and return the CRC value.
    pub fn finalize(self) -> u32 {
        !self.crc
    }

    /// Compute CRC-32/BZIP2 for a slice in one call.
    pub fn compute(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Crc32Bzip2 {
    fn default() -> Self {
        Self::new()
    }
}

/// CRC-64/XZ calculator (ECMA-182 polynomial, reflected).
#[derive(Debug, Clone)]
pub struct Crc64 {
    crc: u64,
}

impl Crc64 {
    /// Create a new CRC-64 calculator.
    pub fn new() -> Self {
        Self { crc: u64::MAX }
    }

    /// Update the CRC with more data.
    pub fn update(&mut self, data: &[u8]) {
        let mut c = self.crc;
        let tail = if data.len() >= 16 {
            let mut chunks = data.chunks_exact(8);
            for bytes in &mut chunks {
                let mut word = [0u8; 8];
                word.copy_from_slice(bytes);
                let x = c ^ u64::from_le_bytes(word);
                c = CRC64_TABLE_SLICE[7][(x & 0xFF) as usize]
                    ^ CRC64_TABLE_SLICE[6][((x >> 8) & 0xFF) as usize]
                    ^ CRC64_TABLE_SLICE[5][((x >> 16) & 0xFF) as usize]
                    ^ CRC64_TABLE_SLICE[4][((x >> 24) & 0xFF) as usize]
                    ^ CRC64_TABLE_SLICE[3][((x >> 32) & 0xFF) as usize]
                    ^ CRC64_TABLE_SLICE[2][((x >> 40) & 0xFF) as usize]
                    ^ CRC64_TABLE_SLICE[1][((x >> 48) & 0xFF) as usize]
                    ^ CRC64_TABLE_SLICE[0][(x >> 56) as usize];
            }
            chunks.remainder()
        } else {
            data
        };
        for &byte in tail {
            c = CRC64_TABLE_SLICE[0][((c ^ byte as u64) & 0xFF) as usize] ^ (c >> 8);
        }
        self.crc = c;
    }

    /// Finalize and return the CRC value.
    pub fn finalize(self) -> u64 {
        self.crc ^ u64::MAX
    }

    /// Compute CRC-64 for a slice in one call.
    pub fn compute(data: &[u8]) -> u64 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Crc64 {
    fn default() -> Self {
        Self::new()
    }
}

/// Adler-32 calculator.
#[derive(Debug, Clone)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    /// Create a new Adler-32 calculator.
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Update the checksum with more data.
    pub fn update(&mut self, data: &[u8]) {
        for block in data.chunks(ADLER_NMAX) {
            for &byte in block {
                self.a += byte as u32;
                self.b += self.a;
            }
            self.a %= ADLER_MOD;
            self.b %= ADLER_MOD;
        }
    }

    /// Finalize and return the checksum.
    pub fn finalize(self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Compute Adler-32 for a slice in one call.
    pub fn compute(data: &[u8]) -> u32 {
        let mut adler = Self::new();
        adler.update(data);
        adler.finalize()
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Checksum algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumKind {
    /// CRC-32 (ISO-HDLC).
    Crc32,
    /// CRC-32/BZIP2.
    Crc32Bzip2,
    /// CRC-64/XZ.
    Crc64,
    /// Adler-32.
    Adler32,
}

impl ChecksumKind {
    /// All supported algorithms.
    pub const ALL: [ChecksumKind; 4] = [
        ChecksumKind::Crc32,
        ChecksumKind::Crc32Bzip2,
        ChecksumKind::Crc64,
        ChecksumKind::Adler32,
    ];

    /// Human-readable algorithm name.
    pub fn name(self) -> &'static str {
        match self {
            ChecksumKind::Crc32 => "CRC-32",
            ChecksumKind::Crc32Bzip2 => "CRC-32/BZIP2",
            ChecksumKind::Crc64 => "CRC-64",
            ChecksumKind::Adler32 => "Adler-32",
        }
    }

    /// Compute this checksum over `data`, widened to `u64`.
    pub fn compute(self, data: &[u8]) -> u64 {
        match self {
            ChecksumKind::Crc32 => Crc32::compute(data) as u64,
            ChecksumKind::Crc32Bzip2 => Crc32Bzip2::compute(data) as u64,
            ChecksumKind::Crc64 => Crc64::compute(data),
            ChecksumKind::Adler32 => Adler32::compute(data) as u64,
        }
    }

    /// Verify `data` against an expected checksum value.
    pub fn verify(self, data: &[u8], expected: u64) -> Result<()> {
        let computed = self.compute(data);
        if computed != expected {
            return Err(LzmaError::checksum_mismatch(
                self.name(),
                expected,
                computed,
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
