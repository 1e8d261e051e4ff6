//! Output window for LZ77-style back-references.
//!
//! The window is the decoded output itself: bytes are appended as literals
//! or as copies of earlier output, and nothing is ever removed. The
//! dictionary size only bounds how far back a copy may reach. LZMA2
//! dictionary resets move the start of the addressable history forward
//! without discarding output.
//!
//! Distances are 0-based: distance 0 is the most recently written byte.

use crate::error::{LzmaError, Result};

/// Append-only output buffer with a bounded back-reference horizon.
#[derive(Debug, Clone)]
pub struct OutputWindow {
    /// Every byte decoded so far.
    buffer: Vec<u8>,
    /// Maximum back-reference reach.
    dict_size: usize,
    /// Index of the first byte that back-references may address.
    base: usize,
}

impl OutputWindow {
    /// Create an empty window with the given dictionary size.
    pub fn new(dict_size: usize) -> Self {
        Self {
            buffer: Vec::new(),
            dict_size,
            base: 0,
        }
    }

    /// Reserve room for at least `additional` more bytes.
    pub fn reserve(&mut self, additional: usize) {
        self.buffer.reserve(additional);
    }

    /// Dictionary size bounding back-references.
    pub fn dict_size(&self) -> usize {
        self.dict_size
    }

    /// Total number of bytes produced.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether no bytes have been produced.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes produced since the last dictionary reset.
    ///
    /// Literal and position-state contexts are derived from this value.
    #[inline]
    pub fn position(&self) -> usize {
        self.buffer.len() - self.base
    }

    /// Number of bytes addressable by a back-reference.
    #[inline]
    pub fn available(&self) -> usize {
        (self.buffer.len() - self.base).min(self.dict_size)
    }

    /// Append a single byte.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    /// Append bytes taken verbatim from the input (LZMA2 stored chunks).
    pub fn extend_stored(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Byte `distance + 1` positions back, or 0 outside the history.
    #[inline]
    pub fn byte_back(&self, distance: usize) -> u8 {
        if distance < self.buffer.len() - self.base {
            self.buffer[self.buffer.len() - 1 - distance]
        } else {
            0
        }
    }

    /// Append `length` bytes copied from `distance + 1` bytes back.
    ///
    /// The source may overlap the bytes being written, in which case the
    /// copy repeats the pattern between source and end of output.
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        let available = self.available();
        if available == 0 {
            return Err(LzmaError::EmptyWindow);
        }
        if distance >= available {
            return Err(LzmaError::insufficient_history(
                distance as u64,
                available as u64,
            ));
        }

        let start = self.buffer.len() - distance - 1;
        self.buffer.reserve(length);
        for i in 0..length {
            let byte = self.buffer[start + i];
            self.buffer.push(byte);
        }

        Ok(())
    }

    /// Read-only view of the addressable history.
    pub fn lookback(&self) -> &[u8] {
        &self.buffer[self.buffer.len() - self.available()..]
    }

    /// Make all bytes produced so far unaddressable (LZMA2 dictionary reset).
    pub fn reset_dictionary(&mut self) {
        self.base = self.buffer.len();
    }

    /// Every byte produced so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the window and return the decoded bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_push_and_byte_back() {
        let mut window = OutputWindow::new(4096);
        assert!(window.is_empty());
        assert_eq!(window.byte_back(0), 0);

        window.push(b'a');
        window.push(b'b');
        assert_eq!(window.byte_back(0), b'b');
        assert_eq!(window.byte_back(1), b'a');
        assert_eq!(window.byte_back(2), 0);
    }

    #[test]
    fn test_overlapping_copy() {
        let mut window = OutputWindow::new(4096);
        window.extend_stored(b"ab");
        window.copy_match(0, 3).unwrap();
        assert_eq!(window.as_slice(), b"abbbb");
    }

    #[test]
    fn test_pattern_copy() {
        let mut window = OutputWindow::new(4096);
        window.extend_stored(b"xyz");
        window.copy_match(2, 7).unwrap();
        assert_eq!(window.as_slice(), b"xyzxyzxyzx");
    }

    #[test]
    fn test_copy_from_empty_window() {
        let mut window = OutputWindow::new(4096);
        let err = window.copy_match(0, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyWindow);
    }

    #[test]
    fn test_copy_beyond_history() {
        let mut window = OutputWindow::new(4096);
        window.extend_stored(b"ab");
        let err = window.copy_match(2, 1).unwrap_err();
        assert!(matches!(
            err,
            LzmaError::InsufficientHistory {
                distance: 2,
                available: 2
            }
        ));
        // Failed copies leave the output untouched
        assert_eq!(window.as_slice(), b"ab");
    }

    #[test]
    fn test_copy_beyond_dictionary() {
        let mut window = OutputWindow::new(4);
        window.extend_stored(b"abcdef");
        assert_eq!(window.available(), 4);
        assert_eq!(window.lookback(), b"cdef");
        window.copy_match(3, 1).unwrap();
        assert_eq!(window.byte_back(0), b'c');
        assert_eq!(
            window.copy_match(4, 1).unwrap_err().kind(),
            ErrorKind::InsufficientHistory
        );
    }

    #[test]
    fn test_dictionary_reset() {
        let mut window = OutputWindow::new(4096);
        window.extend_stored(b"abc");
        window.reset_dictionary();

        assert_eq!(window.len(), 3);
        assert_eq!(window.position(), 0);
        assert_eq!(window.available(), 0);
        assert_eq!(window.byte_back(0), 0);
        assert_eq!(
            window.copy_match(0, 1).unwrap_err().kind(),
            ErrorKind::EmptyWindow
        );

        window.push(b'd');
        window.copy_match(0, 2).unwrap();
        assert_eq!(window.into_inner(), b"abcddd");
    }
}
