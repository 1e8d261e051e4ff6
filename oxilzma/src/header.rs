//! The 13-byte `.lzma` header.
//!
//! ```text
//! +-------+-------------------+-------------------------------+
//! | props | dict size (u32LE) | unpacked size (u64LE)         |
//! +-------+-------------------+-------------------------------+
//! ```
//!
//! An unpacked size of all ones means the stream ends with a marker.

use crate::decoder::decompress_raw_with_options;
use crate::model::{DecoderOptions, LzmaProperties, UnpackedSize};
use oxilzma_core::cursor::ByteReader;
use oxilzma_core::error::{LzmaError, Result};

/// Size of the `.lzma` header in bytes.
pub const HEADER_SIZE: usize = 13;

/// Parsed `.lzma` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzmaHeader {
    /// Literal and position properties.
    pub props: LzmaProperties,
    /// Declared dictionary size, before the decoder's minimum is applied.
    pub dict_size: u32,
    /// Declared output size.
    pub unpacked_size: UnpackedSize,
}

impl LzmaHeader {
    /// Parse a header from the front of `reader`.
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        if reader.remaining() < HEADER_SIZE {
            return Err(LzmaError::unexpected_eof(HEADER_SIZE - reader.remaining()));
        }
        let props = LzmaProperties::from_byte(reader.read_byte()?)?;
        let dict_size = reader.read_u32_le()?;
        let unpacked_size = UnpackedSize::from_header_field(reader.read_u64_le()?);

        Ok(Self {
            props,
            dict_size,
            unpacked_size,
        })
    }

    /// Parse a header from the start of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::parse(&mut ByteReader::new(data))
    }

    /// Serialize the header.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0] = self.props.to_byte();
        bytes[1..5].copy_from_slice(&self.dict_size.to_le_bytes());
        bytes[5..].copy_from_slice(&self.unpacked_size.to_header_field().to_le_bytes());
        bytes
    }
}

/// Decompress a `.lzma` stream: header followed by range-coded data.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_with_options(data, &DecoderOptions::default())
}

/// Decompress a `.lzma` stream with explicit options.
pub fn decompress_with_options(data: &[u8], options: &DecoderOptions) -> Result<Vec<u8>> {
    let mut reader = ByteReader::new(data);
    let header = LzmaHeader::parse(&mut reader)?;
    decompress_raw_with_options(
        reader.rest(),
        header.props,
        header.dict_size,
        header.unpacked_size,
        options,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxilzma_core::error::ErrorKind;

    #[test]
    fn test_parse_header() {
        let bytes = [0x5D, 0, 0, 0x10, 0, 0x20, 0, 0, 0, 0, 0, 0, 0, 0xAA];
        let mut reader = ByteReader::new(&bytes);
        let header = LzmaHeader::parse(&mut reader).unwrap();

        assert_eq!(header.props, LzmaProperties::default());
        assert_eq!(header.dict_size, 1 << 20);
        assert_eq!(header.unpacked_size, UnpackedSize::Known(32));
        assert_eq!(reader.position(), HEADER_SIZE);
        assert_eq!(&header.to_bytes()[..], &bytes[..HEADER_SIZE]);
    }

    #[test]
    fn test_unknown_size() {
        let header = LzmaHeader {
            props: LzmaProperties::default(),
            dict_size: 4096,
            unpacked_size: UnpackedSize::UntilMarker,
        };
        let bytes = header.to_bytes();
        assert!(bytes[5..].iter().all(|&b| b == 0xFF));
        assert_eq!(LzmaHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn test_short_header() {
        let err = LzmaHeader::from_bytes(&[0x5D, 0, 0]).unwrap_err();
        assert!(matches!(err, LzmaError::UnexpectedEof { expected: 10 }));
    }

    #[test]
    fn test_invalid_properties_byte() {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0] = 225;
        let err = LzmaHeader::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidProperties);
    }

    #[test]
    fn test_empty_stream_with_known_size() {
        let mut data = LzmaHeader {
            props: LzmaProperties::default(),
            dict_size: 1 << 16,
            unpacked_size: UnpackedSize::Known(0),
        }
        .to_bytes()
        .to_vec();
        data.extend_from_slice(&[0; 5]);
        assert!(decompress(&data).unwrap().is_empty());
    }
}
