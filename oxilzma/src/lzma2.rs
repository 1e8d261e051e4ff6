//! LZMA2 chunk framing.
//!
//! LZMA2 is a container format around LZMA that provides:
//! - Support for uncompressible chunks (stored as-is)
//! - Dictionary/state reset capability
//! - Chunk-based format with bounded chunk sizes
//!
//! ## Chunk Format
//!
//! Each chunk starts with a control byte:
//! - 0x00: End of LZMA2 stream
//! - 0x01: Uncompressed chunk, dictionary reset
//! - 0x02: Uncompressed chunk, no reset
//! - 0x80-0xFF: LZMA chunk; bits 5-6 select the reset level and bits 0-4
//!   are the high bits of the unpacked size
//!
//! Every LZMA chunk carries its own range-coded payload. Probabilities,
//! state, rep distances and history persist from chunk to chunk unless a
//! reset says otherwise.

use crate::decoder::LzmaDecoder;
use crate::model::{DecoderOptions, EndMarker, LzmaProperties, UnpackedSize, effective_dict_size};
use crate::range_coder::RangeDecoder;
use oxilzma_core::cursor::ByteReader;
use oxilzma_core::error::{LzmaError, Result};
use tracing::{debug, trace, warn};

/// Largest valid LZMA2 dictionary properties byte.
pub const DICT_PROPS_MAX: u8 = 40;

/// What an LZMA chunk resets before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResetLevel {
    /// Continue with the current state.
    Nothing,
    /// Reset probabilities, state and rep distances.
    State,
    /// Reset the state and read a new properties byte.
    StateAndProperties,
    /// Additionally reset the dictionary.
    All,
}

/// Decoded control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// End of stream.
    End,
    /// Bytes stored without compression.
    Stored {
        /// Whether the dictionary is reset first.
        reset_dictionary: bool,
    },
    /// Range-coded LZMA data.
    Lzma {
        /// What to reset before decoding.
        reset: ResetLevel,
        /// Bits 16-20 of `unpacked size - 1`.
        size_high: u8,
    },
}

impl ChunkKind {
    /// Classify a control byte.
    pub fn from_control(control: u8) -> Result<Self> {
        match control {
            0x00 => Ok(Self::End),
            0x01 => Ok(Self::Stored {
                reset_dictionary: true,
            }),
            0x02 => Ok(Self::Stored {
                reset_dictionary: false,
            }),
            0x80..=0xFF => {
                let reset = match (control >> 5) & 0x03 {
                    0 => ResetLevel::Nothing,
                    1 => ResetLevel::State,
                    2 => ResetLevel::StateAndProperties,
                    _ => ResetLevel::All,
                };
                Ok(Self::Lzma {
                    reset,
                    size_high: control & 0x1F,
                })
            }
            _ => Err(LzmaError::invalid_header(format!(
                "invalid LZMA2 control byte {control:#04x}"
            ))),
        }
    }

    /// Whether this chunk resets the dictionary.
    pub fn resets_dictionary(self) -> bool {
        matches!(
            self,
            Self::Stored {
                reset_dictionary: true
            } | Self::Lzma {
                reset: ResetLevel::All,
                ..
            }
        )
    }
}

/// LZMA2 decoder.
#[derive(Debug, Clone)]
pub struct Lzma2Decoder {
    /// Shared LZMA state carried across chunks.
    decoder: LzmaDecoder,
    /// Whether the next chunk must reset the dictionary.
    need_dictionary_reset: bool,
    /// Whether the next LZMA chunk must carry a properties byte.
    need_properties: bool,
    /// Number of chunks decoded.
    chunks: usize,
}

impl Lzma2Decoder {
    /// Create a new LZMA2 decoder with the given dictionary size.
    pub fn new(dict_size: u32) -> Self {
        Self {
            decoder: LzmaDecoder::new(dict_size).with_end_marker(EndMarker::Forbidden),
            need_dictionary_reset: true,
            need_properties: true,
            chunks: 0,
        }
    }

    /// Number of chunks decoded so far, excluding the end marker.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Bytes produced so far.
    pub fn output(&self) -> &[u8] {
        self.decoder.output()
    }

    /// Consume the decoder and return its output.
    pub fn into_output(self) -> Vec<u8> {
        self.decoder.into_output()
    }

    /// Decode chunks until the end-of-stream control byte.
    ///
    /// Bytes after the end control byte are left in `reader`.
    pub fn decode(&mut self, reader: &mut ByteReader<'_>) -> Result<()> {
        loop {
            let kind = ChunkKind::from_control(reader.read_byte()?)?;
            if kind == ChunkKind::End {
                return Ok(());
            }

            if self.need_dictionary_reset && !kind.resets_dictionary() {
                return Err(LzmaError::invalid_header(
                    "first LZMA2 chunk must reset the dictionary",
                ));
            }
            if kind.resets_dictionary() {
                self.decoder.reset_dictionary();
                self.need_dictionary_reset = false;
            }

            match kind {
                ChunkKind::Stored { reset_dictionary } => {
                    // The next LZMA chunk has to bring fresh properties
                    if reset_dictionary {
                        self.need_properties = true;
                    }
                    self.decode_stored(reader)?
                }
                ChunkKind::Lzma { reset, size_high } => {
                    self.decode_lzma(reader, reset, size_high)?
                }
                ChunkKind::End => {}
            }
            self.chunks += 1;
        }
    }

    fn decode_stored(&mut self, reader: &mut ByteReader<'_>) -> Result<()> {
        let size = reader.read_u16_be()? as usize + 1;
        let data = reader.take(size)?;
        trace!(chunk = self.chunks, size, "stored chunk");
        self.decoder.append_stored(data);
        Ok(())
    }

    fn decode_lzma(
        &mut self,
        reader: &mut ByteReader<'_>,
        reset: ResetLevel,
        size_high: u8,
    ) -> Result<()> {
        let unpacked_size = ((size_high as u64) << 16) + reader.read_u16_be()? as u64 + 1;
        let packed_size = reader.read_u16_be()? as usize + 1;

        if reset < ResetLevel::StateAndProperties {
            if self.decoder.properties().is_none() {
                return Err(LzmaError::UninitializedDecoder);
            }
            if self.need_properties {
                return Err(LzmaError::invalid_header(
                    "LZMA chunk after a dictionary reset must set new properties",
                ));
            }
        }

        if reset >= ResetLevel::StateAndProperties {
            let props = LzmaProperties::from_byte(reader.read_byte()?)?;
            if props.lc + props.lp > 4 {
                return Err(LzmaError::invalid_header(format!(
                    "LZMA2 requires lc + lp <= 4, got lc={} lp={}",
                    props.lc, props.lp
                )));
            }
            self.decoder.set_properties(props);
            self.need_properties = false;
        } else if reset == ResetLevel::State {
            self.decoder.reset_state();
        }

        trace!(
            chunk = self.chunks,
            ?reset,
            unpacked_size,
            packed_size,
            "LZMA chunk"
        );

        let packed = reader.take(packed_size)?;
        let mut rc = RangeDecoder::from_slice(packed)?;
        self.decoder.decode(&mut rc, UnpackedSize::Known(unpacked_size))?;
        rc.finish()?;

        let unused = rc.input().remaining();
        if unused > 0 {
            warn!(chunk = self.chunks, unused, "LZMA chunk has trailing bytes");
        }
        Ok(())
    }
}

/// Get dictionary size from LZMA2 properties byte.
///
/// Formula: `(2 | (props & 1)) << (props / 2 + 11)`, with 40 meaning
/// `0xFFFF_FFFF`.
pub fn dict_size_from_props(props: u8) -> Result<u32> {
    match props {
        DICT_PROPS_MAX => Ok(0xFFFF_FFFF),
        0..DICT_PROPS_MAX => Ok((2 | (props as u32 & 1)) << (props / 2 + 11)),
        _ => Err(LzmaError::invalid_header(format!(
            "Invalid LZMA2 dictionary size byte: {props}"
        ))),
    }
}

/// Decode a raw LZMA2 stream.
pub fn decompress_lzma2(data: &[u8], dict_size: u32) -> Result<Vec<u8>> {
    decompress_lzma2_with_options(data, dict_size, &DecoderOptions::default())
}

/// Decode a raw LZMA2 stream, applying the memory limit from `options`.
///
/// End marker and residual settings do not apply: LZMA2 chunks never
/// carry a marker and always finish with a zero code.
pub fn decompress_lzma2_with_options(
    data: &[u8],
    dict_size: u32,
    options: &DecoderOptions,
) -> Result<Vec<u8>> {
    let dict_size = effective_dict_size(dict_size);
    options.check_dict_size(dict_size)?;
    debug!(dict_size, input_len = data.len(), "starting LZMA2 decode");

    let mut reader = ByteReader::new(data);
    let mut decoder = Lzma2Decoder::new(dict_size);
    decoder.decode(&mut reader)?;

    debug!(
        chunks = decoder.chunks(),
        output_len = decoder.output().len(),
        unused_input = reader.remaining(),
        "finished LZMA2 decode"
    );
    Ok(decoder.into_output())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range_coder::{PROB_INIT, RangeEncoder};
    use oxilzma_core::error::ErrorKind;

    #[test]
    fn test_dict_size_props() {
        assert_eq!(dict_size_from_props(0).unwrap(), 2 << 11);
        assert_eq!(dict_size_from_props(1).unwrap(), 3 << 11);
        assert_eq!(dict_size_from_props(2).unwrap(), 2 << 12);
        assert_eq!(dict_size_from_props(18).unwrap(), 1 << 20);
        assert_eq!(dict_size_from_props(39).unwrap(), 3 << 30);
        assert_eq!(dict_size_from_props(40).unwrap(), 0xFFFF_FFFF);
        assert_eq!(
            dict_size_from_props(41).unwrap_err().kind(),
            ErrorKind::InvalidHeader
        );
    }

    #[test]
    fn test_control_bytes() {
        assert_eq!(ChunkKind::from_control(0).unwrap(), ChunkKind::End);
        assert!(ChunkKind::from_control(1).unwrap().resets_dictionary());
        assert!(!ChunkKind::from_control(2).unwrap().resets_dictionary());
        assert_eq!(
            ChunkKind::from_control(0x80).unwrap(),
            ChunkKind::Lzma {
                reset: ResetLevel::Nothing,
                size_high: 0
            }
        );
        assert_eq!(
            ChunkKind::from_control(0xA3).unwrap(),
            ChunkKind::Lzma {
                reset: ResetLevel::State,
                size_high: 3
            }
        );
        assert_eq!(
            ChunkKind::from_control(0xDF).unwrap(),
            ChunkKind::Lzma {
                reset: ResetLevel::StateAndProperties,
                size_high: 0x1F
            }
        );
        assert!(ChunkKind::from_control(0xE0).unwrap().resets_dictionary());
        for control in 0x03..0x80 {
            assert!(ChunkKind::from_control(control).is_err());
        }
    }

    #[test]
    fn test_stored_chunks() {
        let data = [
            0x01, 0x00, 0x02, b'a', b'b', b'c', 0x02, 0x00, 0x00, b'd', 0x00,
        ];
        assert_eq!(decompress_lzma2(&data, 4096).unwrap(), b"abcd");
    }

    #[test]
    fn test_empty_stream() {
        assert!(decompress_lzma2(&[0x00], 4096).unwrap().is_empty());
    }

    #[test]
    fn test_first_chunk_must_reset_dictionary() {
        let data = [0x02, 0x00, 0x00, b'x', 0x00];
        let err = decompress_lzma2(&data, 4096).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHeader);
    }

    #[test]
    fn test_lzma_chunk_without_properties() {
        // Stored chunk resets the dictionary, then an LZMA chunk that only
        // resets state arrives before any properties byte.
        let data = [
            0x01, 0x00, 0x00, b'x', 0xA0, 0x00, 0x00, 0x00, 0x04, 0, 0, 0, 0, 0,
        ];
        let err = decompress_lzma2(&data, 4096).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UninitializedDecoder);
    }

    #[test]
    fn test_lzma_chunk_after_stored_chunk() {
        // One literal 'y' after a stored "x", coded with lc=0 lp=0 pb=0.
        let mut encoder = RangeEncoder::new();
        let mut is_match = PROB_INIT;
        encoder.encode_bit(&mut is_match, 0);
        let mut literal = [PROB_INIT; 0x300];
        encoder.encode_bit_tree(&mut literal, 8, b'y' as u32);
        let packed = encoder.finish();

        let mut data = vec![0x01, 0x00, 0x00, b'x'];
        data.push(0xC0);
        data.extend_from_slice(&[0x00, 0x00]);
        data.extend_from_slice(&((packed.len() - 1) as u16).to_be_bytes());
        data.push(0x00);
        data.extend_from_slice(&packed);
        data.push(0x00);

        assert_eq!(decompress_lzma2(&data, 4096).unwrap(), b"xy");
    }

    /// One LZMA chunk holding a single literal, coded with lc=0 lp=0 pb=0.
    fn literal_chunk(control: u8, byte: u8) -> Vec<u8> {
        let mut encoder = RangeEncoder::new();
        let mut is_match = PROB_INIT;
        encoder.encode_bit(&mut is_match, 0);
        let mut literal = [PROB_INIT; 0x300];
        encoder.encode_bit_tree(&mut literal, 8, byte as u32);
        let packed = encoder.finish();

        let mut chunk = vec![control, 0x00, 0x00];
        chunk.extend_from_slice(&((packed.len() - 1) as u16).to_be_bytes());
        if control >= 0xC0 {
            chunk.push(0x00);
        }
        chunk.extend_from_slice(&packed);
        chunk
    }

    #[test]
    fn test_stored_dictionary_reset_requires_new_properties() {
        for control in [0xA0, 0x80] {
            let mut data = literal_chunk(0xE0, b'a');
            data.extend_from_slice(&[0x01, 0x00, 0x00, b'x']);
            data.extend_from_slice(&literal_chunk(control, b'y'));
            data.push(0x00);

            let err = decompress_lzma2(&data, 4096).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidHeader, "control {control:#x}");
        }

        let mut data = literal_chunk(0xE0, b'a');
        data.extend_from_slice(&[0x01, 0x00, 0x00, b'x']);
        data.extend_from_slice(&literal_chunk(0xC0, b'y'));
        data.push(0x00);
        assert_eq!(decompress_lzma2(&data, 4096).unwrap(), b"axy");
    }

    #[test]
    fn test_stored_chunk_without_reset_keeps_properties() {
        let mut data = literal_chunk(0xE0, b'a');
        data.extend_from_slice(&[0x02, 0x00, 0x00, b'x']);
        data.extend_from_slice(&literal_chunk(0xA0, b'y'));
        data.push(0x00);
        assert_eq!(decompress_lzma2(&data, 4096).unwrap(), b"axy");
    }

    #[test]
    fn test_truncated_stream() {
        let data = [0x01, 0x00, 0x05, b'a', b'b'];
        let err = decompress_lzma2(&data, 4096).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);

        let err = decompress_lzma2(&[], 4096).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_invalid_control_byte() {
        let data = [0x01, 0x00, 0x00, b'x', 0x42];
        let err = decompress_lzma2(&data, 4096).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHeader);
        assert!(err.to_string().ends_with("invalid LZMA2 control byte 0x42"));
    }
}
