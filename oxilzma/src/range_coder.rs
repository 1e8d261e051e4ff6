//! Range decoder for LZMA decompression.
//!
//! The range decoder is an adaptive binary arithmetic decoder. LZMA uses a
//! specific variant with:
//! - 32-bit `range` and `code` registers
//! - Normalization after every decision when range drops below 2^24
//! - 11-bit probability model (2048 = certainty of a zero bit)

use oxilzma_core::cursor::ByteReader;
use oxilzma_core::error::{LzmaError, Result};
use tracing::warn;

/// Number of bits in probability model.
pub const PROB_BITS: u32 = 11;

/// Initial probability: 1024 of 2048, i.e. 50%.
pub const PROB_INIT: Prob = 1 << (PROB_BITS - 1);

/// Probability scale.
pub const PROB_MAX: Prob = 1 << PROB_BITS;

/// Number of bits to shift for probability update.
pub const MOVE_BITS: u32 = 5;

/// Bytes consumed by range decoder initialization.
pub const INIT_BYTES: usize = 5;

/// Top value for range normalization.
const TOP_VALUE: u32 = 1 << 24;

/// One adaptive probability slot, `2048 * P(bit = 0)`.
pub type Prob = u16;

/// Range decoder over an in-memory byte cursor.
#[derive(Debug, Clone)]
pub struct RangeDecoder<'a> {
    input: ByteReader<'a>,
    range: u32,
    code: u32,
}

impl<'a> RangeDecoder<'a> {
    /// Initialize from the first five bytes of `input`.
    ///
    /// The first byte is ignored; the next four form the big-endian code.
    pub fn new(mut input: ByteReader<'a>) -> Result<Self> {
        let available = input.remaining();
        if available < INIT_BYTES {
            return Err(LzmaError::range_decoder_init(INIT_BYTES - available));
        }
        let init: [u8; INIT_BYTES] = input.read_array()?;

        if init[0] != 0 {
            warn!(
                first_byte = init[0],
                "range coder stream does not start with a zero byte"
            );
        }

        Ok(Self {
            input,
            range: 0xFFFF_FFFF,
            code: u32::from_be_bytes([init[1], init[2], init[3], init[4]]),
        })
    }

    /// Initialize from a byte slice.
    pub fn from_slice(data: &'a [u8]) -> Result<Self> {
        Self::new(ByteReader::new(data))
    }

    /// Refill one byte when the range has dropped below 2^24.
    #[inline]
    fn normalize(&mut self) -> Result<()> {
        if self.range < TOP_VALUE {
            let byte = self
                .input
                .next_byte()
                .ok_or(LzmaError::range_decoder_init(1))?;
            self.range <<= 8;
            self.code = (self.code << 8) | byte as u32;
        }
        Ok(())
    }

    /// Decode a single bit with the given probability, adapting it.
    #[inline]
    pub fn decode_bit(&mut self, prob: &mut Prob) -> Result<u32> {
        let bound = (self.range >> PROB_BITS) * (*prob as u32);

        let bit = if self.code < bound {
            self.range = bound;
            *prob += (PROB_MAX - *prob) >> MOVE_BITS;
            0
        } else {
            self.range -= bound;
            self.code -= bound;
            *prob -= *prob >> MOVE_BITS;
            1
        };

        self.normalize()?;
        Ok(bit)
    }

    /// Decode `count` bits with fixed 50% probability, most significant first.
    pub fn decode_direct_bits(&mut self, count: u32) -> Result<u32> {
        let mut result = 0u32;
        for _ in 0..count {
            self.range >>= 1;
            self.code = self.code.wrapping_sub(self.range);
            // All ones when the subtraction went negative, i.e. the bit is 0
            let mask = 0u32.wrapping_sub(self.code >> 31);
            self.code = self.code.wrapping_add(self.range & mask);
            result = (result << 1) | (mask.wrapping_add(1));
            self.normalize()?;
        }
        Ok(result)
    }

    /// Whether the code register is zero, as it is after a well-formed
    /// stream's final symbol.
    #[inline]
    pub fn is_finished_ok(&self) -> bool {
        self.code == 0
    }

    /// Check the residual code after the final symbol.
    pub fn finish(&self) -> Result<()> {
        if self.code != 0 {
            return Err(LzmaError::residual(self.code));
        }
        Ok(())
    }

    /// Current code register.
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Current range register.
    pub fn range(&self) -> u32 {
        self.range
    }

    /// The input cursor, positioned after the last consumed byte.
    pub fn input(&self) -> &ByteReader<'a> {
        &self.input
    }

    /// Consume the decoder and return its input cursor.
    pub fn into_input(self) -> ByteReader<'a> {
        self.input
    }
}

/// Range encoder used to build streams for tests.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct RangeEncoder {
    buffer: Vec<u8>,
    range: u32,
    low: u64,
    cache: u8,
    cache_size: u64,
}

#[cfg(test)]
impl RangeEncoder {
    pub(crate) fn new() -> Self {
        Self {
            buffer: Vec::new(),
            range: 0xFFFF_FFFF,
            low: 0,
            cache: 0,
            cache_size: 1,
        }
    }

    fn shift_low(&mut self) {
        if self.low < 0xFF00_0000 || self.low > 0xFFFF_FFFF {
            let carry = (self.low >> 32) as u8;
            let mut pending = self.cache;
            loop {
                self.buffer.push(pending.wrapping_add(carry));
                pending = 0xFF;
                self.cache_size -= 1;
                if self.cache_size == 0 {
                    break;
                }
            }
            self.cache = (self.low >> 24) as u8;
        }
        self.cache_size += 1;
        self.low = (self.low << 8) & 0xFFFF_FFFF;
    }

    fn normalize(&mut self) {
        if self.range < TOP_VALUE {
            self.range <<= 8;
            self.shift_low();
        }
    }

    pub(crate) fn encode_bit(&mut self, prob: &mut Prob, bit: u32) {
        let bound = (self.range >> PROB_BITS) * (*prob as u32);
        if bit == 0 {
            self.range = bound;
            *prob += (PROB_MAX - *prob) >> MOVE_BITS;
        } else {
            self.low += bound as u64;
            self.range -= bound;
            *prob -= *prob >> MOVE_BITS;
        }
        self.normalize();
    }

    pub(crate) fn encode_direct_bits(&mut self, value: u32, count: u32) {
        for i in (0..count).rev() {
            self.range >>= 1;
            if (value >> i) & 1 != 0 {
                self.low += self.range as u64;
            }
            self.normalize();
        }
    }

    pub(crate) fn encode_bit_tree(&mut self, probs: &mut [Prob], num_bits: u32, value: u32) {
        let mut index = 1usize;
        for i in (0..num_bits).rev() {
            let bit = (value >> i) & 1;
            self.encode_bit(&mut probs[index], bit);
            index = (index << 1) | bit as usize;
        }
    }

    pub(crate) fn encode_reverse_bit_tree(
        &mut self,
        probs: &mut [Prob],
        offset: usize,
        num_bits: u32,
        value: u32,
    ) {
        let mut index = 1usize;
        for i in 0..num_bits {
            let bit = (value >> i) & 1;
            self.encode_bit(&mut probs[offset + index], bit);
            index = (index << 1) | bit as usize;
        }
    }

    pub(crate) fn finish(mut self) -> Vec<u8> {
        for _ in 0..5 {
            self.shift_low();
        }
        self.buffer
    }
}
