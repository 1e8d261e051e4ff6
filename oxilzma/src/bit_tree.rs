//! Bit-tree decoding.
//!
//! A bit tree of `n` levels holds `2^n` probabilities indexed from 1; the
//! node for the next bit is `(index << 1) | bit`. Forward trees yield the
//! most significant bit first, reverse trees the least significant.

use crate::range_coder::{PROB_INIT, Prob, RangeDecoder};
use oxilzma_core::error::Result;

/// Decode `num_bits` bits most significant first over `probs[1..2^n]`.
#[inline]
pub fn decode(probs: &mut [Prob], num_bits: u32, rc: &mut RangeDecoder<'_>) -> Result<u32> {
    let mut index = 1u32;
    for _ in 0..num_bits {
        index = (index << 1) + rc.decode_bit(&mut probs[index as usize])?;
    }
    Ok(index - (1 << num_bits))
}

/// Decode `num_bits` bits least significant first over
/// `probs[offset + 1..]`.
///
/// The offset form lets several short trees share one table, as the
/// distance decoder's special slots do.
#[inline]
pub fn reverse_decode(
    probs: &mut [Prob],
    offset: usize,
    num_bits: u32,
    rc: &mut RangeDecoder<'_>,
) -> Result<u32> {
    let mut index = 1usize;
    let mut symbol = 0u32;
    for i in 0..num_bits {
        let bit = rc.decode_bit(&mut probs[offset + index])?;
        index = (index << 1) + bit as usize;
        symbol |= bit << i;
    }
    Ok(symbol)
}

/// Fixed-width bit tree owning its probabilities.
#[derive(Debug, Clone)]
pub struct BitTreeDecoder {
    probs: Box<[Prob]>,
    num_bits: u32,
}

impl BitTreeDecoder {
    /// Create a tree of `num_bits` levels with every probability at 50%.
    pub fn new(num_bits: u32) -> Self {
        Self {
            probs: vec![PROB_INIT; 1 << num_bits].into_boxed_slice(),
            num_bits,
        }
    }

    /// Number of bits decoded per symbol.
    pub fn num_bits(&self) -> u32 {
        self.num_bits
    }

    /// Reset every probability to 50%.
    pub fn reset(&mut self) {
        self.probs.fill(PROB_INIT);
    }

    /// Decode a symbol, most significant bit first.
    #[inline]
    pub fn decode(&mut self, rc: &mut RangeDecoder<'_>) -> Result<u32> {
        decode(&mut self.probs, self.num_bits, rc)
    }

    /// Decode a symbol, least significant bit first.
    #[inline]
    pub fn reverse_decode(&mut self, rc: &mut RangeDecoder<'_>) -> Result<u32> {
        reverse_decode(&mut self.probs, 0, self.num_bits, rc)
    }

    #[cfg(test)]
    pub(crate) fn probs_mut(&mut self) -> &mut [Prob] {
        &mut self.probs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range_coder::RangeEncoder;

    #[test]
    fn test_forward_tree() {
        let values = [0u32, 5, 7, 3, 3, 3, 1];
        let mut encoder = RangeEncoder::new();
        let mut tree = BitTreeDecoder::new(3);
        for &v in &values {
            encoder.encode_bit_tree(tree.probs_mut(), 3, v);
        }
        let encoded = encoder.finish();

        let mut rc = RangeDecoder::from_slice(&encoded).unwrap();
        let mut tree = BitTreeDecoder::new(3);
        for &v in &values {
            assert_eq!(tree.decode(&mut rc).unwrap(), v);
        }
        assert!(rc.is_finished_ok());
    }

    #[test]
    fn test_reverse_tree() {
        let values = [0b0001u32, 0b1000, 0b1111, 0b0110];
        let mut encoder = RangeEncoder::new();
        let mut tree = BitTreeDecoder::new(4);
        for &v in &values {
            encoder.encode_reverse_bit_tree(tree.probs_mut(), 0, 4, v);
        }
        let encoded = encoder.finish();

        let mut rc = RangeDecoder::from_slice(&encoded).unwrap();
        let mut tree = BitTreeDecoder::new(4);
        for &v in &values {
            assert_eq!(tree.reverse_decode(&mut rc).unwrap(), v);
        }
    }

    #[test]
    fn test_reverse_tree_with_offset() {
        let mut probs = [PROB_INIT; 40];
        let mut encoder = RangeEncoder::new();
        encoder.encode_reverse_bit_tree(&mut probs, 7, 5, 0b10110);
        encoder.encode_reverse_bit_tree(&mut probs, 0, 2, 0b01);
        let encoded = encoder.finish();

        let mut probs = [PROB_INIT; 40];
        let mut rc = RangeDecoder::from_slice(&encoded).unwrap();
        assert_eq!(reverse_decode(&mut probs, 7, 5, &mut rc).unwrap(), 0b10110);
        assert_eq!(reverse_decode(&mut probs, 0, 2, &mut rc).unwrap(), 0b01);
        // Slot zero of a tree is never touched
        assert_eq!(probs[7], PROB_INIT);
    }

    #[test]
    fn test_fresh_tree_is_roughly_uniform() {
        let mut input = Vec::with_capacity(8192);
        let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
        for _ in 0..8192 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            input.push((seed >> 32) as u8);
        }
        input[0] = 0;

        let mut rc = RangeDecoder::from_slice(&input).unwrap();
        let mut counts = [0u32; 8];
        for _ in 0..4096 {
            let mut tree = BitTreeDecoder::new(3);
            counts[tree.decode(&mut rc).unwrap() as usize] += 1;
        }
        for &count in &counts {
            assert!((384..=640).contains(&count), "skewed histogram {counts:?}");
        }
    }

    #[test]
    fn test_reset() {
        let mut encoder = RangeEncoder::new();
        let mut probs = [PROB_INIT; 4];
        encoder.encode_bit_tree(&mut probs, 2, 2);
        let encoded = encoder.finish();

        let mut tree = BitTreeDecoder::new(2);
        let mut rc = RangeDecoder::from_slice(&encoded).unwrap();
        tree.decode(&mut rc).unwrap();
        assert_ne!(tree.probs_mut()[1], PROB_INIT);
        tree.reset();
        assert!(tree.probs_mut().iter().all(|&p| p == PROB_INIT));
        assert_eq!(tree.num_bits(), 2);
    }
}
