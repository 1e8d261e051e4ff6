//! Match length decoding.
//!
//! ```text
//! choice = 0              -> low[pos_state]   3 bits   lengths 2..=9
//! choice = 1, choice2 = 0 -> mid[pos_state]   3 bits   lengths 10..=17
//! choice = 1, choice2 = 1 -> high             8 bits   lengths 18..=273
//! ```

use crate::bit_tree::BitTreeDecoder;
use crate::model::POS_STATES_MAX;
use crate::range_coder::{PROB_INIT, Prob, RangeDecoder};
use oxilzma_core::error::Result;

/// Number of bits for low length coding.
pub const LEN_LOW_BITS: u32 = 3;
/// Number of bits for mid length coding.
pub const LEN_MID_BITS: u32 = 3;
/// Number of bits for high length coding.
pub const LEN_HIGH_BITS: u32 = 8;

/// Number of low length symbols.
pub const LEN_LOW_SYMBOLS: u32 = 1 << LEN_LOW_BITS;
/// Number of mid length symbols.
pub const LEN_MID_SYMBOLS: u32 = 1 << LEN_MID_BITS;

/// Minimum match length.
pub const MATCH_LEN_MIN: u32 = 2;
/// Maximum match length.
pub const MATCH_LEN_MAX: u32 = MATCH_LEN_MIN + LEN_LOW_SYMBOLS + LEN_MID_SYMBOLS + 255;

/// Length decoder. Matches and reps each own one.
#[derive(Debug, Clone)]
pub struct LengthDecoder {
    choice: Prob,
    choice2: Prob,
    low: [BitTreeDecoder; POS_STATES_MAX],
    mid: [BitTreeDecoder; POS_STATES_MAX],
    high: BitTreeDecoder,
}

impl LengthDecoder {
    /// Create a length decoder sized for every position state.
    pub fn new() -> Self {
        Self {
            choice: PROB_INIT,
            choice2: PROB_INIT,
            low: std::array::from_fn(|_| BitTreeDecoder::new(LEN_LOW_BITS)),
            mid: std::array::from_fn(|_| BitTreeDecoder::new(LEN_MID_BITS)),
            high: BitTreeDecoder::new(LEN_HIGH_BITS),
        }
    }

    /// Reset all probabilities.
    pub fn reset(&mut self) {
        self.choice = PROB_INIT;
        self.choice2 = PROB_INIT;
        self.low.iter_mut().for_each(BitTreeDecoder::reset);
        self.mid.iter_mut().for_each(BitTreeDecoder::reset);
        self.high.reset();
    }

    /// Decode a length in `MATCH_LEN_MIN..=MATCH_LEN_MAX`.
    pub fn decode(&mut self, rc: &mut RangeDecoder<'_>, pos_state: usize) -> Result<u32> {
        if rc.decode_bit(&mut self.choice)? == 0 {
            return Ok(MATCH_LEN_MIN + self.low[pos_state].decode(rc)?);
        }
        if rc.decode_bit(&mut self.choice2)? == 0 {
            return Ok(MATCH_LEN_MIN + LEN_LOW_SYMBOLS + self.mid[pos_state].decode(rc)?);
        }
        Ok(MATCH_LEN_MIN + LEN_LOW_SYMBOLS + LEN_MID_SYMBOLS + self.high.decode(rc)?)
    }

    /// Encode `length` with the test range encoder, mirroring [`Self::decode`].
    #[cfg(test)]
    pub(crate) fn encode(
        &mut self,
        rc: &mut crate::range_coder::RangeEncoder,
        pos_state: usize,
        length: u32,
    ) {
        let symbol = length - MATCH_LEN_MIN;
        if symbol < LEN_LOW_SYMBOLS {
            rc.encode_bit(&mut self.choice, 0);
            rc.encode_bit_tree(self.low[pos_state].probs_mut(), LEN_LOW_BITS, symbol);
        } else if symbol < LEN_LOW_SYMBOLS + LEN_MID_SYMBOLS {
            rc.encode_bit(&mut self.choice, 1);
            rc.encode_bit(&mut self.choice2, 0);
            rc.encode_bit_tree(
                self.mid[pos_state].probs_mut(),
                LEN_MID_BITS,
                symbol - LEN_LOW_SYMBOLS,
            );
        } else {
            rc.encode_bit(&mut self.choice, 1);
            rc.encode_bit(&mut self.choice2, 1);
            rc.encode_bit_tree(
                self.high.probs_mut(),
                LEN_HIGH_BITS,
                symbol - LEN_LOW_SYMBOLS - LEN_MID_SYMBOLS,
            );
        }
    }
}

impl Default for LengthDecoder {
    fn default() -> Self {
        Self::new()
    }
}
