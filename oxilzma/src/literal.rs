//! Literal decoding.
//!
//! Each literal context owns 0x300 probabilities: 0x100 for the plain
//! 8-level tree and 0x200 for the matched mode used right after a match,
//! where each bit is also conditioned on the byte at `rep0`.

use crate::range_coder::{PROB_INIT, Prob, RangeDecoder};
use crate::state::State;
use oxilzma_core::error::Result;
use oxilzma_core::window::OutputWindow;

/// Probabilities per literal context.
pub const LITERAL_CODER_SIZE: usize = 0x300;

/// Context-selected literal decoder.
#[derive(Debug, Clone)]
pub struct LiteralDecoder {
    probs: Vec<[Prob; LITERAL_CODER_SIZE]>,
    lc: u32,
    lp: u32,
}

impl LiteralDecoder {
    /// Create a decoder with `2^(lc + lp)` contexts.
    pub fn new(lc: u32, lp: u32) -> Self {
        Self {
            probs: vec![[PROB_INIT; LITERAL_CODER_SIZE]; 1 << (lc + lp)],
            lc,
            lp,
        }
    }

    /// Reset every context to 50%.
    pub fn reset(&mut self) {
        for coder in &mut self.probs {
            coder.fill(PROB_INIT);
        }
    }

    /// Number of literal contexts.
    pub fn num_contexts(&self) -> usize {
        self.probs.len()
    }

    /// Context index from the output position and the previous byte.
    #[inline]
    pub fn context(&self, position: usize, prev_byte: u8) -> usize {
        let pos_bits = position & ((1 << self.lp) - 1);
        (pos_bits << self.lc) + ((prev_byte as usize) >> (8 - self.lc))
    }

    /// Decode one literal.
    ///
    /// `window` is only read: it supplies the position, the previous byte
    /// and, after a match, the byte at `rep0`.
    pub fn decode(
        &mut self,
        rc: &mut RangeDecoder<'_>,
        window: &OutputWindow,
        state: State,
        rep0: u32,
    ) -> Result<u8> {
        let context = self.context(window.position(), window.byte_back(0));
        let probs = &mut self.probs[context];

        let mut symbol = 1usize;
        if !state.is_literal() {
            let mut match_byte = window.byte_back(rep0 as usize) as usize;
            while symbol < 0x100 {
                let match_bit = (match_byte >> 7) & 1;
                match_byte <<= 1;
                let bit = rc.decode_bit(&mut probs[((1 + match_bit) << 8) + symbol])? as usize;
                symbol = (symbol << 1) | bit;
                if match_bit != bit {
                    break;
                }
            }
        }
        while symbol < 0x100 {
            symbol = (symbol << 1) | rc.decode_bit(&mut probs[symbol])? as usize;
        }

        Ok((symbol - 0x100) as u8)
    }

    #[cfg(test)]
    pub(crate) fn probs_mut(&mut self, context: usize) -> &mut [Prob; LITERAL_CODER_SIZE] {
        &mut self.probs[context]
    }
}
