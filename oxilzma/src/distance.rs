//! Match distance decoding.
//!
//! A 6-bit slot, chosen by one of four trees keyed on the match length,
//! gives the distance's top two bits and bit count. Slots 0-3 are the
//! distance itself. Slots 4-13 add a reverse tree over shared "special"
//! probabilities; larger slots add direct bits and a 4-bit reverse align
//! tree for the low bits.

use crate::bit_tree::{self, BitTreeDecoder};
use crate::range_coder::{PROB_INIT, Prob, RangeDecoder};
use oxilzma_core::error::Result;

/// Number of length states selecting a slot tree.
pub const LEN_TO_POS_STATES: usize = 4;
/// Bits per distance slot.
pub const DIST_SLOT_BITS: u32 = 6;
/// First slot coded with the special probabilities.
pub const START_POS_MODEL_INDEX: u32 = 4;
/// First slot coded with direct bits.
pub const END_POS_MODEL_INDEX: u32 = 14;
/// Distances below this are coded without direct bits.
pub const FULL_DISTANCES: u32 = 1 << (END_POS_MODEL_INDEX >> 1);
/// Number of alignment bits.
pub const DIST_ALIGN_BITS: u32 = 4;
/// Distance value reserved for the end-of-stream marker.
pub const END_MARKER_DISTANCE: u32 = 0xFFFF_FFFF;

const SPECIAL_PROBS: usize = 1 + (FULL_DISTANCES - END_POS_MODEL_INDEX) as usize;

/// Distance decoder.
#[derive(Debug, Clone)]
pub struct DistanceDecoder {
    slot: [BitTreeDecoder; LEN_TO_POS_STATES],
    special: [Prob; SPECIAL_PROBS],
    align: BitTreeDecoder,
}

impl DistanceDecoder {
    /// Create a distance decoder with every probability at 50%.
    pub fn new() -> Self {
        Self {
            slot: std::array::from_fn(|_| BitTreeDecoder::new(DIST_SLOT_BITS)),
            special: [PROB_INIT; SPECIAL_PROBS],
            align: BitTreeDecoder::new(DIST_ALIGN_BITS),
        }
    }

    /// Reset all probabilities.
    pub fn reset(&mut self) {
        self.slot.iter_mut().for_each(BitTreeDecoder::reset);
        self.special.fill(PROB_INIT);
        self.align.reset();
    }

    /// Slot tree index for a match of `length` bytes.
    #[inline]
    pub fn len_state(length: u32) -> usize {
        (length.saturating_sub(2) as usize).min(LEN_TO_POS_STATES - 1)
    }

    /// Decode the 0-based distance of a match of `length` bytes.
    ///
    /// Returns [`END_MARKER_DISTANCE`] for the end-of-stream marker.
    pub fn decode(&mut self, rc: &mut RangeDecoder<'_>, length: u32) -> Result<u32> {
        let slot = self.slot[Self::len_state(length)].decode(rc)?;
        if slot < START_POS_MODEL_INDEX {
            return Ok(slot);
        }

        let direct_bits = (slot >> 1) - 1;
        let base = (2 | (slot & 1)) << direct_bits;

        if slot < END_POS_MODEL_INDEX {
            let offset = (base - slot) as usize;
            return Ok(base + bit_tree::reverse_decode(&mut self.special, offset, direct_bits, rc)?);
        }

        let high = rc.decode_direct_bits(direct_bits - DIST_ALIGN_BITS)? << DIST_ALIGN_BITS;
        let low = self.align.reverse_decode(rc)?;
        Ok(base + high + low)
    }

    /// Encode `distance` with the test range encoder, mirroring
    /// [`Self::decode`].
    #[cfg(test)]
    pub(crate) fn encode(
        &mut self,
        rc: &mut crate::range_coder::RangeEncoder,
        length: u32,
        distance: u32,
    ) {
        let slot = slot_of(distance);
        rc.encode_bit_tree(
            self.slot[Self::len_state(length)].probs_mut(),
            DIST_SLOT_BITS,
            slot,
        );
        if slot < START_POS_MODEL_INDEX {
            return;
        }
        let direct_bits = (slot >> 1) - 1;
        let base = (2 | (slot & 1)) << direct_bits;
        let reduced = distance - base;
        if slot < END_POS_MODEL_INDEX {
            rc.encode_reverse_bit_tree(
                &mut self.special,
                (base - slot) as usize,
                direct_bits,
                reduced,
            );
        } else {
            rc.encode_direct_bits(reduced >> DIST_ALIGN_BITS, direct_bits - DIST_ALIGN_BITS);
            rc.encode_reverse_bit_tree(
                self.align.probs_mut(),
                0,
                DIST_ALIGN_BITS,
                reduced & ((1 << DIST_ALIGN_BITS) - 1),
            );
        }
    }
}

impl Default for DistanceDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Slot whose range contains `distance`.
#[cfg(test)]
pub(crate) fn slot_of(distance: u32) -> u32 {
    if distance < START_POS_MODEL_INDEX {
        return distance;
    }
    let top = 31 - distance.leading_zeros();
    (top << 1) | ((distance >> (top - 1)) & 1)
}
