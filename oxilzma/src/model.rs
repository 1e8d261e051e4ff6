//! LZMA properties, decoding options and the probability model.
//!
//! LZMA uses context-dependent probability models for:
//! - Literal decoding (context = previous byte + position)
//! - Match and rep length decoding
//! - Distance decoding
//! - Symbol kind decisions, keyed by state and position

use crate::distance::DistanceDecoder;
use crate::length::LengthDecoder;
use crate::literal::LiteralDecoder;
use crate::range_coder::{PROB_INIT, Prob};
use crate::state::NUM_STATES;
use oxilzma_core::error::{LzmaError, Result};

/// Literal context bits (default: 3).
pub const LC_DEFAULT: u32 = 3;

/// Literal position bits (default: 0).
pub const LP_DEFAULT: u32 = 0;

/// Position bits (default: 2).
pub const PB_DEFAULT: u32 = 2;

/// Largest `lc`.
pub const LC_MAX: u32 = 8;
/// Largest `lp`.
pub const LP_MAX: u32 = 4;
/// Largest `pb`.
pub const PB_MAX: u32 = 4;

/// Maximum number of position states.
pub const POS_STATES_MAX: usize = 1 << PB_MAX;

/// Properties bytes at or above this value are invalid.
pub const PROPS_BYTE_LIMIT: u8 = 9 * 5 * 5;

/// Smallest dictionary a decoder will use.
pub const DICT_SIZE_MIN: u32 = 1 << 12;

/// LZMA properties (lc, lp, pb).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzmaProperties {
    /// Literal context bits.
    pub lc: u32,
    /// Literal position bits.
    pub lp: u32,
    /// Position bits.
    pub pb: u32,
}

impl LzmaProperties {
    /// Create new properties, checking each field's range.
    pub fn new(lc: u32, lp: u32, pb: u32) -> Result<Self> {
        if lc > LC_MAX || lp > LP_MAX || pb > PB_MAX {
            return Err(LzmaError::invalid_header(format!(
                "properties out of range: lc={lc} lp={lp} pb={pb}"
            )));
        }
        Ok(Self { lc, lp, pb })
    }

    /// Parse from property byte: `(pb * 5 + lp) * 9 + lc`.
    pub fn from_byte(byte: u8) -> Result<Self> {
        if byte >= PROPS_BYTE_LIMIT {
            return Err(LzmaError::invalid_properties(byte));
        }
        let value = byte as u32;
        Ok(Self {
            lc: value % 9,
            lp: (value / 9) % 5,
            pb: value / 45,
        })
    }

    /// Encode to property byte.
    pub fn to_byte(&self) -> u8 {
        ((self.pb * 5 + self.lp) * 9 + self.lc) as u8
    }

    /// Get number of literal contexts.
    pub fn num_lit_states(&self) -> usize {
        1 << (self.lc + self.lp)
    }

    /// Get number of position states.
    pub fn num_pos_states(&self) -> usize {
        1 << self.pb
    }

    /// Mask selecting the position state from an output position.
    pub fn pos_mask(&self) -> usize {
        self.num_pos_states() - 1
    }
}

impl Default for LzmaProperties {
    fn default() -> Self {
        Self {
            lc: LC_DEFAULT,
            lp: LP_DEFAULT,
            pb: PB_DEFAULT,
        }
    }
}

/// Raise a declared dictionary size to the decoder's minimum.
pub fn effective_dict_size(dict_size: u32) -> u32 {
    dict_size.max(DICT_SIZE_MIN)
}

/// How much output a decode call should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpackedSize {
    /// Exactly this many bytes.
    Known(u64),
    /// Until the end-of-stream marker.
    UntilMarker,
}

impl UnpackedSize {
    /// Interpret the 64-bit size field of a `.lzma` header, where all
    /// ones means unknown.
    pub fn from_header_field(value: u64) -> Self {
        if value == u64::MAX {
            Self::UntilMarker
        } else {
            Self::Known(value)
        }
    }

    /// The 64-bit header encoding of this size.
    pub fn to_header_field(self) -> u64 {
        match self {
            Self::Known(value) => value,
            Self::UntilMarker => u64::MAX,
        }
    }

    /// The declared size, if known.
    pub fn known(self) -> Option<u64> {
        match self {
            Self::Known(value) => Some(value),
            Self::UntilMarker => None,
        }
    }
}

/// End-of-stream marker policy when the size is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndMarker {
    /// Stop at the declared size, or consume a marker if one follows.
    #[default]
    Allowed,
    /// The stream must end with a marker.
    Required,
    /// The stream must not contain a marker.
    Forbidden,
}

/// Options controlling a decoding session.
#[derive(Debug, Clone)]
pub struct DecoderOptions {
    /// End marker policy.
    pub end_marker: EndMarker,
    /// Require a zero code register after the last symbol.
    pub verify_residual: bool,
    /// Upper bound on the dictionary size, in bytes.
    pub memory_limit: Option<u64>,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            end_marker: EndMarker::Allowed,
            verify_residual: true,
            memory_limit: None,
        }
    }
}

impl DecoderOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the end marker policy.
    pub fn end_marker(mut self, policy: EndMarker) -> Self {
        self.end_marker = policy;
        self
    }

    /// Enable or disable the zero-residual check.
    pub fn verify_residual(mut self, verify: bool) -> Self {
        self.verify_residual = verify;
        self
    }

    /// Reject dictionaries larger than `limit` bytes.
    pub fn memory_limit(mut self, limit: u64) -> Self {
        self.memory_limit = Some(limit);
        self
    }

    /// Check a dictionary size against the memory limit.
    pub fn check_dict_size(&self, dict_size: u32) -> Result<()> {
        match self.memory_limit {
            Some(limit) if dict_size as u64 > limit => Err(LzmaError::invalid_header(format!(
                "dictionary of {dict_size} bytes exceeds memory limit of {limit} bytes"
            ))),
            _ => Ok(()),
        }
    }
}

/// Complete LZMA model containing all probability tables.
#[derive(Debug, Clone)]
pub struct LzmaModel {
    /// LZMA properties.
    pub props: LzmaProperties,

    /// Is-match probabilities.
    pub is_match: [[Prob; POS_STATES_MAX]; NUM_STATES],
    /// Is-rep probabilities.
    pub is_rep: [Prob; NUM_STATES],
    /// Is-rep0 probabilities.
    pub is_rep_g0: [Prob; NUM_STATES],
    /// Is-rep1 probabilities.
    pub is_rep_g1: [Prob; NUM_STATES],
    /// Is-rep2 probabilities.
    pub is_rep_g2: [Prob; NUM_STATES],
    /// Is-rep0-long probabilities.
    pub is_rep0_long: [[Prob; POS_STATES_MAX]; NUM_STATES],

    /// Match length decoder.
    pub match_len: LengthDecoder,
    /// Rep match length decoder.
    pub rep_len: LengthDecoder,

    /// Literal decoder.
    pub literal: LiteralDecoder,

    /// Distance decoder.
    pub distance: DistanceDecoder,
}

impl LzmaModel {
    /// Create a new LZMA model with the given properties.
    pub fn new(props: LzmaProperties) -> Self {
        Self {
            props,
            is_match: [[PROB_INIT; POS_STATES_MAX]; NUM_STATES],
            is_rep: [PROB_INIT; NUM_STATES],
            is_rep_g0: [PROB_INIT; NUM_STATES],
            is_rep_g1: [PROB_INIT; NUM_STATES],
            is_rep_g2: [PROB_INIT; NUM_STATES],
            is_rep0_long: [[PROB_INIT; POS_STATES_MAX]; NUM_STATES],
            match_len: LengthDecoder::new(),
            rep_len: LengthDecoder::new(),
            literal: LiteralDecoder::new(props.lc, props.lp),
            distance: DistanceDecoder::new(),
        }
    }

    /// Reset all probabilities to initial values.
    pub fn reset(&mut self) {
        for state in &mut self.is_match {
            state.fill(PROB_INIT);
        }
        self.is_rep.fill(PROB_INIT);
        self.is_rep_g0.fill(PROB_INIT);
        self.is_rep_g1.fill(PROB_INIT);
        self.is_rep_g2.fill(PROB_INIT);
        for state in &mut self.is_rep0_long {
            state.fill(PROB_INIT);
        }
        self.match_len.reset();
        self.rep_len.reset();
        self.literal.reset();
        self.distance.reset();
    }
}
