//! LZMA decompression.
//!
//! [`LzmaDecoder`] holds everything that survives between calls: the
//! probability model, the state machine, the four most recent distances
//! and the output window. A range decoder is supplied per call, so LZMA2
//! can feed each chunk through its own range decoder while the model and
//! history carry over.

use crate::distance::END_MARKER_DISTANCE;
use crate::model::{
    DecoderOptions, EndMarker, LzmaModel, LzmaProperties, UnpackedSize, effective_dict_size,
};
use crate::range_coder::RangeDecoder;
use crate::state::State;
use oxilzma_core::error::{LzmaError, Result};
use oxilzma_core::window::OutputWindow;
use tracing::debug;

/// Output reserved up front when the size is known, at most.
const PREALLOC_MAX: u64 = 1 << 24;

/// How a decode call stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The end-of-stream marker was decoded.
    Marker,
    /// The requested number of bytes was produced.
    SizeReached,
}

/// LZMA decoder.
#[derive(Debug, Clone)]
pub struct LzmaDecoder {
    /// Probability model; `None` until properties are supplied.
    model: Option<LzmaModel>,
    /// Current state.
    state: State,
    /// Rep distances, most recent first.
    reps: [u32; 4],
    /// Output produced so far.
    window: OutputWindow,
    /// End marker policy.
    end_marker: EndMarker,
}

impl LzmaDecoder {
    /// Create a decoder without properties.
    ///
    /// [`Self::decode`] fails with [`LzmaError::UninitializedDecoder`] until
    /// [`Self::set_properties`] is called.
    pub fn new(dict_size: u32) -> Self {
        Self {
            model: None,
            state: State::LitLit,
            reps: [0; 4],
            window: OutputWindow::new(effective_dict_size(dict_size) as usize),
            end_marker: EndMarker::Allowed,
        }
    }

    /// Create a decoder ready to decode.
    pub fn with_properties(props: LzmaProperties, dict_size: u32) -> Self {
        let mut decoder = Self::new(dict_size);
        decoder.set_properties(props);
        decoder
    }

    /// Set the end marker policy.
    pub fn with_end_marker(mut self, policy: EndMarker) -> Self {
        self.end_marker = policy;
        self
    }

    /// Reserve room for `expected` more output bytes.
    pub fn reserve(&mut self, expected: u64) {
        self.window.reserve(expected.min(PREALLOC_MAX) as usize);
    }

    /// Install new properties with a freshly initialized model and state.
    pub fn set_properties(&mut self, props: LzmaProperties) {
        self.model = Some(LzmaModel::new(props));
        self.state = State::LitLit;
        self.reps = [0; 4];
    }

    /// Reset probabilities, state and rep distances, keeping the output.
    pub fn reset_state(&mut self) {
        if let Some(model) = self.model.as_mut() {
            model.reset();
        }
        self.state = State::LitLit;
        self.reps = [0; 4];
    }

    /// Forget the history available to back-references.
    pub fn reset_dictionary(&mut self) {
        self.window.reset_dictionary();
    }

    /// Append bytes stored verbatim in the container.
    pub fn append_stored(&mut self, bytes: &[u8]) {
        self.window.extend_stored(bytes);
    }

    /// Current properties, if any.
    pub fn properties(&self) -> Option<LzmaProperties> {
        self.model.as_ref().map(|model| model.props)
    }

    /// Current state machine state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Rep distances, most recent first.
    pub fn reps(&self) -> [u32; 4] {
        self.reps
    }

    /// The output window.
    pub fn window(&self) -> &OutputWindow {
        &self.window
    }

    /// Bytes produced so far.
    pub fn output(&self) -> &[u8] {
        self.window.as_slice()
    }

    /// Consume the decoder and return its output.
    pub fn into_output(self) -> Vec<u8> {
        self.window.into_inner()
    }

    /// Decode symbols from `rc` until `size` more bytes have been produced
    /// or the end marker is found.
    ///
    /// Output produced before an error stays in the window.
    pub fn decode(&mut self, rc: &mut RangeDecoder<'_>, size: UnpackedSize) -> Result<StreamEnd> {
        let Self {
            model,
            state,
            reps,
            window,
            end_marker,
        } = self;
        let model = model.as_mut().ok_or(LzmaError::UninitializedDecoder)?;

        let limit = match size {
            UnpackedSize::Known(limit) => Some(limit),
            UnpackedSize::UntilMarker if *end_marker == EndMarker::Forbidden => {
                return Err(LzmaError::invalid_header(
                    "unknown size requires an end marker",
                ));
            }
            UnpackedSize::UntilMarker => None,
        };
        let pos_mask = model.props.pos_mask();
        let mut produced = 0u64;

        loop {
            let remaining = limit.map(|limit| limit - produced);
            if remaining == Some(0) {
                match end_marker {
                    EndMarker::Forbidden => return Ok(StreamEnd::SizeReached),
                    EndMarker::Allowed if rc.is_finished_ok() => {
                        return Ok(StreamEnd::SizeReached);
                    }
                    _ => {}
                }
            }

            let pos_state = window.position() & pos_mask;
            let s = state.index();

            if rc.decode_bit(&mut model.is_match[s][pos_state])? == 0 {
                if let (Some(0), Some(limit)) = (remaining, limit) {
                    return Err(LzmaError::size_exceeded(limit));
                }
                let byte = model.literal.decode(rc, window, *state, reps[0])?;
                window.push(byte);
                produced += 1;
                *state = state.after_literal();
                continue;
            }

            let length;
            if rc.decode_bit(&mut model.is_rep[s])? != 0 {
                if let (Some(0), Some(limit)) = (remaining, limit) {
                    return Err(LzmaError::size_exceeded(limit));
                }
                if window.available() == 0 {
                    return Err(LzmaError::EmptyWindow);
                }

                if rc.decode_bit(&mut model.is_rep_g0[s])? == 0 {
                    if rc.decode_bit(&mut model.is_rep0_long[s][pos_state])? == 0 {
                        *state = state.after_short_rep();
                        window.copy_match(reps[0] as usize, 1)?;
                        produced += 1;
                        continue;
                    }
                } else {
                    let distance;
                    if rc.decode_bit(&mut model.is_rep_g1[s])? == 0 {
                        distance = reps[1];
                    } else {
                        if rc.decode_bit(&mut model.is_rep_g2[s])? == 0 {
                            distance = reps[2];
                        } else {
                            distance = reps[3];
                            reps[3] = reps[2];
                        }
                        reps[2] = reps[1];
                    }
                    reps[1] = reps[0];
                    reps[0] = distance;
                }

                length = model.rep_len.decode(rc, pos_state)?;
                *state = state.after_rep();
            } else {
                reps[3] = reps[2];
                reps[2] = reps[1];
                reps[1] = reps[0];
                length = model.match_len.decode(rc, pos_state)?;
                *state = state.after_match();
                reps[0] = model.distance.decode(rc, length)?;

                if reps[0] == END_MARKER_DISTANCE {
                    if *end_marker == EndMarker::Forbidden {
                        return Err(LzmaError::insufficient_history(
                            END_MARKER_DISTANCE as u64,
                            window.available() as u64,
                        ));
                    }
                    if let Some(remaining) = remaining.filter(|&remaining| remaining > 0) {
                        return Err(LzmaError::invalid_header(format!(
                            "end marker found {remaining} bytes before the declared size"
                        )));
                    }
                    return Ok(StreamEnd::Marker);
                }
                if let (Some(0), Some(limit)) = (remaining, limit) {
                    return Err(LzmaError::size_exceeded(limit));
                }
            }

            let mut count = length as u64;
            let truncated = remaining.filter(|&remaining| count > remaining);
            if let Some(remaining) = truncated {
                count = remaining;
            }
            window.copy_match(reps[0] as usize, count as usize)?;
            produced += count;

            if let Some(remaining) = truncated {
                return Err(LzmaError::repeat_exceeds(length as usize, remaining));
            }
        }
    }
}

/// Decompress raw LZMA data (no header).
pub fn decompress_raw(
    data: &[u8],
    props: LzmaProperties,
    dict_size: u32,
    size: UnpackedSize,
) -> Result<Vec<u8>> {
    decompress_raw_with_options(data, props, dict_size, size, &DecoderOptions::default())
}

/// Decompress raw LZMA data (no header) with explicit options.
pub fn decompress_raw_with_options(
    data: &[u8],
    props: LzmaProperties,
    dict_size: u32,
    size: UnpackedSize,
    options: &DecoderOptions,
) -> Result<Vec<u8>> {
    let dict_size = effective_dict_size(dict_size);
    options.check_dict_size(dict_size)?;

    debug!(
        lc = props.lc,
        lp = props.lp,
        pb = props.pb,
        dict_size,
        ?size,
        input_len = data.len(),
        "starting LZMA decode"
    );

    let mut decoder =
        LzmaDecoder::with_properties(props, dict_size).with_end_marker(options.end_marker);
    if let UnpackedSize::Known(expected) = size {
        decoder.reserve(expected);
    }

    let mut rc = RangeDecoder::from_slice(data)?;
    let end = decoder.decode(&mut rc, size)?;
    if options.verify_residual {
        rc.finish()?;
    }

    debug!(
        ?end,
        output_len = decoder.output().len(),
        unused_input = rc.input().remaining(),
        "finished LZMA decode"
    );
    Ok(decoder.into_output())
}
