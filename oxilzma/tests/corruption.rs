//! Malformed, truncated and inconsistent streams must fail with a typed
//! error, never succeed with short or wrong output.

mod common;

use common::{fixture, text};
use oxilzma::{
    DecoderOptions, EndMarker, ErrorKind, HEADER_SIZE, LzmaDecoder, LzmaError, LzmaProperties,
    RangeDecoder, UnpackedSize, decompress, decompress_with_options,
};

fn with_declared_size(mut data: Vec<u8>, size: u64) -> Vec<u8> {
    data[5..HEADER_SIZE].copy_from_slice(&size.to_le_bytes());
    data
}

#[test]
fn test_truncated_marker_stream() {
    let mut data = fixture("text.lzma");
    data.pop();
    let err = decompress(&data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RangeDecoderInit);
}

#[test]
fn test_truncated_known_size_stream() {
    for name in ["text_known_size.lzma", "text_no_marker.lzma"] {
        let mut data = fixture(name);
        data.pop();
        let err = decompress(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RangeDecoderInit, "{name}");
    }
}

#[test]
fn test_stream_cut_inside_range_coder_init() {
    let data = fixture("hello.lzma");
    let err = decompress(&data[..HEADER_SIZE + 3]).unwrap_err();
    assert!(matches!(err, LzmaError::RangeDecoderInit { needed: 2 }));
}

#[test]
fn test_declared_size_smaller_than_stream() {
    let data = with_declared_size(fixture("text.lzma"), 100);
    let err = decompress(&data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RepeatLengthExceedsRemaining);
}

#[test]
fn test_declared_size_larger_than_stream() {
    let data = with_declared_size(fixture("text.lzma"), 5000);
    let err = decompress(&data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidHeader);
}

#[test]
fn test_residual_code_after_last_symbol() {
    let data = fixture("text_no_marker.lzma");
    let strict = DecoderOptions::new().end_marker(EndMarker::Forbidden);

    for (flip, code) in [(0x01u8, 0x01u32), (0x02, 0x02), (0x80, 0x80)] {
        let mut corrupt = data.clone();
        if let Some(last) = corrupt.last_mut() {
            *last ^= flip;
        }
        let err = decompress_with_options(&corrupt, &strict).unwrap_err();
        assert!(
            matches!(err, LzmaError::RangeDecoderResidual { code: c } if c == code),
            "flip {flip:#x}: {err}"
        );
    }
}

#[test]
fn test_residual_check_can_be_disabled() {
    let mut data = fixture("text_no_marker.lzma");
    if let Some(last) = data.last_mut() {
        *last ^= 0x01;
    }
    let lenient = DecoderOptions::new()
        .end_marker(EndMarker::Forbidden)
        .verify_residual(false);
    assert_eq!(
        decompress_with_options(&data, &lenient).unwrap(),
        text(4096)
    );
}

#[test]
fn test_nonzero_residual_expects_marker() {
    // With a marker allowed, a non-zero code at the declared size means
    // the stream continues, and the next symbol overruns the size.
    let mut data = fixture("text_no_marker.lzma");
    if let Some(last) = data.last_mut() {
        *last ^= 0x01;
    }
    let err = decompress(&data).unwrap_err();
    assert!(matches!(
        err,
        LzmaError::UncompressedSizeExceeded { limit: 4096 }
    ));
}

#[test]
fn test_marker_required_but_absent() {
    let data = fixture("text_no_marker.lzma");
    let options = DecoderOptions::new().end_marker(EndMarker::Required);
    let err = decompress_with_options(&data, &options).unwrap_err();
    assert!(err.is_data_error());
}

#[test]
fn test_invalid_properties_byte() {
    let mut data = fixture("hello.lzma");
    data[0] = 225;
    let err = decompress(&data).unwrap_err();
    assert!(matches!(err, LzmaError::InvalidProperties { byte: 225 }));
}

#[test]
fn test_short_header() {
    let data = fixture("hello.lzma");
    let err = decompress(&data[..7]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}

#[test]
fn test_memory_limit_rejects_large_dictionary() {
    let data = fixture("text.lzma");
    let options = DecoderOptions::new().memory_limit(64 * 1024);
    let err = decompress_with_options(&data, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidHeader);
}

#[test]
fn test_dictionary_too_small_for_distances() {
    // The long-distance fixture repeats a 20000-byte block; a 4 KiB
    // dictionary cannot reach it.
    let data = fixture("long_distance.lzma");
    let mut decoder = LzmaDecoder::with_properties(LzmaProperties::default(), 4096);
    let mut rc = RangeDecoder::from_slice(&data[HEADER_SIZE..]).unwrap();
    let err = decoder
        .decode(&mut rc, UnpackedSize::UntilMarker)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientHistory);
    // Output decoded before the failure stays available for inspection
    assert!(decoder.output().len() >= 20000);
}
