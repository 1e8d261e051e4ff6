//! Shared fixtures for integration tests.
//!
//! Every file under `tests/data/` was produced by a reference LZMA encoder
//! from one of the generators below.

#![allow(dead_code)]

use std::path::PathBuf;

/// Read a fixture from `tests/data/`.
pub fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("missing fixture {}: {e}", path.display()))
}

const TEXT: &[u8] = b"The quick brown fox jumps over the lazy dog. \
Pack my box with five dozen liquor jugs. \
How vexingly quick daft zebras jump! ";

/// The pangram text repeated and cut to `len` bytes.
pub fn text(len: usize) -> Vec<u8> {
    TEXT.iter().copied().cycle().take(len).collect()
}

/// Reproducible pseudo-random bytes from a 64-bit LCG.
pub fn lcg(len: usize, mut seed: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(len);
    for _ in 0..len {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.push((seed >> 32) as u8);
    }
    data
}

/// Default seed of [`lcg`] fixtures.
pub const SEED: u64 = 0x123456789ABCDEF0;

/// Contents of `long_distance.lzma`: a random block repeated after 3000
/// bytes of text, so every match reaches back more than 20 KiB.
pub fn long_distance() -> Vec<u8> {
    let random = lcg(20000, SEED);
    let mut data = random.clone();
    data.extend(text(3000));
    data.extend(random);
    data
}

/// Contents of `lc0_lp2_pb0.lzma`.
pub fn position_pattern() -> Vec<u8> {
    (0..3000usize)
        .map(|i| ((i * 7 + (i >> 5)) & 0xFF) as u8)
        .collect()
}

/// Contents of `mixed.lzma2`: incompressible bytes stored verbatim,
/// followed by text coded as LZMA.
pub fn mixed() -> Vec<u8> {
    let mut data = lcg(70000, 42);
    data.extend(text(5000));
    data
}
