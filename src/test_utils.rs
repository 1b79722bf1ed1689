// SPDX-License-Identifier: Apache-2.0

//! Test-only helpers.
//!
//! Keep this module lightweight so `cargo test` works out of the box.

use ndarray::Array1;

use crate::constants::SIMD_THRESHOLD_COMBINE;

/// Selector array from a `0`/`1` string such as `"010010"`.
pub fn bits(pattern: &str) -> Array1<u8> {
    pattern
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| (b != b'0') as u8)
        .collect()
}

/// Repeat `pattern` until it is at least `min_len` long.
///
/// Used to push inputs over the SIMD thresholds so both dispatch paths run.
pub fn stretch(pattern: &[u8], min_len: usize) -> Vec<u8> {
    if pattern.is_empty() {
        return Vec::new();
    }
    let repeats = min_len.div_ceil(pattern.len()).max(1);
    pattern.repeat(repeats)
}

/// A row width guaranteed to take the SIMD path when SIMD is enabled.
pub fn wide_row_len() -> usize {
    SIMD_THRESHOLD_COMBINE.min(4096).max(64) * 3 + 7
}
