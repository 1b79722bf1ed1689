// SPDX-License-Identifier: Apache-2.0

//! Common constants used across implementations
//!
//! This module centralizes the feature matrix layout, lane counts and the
//! thresholds that decide between scalar and SIMD paths.

// =============================================================================
// FEATURE MATRIX LAYOUT
// =============================================================================

/// Number of columns in every feature matrix row.
pub const FEATURE_COUNT: usize = 25;

/// Raw selection byte meaning "no row". Only used at the raw interop boundary,
/// see `RowSelection::from_raw`.
pub const SENTINEL_ROW: u8 = u8::MAX;

// =============================================================================
// SIMD Lane Counts by Architecture
// =============================================================================

#[cfg(target_arch = "x86_64")]
pub use x86_constants::*;
#[cfg(target_arch = "x86_64")]
mod x86_constants {
    // AVX2 (256-bit registers)
    pub const LANES_AVX2_BYTES: usize = 32; // 256/8 = 32 byte elements
}

#[cfg(target_arch = "aarch64")]
pub use neon_constants::*;
#[cfg(target_arch = "aarch64")]
mod neon_constants {
    pub const LANES_NEON_BYTES: usize = 16; // 128/8 = 16 byte elements
}

// =============================================================================
// SIMD Performance Thresholds
// =============================================================================

// When disable-simd feature is enabled, set all thresholds to usize::MAX to force scalar implementations
#[cfg(feature = "disable-simd")]
mod thresholds {
    pub const SIMD_THRESHOLD_COMBINE: usize = usize::MAX; // Row accumulate / multiply
    pub const SIMD_THRESHOLD_MASK_SCAN: usize = usize::MAX; // Non-zero position scan
}

// Normal thresholds when SIMD is enabled (default)
#[cfg(not(feature = "disable-simd"))]
mod thresholds {
    pub const SIMD_THRESHOLD_COMBINE: usize = 64; // Row accumulate / multiply (row width in bytes)
    pub const SIMD_THRESHOLD_MASK_SCAN: usize = 64; // Non-zero position scan (selector length)
}

// Re-export the thresholds at the module level
pub use thresholds::*;
