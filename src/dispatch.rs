// SPDX-License-Identifier: Apache-2.0

//! # featmat dispatch framework
//!
//! The caller-facing surface of the crate. Every entry point validates its
//! inputs up front, then chooses between scalar kernels and SIMD backends
//! (AVX2 on x86_64, NEON on aarch64) based on target capabilities and input
//! sizes. Failures are reported before any output is produced.

use log::trace;
use ndarray::{Array1, ArrayView1, ArrayView2, ArrayViewD, Ix1, Ix2};

use super::constants::*;

#[cfg(target_arch = "aarch64")]
use std::arch::is_aarch64_feature_detected;

use crate::arrays;
use crate::features::{self, FeatureMatrix};
use crate::types::{FeatmatError, Result, RowSelection};

// =============================================================================
//  HARDWARE DETECTION & SIMD CAPABILITIES
// =============================================================================

/// Hardware capability detection used by the dispatch layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareCapabilities {
    pub has_avx2: bool,
    pub has_neon: bool,
}

impl HardwareCapabilities {
    #[inline]
    pub fn detect() -> Self {
        HardwareCapabilities {
            has_avx2: Self::detect_avx2(),
            has_neon: Self::detect_neon(),
        }
    }

    fn detect_avx2() -> bool {
        #[allow(unused_mut)]
        let mut detected_avx2 = false;

        #[cfg(target_arch = "x86_64")]
        if is_x86_feature_detected!("avx2") {
            detected_avx2 = true;
        }

        detected_avx2
    }

    fn detect_neon() -> bool {
        #[allow(unused_mut)]
        let mut detected_neon = false;

        #[cfg(target_arch = "aarch64")]
        if is_aarch64_feature_detected!("neon") {
            detected_neon = true;
        }

        detected_neon
    }
}

/// Get information about available SIMD capabilities
#[inline]
pub fn get_hw_capabilities() -> HardwareCapabilities {
    HardwareCapabilities::detect()
}

/// Check if a specific SIMD instruction set is available
#[inline]
pub fn has_hw_support(instruction_set: &str) -> bool {
    let caps = get_hw_capabilities();
    match instruction_set {
        "avx2" => caps.has_avx2,
        "neon" => caps.has_neon,
        _ => false,
    }
}

// =============================================================================
//  FEATURE MATRIX CONSTRUCTION
// =============================================================================

/// Build the per-character feature matrix for `text`.
///
/// The result has one row per `char` and `FEATURE_COUNT` columns. The start
/// and the end of the text behave as whitespace: row 0 has `PrevSpace` set and
/// the last row has `NextSpace` set.
///
/// # Examples
/// ```rust
/// use featmat::{build_feature_matrix, Feature};
///
/// let m = build_feature_matrix("Hi!")?;
/// assert_eq!(m.shape(), (3, featmat::constants::FEATURE_COUNT));
/// assert_eq!(m.get(0, Feature::Upper), Some(1));
/// assert_eq!(m.get(2, Feature::Symbol), Some(1));
/// assert_eq!(m.get(2, Feature::NextSpace), Some(1));
/// # Ok::<(), featmat::FeatmatError>(())
/// ```
pub fn build_feature_matrix(text: &str) -> Result<FeatureMatrix> {
    trace!("BUILD_FEATURE_MATRIX DISPATCH: text.len()={}", text.len());
    features::build_from_str(text)
}

/// Build the feature matrix from UTF-8 bytes.
///
/// # Errors
/// * `FeatmatError::InvalidInput` if `bytes` is not valid UTF-8
pub fn build_feature_matrix_from_utf8(bytes: &[u8]) -> Result<FeatureMatrix> {
    trace!(
        "BUILD_FEATURE_MATRIX_FROM_UTF8 DISPATCH: bytes.len()={}",
        bytes.len()
    );
    let text = std::str::from_utf8(bytes).map_err(|e| {
        FeatmatError::InvalidInput(format!("input is not valid UTF-8: {}", e))
    })?;
    features::build_from_str(text)
}

/// Build the feature matrix from raw code points.
///
/// # Errors
/// * `FeatmatError::InvalidInput` if any value is a surrogate or above U+10FFFF
pub fn build_feature_matrix_from_code_points(code_points: &[u32]) -> Result<FeatureMatrix> {
    trace!(
        "BUILD_FEATURE_MATRIX_FROM_CODE_POINTS DISPATCH: code_points.len()={}",
        code_points.len()
    );
    let chars = features::decode_code_points(code_points)?;
    let len = chars.len();
    features::build_from_chars(chars, len)
}

// =============================================================================
//  BLOCK MASK
// =============================================================================

/// Ascending positions of the non-zero entries of a selector array.
fn nonzero_positions(values: ArrayView1<'_, u8>) -> Vec<usize> {
    let len = values.len();
    let mut out = Vec::new();

    let slice = match values.to_slice() {
        Some(slice) => slice,
        None => {
            out.extend(
                values
                    .iter()
                    .enumerate()
                    .filter(|&(_, &v)| v != 0)
                    .map(|(i, _)| i),
            );
            return out;
        }
    };

    // Smart threshold-based dispatching: use scalar for short selectors
    if len < SIMD_THRESHOLD_MASK_SCAN {
        arrays::nonzero_positions_scalar(slice, &mut out);
        return out;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if get_hw_capabilities().has_avx2 {
            unsafe { arrays::nonzero_positions_avx2(slice, len, &mut out) };
            return out;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if get_hw_capabilities().has_neon {
            unsafe { arrays::nonzero_positions_neon(slice, len, &mut out) };
            return out;
        }
    }

    arrays::nonzero_positions_scalar(slice, &mut out);
    out
}

/// Generate a block mask from anchor and boundary selectors.
///
/// Returns ones everywhere except inside regions opened by a non-zero `a1`
/// (anchor) entry. Each anchor is closed by the first non-zero `a2`
/// (boundary) entry at or after it, and the positions strictly between the
/// previous boundary and that closing boundary are zeroed. The start of the
/// array counts as a boundary before index 0; the end of the array closes any
/// anchor left open.
///
/// # Arguments
/// * `a1` - anchor selector, any non-zero value counts
/// * `a2` - boundary selector, same length as `a1`
///
/// # Errors
/// * `FeatmatError::DimensionMismatch` if the lengths differ
///
/// # Examples
/// ```rust
/// use featmat::block_mask;
/// use ndarray::array;
///
/// // no anchors: nothing masked
/// let mask = block_mask(array![0u8, 0, 0].view(), array![1u8, 0, 1].view())?;
/// assert_eq!(mask.to_vec(), vec![1, 1, 1]);
///
/// let a1 = array![0u8, 0, 0, 1, 0, 0, 0, 0];
/// let a2 = array![0u8, 0, 1, 0, 0, 0, 1, 0];
/// let mask = block_mask(a1.view(), a2.view())?;
/// assert_eq!(mask.to_vec(), vec![1, 1, 1, 0, 0, 0, 1, 1]);
/// # Ok::<(), featmat::FeatmatError>(())
/// ```
pub fn block_mask(a1: ArrayView1<'_, u8>, a2: ArrayView1<'_, u8>) -> Result<Array1<u8>> {
    trace!(
        "BLOCK_MASK DISPATCH: a1.len()={}, a2.len()={}",
        a1.len(),
        a2.len()
    );

    if a1.len() != a2.len() {
        return Err(FeatmatError::DimensionMismatch(format!(
            "selector arrays must have matching length, got {} and {}",
            a1.len(),
            a2.len()
        )));
    }

    let len = a1.len();
    let anchors = nonzero_positions(a1);
    if anchors.is_empty() {
        return Ok(Array1::ones(len));
    }
    let boundaries = nonzero_positions(a2);

    Ok(Array1::from(arrays::block_mask_from_positions(
        len,
        &anchors,
        &boundaries,
    )))
}

/// Rank-checked variant of [`block_mask`] for arrays whose dimensionality is
/// only known at runtime.
///
/// # Errors
/// * `FeatmatError::DimensionMismatch` if either array is not 1-D or the lengths differ
pub fn block_mask_dyn(a1: ArrayViewD<'_, u8>, a2: ArrayViewD<'_, u8>) -> Result<Array1<u8>> {
    trace!(
        "BLOCK_MASK_DYN DISPATCH: a1.ndim()={}, a2.ndim()={}",
        a1.ndim(),
        a2.ndim()
    );

    let (d1, d2) = (a1.ndim(), a2.ndim());
    match (a1.into_dimensionality::<Ix1>(), a2.into_dimensionality::<Ix1>()) {
        (Ok(a1), Ok(a2)) => block_mask(a1, a2),
        _ => Err(FeatmatError::DimensionMismatch(format!(
            "selector arrays must be 1-D, got {}-D and {}-D",
            d1, d2
        ))),
    }
}

// =============================================================================
//  ROW COMBINATION
// =============================================================================

/// Borrow row `index` as a contiguous slice, copying into `scratch` when the
/// view is strided (e.g. a transposed feature matrix).
#[inline]
fn row_slice<'a>(matrix: &'a ArrayView2<'_, u8>, index: usize, scratch: &'a mut Vec<u8>) -> &'a [u8] {
    let row = matrix.row(index);
    match row.to_slice() {
        Some(slice) => slice,
        None => {
            scratch.clear();
            scratch.extend(row.iter().copied());
            scratch.as_slice()
        }
    }
}

/// `acc[k] = acc[k].wrapping_add(row[k])`, threshold-dispatched.
#[inline]
fn accumulate_row(
    acc: &mut [u8],
    row: &[u8],
    #[allow(unused_variables)] caps: HardwareCapabilities,
) {
    let len = acc.len();

    if len < SIMD_THRESHOLD_COMBINE {
        arrays::accumulate_row_scalar(acc, row);
        return;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if caps.has_avx2 {
            unsafe { arrays::accumulate_row_avx2(acc, row, len) };
            return;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if caps.has_neon {
            unsafe { arrays::accumulate_row_neon(acc, row, len) };
            return;
        }
    }

    arrays::accumulate_row_scalar(acc, row);
}

/// `acc[k] = acc[k].wrapping_mul(row[k])`, threshold-dispatched.
#[inline]
fn multiply_row(
    acc: &mut [u8],
    row: &[u8],
    #[allow(unused_variables)] caps: HardwareCapabilities,
) {
    let len = acc.len();

    if len < SIMD_THRESHOLD_COMBINE {
        arrays::multiply_row_scalar(acc, row);
        return;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if caps.has_avx2 {
            unsafe { arrays::multiply_row_avx2(acc, row, len) };
            return;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if caps.has_neon {
            unsafe { arrays::multiply_row_neon(acc, row, len) };
            return;
        }
    }

    arrays::multiply_row_scalar(acc, row);
}

/// Combine selected matrix rows into one row.
///
/// * `RowSelection::Flat` - the selected rows are summed ("or").
/// * `RowSelection::Grouped` - the rows of each group are multiplied
///   element-wise ("and"), then the group products are summed ("or").
///
/// Arithmetic is wrapping 8-bit. Skipped slots (`None`) contribute nothing; a
/// group with no selected row contributes nothing. The result always has one
/// entry per matrix column.
///
/// # Errors
/// * `FeatmatError::IndexOutOfRange` if a selected index is not a row of `matrix`
///
/// # Examples
/// ```rust
/// use featmat::{combine_rows, RowSelection};
/// use ndarray::array;
///
/// let m = array![[1u8, 0, 1, 1], [1, 1, 0, 1], [0, 0, 1, 1]];
///
/// // row 0 OR row 2
/// let or = combine_rows(m.view(), &RowSelection::flat([0, 2]))?;
/// assert_eq!(or.to_vec(), vec![1, 0, 2, 2]);
///
/// // (row 0 AND row 1) OR row 2
/// let and_or = combine_rows(m.view(), &RowSelection::grouped([vec![0, 1], vec![2]]))?;
/// assert_eq!(and_or.to_vec(), vec![1, 0, 1, 2]);
/// # Ok::<(), featmat::FeatmatError>(())
/// ```
pub fn combine_rows(matrix: ArrayView2<'_, u8>, selection: &RowSelection) -> Result<Array1<u8>> {
    let (rows, cols) = matrix.dim();
    trace!(
        "COMBINE_ROWS DISPATCH: rows={}, cols={}, grouped={}",
        rows,
        cols,
        matches!(selection, RowSelection::Grouped(_))
    );

    selection.check_bounds(rows)?;

    let caps = get_hw_capabilities();
    let mut result = vec![0u8; cols];
    let mut scratch = Vec::with_capacity(cols);

    match selection {
        RowSelection::Flat(indices) => {
            for &index in indices.iter().flatten() {
                let row = row_slice(&matrix, index, &mut scratch);
                accumulate_row(&mut result, row, caps);
            }
        }
        RowSelection::Grouped(groups) => {
            let mut product = vec![0u8; cols];
            for group in groups {
                let mut seeded = false;
                for &index in group.iter().flatten() {
                    let row = row_slice(&matrix, index, &mut scratch);
                    if seeded {
                        multiply_row(&mut product, row, caps);
                    } else {
                        product.copy_from_slice(row);
                        seeded = true;
                    }
                }
                if seeded {
                    accumulate_row(&mut result, &product, caps);
                }
            }
        }
    }

    Ok(Array1::from(result))
}

/// Rank-checked variant of [`combine_rows`].
///
/// # Errors
/// * `FeatmatError::Shape` if `matrix` is not 2-D
/// * `FeatmatError::IndexOutOfRange` as for [`combine_rows`]
pub fn combine_rows_dyn(matrix: ArrayViewD<'_, u8>, selection: &RowSelection) -> Result<Array1<u8>> {
    trace!("COMBINE_ROWS_DYN DISPATCH: matrix.ndim()={}", matrix.ndim());

    let ndim = matrix.ndim();
    let matrix = matrix.into_dimensionality::<Ix2>().map_err(|_| {
        FeatmatError::Shape(format!("matrix must be 2-D, got {}-D", ndim))
    })?;
    combine_rows(matrix, selection)
}

/// Combine rows using a raw byte selection, where `SENTINEL_ROW` (255) marks a
/// skipped slot. A 1-D selection is flat, a 2-D selection is grouped.
///
/// # Errors
/// * `FeatmatError::Shape` if `matrix` is not 2-D or `selection` has more than 2 dimensions
/// * `FeatmatError::IndexOutOfRange` as for [`combine_rows`]
pub fn combine_rows_raw(matrix: ArrayViewD<'_, u8>, selection: ArrayViewD<'_, u8>) -> Result<Array1<u8>> {
    trace!(
        "COMBINE_ROWS_RAW DISPATCH: matrix.ndim()={}, selection.ndim()={}",
        matrix.ndim(),
        selection.ndim()
    );

    if matrix.ndim() != 2 {
        return Err(FeatmatError::Shape(format!(
            "matrix must be 2-D, got {}-D",
            matrix.ndim()
        )));
    }
    let selection = RowSelection::from_raw(selection)?;
    combine_rows_dyn(matrix, &selection)
}
