// SPDX-License-Identifier: Apache-2.0

//! Array kernels
//!
//! Byte-array building blocks behind the block mask generator and the row
//! reducer: non-zero position scans, region masking, and element-wise wrapping
//! add/multiply of matrix rows. Most kernels have a scalar and a SIMD variant;
//! the dispatch layer picks one.
//!
//! ## Performance notes
//! Kernels take plain slices and never allocate inside their loops. When
//! modifying hot paths, keep it that way.

// Some clippy lints are noisy for low-level SIMD code; we opt out at the module level.
#![allow(unsafe_op_in_unsafe_fn)]

use super::constants::*;

// ARM NEON imports
#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::{vaddq_u8, vld1q_u8, vmaxvq_u8, vmulq_u8, vst1q_u8};

// x86_64 SIMD intrinsics imports - AVX2
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{
  __m256i, _mm256_add_epi8, _mm256_and_si256, _mm256_cmpeq_epi8, _mm256_loadu_si256,
  _mm256_movemask_epi8, _mm256_mullo_epi16, _mm256_or_si256, _mm256_set1_epi16,
  _mm256_setzero_si256, _mm256_slli_epi16, _mm256_srli_epi16, _mm256_storeu_si256,
};

// =============================================================================
// NON-ZERO POSITION SCAN
// =============================================================================

/// Ascending positions of the non-zero bytes in `values`.
#[inline]
pub(crate) fn nonzero_positions_scalar(values: &[u8], out: &mut Vec<usize>) {
  for (i, &v) in values.iter().enumerate() {
    if v != 0 {
      out.push(i);
    }
  }
}

// AVX2 non-zero scan: compare 32 bytes against zero, walk the inverted movemask.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
pub(crate) unsafe fn nonzero_positions_avx2(values: &[u8], len: usize, out: &mut Vec<usize>) {
  const LANES: usize = LANES_AVX2_BYTES;

  let zero = _mm256_setzero_si256();
  let full_chunks = len / LANES;
  let remaining_elements = len % LANES;

  for chunk_idx in 0..full_chunks {
    let offset = chunk_idx * LANES;
    let chunk = _mm256_loadu_si256(values.as_ptr().add(offset) as *const __m256i);
    let is_zero = _mm256_cmpeq_epi8(chunk, zero);
    let mut bits = !(_mm256_movemask_epi8(is_zero) as u32);
    while bits != 0 {
      out.push(offset + bits.trailing_zeros() as usize);
      bits &= bits - 1;
    }
  }

  // Handle remaining elements with scalar scan
  let offset = full_chunks * LANES;
  for j in 0..remaining_elements {
    if values[offset + j] != 0 {
      out.push(offset + j);
    }
  }
}

// NEON non-zero scan: skip all-zero 16-byte chunks with a horizontal max.
#[cfg(target_arch = "aarch64")]
#[inline]
pub(crate) unsafe fn nonzero_positions_neon(values: &[u8], len: usize, out: &mut Vec<usize>) {
  const LANES: usize = LANES_NEON_BYTES;

  let full_chunks = len / LANES;
  let remaining_elements = len % LANES;

  for chunk_idx in 0..full_chunks {
    let offset = chunk_idx * LANES;
    let chunk = vld1q_u8(values.as_ptr().add(offset));
    if vmaxvq_u8(chunk) == 0 {
      continue;
    }
    for j in 0..LANES {
      if values[offset + j] != 0 {
        out.push(offset + j);
      }
    }
  }

  let offset = full_chunks * LANES;
  for j in 0..remaining_elements {
    if values[offset + j] != 0 {
      out.push(offset + j);
    }
  }
}

// =============================================================================
// BLOCK MASK
// =============================================================================

/// Mask of ones with zeroed regions around anchors.
///
/// `anchors` and `boundaries` are ascending positions in `0..len`. Each anchor
/// is closed by the first boundary at or after it; the positions strictly
/// between the preceding boundary and the closing one are zeroed. The start of
/// the array is a boundary just before index 0 and the end of the array closes
/// anchors left open.
pub(crate) fn block_mask_from_positions(len: usize, anchors: &[usize], boundaries: &[usize]) -> Vec<u8> {
  if anchors.is_empty() {
    return vec![1; len];
  }
  if boundaries.is_empty() {
    return vec![0; len];
  }

  let mut mask = vec![1u8; len];
  let mut anchor_idx = 0usize;
  // first position after the previous boundary
  let mut region_start = 0usize;

  for &boundary in boundaries {
    if boundary >= anchors[anchor_idx] {
      if boundary > region_start {
        mask[region_start..boundary].fill(0);
      }
      anchor_idx += 1;
      if anchor_idx >= anchors.len() {
        break;
      }
    }
    region_start = boundary + 1;
  }

  if anchor_idx < anchors.len() && region_start < len {
    mask[region_start..].fill(0);
  }

  mask
}

// =============================================================================
// ROW ACCUMULATE (wrapping u8 add)
// =============================================================================

#[inline]
pub(crate) fn accumulate_row_scalar(acc: &mut [u8], row: &[u8]) {
  for (a, &r) in acc.iter_mut().zip(row) {
    *a = a.wrapping_add(r);
  }
}

// AVX2 row accumulate. `_mm256_add_epi8` wraps, which is the semantics we want.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
pub(crate) unsafe fn accumulate_row_avx2(acc: &mut [u8], row: &[u8], len: usize) {
  const LANES: usize = LANES_AVX2_BYTES;

  let full_chunks = len / LANES;
  let remaining_elements = len % LANES;

  for chunk_idx in 0..full_chunks {
    let offset = chunk_idx * LANES;
    let acc_chunk = _mm256_loadu_si256(acc.as_ptr().add(offset) as *const __m256i);
    let row_chunk = _mm256_loadu_si256(row.as_ptr().add(offset) as *const __m256i);
    let sum = _mm256_add_epi8(acc_chunk, row_chunk);
    _mm256_storeu_si256(acc.as_mut_ptr().add(offset) as *mut __m256i, sum);
  }

  let offset = full_chunks * LANES;
  for j in 0..remaining_elements {
    acc[offset + j] = acc[offset + j].wrapping_add(row[offset + j]);
  }
}

// NEON row accumulate.
#[cfg(target_arch = "aarch64")]
#[inline]
pub(crate) unsafe fn accumulate_row_neon(acc: &mut [u8], row: &[u8], len: usize) {
  const LANES: usize = LANES_NEON_BYTES;

  let full_chunks = len / LANES;
  let remaining_elements = len % LANES;

  for chunk_idx in 0..full_chunks {
    let offset = chunk_idx * LANES;
    let acc_chunk = vld1q_u8(acc.as_ptr().add(offset));
    let row_chunk = vld1q_u8(row.as_ptr().add(offset));
    vst1q_u8(acc.as_mut_ptr().add(offset), vaddq_u8(acc_chunk, row_chunk));
  }

  let offset = full_chunks * LANES;
  for j in 0..remaining_elements {
    acc[offset + j] = acc[offset + j].wrapping_add(row[offset + j]);
  }
}

// =============================================================================
// ROW MULTIPLY (wrapping u8 mul)
// =============================================================================

#[inline]
pub(crate) fn multiply_row_scalar(acc: &mut [u8], row: &[u8]) {
  for (a, &r) in acc.iter_mut().zip(row) {
    *a = a.wrapping_mul(r);
  }
}

// AVX2 row multiply. There is no 8-bit multiply, so even and odd bytes are
// multiplied in 16-bit lanes separately and recombined; the low byte of each
// 16-bit product is the wrapped 8-bit product.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
pub(crate) unsafe fn multiply_row_avx2(acc: &mut [u8], row: &[u8], len: usize) {
  const LANES: usize = LANES_AVX2_BYTES;

  let low_bytes = _mm256_set1_epi16(0x00FF);
  let full_chunks = len / LANES;
  let remaining_elements = len % LANES;

  for chunk_idx in 0..full_chunks {
    let offset = chunk_idx * LANES;
    let a = _mm256_loadu_si256(acc.as_ptr().add(offset) as *const __m256i);
    let b = _mm256_loadu_si256(row.as_ptr().add(offset) as *const __m256i);

    let even = _mm256_and_si256(_mm256_mullo_epi16(a, b), low_bytes);
    let odd = _mm256_mullo_epi16(_mm256_srli_epi16::<8>(a), _mm256_srli_epi16::<8>(b));
    let product = _mm256_or_si256(even, _mm256_slli_epi16::<8>(odd));

    _mm256_storeu_si256(acc.as_mut_ptr().add(offset) as *mut __m256i, product);
  }

  let offset = full_chunks * LANES;
  for j in 0..remaining_elements {
    acc[offset + j] = acc[offset + j].wrapping_mul(row[offset + j]);
  }
}

// NEON row multiply. `vmulq_u8` keeps the low 8 bits of each product.
#[cfg(target_arch = "aarch64")]
#[inline]
pub(crate) unsafe fn multiply_row_neon(acc: &mut [u8], row: &[u8], len: usize) {
  const LANES: usize = LANES_NEON_BYTES;

  let full_chunks = len / LANES;
  let remaining_elements = len % LANES;

  for chunk_idx in 0..full_chunks {
    let offset = chunk_idx * LANES;
    let acc_chunk = vld1q_u8(acc.as_ptr().add(offset));
    let row_chunk = vld1q_u8(row.as_ptr().add(offset));
    vst1q_u8(acc.as_mut_ptr().add(offset), vmulq_u8(acc_chunk, row_chunk));
  }

  let offset = full_chunks * LANES;
  for j in 0..remaining_elements {
    acc[offset + j] = acc[offset + j].wrapping_mul(row[offset + j]);
  }
}
