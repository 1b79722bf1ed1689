// SPDX-License-Identifier: Apache-2.0

//! featmat library
//!
//! The character-level feature-matrix engine behind a linear-algebraic
//! tokenizer. A string becomes a `(len, FEATURE_COUNT)` byte matrix holding
//! each character's classification and that of its neighbours; two array
//! primitives then turn feature columns into split decisions:
//!
//! - **Feature matrix builder**: [`build_feature_matrix`]
//! - **Block mask generator**: [`block_mask`]
//! - **Row combination reducer**: [`combine_rows`]
//!
//! ## Hardware support
//! - **AVX2 / NEON** are used on stable Rust where available
//! - the `disable-simd` feature forces the scalar kernels
//!
//! ## Usage
//!
//! ```rust
//! use featmat::{block_mask, build_feature_matrix, combine_rows, Feature, RowSelection};
//!
//! let m = build_feature_matrix("mail me@example.com now")?;
//!
//! // per-character "@ between alphanumerics" flags
//! let email = RowSelection::from_features([[
//!     Feature::CharAt,
//!     Feature::PrevAlphaNum,
//!     Feature::NextAlphaNum,
//! ]]);
//! let anchors = combine_rows(m.transposed(), &email)?;
//!
//! // keep the whole address in one piece: mask between the surrounding spaces
//! let keep = block_mask(anchors.view(), m.column(Feature::Space).view())?;
//! assert_eq!(keep[4], 1);
//! assert_eq!(keep[10], 0);
//! # Ok::<(), featmat::FeatmatError>(())
//! ```

pub mod arrays;
pub mod classify;
pub mod constants;
pub mod dispatch;
pub mod features;
pub mod types;

pub use classify::{classify_char, classify_code_point, CharFlags};
pub use dispatch::*;
pub use features::FeatureMatrix;
pub use types::*;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
#[path = "tests/arrays_tests.rs"]
mod arrays_tests;
#[cfg(test)]
#[path = "tests/classify_tests.rs"]
mod classify_tests;
#[cfg(test)]
#[path = "tests/features_tests.rs"]
mod features_tests;
#[cfg(test)]
#[path = "tests/properties_tests.rs"]
mod properties_tests;
