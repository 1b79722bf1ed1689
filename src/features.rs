// SPDX-License-Identifier: Apache-2.0

//! Feature matrix construction
//!
//! One row per code point, `FEATURE_COUNT` byte columns per row. A row holds
//! the character's own classification plus the classification of its
//! neighbours at offsets -1, +1 and +2.
//!
//! The builder walks the text once. When it reaches position `i` it writes row
//! `i`, pushes row `i`'s values back into the "next" columns of row `i-1` and
//! the "after next" columns of row `i-2`, and pulls row `i-1`'s values into its
//! own "prev" columns. Rows whose right-hand neighbours do not exist get the
//! end-of-text defaults, which behave like whitespace.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::Serialize;

use crate::classify::{classify_char, CharFlags};
use crate::constants::FEATURE_COUNT;
use crate::types::{FeatmatError, Feature, Result};

const F: usize = FEATURE_COUNT;

/// Immutable per-character feature matrix with shape `(len, FEATURE_COUNT)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureMatrix {
    data: Array2<u8>,
}

impl FeatureMatrix {
    /// Number of rows (code points).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    #[inline]
    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.data.view()
    }

    /// Features as rows, characters as columns: `(FEATURE_COUNT, len)`.
    ///
    /// This is the layout to hand to the row reducer when combining feature
    /// columns into a per-character mask.
    #[inline]
    pub fn transposed(&self) -> ArrayView2<'_, u8> {
        self.data.view().reversed_axes()
    }

    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, u8>> {
        (index < self.len()).then(|| self.data.row(index))
    }

    /// Owned copy of one feature column, one entry per character.
    pub fn column(&self, feature: Feature) -> Array1<u8> {
        self.data.index_axis(Axis(1), feature.index()).to_owned()
    }

    pub fn get(&self, index: usize, feature: Feature) -> Option<u8> {
        self.data.get((index, feature.index())).copied()
    }

    /// Names of the features set in row `index`, in column order.
    pub fn active_features(&self, index: usize) -> Vec<Feature> {
        match self.row(index) {
            Some(row) => Feature::ALL
                .iter()
                .copied()
                .filter(|f| row[f.index()] != 0)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn into_inner(self) -> Array2<u8> {
        self.data
    }
}

// =============================================================================
// ROW WRITERS
// =============================================================================

#[inline]
fn put(buf: &mut [u8], row: usize, feature: Feature, value: u8) {
    buf[row + feature.index()] = value;
}

#[inline]
fn take(buf: &[u8], row: usize, feature: Feature) -> u8 {
    buf[row + feature.index()]
}

/// Fill row `i` from its flags and settle every neighbour column that
/// position `i` can decide.
#[inline]
fn write_position(buf: &mut [u8], i: usize, len: usize, flags: CharFlags) {
    let cur = i * F;

    put(buf, cur, Feature::Alpha, flags.contains(CharFlags::ALPHA) as u8);
    put(buf, cur, Feature::AlphaNum, flags.is_alpha_numeric() as u8);
    put(buf, cur, Feature::Num, flags.contains(CharFlags::NUMERIC) as u8);
    put(buf, cur, Feature::Lower, flags.contains(CharFlags::LOWER) as u8);
    put(buf, cur, Feature::Upper, flags.contains(CharFlags::UPPER) as u8);
    put(buf, cur, Feature::Space, flags.contains(CharFlags::SPACE) as u8);
    put(buf, cur, Feature::Symbol, flags.is_symbol() as u8);
    put(buf, cur, Feature::Special, flags.contains(CharFlags::SPECIAL) as u8);
    put(buf, cur, Feature::CharAt, flags.contains(CharFlags::CHAR_AT) as u8);
    put(buf, cur, Feature::CharColon, flags.contains(CharFlags::CHAR_COLON) as u8);
    put(buf, cur, Feature::CharSlash, flags.contains(CharFlags::CHAR_SLASH) as u8);
    put(buf, cur, Feature::CharPeriod, flags.contains(CharFlags::CHAR_PERIOD) as u8);

    if i >= 1 {
        let prev = cur - F;

        // forward: this row becomes the previous row's "next"
        put(buf, prev, Feature::NextAlpha, take(buf, cur, Feature::Alpha));
        put(buf, prev, Feature::NextAlphaNum, take(buf, cur, Feature::AlphaNum));
        put(buf, prev, Feature::NextLower, take(buf, cur, Feature::Lower));
        put(buf, prev, Feature::NextSpace, take(buf, cur, Feature::Space));
        put(buf, prev, Feature::NextAt, take(buf, cur, Feature::CharAt));
        put(buf, prev, Feature::NextSlash, take(buf, cur, Feature::CharSlash));

        // backward: the previous row becomes this row's "prev"
        put(buf, cur, Feature::PrevAlpha, take(buf, prev, Feature::Alpha));
        put(buf, cur, Feature::PrevAlphaNum, take(buf, prev, Feature::AlphaNum));
        put(buf, cur, Feature::PrevLower, take(buf, prev, Feature::Lower));
        put(buf, cur, Feature::PrevSpace, take(buf, prev, Feature::Space));
        put(buf, cur, Feature::PrevSymbol, take(buf, prev, Feature::Symbol));
    } else {
        // start of text behaves as a space
        put(buf, cur, Feature::PrevSpace, 1);
    }

    if i >= 2 {
        let before_prev = cur - 2 * F;
        put(buf, before_prev, Feature::AfterNextAlpha, take(buf, cur, Feature::Alpha));
        put(buf, before_prev, Feature::AfterNextSlash, take(buf, cur, Feature::CharSlash));
    }

    if i + 1 >= len {
        put(buf, cur, Feature::NextAlpha, 0);
        put(buf, cur, Feature::NextAlphaNum, 0);
        put(buf, cur, Feature::NextAt, 0);
        put(buf, cur, Feature::NextLower, 0);
        put(buf, cur, Feature::NextSlash, 0);
        // end of text behaves as a space
        put(buf, cur, Feature::NextSpace, 1);
    }

    if i + 2 >= len {
        put(buf, cur, Feature::AfterNextAlpha, 0);
        put(buf, cur, Feature::AfterNextSlash, 0);
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

/// Build from an already-decoded character sequence of known length.
pub(crate) fn build_from_chars<I>(chars: I, len: usize) -> Result<FeatureMatrix>
where
    I: IntoIterator<Item = char>,
{
    let mut buf = vec![0u8; len * F];
    let mut written = 0usize;

    for (i, c) in chars.into_iter().enumerate().take(len) {
        write_position(&mut buf, i, len, classify_char(c));
        written += 1;
    }

    if written != len {
        return Err(FeatmatError::InvalidInput(format!(
            "expected {} characters, got {}",
            len, written
        )));
    }

    let data = Array2::from_shape_vec((len, F), buf)
        .map_err(|e| FeatmatError::Shape(e.to_string()))?;
    Ok(FeatureMatrix { data })
}

pub(crate) fn build_from_str(text: &str) -> Result<FeatureMatrix> {
    build_from_chars(text.chars(), text.chars().count())
}

/// Decode raw code points, rejecting surrogates and values above U+10FFFF.
pub(crate) fn decode_code_points(code_points: &[u32]) -> Result<Vec<char>> {
    code_points
        .iter()
        .enumerate()
        .map(|(pos, &cp)| {
            char::from_u32(cp).ok_or_else(|| {
                FeatmatError::InvalidInput(format!(
                    "code point {:#X} at position {} is not a Unicode scalar value",
                    cp, pos
                ))
            })
        })
        .collect()
}
