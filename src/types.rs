// SPDX-License-Identifier: Apache-2.0

// types.rs for featmat
use std::fmt;

use ndarray::{ArrayD, ArrayViewD, IxDyn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{FEATURE_COUNT, SENTINEL_ROW};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatmatError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("Shape error: {0}")]
    Shape(String),
    #[error("Row index {index} out of range for matrix with {rows} rows")]
    IndexOutOfRange { index: usize, rows: usize },
}

pub type Result<T> = std::result::Result<T, FeatmatError>;

/// One column of the feature matrix.
///
/// The discriminant is the column index; the ordering is part of the public
/// contract because callers build row selections from these indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Feature {
    Alpha = 0,
    AlphaNum = 1,
    Num = 2,
    Lower = 3,
    Upper = 4,
    Space = 5,
    Symbol = 6,
    /// Social-media sigils `#@$^`, displayed as `Twitter`.
    Special = 7,
    CharAt = 8,
    CharColon = 9,
    CharSlash = 10,
    CharPeriod = 11,
    PrevAlpha = 12,
    NextAlpha = 13,
    PrevAlphaNum = 14,
    NextAlphaNum = 15,
    PrevLower = 16,
    NextLower = 17,
    PrevSpace = 18,
    NextSpace = 19,
    PrevSymbol = 20,
    NextAt = 21,
    NextSlash = 22,
    AfterNextAlpha = 23,
    AfterNextSlash = 24,
}

impl Feature {
    /// Every column, in index order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Alpha,
        Feature::AlphaNum,
        Feature::Num,
        Feature::Lower,
        Feature::Upper,
        Feature::Space,
        Feature::Symbol,
        Feature::Special,
        Feature::CharAt,
        Feature::CharColon,
        Feature::CharSlash,
        Feature::CharPeriod,
        Feature::PrevAlpha,
        Feature::NextAlpha,
        Feature::PrevAlphaNum,
        Feature::NextAlphaNum,
        Feature::PrevLower,
        Feature::NextLower,
        Feature::PrevSpace,
        Feature::NextSpace,
        Feature::PrevSymbol,
        Feature::NextAt,
        Feature::NextSlash,
        Feature::AfterNextAlpha,
        Feature::AfterNextSlash,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Option<Feature> {
        Self::ALL.get(index).copied()
    }

    /// Short display name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Alpha => "Alpha",
            Feature::AlphaNum => "AlphaNum",
            Feature::Num => "Num",
            Feature::Lower => "Lower",
            Feature::Upper => "Upper",
            Feature::Space => "Space",
            Feature::Symbol => "Symbol",
            Feature::Special => "Twitter",
            Feature::CharAt => "@",
            Feature::CharColon => ":",
            Feature::CharSlash => "/",
            Feature::CharPeriod => ".",
            Feature::PrevAlpha => "Prev_Alpha",
            Feature::NextAlpha => "Next_Alpha",
            Feature::PrevAlphaNum => "Prev_AlphaNum",
            Feature::NextAlphaNum => "Next_AlphaNum",
            Feature::PrevLower => "Prev_Lower",
            Feature::NextLower => "Next_Lower",
            Feature::PrevSpace => "Prev_Space",
            Feature::NextSpace => "Next_Space",
            Feature::PrevSymbol => "Prev_Symbol",
            Feature::NextAt => "Next_@",
            Feature::NextSlash => "Next_/",
            Feature::AfterNextAlpha => "After_Next_Alpha",
            Feature::AfterNextSlash => "After_Next_/",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A selected row, or `None` for an empty slot that the reducer skips.
pub type RowIndex = Option<usize>;

/// Rows to fold together with [`crate::combine_rows`].
///
/// `Flat` rows are summed. Each `Grouped` inner list is multiplied
/// element-wise first and the group products are then summed. Groups may have
/// different lengths; a short group behaves as if padded with `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowSelection {
    Flat(Vec<RowIndex>),
    Grouped(Vec<Vec<RowIndex>>),
}

impl RowSelection {
    pub fn flat<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        RowSelection::Flat(rows.into_iter().map(Some).collect())
    }

    /// Build a grouped selection from plain index lists, e.g. feature columns
    /// `[[Space], [Upper, NextLower]]` meaning "space OR (upper AND next-lower)".
    pub fn grouped<I, G>(groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = usize>,
    {
        RowSelection::Grouped(
            groups
                .into_iter()
                .map(|g| g.into_iter().map(Some).collect())
                .collect(),
        )
    }

    /// Same as [`RowSelection::grouped`] but named by feature column.
    pub fn from_features<I, G>(groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = Feature>,
    {
        Self::grouped(
            groups
                .into_iter()
                .map(|g| g.into_iter().map(Feature::index).collect::<Vec<_>>()),
        )
    }

    /// Convert a raw byte selection where `SENTINEL_ROW` (255) marks a skipped slot.
    ///
    /// Accepts 1-D (flat) and 2-D (grouped) arrays; anything else is a shape error.
    pub fn from_raw(raw: ArrayViewD<'_, u8>) -> Result<Self> {
        let decode = |v: u8| if v == SENTINEL_ROW { None } else { Some(v as usize) };
        match raw.ndim() {
            1 => Ok(RowSelection::Flat(raw.iter().copied().map(decode).collect())),
            2 => {
                let groups = raw
                    .outer_iter()
                    .map(|group| group.iter().copied().map(decode).collect())
                    .collect();
                Ok(RowSelection::Grouped(groups))
            }
            n => Err(FeatmatError::Shape(format!(
                "row selection must be 1-D or 2-D, got {}-D",
                n
            ))),
        }
    }

    /// Convert back to the raw byte form, padding short groups with `SENTINEL_ROW`.
    pub fn to_raw(&self) -> Result<ArrayD<u8>> {
        let encode = |idx: &RowIndex| -> Result<u8> {
            match *idx {
                None => Ok(SENTINEL_ROW),
                Some(i) if i < SENTINEL_ROW as usize => Ok(i as u8),
                Some(i) => Err(FeatmatError::InvalidInput(format!(
                    "row index {} cannot be encoded as a byte selection",
                    i
                ))),
            }
        };

        match self {
            RowSelection::Flat(rows) => {
                let data = rows.iter().map(encode).collect::<Result<Vec<u8>>>()?;
                ArrayD::from_shape_vec(IxDyn(&[data.len()]), data)
                    .map_err(|e| FeatmatError::Shape(e.to_string()))
            }
            RowSelection::Grouped(groups) => {
                let width = groups.iter().map(Vec::len).max().unwrap_or(0);
                let mut data = vec![SENTINEL_ROW; groups.len() * width];
                for (g, group) in groups.iter().enumerate() {
                    for (j, idx) in group.iter().enumerate() {
                        data[g * width + j] = encode(idx)?;
                    }
                }
                ArrayD::from_shape_vec(IxDyn(&[groups.len(), width]), data)
                    .map_err(|e| FeatmatError::Shape(e.to_string()))
            }
        }
    }

    /// Iterate every non-skipped index regardless of grouping.
    pub fn selected(&self) -> Box<dyn Iterator<Item = usize> + '_> {
        match self {
            RowSelection::Flat(rows) => Box::new(rows.iter().flatten().copied()),
            RowSelection::Grouped(groups) => {
                Box::new(groups.iter().flat_map(|g| g.iter().flatten().copied()))
            }
        }
    }

    /// Reject any selected index that does not address a row of a `rows`-row matrix.
    pub fn check_bounds(&self, rows: usize) -> Result<()> {
        match self.selected().find(|&idx| idx >= rows) {
            Some(index) => Err(FeatmatError::IndexOutOfRange { index, rows }),
            None => Ok(()),
        }
    }
}
