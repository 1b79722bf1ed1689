// SPDX-License-Identifier: Apache-2.0

//! Character classification
//!
//! Maps a single code point to the fixed set of flags the feature matrix is
//! built from. ASCII goes through a precomputed table; everything else is
//! derived from the code point's general category, with case and whitespace
//! taken from the properties exposed by `char`.
//!
//! ## Notes
//! - `ALPHA` is the letter categories (L*) only; marks and letter numbers are
//!   not alphabetic.
//! - `NUMERIC` is any code point with a numeric value: the N* categories plus
//!   the Han ideographs that carry a numeric reading.
//! - `PRINTABLE` is false for every other (C*) and separator (Z*) code point,
//!   unassigned ones included, except the ASCII space.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use unicode_general_category::{get_general_category, GeneralCategory};

bitflags! {
    /// Classification flags for one code point.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CharFlags: u32 {
        const ALPHA = 0x0001;
        const NUMERIC = 0x0002;
        const LOWER = 0x0004;
        const UPPER = 0x0008;
        const SPACE = 0x0010;
        const PRINTABLE = 0x0020;
        /// Social-media sigils: `#`, `@`, `$`, `^`
        const SPECIAL = 0x0040;
        const CHAR_AT = 0x0080;
        const CHAR_COLON = 0x0100;
        const CHAR_SLASH = 0x0200;
        const CHAR_PERIOD = 0x0400;
    }
}

impl CharFlags {
    #[inline]
    pub fn is_alpha_numeric(self) -> bool {
        self.intersects(CharFlags::ALPHA | CharFlags::NUMERIC)
    }

    /// Printable, but neither alphanumeric nor whitespace.
    #[inline]
    pub fn is_symbol(self) -> bool {
        self.contains(CharFlags::PRINTABLE)
            && !self.is_alpha_numeric()
            && !self.contains(CharFlags::SPACE)
    }
}

// =============================================================================
// ASCII FAST PATH
// =============================================================================

const fn ascii_flags(b: u8) -> u32 {
    let mut flags = 0u32;
    if b.is_ascii_alphabetic() {
        flags |= CharFlags::ALPHA.bits();
    }
    if b.is_ascii_digit() {
        flags |= CharFlags::NUMERIC.bits();
    }
    if b.is_ascii_lowercase() {
        flags |= CharFlags::LOWER.bits();
    }
    if b.is_ascii_uppercase() {
        flags |= CharFlags::UPPER.bits();
    }
    // \t \n \v \f \r, the four information separators, and ' '
    if (b >= 0x09 && b <= 0x0D) || (b >= 0x1C && b <= 0x1F) || b == b' ' {
        flags |= CharFlags::SPACE.bits();
    }
    if b == b' ' || (b >= 0x21 && b <= 0x7E) {
        flags |= CharFlags::PRINTABLE.bits();
    }
    if b == b'#' || b == b'@' || b == b'$' || b == b'^' {
        flags |= CharFlags::SPECIAL.bits();
    }
    if b == b'@' {
        flags |= CharFlags::CHAR_AT.bits();
    }
    if b == b':' {
        flags |= CharFlags::CHAR_COLON.bits();
    }
    if b == b'/' {
        flags |= CharFlags::CHAR_SLASH.bits();
    }
    if b == b'.' {
        flags |= CharFlags::CHAR_PERIOD.bits();
    }
    flags
}

const fn build_ascii_table() -> [u32; 128] {
    let mut table = [0u32; 128];
    let mut b = 0usize;
    while b < 128 {
        table[b] = ascii_flags(b as u8);
        b += 1;
    }
    table
}

static ASCII_TABLE: [u32; 128] = build_ascii_table();

// =============================================================================
// NON-ASCII PROPERTIES
// =============================================================================

// Han ideographs with a Unihan numeric value (primary, accounting or other).
// They are general category Lo but still count as numeric.
const IDEOGRAPHIC_NUMERICS: &[u32] = &[
    0x3405, 0x3483, 0x382A, 0x3B4D, 0x4E00, 0x4E03, 0x4E07, 0x4E09,
    0x4E5D, 0x4E8C, 0x4E94, 0x4E96, 0x4EBF, 0x4EC0, 0x4EDF, 0x4EE8,
    0x4F0D, 0x4F70, 0x5104, 0x5146, 0x5169, 0x516B, 0x516D, 0x5341,
    0x5343, 0x5344, 0x5345, 0x534C, 0x53C1, 0x53C2, 0x53C3, 0x53C4,
    0x56DB, 0x58F1, 0x58F9, 0x5E7A, 0x5EFE, 0x5EFF, 0x5F0C, 0x5F0D,
    0x5F0E, 0x5F10, 0x62FE, 0x634C, 0x67D2, 0x6F06, 0x7396, 0x767E,
    0x8086, 0x842C, 0x8CAE, 0x8CB3, 0x8D30, 0x9621, 0x9646, 0x964C,
    0x9678, 0x96F6, 0xF96B, 0xF973, 0xF978, 0xF9B2, 0xF9D1, 0xF9D3,
    0xF9FD, 0x20001, 0x20064, 0x200E2, 0x20121, 0x2092A, 0x20983, 0x2098C,
    0x2099C, 0x20AEA, 0x20AFD, 0x20B19, 0x22390, 0x22998, 0x23B1B, 0x2626D,
    0x2F890,
];

fn is_ideographic_numeric(cp: u32) -> bool {
    IDEOGRAPHIC_NUMERICS.binary_search(&cp).is_ok()
}

fn classify_non_ascii(c: char) -> CharFlags {
    use GeneralCategory::*;

    let category = get_general_category(c);
    let mut flags = CharFlags::empty();

    flags.set(
        CharFlags::ALPHA,
        matches!(
            category,
            UppercaseLetter | LowercaseLetter | TitlecaseLetter | ModifierLetter | OtherLetter
        ),
    );
    flags.set(
        CharFlags::NUMERIC,
        matches!(category, DecimalNumber | LetterNumber | OtherNumber)
            || is_ideographic_numeric(c as u32),
    );
    flags.set(CharFlags::LOWER, c.is_lowercase());
    flags.set(CharFlags::UPPER, c.is_uppercase());
    flags.set(CharFlags::SPACE, c.is_whitespace());

    // Other (C*) and separator (Z*) categories, unassigned included.
    flags.set(
        CharFlags::PRINTABLE,
        !matches!(
            category,
            Control
                | Format
                | Surrogate
                | PrivateUse
                | Unassigned
                | SpaceSeparator
                | LineSeparator
                | ParagraphSeparator
        ),
    );

    flags
}

/// Classify one character.
#[inline]
pub fn classify_char(c: char) -> CharFlags {
    let cp = c as u32;
    if cp < 128 {
        return CharFlags::from_bits_retain(ASCII_TABLE[cp as usize]);
    }
    classify_non_ascii(c)
}

/// Classify a raw code point. Anything that is not a Unicode scalar value
/// (surrogates, values above U+10FFFF) gets no flags at all.
#[inline]
pub fn classify_code_point(cp: u32) -> CharFlags {
    match char::from_u32(cp) {
        Some(c) => classify_char(c),
        None => CharFlags::empty(),
    }
}
