// SPDX-License-Identifier: Apache-2.0

// =============================================================================
// FEATURE MATRIX TESTS
// =============================================================================

#[cfg(test)]
mod tests {
  use crate::constants::FEATURE_COUNT;
  use crate::{
    build_feature_matrix, build_feature_matrix_from_code_points, build_feature_matrix_from_utf8,
    FeatmatError, Feature,
  };

  fn row_vec(text: &str, index: usize) -> Vec<u8> {
    let m = build_feature_matrix(text).unwrap();
    m.row(index).unwrap().to_vec()
  }

  // =============================================================================
  // FULL ROWS
  // =============================================================================

  #[test]
  fn test_hi_bang_rows() {
    let expected: [[u8; FEATURE_COUNT]; 3] = [
      // 'H'
      [1, 1, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 1, 1, 0, 0, 0, 0, 0, 0],
      // 'i'
      [1, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
      // '!'
      [0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 1, 0, 0, 1, 0, 0, 0, 0, 0],
    ];

    let m = build_feature_matrix("Hi!").unwrap();
    assert_eq!(m.shape(), (3, FEATURE_COUNT));
    for (i, row) in expected.iter().enumerate() {
      assert_eq!(m.row(i).unwrap().to_vec(), row.to_vec(), "row {} of \"Hi!\"", i);
    }
  }

  #[test]
  fn test_empty_text() {
    let m = build_feature_matrix("").unwrap();
    assert_eq!(m.shape(), (0, FEATURE_COUNT));
    assert!(m.is_empty());
    assert!(m.row(0).is_none());
    assert!(m.active_features(0).is_empty());
  }

  #[test]
  fn test_single_character_sees_spaces_on_both_sides() {
    let m = build_feature_matrix("a").unwrap();
    assert_eq!(m.len(), 1);
    assert_eq!(
      m.active_features(0),
      vec![
        Feature::Alpha,
        Feature::AlphaNum,
        Feature::Lower,
        Feature::PrevSpace,
        Feature::NextSpace,
      ]
    );
  }

  // =============================================================================
  // NEIGHBOUR PROPAGATION
  // =============================================================================

  #[test]
  fn test_url_scheme_slashes() {
    let m = build_feature_matrix("a://b").unwrap();

    // ':'
    assert_eq!(m.get(1, Feature::CharColon), Some(1));
    assert_eq!(m.get(1, Feature::PrevAlpha), Some(1));
    assert_eq!(m.get(1, Feature::NextSlash), Some(1));
    assert_eq!(m.get(1, Feature::AfterNextSlash), Some(1));

    assert_eq!(m.get(0, Feature::AfterNextSlash), Some(1));
    assert_eq!(m.get(0, Feature::NextSlash), Some(0));
    assert_eq!(m.get(2, Feature::AfterNextAlpha), Some(1));

    // second to last row has no "after next"
    assert_eq!(m.get(3, Feature::AfterNextAlpha), Some(0));
    assert_eq!(m.get(3, Feature::NextAlpha), Some(1));
    assert_eq!(m.get(4, Feature::NextSpace), Some(1));
  }

  #[test]
  fn test_period_before_at_sign() {
    let m = build_feature_matrix("x .@y").unwrap();

    assert_eq!(m.get(2, Feature::CharPeriod), Some(1));
    assert_eq!(m.get(2, Feature::PrevSpace), Some(1));
    assert_eq!(m.get(2, Feature::NextAt), Some(1));
    assert_eq!(m.get(2, Feature::AfterNextAlpha), Some(1));

    assert_eq!(m.get(3, Feature::Special), Some(1));
    assert_eq!(m.get(3, Feature::CharAt), Some(1));
    assert_eq!(m.get(3, Feature::Symbol), Some(1));
    assert_eq!(m.get(3, Feature::PrevSymbol), Some(1));
    assert_eq!(m.get(3, Feature::NextAlpha), Some(1));

    assert_eq!(m.get(1, Feature::Space), Some(1));
    assert_eq!(m.get(0, Feature::NextSpace), Some(1));
  }

  #[test]
  fn test_case_transitions() {
    let m = build_feature_matrix("aB9").unwrap();
    assert_eq!(m.get(0, Feature::NextLower), Some(0));
    assert_eq!(m.get(1, Feature::PrevLower), Some(1));
    assert_eq!(m.get(1, Feature::NextAlphaNum), Some(1));
    assert_eq!(m.get(1, Feature::NextAlpha), Some(0));
    assert_eq!(m.get(2, Feature::Num), Some(1));
    assert_eq!(m.get(2, Feature::AlphaNum), Some(1));
    assert_eq!(m.get(2, Feature::PrevAlphaNum), Some(1));
  }

  #[test]
  fn test_rows_are_per_code_point() {
    let m = build_feature_matrix("héllo").unwrap();
    assert_eq!(m.len(), 5);
    assert_eq!(m.get(1, Feature::Lower), Some(1));
    assert_eq!(m.get(0, Feature::NextLower), Some(1));

    let m = build_feature_matrix("a😀b").unwrap();
    assert_eq!(m.len(), 3);
    assert_eq!(m.get(1, Feature::Symbol), Some(1));
    assert_eq!(m.get(2, Feature::PrevSymbol), Some(1));
  }

  #[test]
  fn test_non_ascii_columns_follow_general_category() {
    let cases: [(char, u8, u8, u8); 5] = [
      // (char, Alpha, Num, Symbol)
      ('\u{093F}', 0, 0, 1),
      ('\u{216B}', 0, 1, 0),
      ('\u{0345}', 0, 0, 1),
      ('\u{4E09}', 1, 1, 0),
      ('\u{0378}', 0, 0, 0),
    ];

    for (c, alpha, num, symbol) in cases {
      let m = build_feature_matrix(&c.to_string()).unwrap();
      assert_eq!(m.get(0, Feature::Alpha), Some(alpha), "Alpha for U+{:04X}", c as u32);
      assert_eq!(m.get(0, Feature::Num), Some(num), "Num for U+{:04X}", c as u32);
      assert_eq!(m.get(0, Feature::Symbol), Some(symbol), "Symbol for U+{:04X}", c as u32);
    }
  }

  #[test]
  fn test_values_are_zero_or_one() {
    let m = build_feature_matrix("Mixed 42, tabs\tand @handles://x.y").unwrap();
    assert!(m.view().iter().all(|&v| v <= 1));
  }

  // =============================================================================
  // INPUT FORMS
  // =============================================================================

  #[test]
  fn test_input_forms_agree() {
    let text = "Ça va? 123 @you";
    let from_str = build_feature_matrix(text).unwrap();
    let from_utf8 = build_feature_matrix_from_utf8(text.as_bytes()).unwrap();
    let code_points: Vec<u32> = text.chars().map(|c| c as u32).collect();
    let from_cps = build_feature_matrix_from_code_points(&code_points).unwrap();

    assert_eq!(from_str, from_utf8);
    assert_eq!(from_str, from_cps);
  }

  #[test]
  fn test_invalid_utf8_is_rejected() {
    let result = build_feature_matrix_from_utf8(&[b'a', 0xFF, b'b']);
    assert!(matches!(result, Err(FeatmatError::InvalidInput(_))));
  }

  #[test]
  fn test_invalid_code_points_are_rejected() {
    for bad in [0xD800u32, 0x110000] {
      let result = build_feature_matrix_from_code_points(&[0x61, bad]);
      match result {
        Err(FeatmatError::InvalidInput(msg)) => {
          assert!(msg.contains("position 1"), "unexpected message: {}", msg)
        }
        other => panic!("expected InvalidInput for {:#X}, got {:?}", bad, other),
      }
    }
  }

  // =============================================================================
  // ACCESSORS
  // =============================================================================

  #[test]
  fn test_transposed_and_column() {
    let m = build_feature_matrix("ab c").unwrap();
    let t = m.transposed();
    assert_eq!(t.dim(), (FEATURE_COUNT, 4));
    assert_eq!(t.row(Feature::Space.index()).to_vec(), vec![0, 0, 1, 0]);
    assert_eq!(m.column(Feature::Space).to_vec(), vec![0, 0, 1, 0]);
    assert_eq!(m.column(Feature::NextSpace).to_vec(), vec![0, 1, 0, 1]);
  }

  #[test]
  fn test_out_of_range_accessors() {
    let m = build_feature_matrix("ab").unwrap();
    assert!(m.row(2).is_none());
    assert_eq!(m.get(2, Feature::Alpha), None);
    assert!(m.active_features(5).is_empty());
  }

  #[test]
  fn test_into_inner_keeps_data() {
    let m = build_feature_matrix("ok").unwrap();
    let expected = row_vec("ok", 1);
    let data = m.into_inner();
    assert_eq!(data.row(1).to_vec(), expected);
  }

  #[test]
  fn test_feature_indices_and_names() {
    for (i, f) in Feature::ALL.iter().enumerate() {
      assert_eq!(f.index(), i);
      assert_eq!(Feature::from_index(i), Some(*f));
    }
    assert_eq!(Feature::from_index(FEATURE_COUNT), None);
    assert_eq!(Feature::CharAt.to_string(), "@");
    assert_eq!(Feature::AfterNextSlash.to_string(), "After_Next_/");
    assert_eq!(Feature::PrevAlpha.name(), "Prev_Alpha");
    assert_eq!(Feature::Special.name(), "Twitter");
  }

  #[test]
  fn test_feature_serde() {
    let json = serde_json::to_string(&Feature::NextAlphaNum).unwrap();
    assert_eq!(json, "\"NEXT_ALPHA_NUM\"");
    let back: Feature = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Feature::NextAlphaNum);
  }
}
