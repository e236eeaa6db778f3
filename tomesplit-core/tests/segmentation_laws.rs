//! Property tests for the partitioning laws of `segment`

use proptest::prelude::*;
use tomesplit_core::{segment, SegmentConfig, Segmentation, StructuralUnit, UnitRef};

fn config(max_words: usize, strict: bool) -> SegmentConfig {
    SegmentConfig::builder()
        .max_words(max_words)
        .strict_boundaries(strict)
        .build()
        .unwrap()
}

fn counted_units() -> impl Strategy<Value = Vec<StructuralUnit>> {
    prop::collection::vec((0usize..400, any::<bool>()), 0..40).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (words, boundary))| {
                StructuralUnit::new(index, format!("u{index}"), words).with_boundary(boundary)
            })
            .collect()
    })
}

/// Units whose text is made of short paragraphs of plain words
fn text_units() -> impl Strategy<Value = Vec<StructuralUnit>> {
    let paragraphs = prop::collection::vec(1usize..30, 1..12);
    prop::collection::vec((paragraphs, any::<bool>()), 1..12).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (paragraphs, boundary))| {
                let text = paragraphs
                    .iter()
                    .map(|&n| "lorem ".repeat(n).trim_end().to_string() + ".")
                    .collect::<Vec<_>>()
                    .join("\n\n");
                StructuralUnit::from_text(index, format!("u{index}"), text).with_boundary(boundary)
            })
            .collect()
    })
}

/// Every unit index in output order, with consecutive slices of one unit merged
fn covered_indices(result: &Segmentation) -> Vec<usize> {
    let mut indices: Vec<usize> = Vec::new();
    let mut last_partial: Option<usize> = None;
    for unit in result.parts.iter().flat_map(|p| &p.units) {
        match unit {
            UnitRef::Whole { index, .. } => {
                indices.push(*index);
                last_partial = None;
            }
            UnitRef::Partial(sub) => {
                if last_partial != Some(sub.parent_index) {
                    indices.push(sub.parent_index);
                }
                last_partial = Some(sub.parent_index);
            }
        }
    }
    indices
}

proptest! {
    #[test]
    fn parts_cover_every_unit_once_in_order(units in counted_units(), max in 1usize..500, strict in any::<bool>()) {
        let result = segment(&units, &config(max, strict)).unwrap();
        let expected: Vec<usize> = (0..units.len()).collect();
        prop_assert_eq!(covered_indices(&result), expected);
    }

    #[test]
    fn parts_are_numbered_and_never_empty(units in counted_units(), max in 1usize..500, strict in any::<bool>()) {
        let result = segment(&units, &config(max, strict)).unwrap();
        for (position, part) in result.parts.iter().enumerate() {
            prop_assert_eq!(part.sequence_number, position + 1);
            prop_assert!(!part.units.is_empty());
            let sum: usize = part.units.iter().map(UnitRef::word_count).sum();
            prop_assert_eq!(part.total_words, sum);
        }
    }

    #[test]
    fn over_budget_parts_are_a_single_oversized_unit(units in counted_units(), max in 1usize..500) {
        let result = segment(&units, &config(max, false)).unwrap();
        for part in &result.parts {
            if part.exceeds(max) {
                prop_assert_eq!(part.units.len(), 1);
                let prefix = format!("unit {} ", part.units[0].unit_index());
                let warned = result.warnings.iter().any(|w| w.to_string().starts_with(&prefix));
                prop_assert!(warned);
            }
        }
    }

    #[test]
    fn strict_parts_start_at_boundaries(units in counted_units(), max in 1usize..500) {
        let result = segment(&units, &config(max, true)).unwrap();
        for part in &result.parts {
            prop_assert!(part.units.iter().all(|u| u.sub_unit().is_none()));
            let first = part.first_unit().unwrap();
            prop_assert!(first == 0 || units[first].is_boundary);
        }
    }

    #[test]
    fn word_totals_are_preserved(units in text_units(), max in 1usize..120, strict in any::<bool>()) {
        let result = segment(&units, &config(max, strict)).unwrap();
        let input: usize = units.iter().map(|u| u.word_count).sum();
        let output: usize = result.parts.iter().map(|p| p.total_words).sum();
        prop_assert_eq!(input, output);
    }

    #[test]
    fn slices_reassemble_their_unit(units in text_units(), max in 1usize..120) {
        let result = segment(&units, &config(max, false)).unwrap();

        let mut rebuilt = vec![String::new(); units.len()];
        for unit in result.parts.iter().flat_map(|p| &p.units) {
            let index = unit.unit_index();
            let text = units[index].text.as_deref().unwrap();
            match unit.sub_unit() {
                Some(sub) => rebuilt[index].push_str(sub.slice(text).unwrap()),
                None => rebuilt[index].push_str(text),
            }
        }

        for (unit, text) in units.iter().zip(&rebuilt) {
            prop_assert_eq!(unit.text.as_deref().unwrap(), text.as_str());
        }
    }

    #[test]
    fn text_units_respect_budget(units in text_units(), max in 1usize..120) {
        let result = segment(&units, &config(max, false)).unwrap();
        prop_assert!(result.warnings.is_empty());
        prop_assert!(result.parts.iter().all(|p| !p.exceeds(max)));
    }

    #[test]
    fn segmentation_is_deterministic(units in counted_units(), max in 1usize..500, strict in any::<bool>()) {
        let cfg = config(max, strict);
        prop_assert_eq!(segment(&units, &cfg), segment(&units, &cfg));
    }
}
