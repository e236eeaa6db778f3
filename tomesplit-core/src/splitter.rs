//! Slicing of a single oversized unit
//!
//! The text is scanned at paragraph granularity first. Any paragraph that is
//! itself over budget is rescanned at sentence granularity, and any sentence
//! still over budget is cut after a fixed number of words. Pieces are packed
//! greedily into slices under the budget, so the same tie-break as the engine
//! applies at a finer grain.
//!
//! Slices are expressed as byte ranges that tile the parent text, which makes
//! the round trip exact by construction.

use crate::{
    error::{Result, SegmentError},
    unit::{Granularity, StructuralUnit, SubUnit},
    words::{count_words, word_pattern},
};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

static PARAGRAPH_BREAK: OnceLock<Regex> = OnceLock::new();
static SENTENCE_END: OnceLock<Regex> = OnceLock::new();

fn paragraph_break() -> &'static Regex {
    PARAGRAPH_BREAK
        .get_or_init(|| Regex::new(r"\n\s*\n").expect("paragraph pattern is a valid regex"))
}

fn sentence_end() -> &'static Regex {
    SENTENCE_END.get_or_init(|| {
        Regex::new(r#"[.!?…。！？]+["'”’)\]]*\s+"#).expect("sentence pattern is a valid regex")
    })
}

/// Split `unit` into ordered slices of at most `max_words` words each
///
/// The unit must carry text. A single slice is returned when the text holds
/// no more than `max_words` words; the caller decides what that means for an
/// oversized unit.
pub fn split_unit(unit: &StructuralUnit, max_words: usize) -> Result<Vec<SubUnit>> {
    if max_words == 0 {
        return Err(SegmentError::InvalidConfiguration(
            "max_words must be greater than 0".into(),
        ));
    }

    let text = unit
        .text
        .as_deref()
        .ok_or(SegmentError::MissingContent { index: unit.index })?;

    let mut spans = Vec::new();
    split_span(
        text,
        0..text.len(),
        Granularity::Paragraph,
        max_words,
        &mut spans,
    );

    let sub_units = spans
        .into_iter()
        .enumerate()
        .map(|(ordinal, span)| SubUnit {
            parent_index: unit.index,
            ordinal,
            start: span.range.start,
            len: span.range.len(),
            word_count: span.words,
            granularity: span.granularity,
        })
        .collect();

    Ok(sub_units)
}

#[derive(Debug)]
struct Span {
    range: Range<usize>,
    words: usize,
    granularity: Granularity,
}

fn split_span(
    text: &str,
    range: Range<usize>,
    granularity: Granularity,
    max_words: usize,
    out: &mut Vec<Span>,
) {
    let mut open: Option<Span> = None;

    for piece in pieces(text, range, granularity) {
        let words = count_words(&text[piece.clone()]);

        if words > max_words {
            if let Some(span) = open.take() {
                out.push(span);
            }

            match granularity.finer() {
                Some(finer) => split_span(text, piece, finer, max_words, out),
                // Token pieces hold a single word, so this is unreachable for
                // any positive budget.
                None => out.push(Span {
                    range: piece,
                    words,
                    granularity,
                }),
            }
            continue;
        }

        match open.as_mut() {
            Some(span) if span.words + words <= max_words => {
                span.range.end = piece.end;
                span.words += words;
            }
            _ => {
                if let Some(span) = open.take() {
                    out.push(span);
                }
                open = Some(Span {
                    range: piece,
                    words,
                    granularity,
                });
            }
        }
    }

    if let Some(span) = open {
        out.push(span);
    }
}

/// Tile `range` into contiguous pieces at the given granularity
fn pieces(text: &str, range: Range<usize>, granularity: Granularity) -> Vec<Range<usize>> {
    let base = range.start;
    let window = &text[range.clone()];

    let cuts: Vec<usize> = match granularity {
        Granularity::Paragraph => paragraph_break()
            .find_iter(window)
            .map(|m| base + m.end())
            .collect(),
        Granularity::Sentence => sentence_end()
            .find_iter(window)
            .map(|m| base + m.end())
            .collect(),
        Granularity::Token => word_pattern()
            .find_iter(window)
            .map(|m| base + m.start())
            .collect(),
    };

    let mut result = Vec::with_capacity(cuts.len() + 1);
    let mut start = range.start;
    for cut in cuts {
        if cut > start && cut < range.end {
            result.push(start..cut);
            start = cut;
        }
    }
    if start < range.end || result.is_empty() {
        result.push(start..range.end);
    }

    result
}
