//! Units consumed and parts produced by the engine

use crate::words::count_words;
use std::ops::Range;

/// One atomic, ordered piece of source content (a chapter document or a page)
///
/// Units are created by extraction and only read by the engine. The
/// `identifier` is opaque here; extraction and serialization use it to find
/// the full content again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralUnit {
    /// Position in original document order (0-based, contiguous)
    pub index: usize,
    /// Opaque reference such as a spine id or a page number
    pub identifier: String,
    /// Word count computed once at extraction time
    pub word_count: usize,
    /// Whether a structural break is permitted immediately before this unit
    pub is_boundary: bool,
    /// Plain text of the unit, needed only to split it when oversized
    pub text: Option<String>,
}

impl StructuralUnit {
    /// Create a boundary unit without text
    pub fn new(index: usize, identifier: impl Into<String>, word_count: usize) -> Self {
        Self {
            index,
            identifier: identifier.into(),
            word_count,
            is_boundary: true,
            text: None,
        }
    }

    /// Create a boundary unit from its text, counting its words
    pub fn from_text(index: usize, identifier: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            index,
            identifier: identifier.into(),
            word_count: count_words(&text),
            is_boundary: true,
            text: Some(text),
        }
    }

    /// Set whether a break is permitted before this unit
    pub fn with_boundary(mut self, is_boundary: bool) -> Self {
        self.is_boundary = is_boundary;
        self
    }

    /// Attach text without recounting words
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Secondary boundary at which an oversized unit was cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Granularity {
    /// Blank-line separated paragraphs
    Paragraph,
    /// Terminal punctuation followed by whitespace
    Sentence,
    /// Hard cut after a fixed number of words
    Token,
}

impl Granularity {
    /// The next finer granularity, if any
    pub fn finer(self) -> Option<Self> {
        match self {
            Granularity::Paragraph => Some(Granularity::Sentence),
            Granularity::Sentence => Some(Granularity::Token),
            Granularity::Token => None,
        }
    }
}

/// A contiguous slice of one unit's text
///
/// Slices of the same parent are ordered by `ordinal` and, concatenated,
/// reproduce the parent text exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubUnit {
    /// Index of the parent unit
    pub parent_index: usize,
    /// Position among the parent's slices (0-based)
    pub ordinal: usize,
    /// Byte offset into the parent text
    pub start: usize,
    /// Byte length
    pub len: usize,
    /// Words in this slice
    pub word_count: usize,
    /// Finest granularity used to find this slice's end
    pub granularity: Granularity,
}

impl SubUnit {
    /// Byte offset one past the end of the slice
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Byte range within the parent text
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Borrow the slice out of the parent text
    ///
    /// Returns `None` when the range does not fit `parent_text`.
    pub fn slice<'a>(&self, parent_text: &'a str) -> Option<&'a str> {
        parent_text.get(self.range())
    }
}

/// A whole or partial reference to a unit inside a [`Part`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum UnitRef {
    /// The complete unit
    Whole {
        /// Index of the unit
        index: usize,
        /// Its word count
        word_count: usize,
    },
    /// One slice of an oversized unit
    Partial(SubUnit),
}

impl UnitRef {
    /// Index of the referenced unit
    pub fn unit_index(&self) -> usize {
        match self {
            UnitRef::Whole { index, .. } => *index,
            UnitRef::Partial(sub) => sub.parent_index,
        }
    }

    /// Words contributed to the part
    pub fn word_count(&self) -> usize {
        match self {
            UnitRef::Whole { word_count, .. } => *word_count,
            UnitRef::Partial(sub) => sub.word_count,
        }
    }

    /// The slice, when this reference covers only part of a unit
    pub fn sub_unit(&self) -> Option<&SubUnit> {
        match self {
            UnitRef::Whole { .. } => None,
            UnitRef::Partial(sub) => Some(sub),
        }
    }
}

/// One contiguous output segment of the source
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Part {
    /// 1-based position in output order
    pub sequence_number: usize,
    /// Ordered whole or partial unit references (never empty)
    pub units: Vec<UnitRef>,
    /// Sum of the word counts of `units`
    pub total_words: usize,
}

impl Part {
    /// Index of the first unit touched by this part
    pub fn first_unit(&self) -> Option<usize> {
        self.units.first().map(UnitRef::unit_index)
    }

    /// Index of the last unit touched by this part
    pub fn last_unit(&self) -> Option<usize> {
        self.units.last().map(UnitRef::unit_index)
    }

    /// Whether the part holds more words than `max_words`
    pub fn exceeds(&self, max_words: usize) -> bool {
        self.total_words > max_words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_counts_words() {
        let unit = StructuralUnit::from_text(0, "ch1", "Call me Ishmael.");
        assert_eq!(unit.word_count, 3);
        assert!(unit.is_boundary);
        assert_eq!(unit.text.as_deref(), Some("Call me Ishmael."));
    }

    #[test]
    fn test_with_boundary_and_text() {
        let unit = StructuralUnit::new(3, "p4", 10)
            .with_boundary(false)
            .with_text("ten words or so");
        assert!(!unit.is_boundary);
        assert_eq!(unit.word_count, 10);
        assert!(unit.text.is_some());
    }

    #[test]
    fn test_granularity_ladder() {
        assert_eq!(Granularity::Paragraph.finer(), Some(Granularity::Sentence));
        assert_eq!(Granularity::Sentence.finer(), Some(Granularity::Token));
        assert_eq!(Granularity::Token.finer(), None);
    }

    #[test]
    fn test_sub_unit_slice() {
        let sub = SubUnit {
            parent_index: 0,
            ordinal: 1,
            start: 6,
            len: 5,
            word_count: 1,
            granularity: Granularity::Token,
        };
        assert_eq!(sub.end(), 11);
        assert_eq!(sub.slice("hello world"), Some("world"));
        assert_eq!(sub.slice("short"), None);
    }

    #[test]
    fn test_part_accessors() {
        let part = Part {
            sequence_number: 1,
            units: vec![
                UnitRef::Whole {
                    index: 4,
                    word_count: 10,
                },
                UnitRef::Whole {
                    index: 5,
                    word_count: 20,
                },
            ],
            total_words: 30,
        };
        assert_eq!(part.first_unit(), Some(4));
        assert_eq!(part.last_unit(), Some(5));
        assert!(part.exceeds(29));
        assert!(!part.exceeds(30));
    }
}
