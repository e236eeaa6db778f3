//! Greedy single-pass segmentation
//!
//! Units are appended to an open part while the running total stays within
//! `max_words`. When the next unit would overflow the budget the engine cuts:
//!
//! 1. before the unit when a break is permitted there;
//! 2. otherwise at the nearest boundary inside the open part;
//! 3. otherwise, outside strict mode, right before the unit anyway, and in
//!    strict mode not at all (the part grows past the budget).
//!
//! A unit that alone exceeds the budget is sliced by [`split_unit`] outside
//! strict mode and the slices are fed back through the same loop. When it
//! cannot be sliced it becomes a part of its own and a [`SegmentWarning`] is
//! recorded.

use crate::{
    config::SegmentConfig,
    error::{Result, SegmentError},
    splitter::split_unit,
    unit::{Part, StructuralUnit, UnitRef},
};
use std::fmt;

/// Output of a segmentation run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segmentation {
    /// Parts in output order, numbered from 1
    pub parts: Vec<Part>,
    /// Soft violations of the word budget
    pub warnings: Vec<SegmentWarning>,
}

impl Segmentation {
    /// Number of parts produced
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether no parts were produced
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Why an oversized unit was kept whole
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OversizeReason {
    /// Strict boundaries forbid cutting inside a unit
    StrictBoundaries,
    /// The unit carries no text to slice
    NoContent,
    /// The text has no internal boundary at any granularity
    NoInternalBoundary,
}

impl fmt::Display for OversizeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OversizeReason::StrictBoundaries => write!(f, "strict boundaries are enabled"),
            OversizeReason::NoContent => write!(f, "no text is available to split"),
            OversizeReason::NoInternalBoundary => write!(f, "no internal boundary was found"),
        }
    }
}

/// Observability signal for a part that breaks the word budget
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum SegmentWarning {
    /// A unit larger than the budget was emitted whole
    UnsplittableOversizedUnit {
        /// Index of the unit
        index: usize,
        /// Identifier of the unit
        identifier: String,
        /// Its word count
        word_count: usize,
        /// The configured budget
        max_words: usize,
        /// Why it was not sliced
        reason: OversizeReason,
    },
}

impl fmt::Display for SegmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentWarning::UnsplittableOversizedUnit {
                index,
                identifier,
                word_count,
                max_words,
                reason,
            } => write!(
                f,
                "unit {index} ({identifier}) has {word_count} words, over the {max_words} word budget, and was kept whole: {reason}"
            ),
        }
    }
}

/// Partition `units` into parts under `config`
///
/// Unit indices must be `0..units.len()` in order. The first unit is always
/// treated as a boundary. Identical input always yields identical output.
pub fn segment(units: &[StructuralUnit], config: &SegmentConfig) -> Result<Segmentation> {
    let config = config.validate()?;
    check_sequence(units)?;

    let mut planner = Planner::new(config);
    for (position, unit) in units.iter().enumerate() {
        let is_boundary = unit.is_boundary || position == 0;
        if unit.word_count > config.max_words {
            planner.push_oversized(unit, is_boundary)?;
        } else {
            planner.push(Item {
                entry: UnitRef::Whole {
                    index: unit.index,
                    word_count: unit.word_count,
                },
                is_boundary,
            });
        }
    }

    let segmentation = planner.finish();
    log::debug!(
        "segmented {} units into {} parts ({} warnings)",
        units.len(),
        segmentation.parts.len(),
        segmentation.warnings.len()
    );
    Ok(segmentation)
}

fn check_sequence(units: &[StructuralUnit]) -> Result<()> {
    for (position, unit) in units.iter().enumerate() {
        if unit.index != position {
            return Err(SegmentError::InvalidUnitSequence {
                expected: position,
                found: unit.index,
            });
        }
    }
    Ok(())
}

/// Sum of word counts, pinned at `usize::MAX`
fn saturating_total(counts: impl Iterator<Item = usize>) -> usize {
    counts.fold(0, usize::saturating_add)
}

/// A unit or slice waiting to be placed, with its cut permission
#[derive(Debug)]
struct Item {
    entry: UnitRef,
    is_boundary: bool,
}

impl Item {
    fn words(&self) -> usize {
        self.entry.word_count()
    }
}

struct Planner {
    config: SegmentConfig,
    closed: Vec<Vec<UnitRef>>,
    current: Vec<Item>,
    current_words: usize,
    warnings: Vec<SegmentWarning>,
}

impl Planner {
    fn new(config: SegmentConfig) -> Self {
        Self {
            config,
            closed: Vec::new(),
            current: Vec::new(),
            current_words: 0,
            warnings: Vec::new(),
        }
    }

    fn push(&mut self, item: Item) {
        if self.current.is_empty() {
            self.append(item);
            return;
        }

        if item.words() <= self.config.max_words.saturating_sub(self.current_words) {
            self.append(item);
            return;
        }

        if item.is_boundary {
            self.close();
            self.append(item);
            return;
        }

        if let Some(cut) = self.preceding_boundary(item.words()) {
            let tail = self.current.split_off(cut);
            self.current_words = saturating_total(self.current.iter().map(Item::words));
            self.close();
            for carried in tail {
                self.append(carried);
            }
            self.append(item);
            return;
        }

        if !self.config.strict_boundaries {
            log::debug!(
                "forcing a cut before non-boundary unit {}",
                item.entry.unit_index()
            );
            self.close();
        }
        self.append(item);
    }

    /// Position of the nearest boundary after the first item of the open part
    ///
    /// Outside strict mode the carried tail plus the incoming words must fit
    /// the budget, otherwise the cut would only move the overflow.
    fn preceding_boundary(&self, incoming: usize) -> Option<usize> {
        let mut tail_words: usize = 0;
        for position in (1..self.current.len()).rev() {
            tail_words = tail_words.saturating_add(self.current[position].words());
            if self.current[position].is_boundary {
                let fits = tail_words.saturating_add(incoming) <= self.config.max_words;
                return (self.config.strict_boundaries || fits).then_some(position);
            }
        }
        None
    }

    fn push_oversized(&mut self, unit: &StructuralUnit, is_boundary: bool) -> Result<()> {
        let whole = Item {
            entry: UnitRef::Whole {
                index: unit.index,
                word_count: unit.word_count,
            },
            is_boundary,
        };

        if self.config.strict_boundaries {
            self.warn(unit, OversizeReason::StrictBoundaries);
            self.push(whole);
            return Ok(());
        }

        if unit.text.is_none() {
            self.warn(unit, OversizeReason::NoContent);
            self.isolate(whole);
            return Ok(());
        }

        let slices = split_unit(unit, self.config.max_words)?;
        if slices.len() < 2 {
            self.warn(unit, OversizeReason::NoInternalBoundary);
            self.isolate(whole);
            return Ok(());
        }

        log::debug!(
            "split unit {} ({} words) into {} slices",
            unit.index,
            unit.word_count,
            slices.len()
        );

        for slice in slices {
            // Every cut found by the splitter is a permitted break.
            let slice_boundary = slice.ordinal > 0 || is_boundary;
            self.push(Item {
                entry: UnitRef::Partial(slice),
                is_boundary: slice_boundary,
            });
        }
        Ok(())
    }

    /// Emit `item` as a part of its own
    fn isolate(&mut self, item: Item) {
        self.close();
        self.append(item);
        self.close();
    }

    fn warn(&mut self, unit: &StructuralUnit, reason: OversizeReason) {
        let warning = SegmentWarning::UnsplittableOversizedUnit {
            index: unit.index,
            identifier: unit.identifier.clone(),
            word_count: unit.word_count,
            max_words: self.config.max_words,
            reason,
        };
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    fn append(&mut self, item: Item) {
        self.current_words = self.current_words.saturating_add(item.words());
        self.current.push(item);
    }

    fn close(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let entries = self.current.drain(..).map(|item| item.entry).collect();
        self.closed.push(entries);
        self.current_words = 0;
    }

    fn finish(mut self) -> Segmentation {
        self.close();

        let parts = self
            .closed
            .into_iter()
            .enumerate()
            .map(|(position, units)| Part {
                sequence_number: position + 1,
                total_words: saturating_total(units.iter().map(UnitRef::word_count)),
                units,
            })
            .collect();

        Segmentation {
            parts,
            warnings: self.warnings,
        }
    }
}
