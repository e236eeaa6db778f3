//! Word-budgeted document segmentation
//!
//! This crate decides where to cut a long document into smaller parts. A
//! document is seen as an ordered sequence of [`StructuralUnit`]s (EPUB spine
//! chapters, PDF pages) that each carry a word count and a flag telling
//! whether a structural break is permitted before them. [`segment`] walks the
//! sequence once and groups the units into [`Part`]s that stay under a word
//! budget while cutting only where the boundary policy allows.
//!
//! # Architecture
//!
//! - **Engine** ([`engine`]): the greedy single-pass planner
//! - **Splitter** ([`splitter`]): slices a single oversized unit at
//!   paragraph, sentence or word granularity
//! - **Config** ([`config`]): the validated budget and strictness policy
//!
//! The crate performs no I/O. Extraction of units from source files and
//! rendering of parts into output files live in `tomesplit-cli`.
//!
//! # Example
//!
//! ```rust
//! use tomesplit_core::{segment, SegmentConfig, StructuralUnit};
//!
//! let units: Vec<StructuralUnit> = [30_000, 25_000, 10_000, 20_000, 15_000]
//!     .iter()
//!     .enumerate()
//!     .map(|(index, &words)| StructuralUnit::new(index, format!("ch{index}"), words))
//!     .collect();
//!
//! let config = SegmentConfig::builder().max_words(50_000).build().unwrap();
//! let result = segment(&units, &config).unwrap();
//!
//! let totals: Vec<usize> = result.parts.iter().map(|p| p.total_words).collect();
//! assert_eq!(totals, vec![30_000, 35_000, 35_000]);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod splitter;
pub mod unit;
pub mod words;

pub use config::{SegmentConfig, SegmentConfigBuilder};
pub use engine::{segment, OversizeReason, SegmentWarning, Segmentation};
pub use error::{Result, SegmentError};
pub use splitter::split_unit;
pub use unit::{Granularity, Part, StructuralUnit, SubUnit, UnitRef};
pub use words::count_words;
