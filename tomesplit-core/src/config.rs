//! Segmentation configuration

use crate::error::{Result, SegmentError};

/// Default configuration constants
pub mod defaults {
    /// Default word ceiling per part
    pub const MAX_WORDS: usize = 80_000;

    /// Cuts inside oversized units are allowed unless asked otherwise
    pub const STRICT_BOUNDARIES: bool = false;
}

/// Immutable input to a single segmentation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentConfig {
    /// Target ceiling of words per part (must be positive)
    pub max_words: usize,
    /// Never cut inside a unit, even if a part has to exceed `max_words`
    pub strict_boundaries: bool,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_words: defaults::MAX_WORDS,
            strict_boundaries: defaults::STRICT_BOUNDARIES,
        }
    }
}

impl SegmentConfig {
    /// Create a validated configuration with the given budget
    pub fn new(max_words: usize) -> Result<Self> {
        Self {
            max_words,
            ..Default::default()
        }
        .validate()
    }

    /// Create a configuration builder
    pub fn builder() -> SegmentConfigBuilder {
        SegmentConfigBuilder::default()
    }

    /// Validate the configuration, handing it back unchanged on success
    ///
    /// A zero budget is rejected rather than clamped.
    pub fn validate(self) -> Result<Self> {
        if self.max_words == 0 {
            return Err(SegmentError::InvalidConfiguration(
                "max_words must be greater than 0".into(),
            ));
        }

        Ok(self)
    }
}

/// Builder for [`SegmentConfig`]
#[derive(Debug, Default)]
pub struct SegmentConfigBuilder {
    config: SegmentConfig,
}

impl SegmentConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the word ceiling per part
    pub fn max_words(mut self, max_words: usize) -> Self {
        self.config.max_words = max_words;
        self
    }

    /// Set the boundary strictness
    pub fn strict_boundaries(mut self, strict: bool) -> Self {
        self.config.strict_boundaries = strict;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<SegmentConfig> {
        self.config.validate()
    }
}
