//! Word counting shared by extraction and the splitter

use regex::Regex;
use std::sync::OnceLock;

static WORD_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Pattern matching a single word: a maximal run of Unicode word characters
pub(crate) fn word_pattern() -> &'static Regex {
    WORD_PATTERN.get_or_init(|| Regex::new(r"\w+").expect("word pattern is a valid regex"))
}

/// Count the words in `text`
///
/// A word is a maximal run of Unicode word characters, so punctuation and
/// markup symbols never count and `"don't"` counts as two words. Counts are
/// additive over any split that cuts at a non-word character.
pub fn count_words(text: &str) -> usize {
    word_pattern().find_iter(text).count()
}
