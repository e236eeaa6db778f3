//! Section heading detection and text cleanup for PDF pages

use regex::Regex;
use std::sync::OnceLock;

/// Lines inspected at the top of each page
const HEADING_SCAN_LINES: usize = 5;

static HEADING_PATTERN: OnceLock<Regex> = OnceLock::new();
static EXCESS_NEWLINES: OnceLock<Regex> = OnceLock::new();
static HYPHEN_BREAK: OnceLock<Regex> = OnceLock::new();

fn heading_pattern() -> &'static Regex {
    HEADING_PATTERN.get_or_init(|| {
        Regex::new(r"^(?:chapter\s+\d+|\d+\.\s+|section\s+\d+|part\s+\d+)")
            .expect("heading pattern is a valid regex")
    })
}

fn excess_newlines() -> &'static Regex {
    EXCESS_NEWLINES.get_or_init(|| Regex::new(r"\n{3,}").expect("newline pattern is a valid regex"))
}

fn hyphen_break() -> &'static Regex {
    HYPHEN_BREAK.get_or_init(|| {
        Regex::new(r"([a-zA-Z])-\n([a-zA-Z])").expect("hyphenation pattern is a valid regex")
    })
}

/// Whether `page` opens with something that looks like a section heading
///
/// One of the first lines must either start with a numbered marker
/// (`chapter 3`, `2. `, `section 4`, `part 1`) or be a short line of 4 to 49
/// characters followed by a blank line.
pub fn is_section_start(page: &str) -> bool {
    let lines: Vec<&str> = page.trim_start_matches(['\n', '\r']).lines().collect();

    lines
        .iter()
        .take(HEADING_SCAN_LINES)
        .enumerate()
        .any(|(position, line)| {
            let line = line.trim().to_lowercase();
            if heading_pattern().is_match(&line) {
                return true;
            }

            let length = line.chars().count();
            let next_is_blank = lines
                .get(position + 1)
                .is_some_and(|next| next.trim().is_empty());
            (4..50).contains(&length) && next_is_blank
        })
}

/// Mark section starts across `pages`
///
/// When no page looks like a section start every page is treated as one,
/// so page breaks remain available as cut points.
pub fn detect_boundaries(pages: &[String]) -> Vec<bool> {
    let detected: Vec<bool> = pages.iter().map(|page| is_section_start(page)).collect();

    if detected.iter().any(|&start| start) {
        log::debug!(
            "detected {} section starts over {} pages",
            detected.iter().filter(|&&start| start).count(),
            pages.len()
        );
        detected
    } else {
        log::debug!("no section headings detected; every page is a boundary");
        vec![true; pages.len()]
    }
}

/// Normalize extracted page text
///
/// Runs of three or more newlines collapse to one blank line and words
/// hyphenated across a line break are joined.
pub fn clean_page_text(text: &str) -> String {
    let collapsed = excess_newlines().replace_all(text, "\n\n");
    hyphen_break()
        .replace_all(&collapsed, "$1$2")
        .trim()
        .to_string()
}
