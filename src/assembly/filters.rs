//! Surface patterns that mark a sentence as an extraction artifact.

use regex::Regex;
use std::sync::LazyLock;

static CAPITALIZED_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][\w'.-]*\s+[A-Z][\w'.-]*").expect("valid capitalized run regex")
});

const QUOTE_MARKS: &[&str] = &["\"", "''", "``", "`", "“", "”"];

/// Why a sentence was filtered on its surface form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePattern {
    /// Two or more consecutive capitalized tokens.
    CapitalizedRun,
    /// A forward slash.
    Slash,
    /// Any quotation mark variant.
    Quotation,
}

/// First disallowed surface pattern found in `text`, if any.
pub fn disallowed_surface(text: &str) -> Option<SurfacePattern> {
    if text.contains('/') {
        Some(SurfacePattern::Slash)
    } else if QUOTE_MARKS.iter().any(|mark| text.contains(mark)) {
        Some(SurfacePattern::Quotation)
    } else if CAPITALIZED_RUN.is_match(text) {
        Some(SurfacePattern::CapitalizedRun)
    } else {
        None
    }
}
