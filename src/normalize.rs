//! Name normalization shared by every comparison in the crate.
//!
//! Playlist titles/artists and names parsed from local filenames are only
//! ever compared after passing through [`normalize_name`].

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Stand-in for quote characters. Downloaders write `_` where a title had a
/// quote, so quotes must become this marker before punctuation is stripped.
const QUOTE_MARKER: char = '_';

/// Curly quotes would vanish in the ASCII fold; they count as plain quotes.
const TYPOGRAPHIC_QUOTES: [char; 4] = ['\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}'];

/// Anything that is not a word character, whitespace, hyphen or parenthesis.
/// Input is ASCII by the time this runs, so `\w` is `[A-Za-z0-9_]`.
pub static NON_NAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s\-\(\)]").unwrap());

/// Regex to collapse whitespace runs into a single space
pub static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Fold Unicode text to lowercase ASCII: NFKD decomposition, then every
/// non-ASCII code point (combining marks included) is dropped.
/// e.g., "Beyoncé" → "beyonce", "naïve" → "naive"
pub fn fold_to_ascii(s: &str) -> String {
    s.nfkd().filter(char::is_ascii).collect::<String>().to_lowercase()
}

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Normalize a display string (title or artist) for comparison.
///
/// Case, accents, quoting style and punctuation are ignored; whitespace is
/// collapsed and trimmed. Idempotent and total.
pub fn normalize_name(raw: &str) -> String {
    let folded = fold_to_ascii(&raw.replace(TYPOGRAPHIC_QUOTES, "'"));

    // 'Tum Tum (From "Enemy - Tamil")' is stored as 'Tum Tum (From _Enemy - Tamil_)'
    let quoted = folded.replace(['"', '\''], &QUOTE_MARKER.to_string());

    let stripped = NON_NAME_CHARS.replace_all(&quoted, "");
    let spaced = stripped.replace(QUOTE_MARKER, " ");

    WHITESPACE_RUN.replace_all(&spaced, " ").trim().to_string()
}

// ============================================================================
// TESTS
// ============================================================================
