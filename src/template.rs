//! Structure-template translation
//!
//! Turns a user-authored structure template such as `"YYYY/MM/DD"` into a
//! chrono format pattern (`"%Y/%m/%d"`). Tokens are matched case-sensitively,
//! longest first, and only at word boundaries; everything else passes through
//! literally.

use chrono::NaiveDateTime;

/// Default pattern used when the structure template is empty: year/month.
pub const DEFAULT_STRUCTURE: &str = "%Y/%m";

/// Recognized tokens and their chrono format codes, longest first.
///
/// Order matters: multi-character tokens must be tried before the shorter
/// tokens sharing their prefix (`DDDD` before `DD` before `D`).
const TOKENS: &[(&str, &str)] = &[
    ("MONTHNUM", "%m"),
    ("MINUTE", "%M"),
    ("SECOND", "%S"),
    ("DAYNUM", "%d"),
    ("MONTH", "%B"),
    ("YEAR", "%Y"),
    ("HOUR", "%H"),
    ("YYYY", "%Y"),
    ("MMMM", "%B"),
    ("DDDD", "%A"),
    ("MMM", "%b"),
    ("DDD", "%a"),
    ("DAY", "%A"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("HH", "%H"),
    ("mm", "%M"),
    ("SS", "%S"),
    ("M", "%-m"),
    ("D", "%-d"),
    ("H", "%-H"),
    ("m", "%-M"),
    ("S", "%-S"),
];

/// Translate a structure template into a chrono format pattern.
///
/// An empty template yields [`DEFAULT_STRUCTURE`].
pub fn translate(template: &str) -> String {
    if template.is_empty() {
        return DEFAULT_STRUCTURE.to_string();
    }

    let bytes = template.as_bytes();
    let mut pattern = String::with_capacity(template.len());
    let mut pos = 0;

    while pos < bytes.len() {
        match longest_token_at(template, pos) {
            Some((text, code)) => {
                pattern.push_str(code);
                pos += text.len();
            }
            None => {
                // Safe: tokens are ASCII, so `pos` always lands on a char boundary
                let ch = template[pos..].chars().next().unwrap();
                if ch == '%' {
                    // Keep a literal percent out of chrono's way
                    pattern.push_str("%%");
                } else {
                    pattern.push(ch);
                }
                pos += ch.len_utf8();
            }
        }
    }

    pattern
}

/// Render a structure template for one timestamp.
pub fn render(template: &str, taken: &NaiveDateTime) -> String {
    taken.format(&translate(template)).to_string()
}

/// Find the longest boundary-valid token starting at `pos`, if any.
fn longest_token_at(template: &str, pos: usize) -> Option<(&'static str, &'static str)> {
    let rest = &template[pos..];
    for &(text, code) in TOKENS {
        if rest.starts_with(text) && is_word_boundary(template, pos, text.len()) {
            return Some((text, code));
        }
    }
    None
}

/// A candidate match is accepted only when the characters immediately before
/// and after it are not alphanumeric. This keeps `MM` from firing inside a
/// literal such as `SUMMARY`.
fn is_word_boundary(template: &str, pos: usize, len: usize) -> bool {
    let before = template[..pos].chars().next_back();
    let after = template[pos + len..].chars().next();

    !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
}
