//! File-name-safe normalization of library titles and tags.

use unicode_normalization::UnicodeNormalization;

/// Characters the host cannot use in file or directory names.
const STRIPPED: &[char] = &[':', '<', '>', '*', '?', '|'];

/// Path separators, replaced by a dash.
const SEPARATORS: &[char] = &['/', '\\'];

fn normalize(text: &str, strip_parens: bool) -> String {
    let replaced: String = text
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .filter(|c| !(strip_parens && matches!(c, '(' | ')')))
        .map(|c| if SEPARATORS.contains(&c) { '-' } else { c })
        .collect();

    let ascii: String = replaced.nfkd().filter(char::is_ascii).collect();

    // Windows cannot have directories ending in a dot
    ascii
        .trim_start()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}

/// Normalize a name for library node files and smart playlists.
///
/// Removes `: < > * ? | ( )`, turns `/` and `\` into `-`, decomposes and
/// drops anything non-ASCII, then trims whitespace and trailing dots.
///
/// ```
/// use kodiconnect_core::normalize_nodes;
///
/// assert_eq!(normalize_nodes("Amélie (2001)"), "Amelie 2001");
/// ```
#[must_use]
pub fn normalize_nodes(text: &str) -> String {
    normalize(text, true)
}

/// Like [`normalize_nodes`] but keeps parentheses, matching the folder
/// names theme media tools expect.
#[must_use]
pub fn normalize_string(text: &str) -> String {
    normalize(text, false)
}
