//! Shared utility functions for element rendering.

/// Escape text for use in HTML content and attribute values.
///
/// # Examples
///
/// ```
/// use mdr_renderer::escape_html;
///
/// assert_eq!(escape_html("<a href=\"x\">"), "&lt;a href=&quot;x&quot;&gt;");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Parse a `heading-N` tag into its level (1-6).
///
/// # Examples
///
/// ```
/// use mdr_renderer::heading_level;
///
/// assert_eq!(heading_level("heading-2"), Some(2));
/// assert_eq!(heading_level("heading-7"), None);
/// assert_eq!(heading_level("paragraph"), None);
/// ```
#[must_use]
pub fn heading_level(tag: &str) -> Option<u8> {
    let level: u8 = tag.strip_prefix("heading-")?.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Whether `name` is safe to write as an element or attribute name: an ASCII
/// letter followed by ASCII letters, digits, `-`, `_`, `.` or `:`.
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}
