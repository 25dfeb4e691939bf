#![forbid(unsafe_code)]

//! Number formatting and parsing for counter elements.
//!
//! Grouping follows the CLDR data shipped with `num-format`, so `de` reads
//! `1.234.567` and `en-IN` reads `12,34,567`.

use num_format::ToFormattedString;

pub use num_format::Locale;

/// Format `value` with the digit grouping of `locale`.
#[must_use]
pub fn group_digits(value: u64, locale: &Locale) -> String {
    value.to_formatted_string(locale)
}

/// Resolve a BCP 47 language tag such as `navigator.language`.
///
/// Tries the full tag, then its language subtag, then falls back to `en`.
/// Underscores are accepted in place of hyphens.
#[must_use]
pub fn locale_for_tag(tag: &str) -> Locale {
    let tag = tag.trim().replace('_', "-");
    if let Ok(locale) = Locale::from_name(&tag) {
        return locale;
    }
    tag.split('-')
        .next()
        .and_then(|lang| Locale::from_name(lang).ok())
        .unwrap_or(Locale::en)
}

/// Parse a counter target the way `parseInt(value, 10)` reads it: leading
/// whitespace, an optional `+`, then leading decimal digits. Trailing
/// characters are ignored.
///
/// Returns `None` when no digits are present, the value is negative, or it
/// does not fit in a `u64`.
#[must_use]
pub fn parse_leading_integer(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(unsigned.len(), |(i, _)| i);
    if end == 0 {
        return None;
    }
    unsigned[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping() {
        let en_locale = Locale::en;
        assert_eq!(group_digits(0, &en_locale), "0");
        assert_eq!(group_digits(999, &en_locale), "999");
        assert_eq!(group_digits(1000, &en_locale), "1,000");
        assert_eq!(group_digits(1_234_567, &en_locale), "1,234,567");
        assert_eq!(group_digits(u64::MAX, &en_locale), "18,446,744,073,709,551,615");
    }

    #[test]
    fn grouping_follows_locale() {
        assert_eq!(group_digits(1_234_567, &Locale::de), "1.234.567");
        assert_eq!(group_digits(1_234_567, &Locale::en_IN), "12,34,567");
    }

    #[test]
    fn tags_resolve_to_locales() {
        assert_eq!(locale_for_tag("de"), Locale::de);
        assert_eq!(group_digits(1_234_567, &locale_for_tag("de-DE")), "1.234.567");
        assert_eq!(locale_for_tag("en-IN"), Locale::en_IN);
        assert_eq!(locale_for_tag("en_IN"), Locale::en_IN);
        assert_eq!(group_digits(1_234_567, &locale_for_tag(" en-US ")), "1,234,567");
        assert_eq!(locale_for_tag("tlh"), Locale::en);
        assert_eq!(locale_for_tag(""), Locale::en);
    }

    #[test]
    fn leading_integer() {
        assert_eq!(parse_leading_integer("1500"), Some(1500));
        assert_eq!(parse_leading_integer("  42 "), Some(42));
        assert_eq!(parse_leading_integer("+7"), Some(7));
        assert_eq!(parse_leading_integer("98%"), Some(98));
        assert_eq!(parse_leading_integer("10.5"), Some(10));
        assert_eq!(parse_leading_integer(""), None);
        assert_eq!(parse_leading_integer("abc"), None);
        assert_eq!(parse_leading_integer("-5"), None);
        assert_eq!(parse_leading_integer("99999999999999999999999"), None);
    }
}
