#![no_main]

use libfuzzer_sys::fuzz_target;
use pagefx_core::format::{group_digits, locale_for_tag, parse_leading_integer};

// Input: `<language tag>\n<counter target>`.
fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let (tag, target) = raw.split_once('\n').unwrap_or(("en", &raw));
    let locale = locale_for_tag(tag);
    if let Some(value) = parse_leading_integer(target) {
        let grouped = group_digits(value, &locale);
        assert_eq!(grouped.replace(locale.separator(), ""), value.to_string());
    }
});
