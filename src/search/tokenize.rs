//! Key and query normalization shared by the shard reader and the matcher.
//!
//! Keys arrive escaped the way the index builder writes entry ids: every
//! character below U+0080 other than `[a-z0-9]` becomes `_` plus two lowercase
//! hex digits (`_20` for a space, `_2e` for `.`, `_5f` for `_`). Queries are
//! brought to the same decoded, lowercased form before matching.

use std::borrow::Cow;

/// Normalize raw query text: trim, lowercase, collapse runs of whitespace to one space.
///
/// Multi-word labels like "Using the header" are indexed as `the header`, so
/// `"  The   Header "` must normalize to exactly that.
pub fn normalize_query(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode an escaped key body (entry id without its ordinal) into normalized form.
///
/// An underscore not followed by two hex digits is kept literally.
pub fn decode_key(escaped: &str) -> String {
    let mut decoded = String::with_capacity(escaped.len());
    let mut rest = escaped;

    while let Some(idx) = rest.find('_') {
        decoded.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];
        match after
            .get(..2)
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        {
            Some(byte) if byte < 0x80 => {
                decoded.push(char::from(byte));
                rest = &after[2..];
            }
            _ => {
                decoded.push('_');
                rest = after;
            }
        }
    }
    decoded.push_str(rest);

    normalize_query(&decoded)
}

/// Escape a normalized key the way the index builder writes entry ids.
pub fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || !c.is_ascii() {
            out.push(c);
        } else {
            out.push_str(&format!("_{:02x}", u32::from(c)));
        }
    }
    out
}

/// Split an entry id like `timer_5ftest_2ecpp_21` into its escaped key and ordinal.
///
/// The ordinal is the decimal group after the last underscore. Returns `None`
/// when the id carries no ordinal.
pub fn split_entry_id(id: &str) -> Option<(&str, u32)> {
    let (key, ordinal) = id.rsplit_once('_')?;
    if key.is_empty() || ordinal.is_empty() || !ordinal.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    ordinal.parse().ok().map(|n| (key, n))
}

/// The character that selects a query's bucket: its first normalized character.
pub fn bucket_char(normalized: &str) -> Option<char> {
    normalized.chars().next()
}

/// Decode the HTML entities the index builder writes into labels and scopes.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("Timer", "timer")]
    #[case("  The   Header ", "the header")]
    #[case("\tRectGridIO\n", "rectgridio")]
    #[case("", "")]
    #[case("   ", "")]
    #[case("Nextsim::Timer", "nextsim::timer")]
    fn test_normalize_query(#[case] raw: &str, #[case] expected: &str) {
        check!(normalize_query(raw) == expected);
    }

    #[rstest]
    #[case("timer", "timer")]
    #[case("the_20header", "the header")]
    #[case("timer_5ftest_2ecpp", "timer_test.cpp")]
    #[case("tt_20module_20tt_20namespace_20and_20class", "tt module tt namespace and class")]
    #[case("operator_3d_3d", "operator==")]
    #[case("caf\u{e9}", "caf\u{e9}")]
    #[case("odd_zz", "odd_zz")]
    #[case("trailing_", "trailing_")]
    fn test_decode_key(#[case] escaped: &str, #[case] expected: &str) {
        check!(decode_key(escaped) == expected);
    }

    #[rstest]
    #[case("timer_test.cpp", "timer_5ftest_2ecpp")]
    #[case("the header", "the_20header")]
    #[case("caf\u{e9}", "caf\u{e9}")]
    fn test_encode_key_matches_builder_escaping(#[case] key: &str, #[case] expected: &str) {
        check!(encode_key(key) == expected);
        check!(decode_key(&encode_key(key)) == key);
    }

    #[rstest]
    #[case("ra_0", Some(("ra", 0)))]
    #[case("the_20header_5", Some(("the_20header", 5)))]
    #[case("timer_5ftest_2ecpp_21", Some(("timer_5ftest_2ecpp", 21)))]
    #[case("noordinal", None)]
    #[case("_7", None)]
    #[case("key_", None)]
    #[case("key_2e", None)]
    fn test_split_entry_id(#[case] id: &str, #[case] expected: Option<(&str, u32)>) {
        check!(split_entry_id(id) == expected);
    }

    #[test]
    fn test_decode_entities() {
        check!(
            decode_entities("Nextsim::Timer::report(const Key &amp;timerName)")
                == "Nextsim::Timer::report(const Key &timerName)"
        );
        check!(decode_entities("&lt;tt&gt;Module&lt;/tt&gt;") == "<tt>Module</tt>");
        check!(decode_entities("&amp;lt;") == "&lt;");
        check!(matches!(decode_entities("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_bucket_char() {
        check!(bucket_char("timer") == Some('t'));
        check!(bucket_char("") == None);
    }
}
