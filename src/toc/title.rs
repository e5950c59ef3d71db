//! Chapter title normalization.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Named or numeric character reference.
static ENTITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").unwrap());

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Two or more colons separated only by whitespace.
static DUPLICATE_COLON_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(?:\s*:)+").unwrap());

/// A lower-case letter following a colon.
static COLON_LOWER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*(\p{Ll})").unwrap());

/// Canonicalizes a chapter title.
///
/// Decodes entities, collapses whitespace, merges duplicate colons and
/// capitalizes the first letter after each colon. Idempotent.
pub fn normalize_title(raw: &str) -> String {
    let decoded = decode_entities(raw);
    let collapsed = WHITESPACE_REGEX.replace_all(&decoded, " ");
    let collapsed = collapsed.trim();
    let merged = DUPLICATE_COLON_REGEX.replace_all(collapsed, ":");

    COLON_LOWER_REGEX
        .replace_all(&merged, |caps: &Captures| {
            let upper: String = caps[1].chars().flat_map(char::to_uppercase).collect();
            format!(": {}", upper)
        })
        .into_owned()
}

/// Form used to compare two renderings of the same title: lower-case with
/// all whitespace and colons removed.
pub fn comparison_form(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Decodes character references until none are left. Every replacement
/// shortens the text, so this terminates.
fn decode_entities(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = ENTITY_REGEX
            .replace_all(&current, |caps: &Captures| {
                decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }

    let decoded = match body {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        _ => return None,
    };
    Some(decoded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_entities() {
        assert_eq!(normalize_title("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(normalize_title("Ch&#432;&#417;ng 1"), "Chương 1");
        assert_eq!(normalize_title("&#x43;hapter"), "Chapter");
        assert_eq!(normalize_title("a&nbsp;&nbsp;b"), "a b");
        assert_eq!(normalize_title("&bogus; stays"), "&bogus; stays");
    }

    #[test]
    fn test_double_escaped_entities_fully_decode() {
        assert_eq!(normalize_title("A &amp;amp; B"), "A & B");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize_title("  Chương   1 \n\t Mở đầu "), "Chương 1 Mở đầu");
    }

    #[test]
    fn test_collapses_duplicate_colons() {
        assert_eq!(normalize_title("Chương 1:: Khởi đầu"), "Chương 1: Khởi đầu");
        assert_eq!(normalize_title("Chương 1 : : Khởi đầu"), "Chương 1 : Khởi đầu");
        assert_eq!(normalize_title("A:::B"), "A:B");
    }

    #[test]
    fn test_capitalizes_after_colon() {
        assert_eq!(normalize_title("Chương 5: awakening"), "Chương 5: Awakening");
        assert_eq!(normalize_title("Chương 5:awakening"), "Chương 5: Awakening");
        assert_eq!(normalize_title("Chương 5: đêm tối"), "Chương 5: Đêm tối");
        assert_eq!(normalize_title("Chương 5: 12 giờ"), "Chương 5: 12 giờ");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "  Chương 1::  mở đầu  ",
            "Tom &amp;amp; jerry: the &lt;end&gt;",
            "a : : b :: c: d",
            "[Quyển 1] - Chương 1: khởi đầu",
            ":::",
            "",
            "x:\u{a0}ñ",
            "&#58;&#58;a",
        ];
        for sample in samples {
            let once = normalize_title(sample);
            assert_eq!(normalize_title(&once), once, "input: {:?}", sample);
        }
    }

    #[test]
    fn test_comparison_form() {
        assert_eq!(comparison_form("Chương 5: Awakening"), "chương5awakening");
        assert_eq!(
            comparison_form("chương 5:awakening"),
            comparison_form("Chương 5: Awakening")
        );
        assert_eq!(comparison_form(" : \n"), "");
    }
}
