//! Parsing of user supplied code point lists.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Hyphen, en dash, em dash and minus sign, with optional surrounding space.
static RANGE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[-\u{2013}\u{2014}\u{2212}]\s*").unwrap());

static CODE_POINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(?:u\+|\\u|u|0x)?([0-9a-f]{1,6})$").unwrap());

/// Parse a list of code points and code point ranges.
///
/// Entries are separated by commas or whitespace. Each entry is a hex code
/// point, optionally prefixed with `U+`, `\u`, `u` or `0x`, or a range of
/// two such values joined by a hyphen, en dash, em dash or minus sign.
///
/// ```
/// use fonthandle_subsetter::parse_unicodes;
///
/// let cps = parse_unicodes("U+0041-U+0043, 0x20 \\u00e9").unwrap();
/// assert_eq!(cps, vec![0x41, 0x42, 0x43, 0x20, 0xE9]);
/// ```
pub fn parse_unicodes(input: &str) -> Result<Vec<u32>> {
    let normalized = RANGE_SEPARATOR.replace_all(input.trim(), "-");
    let mut code_points = Vec::new();

    for entry in normalized.split(|c: char| c == ',' || c.is_whitespace()) {
        if entry.is_empty() {
            continue;
        }
        match entry.split_once('-') {
            Some((start, end)) => {
                let start = parse_code_point(start, entry)?;
                let end = parse_code_point(end, entry)?;
                if start > end {
                    return Err(Error::InvalidUnicode(entry.to_string()));
                }
                code_points.extend(start..=end);
            }
            None => code_points.push(parse_code_point(entry, entry)?),
        }
    }

    Ok(code_points)
}

fn parse_code_point(value: &str, entry: &str) -> Result<u32> {
    let invalid = || Error::InvalidUnicode(entry.to_string());
    let digits = CODE_POINT.captures(value).ok_or_else(invalid)?;
    let code_point = u32::from_str_radix(&digits[1], 16).map_err(|_| invalid())?;
    if code_point > 0x10FFFF {
        return Err(invalid());
    }
    Ok(code_point)
}
