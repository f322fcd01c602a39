//! Raw generation output cleanup.
//!
//! Two shapes: a list of short options (numbered lines from the backend,
//! stripped and capped at three) and a single cleaned block. Normalization
//! never fails; malformed input degrades to an empty array or string.

/// Maximum number of options returned in list mode.
const MAX_OPTIONS: usize = 3;

/// Quote characters stripped from both ends of lines and blocks.
const QUOTE_CHARS: [char; 7] = ['"', '\u{201C}', '\u{201D}', '\'', '\u{2018}', '\u{2019}', '`'];

/// Boilerplate prefixes stripped case-insensitively from block output.
const BOILERPLATE_PREFIXES: [&str; 3] = ["here's a reply:", "reply:", "response:"];

/// Normalize raw text into up to three clean reply options.
///
/// Splits on line breaks, strips a leading `digit+ "."` numbering token,
/// strips bounding quotes, drops lines that end up empty, and truncates to
/// the first three entries.
pub fn normalize_options(raw: &str) -> Vec<String> {
    raw.lines()
        .map(strip_numbering)
        .map(|line| strip_outer_quotes(line).trim().to_owned())
        .filter(|line| !line.is_empty())
        .take(MAX_OPTIONS)
        .collect()
}

/// Normalize raw text into a single cleaned block.
///
/// Strips bounding quotes, then a fixed set of leading boilerplate phrases
/// (case-insensitive), then trims.
pub fn normalize_block(raw: &str) -> String {
    let mut text = strip_outer_quotes(raw.trim()).trim();

    for prefix in BOILERPLATE_PREFIXES {
        match text.get(..prefix.len()) {
            Some(head) if head.eq_ignore_ascii_case(prefix) => {
                text = text[prefix.len()..].trim_start();
                break;
            }
            _ => {}
        }
    }

    text.trim().to_owned()
}

/// Strip a leading `digit+ "."` numbering token plus surrounding whitespace.
fn strip_numbering(line: &str) -> &str {
    let trimmed = line.trim_start();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = trimmed.get(digits..) {
            if let Some(stripped) = rest.strip_prefix('.') {
                return stripped.trim_start();
            }
        }
    }
    trimmed
}

/// Strip any run of bounding quote characters from both ends.
fn strip_outer_quotes(s: &str) -> &str {
    s.trim_matches(|c| QUOTE_CHARS.contains(&c))
}
