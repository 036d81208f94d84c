//! Text ↔ Morse conversion.
//!
//! The round trip is lossy: `decode(encode(s))` upper-cases `s`, drops
//! characters the table does not know, and collapses whitespace runs to a
//! single space.

use super::table::CODE_TABLE;
use super::{UNKNOWN_CHAR, WORD_SEPARATOR};

/// Encode text as Morse.
///
/// Characters without a table entry are dropped, and a word left with
/// nothing to send is dropped with them.
pub fn encode(text: &str) -> String {
    let words: Vec<String> = text
        .split_whitespace()
        .filter_map(|word| {
            let patterns: Vec<&str> = word
                .chars()
                .flat_map(char::to_uppercase)
                .filter_map(|ch| CODE_TABLE.pattern(ch))
                .collect();
            if patterns.is_empty() {
                None
            } else {
                Some(patterns.join(" "))
            }
        })
        .collect();
    words.join(WORD_SEPARATOR)
}

/// Decode Morse back to text. Unknown tokens become `?`.
pub fn decode(morse: &str) -> String {
    let words: Vec<String> = morse
        .trim()
        .split(WORD_SEPARATOR)
        .map(|word| {
            word.split_whitespace()
                .map(|token| CODE_TABLE.character(token).unwrap_or(UNKNOWN_CHAR))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect();
    words.join(" ")
}

/// Encode each line of `text` separately, keeping the line structure.
pub fn encode_lines(text: &str) -> String {
    text.split('\n').map(encode).collect::<Vec<_>>().join("\n")
}

/// Decode each line of `morse` separately, keeping the line structure.
pub fn decode_lines(morse: &str) -> String {
    morse.split('\n').map(decode).collect::<Vec<_>>().join("\n")
}
