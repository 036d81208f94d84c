//! International Morse Code: the character table and the text codec.
//!
//! Morse strings use `.` and `-` for elements, a single space between the
//! letters of a word, and ` / ` between words.

pub mod codec;
pub mod table;

pub use codec::{decode, decode_lines, encode, encode_lines};
pub use table::{CodeTable, CODE_TABLE};

/// Separator placed between encoded words.
pub const WORD_SEPARATOR: &str = " / ";

/// Marker emitted when a Morse token has no table entry.
pub const UNKNOWN_CHAR: char = '?';
