//! The International Morse Code character table.

use std::collections::HashMap;
use std::sync::LazyLock;

/// `(character, pattern)` pairs. Letters, digits, then punctuation.
const ENTRIES: [(char, &str); 54] = [
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('.', ".-.-.-"),
    (',', "--..--"),
    ('?', "..--.."),
    ('\'', ".----."),
    ('!', "-.-.--"),
    ('/', "-..-."),
    ('(', "-.--."),
    (')', "-.--.-"),
    ('&', ".-..."),
    (':', "---..."),
    (';', "-.-.-."),
    ('=', "-...-"),
    ('+', ".-.-."),
    ('-', "-....-"),
    ('_', "..--.-"),
    ('"', ".-..-."),
    ('$', "...-..-"),
    ('@', ".--.-."),
];

/// Process-wide table, built on first use.
pub static CODE_TABLE: LazyLock<CodeTable> = LazyLock::new(CodeTable::build);

/// Bidirectional character ↔ pattern lookup. Immutable once built.
#[derive(Debug)]
pub struct CodeTable {
    to_morse: HashMap<char, &'static str>,
    to_char: HashMap<&'static str, char>,
}

impl CodeTable {
    fn build() -> Self {
        let to_morse: HashMap<char, &'static str> = ENTRIES.iter().copied().collect();
        let to_char = ENTRIES.iter().map(|&(ch, code)| (code, ch)).collect();
        CodeTable { to_morse, to_char }
    }

    /// Pattern for `ch`. Lower-case letters are looked up as upper case.
    pub fn pattern(&self, ch: char) -> Option<&'static str> {
        self.to_morse.get(&ch.to_ascii_uppercase()).copied()
    }

    /// Character for an exact pattern such as `".-"`.
    pub fn character(&self, pattern: &str) -> Option<char> {
        self.to_char.get(pattern).copied()
    }

    pub fn len(&self) -> usize {
        self.to_morse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_morse.is_empty()
    }

    /// All entries in table order.
    pub fn entries(&self) -> impl Iterator<Item = (char, &'static str)> {
        ENTRIES.iter().copied()
    }
}
