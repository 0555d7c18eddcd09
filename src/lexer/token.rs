// Coral16 - A small C compiler for the Coral-16 fantasy console
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Token definition and character-class helpers.
//!
//! The lexer deliberately produces undifferentiated text tokens; keywords,
//! names, and numbers are told apart by the parser. An empty token text
//! signals the end of the input.

/// A single token: its text and the line its first character appeared on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token text. Empty means end of input.
    pub text: String,
    /// 1-indexed source line of the token's first character.
    pub line: u32,
}

impl Token {
    /// Create a new token.
    pub fn new(text: impl Into<String>, line: u32) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }

    /// True if this token marks the end of the input.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "end of input")
        } else {
            write!(f, "'{}'", self.text)
        }
    }
}

/// The reserved words of the language. None of them may be used as a
/// variable, function, or label name.
pub const RESERVED_WORDS: [&str; 11] = [
    "void", "uint16", "if", "else", "for", "while", "do", "break", "continue", "return", "goto",
];

/// Returns true if the given string is a valid name for a function,
/// variable, or label: an alphabetic or underscore character followed by
/// zero or more alphanumeric or underscore characters.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns true if the given string is a reserved word.
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Returns true if the given token text is a label declaration: a valid
/// name directly followed by a colon. The colon is not an operator
/// character, so `loop:` arrives from the lexer as a single token.
pub fn is_label_declaration(text: &str) -> bool {
    match text.strip_suffix(':') {
        Some(name) => is_valid_name(name),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("foo"));
        assert!(is_valid_name("_bar"));
        assert!(is_valid_name("x1"));
        assert!(is_valid_name("SCREEN_WIDTH"));
        assert!(is_valid_name("_"));
    }

    #[test]
    fn test_invalid_names() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1x"));
        assert!(!is_valid_name("foo-bar"));
        assert!(!is_valid_name("foo:"));
        assert!(!is_valid_name("0x12"));
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved_word("while"));
        assert!(is_reserved_word("uint16"));
        assert!(!is_reserved_word("main"));
        assert!(!is_reserved_word("whileloop"));
    }

    #[test]
    fn test_label_declarations() {
        assert!(is_label_declaration("top:"));
        assert!(is_label_declaration("_retry1:"));
        assert!(!is_label_declaration("top"));
        assert!(!is_label_declaration(":"));
        assert!(!is_label_declaration("1up:"));
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::new("while", 3).to_string(), "'while'");
        assert_eq!(Token::new("", 3).to_string(), "end of input");
    }
}
