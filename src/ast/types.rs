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

//! Type definitions for the Coral C language.
//!
//! The language has a single scalar type `uint16`, fixed-size arrays of it,
//! and `void` for function return types only.

/// A type in the Coral C language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    /// `void` - valid only as a function return type.
    Void,
    /// `uint16` - the 16-bit unsigned scalar.
    Uint16,
    /// `uint16[N]` - a fixed-size array of `uint16`. The size is a
    /// compile-time constant greater than zero.
    Uint16Array(u16),
}

impl Type {
    /// True for `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// True for array types.
    pub fn is_array(&self) -> bool {
        matches!(self, Type::Uint16Array(_))
    }

    /// The array size, if this is an array type.
    pub fn array_size(&self) -> Option<u16> {
        match self {
            Type::Uint16Array(size) => Some(*size),
            _ => None,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Uint16 => write!(f, "uint16"),
            Type::Uint16Array(size) => write!(f, "uint16[{}]", size),
        }
    }
}

/// Returns true if the given token text names a base type. There are only
/// two valid type names right now, so this is deliberately crude.
pub fn is_type_name(text: &str) -> bool {
    text == "void" || text == "uint16"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_predicates() {
        assert!(Type::Void.is_void());
        assert!(!Type::Uint16.is_void());
        assert!(Type::Uint16Array(3).is_array());
        assert_eq!(Type::Uint16Array(3).array_size(), Some(3));
        assert_eq!(Type::Uint16.array_size(), None);
    }

    #[test]
    fn test_type_display() {
        assert_eq!(Type::Void.to_string(), "void");
        assert_eq!(Type::Uint16.to_string(), "uint16");
        assert_eq!(Type::Uint16Array(10).to_string(), "uint16[10]");
    }

    #[test]
    fn test_is_type_name() {
        assert!(is_type_name("void"));
        assert!(is_type_name("uint16"));
        assert!(!is_type_name("uint32"));
        assert!(!is_type_name(""));
    }
}
