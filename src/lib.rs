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

//! Coral16 Compiler Library
//!
//! This library compiles Coral C - a small statically-typed imperative
//! language with a single `uint16` scalar type - into assembly text for
//! the Coral-16 fantasy game console.
//!
//! # Modules
//!
//! - [`error`] - Error types, warnings, and diagnostic formatting
//! - [`lexer`] - Tokenization of source code
//! - [`ast`] - The bound program representation (postfix expressions)
//! - [`parser`] - Parsing and semantic binding
//! - [`codegen`] - Assembly generation for the Coral-16 target
//!
//! # Example
//!
//! ```
//! let source = "void main() { COLOR(0x00ff); PIXEL(10, 20); }";
//!
//! match coral16::compile(source) {
//!     Ok((asm, warnings)) => {
//!         assert!(warnings.is_empty());
//!         assert!(asm.contains("CALL main"));
//!     }
//!     Err(e) => panic!("compilation failed: {}", e),
//! }
//! ```

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;

// Re-export commonly used types
pub use error::{
    format_error, format_warning, CompileError, ErrorCode, Result, Warning, WarningCode,
};
pub use lexer::Token;

/// The version of the Coral16 compiler.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of the compiler.
pub const NAME: &str = "Coral16";

/// Compile source code to Coral-16 assembly text.
///
/// This is the main entry point. It runs all stages - lexing, parsing
/// with semantic binding, and code generation - and returns the assembly
/// text together with any warnings produced by constant folding. The
/// first error aborts the pass.
pub fn compile(source: &str) -> Result<(String, Vec<Warning>)> {
    let (program, warnings) = parser::parse(source)?;
    let asm = codegen::generate(&program)?;
    Ok((asm, warnings))
}
