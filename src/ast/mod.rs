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

//! Program representation for the Coral16 compiler.
//!
//! The parser produces these types; the code generator consumes them in a
//! single read-only pass. Expressions live in postfix form throughout.

mod expr;
mod program;
mod stmt;
mod types;

pub use expr::{BinaryOp, CallExpr, Expr, ExprAtom, UnaryOp};
pub use program::{Function, Global, LabelDecl, Local, Param, Program, BUILTIN_NAMES};
pub use stmt::Statement;
pub use types::{is_type_name, Type};
