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

//! Statement definitions for the Coral C language.

use super::expr::{CallExpr, Expr};

/// A statement. The set of kinds is closed; the code generator dispatches
/// by exhaustive match.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `{ ... }` - a brace-delimited statement sequence.
    Compound(Vec<Statement>),
    /// An expression evaluated for its side effects; the result is dropped.
    Expr(Expr),
    /// A call to a void function as a statement.
    VoidCall(CallExpr),
    /// `;` - the empty statement.
    Null,
    /// `if (cond) stmt [else stmt]`.
    If {
        cond: Expr,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    /// `for (init,* ; cond? ; step,*) stmt`. An absent condition means
    /// constant true.
    For {
        init: Vec<Expr>,
        cond: Option<Expr>,
        step: Vec<Expr>,
        body: Box<Statement>,
    },
    /// `while (cond) stmt`.
    While { cond: Expr, body: Box<Statement> },
    /// `do stmt while (cond);`.
    DoWhile { body: Box<Statement>, cond: Expr },
    /// `break;` with its source line.
    Break(u32),
    /// `continue;` with its source line.
    Continue(u32),
    /// `return;` or `return expr;`.
    Return { value: Option<Expr>, line: u32 },
    /// A label declaration; index into the function's label table.
    Label(usize),
    /// `goto name;`. Resolved against the label table at function end.
    Goto { name: String, line: u32 },
    /// A local variable declaration; index into the function's local
    /// table. Initializers are emitted by the frame prologue, so this is
    /// a position marker only.
    LocalDecl(usize),
}
