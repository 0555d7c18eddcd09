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

//! Compile-time folding of constant postfix expressions.
//!
//! All arithmetic is unsigned 16-bit with wrap-around. Division or
//! modulus by zero warns and folds to `0xFFFF`; a constant array index
//! out of bounds warns and marks the expression non-constant.
//!
//! Folding sees *initializers* only: a constant-indexed global array
//! element folds to its static initializer entry even though the runtime
//! value may later change. A scalar global reference is a runtime
//! variable and is never constant - which is what rejects
//! `uint16 n; uint16[n] a;` with a compile-time-size error rather than
//! silently folding `n` to zero.

use crate::ast::{BinaryOp, Expr, ExprAtom, Program, UnaryOp};
use crate::error::{Diagnostics, WarningCode};

/// A value on the folding stack: a scalar, or a whole constant global
/// array awaiting an index.
#[derive(Debug, Clone, Copy)]
enum CVal {
    Scalar(u16),
    Array(usize),
}

/// Fold the expression if it is constant, setting `is_const` and `value`.
/// Non-constant expressions get `is_const = false` and `value = 0`.
pub(crate) fn evaluate(expr: &mut Expr, program: &Program, diagnostics: &mut Diagnostics) {
    expr.is_const = false;
    expr.value = 0;

    let mut stack: Vec<CVal> = Vec::new();
    for atom in &expr.atoms {
        match atom {
            ExprAtom::Literal(value) => stack.push(CVal::Scalar(*value)),
            ExprAtom::Global(idx) => {
                if program.globals[*idx].ty.is_array() {
                    stack.push(CVal::Array(*idx));
                } else {
                    // A scalar global is a runtime variable.
                    return;
                }
            }
            ExprAtom::Param(_) | ExprAtom::Local(_) | ExprAtom::Call(_) => return,
            ExprAtom::Unary(op) => {
                let operand = match stack.pop() {
                    Some(CVal::Scalar(value)) => value,
                    _ => return,
                };
                match op {
                    UnaryOp::Deref | UnaryOp::AddrOf => return,
                    _ => stack.push(CVal::Scalar(op.operate(operand))),
                }
            }
            ExprAtom::Binary(BinaryOp::Assign) => return,
            ExprAtom::Binary(BinaryOp::Index) => {
                let rhs = stack.pop();
                let lhs = stack.pop();
                match (lhs, rhs) {
                    (Some(CVal::Array(g)), Some(CVal::Scalar(index))) => {
                        let global = &program.globals[g];
                        if (index as usize) < global.array_values.len() {
                            stack.push(CVal::Scalar(global.array_values[index as usize]));
                        } else {
                            diagnostics.warn(
                                WarningCode::IndexOutOfBounds,
                                "Array index out of bounds.",
                                expr.line,
                            );
                            return;
                        }
                    }
                    _ => return,
                }
            }
            ExprAtom::Binary(op) => {
                let rhs = match stack.pop() {
                    Some(CVal::Scalar(value)) => value,
                    _ => return,
                };
                let lhs = match stack.pop() {
                    Some(CVal::Scalar(value)) => value,
                    _ => return,
                };
                if rhs == 0 && matches!(op, BinaryOp::Div | BinaryOp::Mod) {
                    let message = match op {
                        BinaryOp::Div => "Division by zero.",
                        _ => "Modulus by zero.",
                    };
                    diagnostics.warn(WarningCode::DivisionByZero, message, expr.line);
                }
                stack.push(CVal::Scalar(op.operate(lhs, rhs)));
            }
        }
    }

    if let [CVal::Scalar(value)] = stack[..] {
        expr.is_const = true;
        expr.value = value;
    }
}
