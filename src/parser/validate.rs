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

//! L-value/r-value validation of postfix expressions.
//!
//! A single walk over the postfix sequence with a stack of value kinds.
//! Assignment requires an l-value on its left; address-of requires an
//! l-value operand. Dereference and indexing produce l-values; everything
//! else produces r-values.

use crate::ast::{BinaryOp, Expr, ExprAtom, UnaryOp};
use crate::error::{CompileError, ErrorCode, Result};

/// The kind of a value on the validation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    LValue,
    RValue,
}

/// Validate the l-value/r-value structure of an expression.
pub(crate) fn validate(expr: &Expr) -> Result<()> {
    let mut stack: Vec<Kind> = Vec::new();
    let underflow = || {
        CompileError::new(
            ErrorCode::MalformedExpression,
            "Malformed expression.",
            expr.line,
        )
    };

    for atom in &expr.atoms {
        match atom {
            ExprAtom::Literal(_) | ExprAtom::Call(_) => stack.push(Kind::RValue),
            ExprAtom::Global(_) | ExprAtom::Param(_) | ExprAtom::Local(_) => {
                stack.push(Kind::LValue)
            }
            ExprAtom::Unary(op) => {
                let operand = stack.pop().ok_or_else(underflow)?;
                let result = match op {
                    UnaryOp::AddrOf => {
                        if operand != Kind::LValue {
                            return Err(CompileError::new(
                                ErrorCode::AddressOfRValue,
                                "Cannot take the address of an r-value.",
                                expr.line,
                            ));
                        }
                        Kind::RValue
                    }
                    UnaryOp::Deref => Kind::LValue,
                    UnaryOp::Neg | UnaryOp::Plus | UnaryOp::Not | UnaryOp::BitNot => Kind::RValue,
                };
                stack.push(result);
            }
            ExprAtom::Binary(op) => {
                let _rhs = stack.pop().ok_or_else(underflow)?;
                let lhs = stack.pop().ok_or_else(underflow)?;
                let result = match op {
                    BinaryOp::Assign => {
                        if lhs != Kind::LValue {
                            return Err(CompileError::new(
                                ErrorCode::AssignToRValue,
                                "Cannot assign to an r-value.",
                                expr.line,
                            ));
                        }
                        Kind::RValue
                    }
                    BinaryOp::Index => Kind::LValue,
                    _ => Kind::RValue,
                };
                stack.push(result);
            }
        }
    }

    if stack.len() == 1 {
        Ok(())
    } else {
        Err(underflow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr_of(atoms: Vec<ExprAtom>) -> Expr {
        Expr::new(atoms, 1)
    }

    #[test]
    fn test_assign_to_variable_ok() {
        // x = 1
        let expr = expr_of(vec![
            ExprAtom::Local(0),
            ExprAtom::Literal(1),
            ExprAtom::Binary(BinaryOp::Assign),
        ]);
        assert!(validate(&expr).is_ok());
    }

    #[test]
    fn test_assign_to_literal_rejected() {
        // 1 = x
        let expr = expr_of(vec![
            ExprAtom::Literal(1),
            ExprAtom::Local(0),
            ExprAtom::Binary(BinaryOp::Assign),
        ]);
        let err = validate(&expr).unwrap_err();
        assert_eq!(err.code, ErrorCode::AssignToRValue);
    }

    #[test]
    fn test_assign_to_sum_rejected() {
        // (x + 1) = 2
        let expr = expr_of(vec![
            ExprAtom::Local(0),
            ExprAtom::Literal(1),
            ExprAtom::Binary(BinaryOp::Add),
            ExprAtom::Literal(2),
            ExprAtom::Binary(BinaryOp::Assign),
        ]);
        let err = validate(&expr).unwrap_err();
        assert_eq!(err.code, ErrorCode::AssignToRValue);
    }

    #[test]
    fn test_assign_to_element_ok() {
        // a[0] = 2
        let expr = expr_of(vec![
            ExprAtom::Global(0),
            ExprAtom::Literal(0),
            ExprAtom::Binary(BinaryOp::Index),
            ExprAtom::Literal(2),
            ExprAtom::Binary(BinaryOp::Assign),
        ]);
        assert!(validate(&expr).is_ok());
    }

    #[test]
    fn test_assign_through_deref_ok() {
        // *p = 2
        let expr = expr_of(vec![
            ExprAtom::Param(0),
            ExprAtom::Unary(UnaryOp::Deref),
            ExprAtom::Literal(2),
            ExprAtom::Binary(BinaryOp::Assign),
        ]);
        assert!(validate(&expr).is_ok());
    }

    #[test]
    fn test_address_of_variable_ok() {
        // &x
        let expr = expr_of(vec![ExprAtom::Local(0), ExprAtom::Unary(UnaryOp::AddrOf)]);
        assert!(validate(&expr).is_ok());
    }

    #[test]
    fn test_address_of_literal_rejected() {
        // &1
        let expr = expr_of(vec![ExprAtom::Literal(1), ExprAtom::Unary(UnaryOp::AddrOf)]);
        let err = validate(&expr).unwrap_err();
        assert_eq!(err.code, ErrorCode::AddressOfRValue);
    }

    #[test]
    fn test_address_of_call_result_rejected() {
        // &(x + y) shape via an r-value on the stack
        let expr = expr_of(vec![
            ExprAtom::Local(0),
            ExprAtom::Local(1),
            ExprAtom::Binary(BinaryOp::Add),
            ExprAtom::Unary(UnaryOp::AddrOf),
        ]);
        let err = validate(&expr).unwrap_err();
        assert_eq!(err.code, ErrorCode::AddressOfRValue);
    }

    #[test]
    fn test_address_of_element_ok() {
        // &a[1]
        let expr = expr_of(vec![
            ExprAtom::Global(0),
            ExprAtom::Literal(1),
            ExprAtom::Binary(BinaryOp::Index),
            ExprAtom::Unary(UnaryOp::AddrOf),
        ]);
        assert!(validate(&expr).is_ok());
    }

    #[test]
    fn test_call_result_is_rvalue() {
        // RND() = 1 shape: call then assign
        let call = crate::ast::CallExpr {
            name: "RND".to_string(),
            args: Vec::new(),
            line: 1,
        };
        let expr = expr_of(vec![
            ExprAtom::Call(call),
            ExprAtom::Literal(1),
            ExprAtom::Binary(BinaryOp::Assign),
        ]);
        let err = validate(&expr).unwrap_err();
        assert_eq!(err.code, ErrorCode::AssignToRValue);
    }
}
