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

//! Parser module for the Coral16 compiler.
//!
//! A single-pass recursive-descent parser that consumes the token stream
//! and produces a fully bound [`Program`]. Expressions are converted to
//! postfix by shunting-yard ([`expressions`]), checked for l-value
//! correctness ([`validate`]), and constant-folded ([`const_eval`]) as they
//! are parsed. Identifiers resolve against the tables built so far, so
//! every name must be declared before use; the one exception is a function
//! calling itself, which works because a function enters the table before
//! its own body is parsed.

mod const_eval;
mod expressions;
mod functions;
mod statements;
mod validate;

use crate::ast::{is_type_name, Expr, Global, Program, Type};
use crate::error::{CompileError, Diagnostics, ErrorCode, Result, Warning};
use crate::lexer::{is_reserved_word, is_valid_name, Lexer, Token};

/// Parse a source file into a bound program plus any warnings produced by
/// constant folding.
pub fn parse(source: &str) -> Result<(Program, Vec<Warning>)> {
    let mut parser = Parser::new(source);
    parser.parse_program()?;
    Ok((parser.program, parser.diagnostics.into_warnings()))
}

/// The parser state.
pub struct Parser {
    /// The token source.
    pub(crate) lexer: Lexer,
    /// The program being built.
    pub(crate) program: Program,
    /// Warning sink for the constant evaluator.
    pub(crate) diagnostics: Diagnostics,
    /// Index of the function whose body is being parsed, if any.
    pub(crate) current_fn: Option<usize>,
}

impl Parser {
    /// Create a new parser over the given source.
    pub fn new(source: &str) -> Self {
        Self {
            lexer: Lexer::new(source),
            program: Program::new(),
            diagnostics: Diagnostics::new(),
            current_fn: None,
        }
    }

    // ========================================
    // Helper Methods
    // ========================================

    /// Consume the next token and require it to equal `expected`.
    pub(crate) fn expect(&mut self, expected: &str) -> Result<Token> {
        let token = self.lexer.next_token();
        if token.is_empty() {
            return Err(CompileError::new(
                ErrorCode::UnexpectedEof,
                format!("Unexpected EOF, expected '{}'.", expected),
                token.line,
            ));
        }
        if token.text != expected {
            return Err(CompileError::new(
                ErrorCode::UnexpectedToken,
                format!("Unexpected token '{}', expected '{}'.", token.text, expected),
                token.line,
            ));
        }
        Ok(token)
    }

    /// Require a token to be a usable name: a valid identifier that is not
    /// a reserved word.
    pub(crate) fn check_name(&self, token: &Token) -> Result<()> {
        if token.is_empty() {
            return Err(CompileError::new(
                ErrorCode::UnexpectedEof,
                "Unexpected EOF, expected a name.",
                token.line,
            ));
        }
        if !is_valid_name(&token.text) || is_reserved_word(&token.text) {
            return Err(CompileError::new(
                ErrorCode::InvalidName,
                format!("Invalid name '{}'.", token.text),
                token.line,
            ));
        }
        Ok(())
    }

    /// Check a new top-level or function-scope name against every table it
    /// could collide with: globals, functions, and (inside a function) the
    /// current parameters and locals.
    pub(crate) fn check_collision(&self, name: &str, line: u32) -> Result<()> {
        let mut taken = self.program.global(name).is_some() || self.program.function(name).is_some();
        if let Some(idx) = self.current_fn {
            let f = &self.program.functions[idx];
            taken = taken || f.param(name).is_some() || f.local(name).is_some();
        }
        if taken {
            return Err(CompileError::new(
                ErrorCode::NameCollision,
                format!("Name '{}' is already in use.", name),
                line,
            ));
        }
        Ok(())
    }

    // ========================================
    // Types
    // ========================================

    /// Parse a type: `void`, `uint16`, or `uint16[ConstExpr]`. The array
    /// size must fold to a constant greater than zero.
    pub(crate) fn parse_type(&mut self) -> Result<Type> {
        let token = self.lexer.next_token();
        if token.is_empty() {
            return Err(CompileError::new(
                ErrorCode::UnexpectedEof,
                "Unexpected EOF, expected a type.",
                token.line,
            ));
        }
        if !is_type_name(&token.text) {
            return Err(CompileError::new(
                ErrorCode::InvalidType,
                format!("Invalid type '{}'.", token.text),
                token.line,
            ));
        }
        let is_void = token.text == "void";
        if self.lexer.peek_token().text != "[" {
            return Ok(if is_void { Type::Void } else { Type::Uint16 });
        }

        self.lexer.next_token();
        let size_expr = self.parse_expr()?;
        self.expect("]")?;
        if is_void {
            return Err(CompileError::new(
                ErrorCode::InvalidType,
                "Invalid type 'void[]'.",
                token.line,
            ));
        }
        if !size_expr.is_const {
            return Err(CompileError::new(
                ErrorCode::ArraySizeNotConstant,
                "Array size must be known at compile time.",
                size_expr.line,
            ));
        }
        if size_expr.value == 0 {
            return Err(CompileError::new(
                ErrorCode::ArraySizeNotPositive,
                "Array size must be greater than zero.",
                size_expr.line,
            ));
        }
        Ok(Type::Uint16Array(size_expr.value))
    }

    // ========================================
    // Top Level
    // ========================================

    /// Parse the whole program: a sequence of globals and functions,
    /// followed by the entry-point check.
    pub(crate) fn parse_program(&mut self) -> Result<()> {
        loop {
            if self.lexer.peek_token().is_empty() {
                break;
            }

            let ty = self.parse_type()?;

            let name = self.lexer.next_token();
            if name.is_empty() {
                return Err(CompileError::new(
                    ErrorCode::UnexpectedEof,
                    "Unexpected EOF, expected global or function name.",
                    name.line,
                ));
            }
            self.check_name(&name)?;

            if self.lexer.peek_token().text == "(" {
                self.parse_function(ty, name)?;
            } else {
                self.parse_global(ty, name)?;
            }
        }

        match self.program.function("main") {
            None => Err(CompileError::top_level(
                ErrorCode::MissingEntryPoint,
                "Expected a 'void main()' function.",
            )),
            Some((_, f)) if !f.return_type.is_void() || !f.params.is_empty() => {
                Err(CompileError::new(
                    ErrorCode::EntryPointSignature,
                    "Function 'main' must return void and take no parameters.",
                    f.line,
                ))
            }
            Some(_) => Ok(()),
        }
    }

    // ========================================
    // Globals
    // ========================================

    /// Parse a global declaration after its type and name:
    /// `( '=' (Expr | ArrayExpr) )? ';'`. Initializers must be constant;
    /// an omitted initializer means all zeros.
    fn parse_global(&mut self, ty: Type, name: Token) -> Result<()> {
        if ty.is_void() {
            return Err(CompileError::new(
                ErrorCode::VoidGlobal,
                format!("Global variable '{}' cannot be of type 'void'.", name.text),
                name.line,
            ));
        }
        self.check_collision(&name.text, name.line)?;

        let mut value = 0u16;
        let mut array_values = vec![0u16; ty.array_size().unwrap_or(0) as usize];

        if self.lexer.peek_token().text == "=" {
            self.lexer.next_token();
            match ty.array_size() {
                Some(size) => {
                    let exprs = self.parse_array_initializer()?;
                    if exprs.len() != size as usize {
                        return Err(CompileError::new(
                            ErrorCode::InitializerSizeMismatch,
                            format!(
                                "Expected {} values in array initializer, got {}.",
                                size,
                                exprs.len()
                            ),
                            name.line,
                        ));
                    }
                    array_values.clear();
                    for expr in &exprs {
                        if !expr.is_const {
                            return Err(CompileError::new(
                                ErrorCode::InitializerNotConstant,
                                "Global initializer must be a constant expression.",
                                expr.line,
                            ));
                        }
                        array_values.push(expr.value);
                    }
                }
                None => {
                    let expr = self.parse_expr()?;
                    if !expr.is_const {
                        return Err(CompileError::new(
                            ErrorCode::InitializerNotConstant,
                            "Global initializer must be a constant expression.",
                            expr.line,
                        ));
                    }
                    value = expr.value;
                }
            }
        }

        self.expect(";")?;
        self.program.globals.push(Global {
            name: name.text,
            ty,
            value,
            array_values,
            line: name.line,
        });
        Ok(())
    }

    /// Parse a brace-delimited, comma-separated expression list:
    /// `'{' Expr (',' Expr)* '}'`.
    pub(crate) fn parse_array_initializer(&mut self) -> Result<Vec<Expr>> {
        self.expect("{")?;
        let mut exprs = Vec::new();
        if self.lexer.peek_token().text != "}" {
            loop {
                exprs.push(self.parse_expr()?);
                if self.lexer.peek_token().text == "," {
                    self.lexer.next_token();
                    continue;
                }
                break;
            }
        }
        self.expect("}")?;
        Ok(exprs)
    }
}
