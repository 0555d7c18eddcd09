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

//! Statement parsing.
//!
//! Statements dispatch on their leading token. The `in_loop` flag is
//! threaded down so `break`/`continue` outside a loop are rejected at
//! parse time; `goto` targets are collected and resolved by the caller at
//! function end.

use super::Parser;
use crate::ast::{is_type_name, LabelDecl, Local, Statement, Type};
use crate::error::{CompileError, ErrorCode, Result};
use crate::lexer::{is_label_declaration, is_reserved_word, is_valid_name};

impl Parser {
    /// Parse one statement.
    ///
    /// `decls_allowed` is true only while parsing the leading run of local
    /// declarations at the top of a function body; every other statement
    /// kind clears it.
    pub(crate) fn parse_statement(
        &mut self,
        in_loop: bool,
        gotos: &mut Vec<(String, u32)>,
        decls_allowed: &mut bool,
    ) -> Result<Statement> {
        let token = self.lexer.peek_token();
        if token.is_empty() {
            return Err(CompileError::new(
                ErrorCode::UnexpectedEof,
                "Unexpected EOF, expected a statement.",
                token.line,
            ));
        }
        let text = token.text.clone();
        let line = token.line;

        if is_type_name(&text) {
            if !*decls_allowed {
                return Err(CompileError::new(
                    ErrorCode::DeclarationAfterStatement,
                    "Local variables must be declared before any other statement.",
                    line,
                ));
            }
            return self.parse_local_decl();
        }
        *decls_allowed = false;

        match text.as_str() {
            "{" => {
                self.lexer.next_token();
                let mut statements = Vec::new();
                let mut no_decls = false;
                while self.lexer.peek_token().text != "}" {
                    if self.lexer.peek_token().is_empty() {
                        return Err(CompileError::new(
                            ErrorCode::UnexpectedEof,
                            "Unexpected EOF, expected '}'.",
                            self.lexer.peek_token().line,
                        ));
                    }
                    statements.push(self.parse_statement(in_loop, gotos, &mut no_decls)?);
                }
                self.expect("}")?;
                Ok(Statement::Compound(statements))
            }
            ";" => {
                self.lexer.next_token();
                Ok(Statement::Null)
            }
            "if" => self.parse_if(in_loop, gotos),
            "for" => self.parse_for(gotos),
            "while" => self.parse_while(gotos),
            "do" => self.parse_do_while(gotos),
            "break" => {
                self.lexer.next_token();
                self.expect(";")?;
                if !in_loop {
                    return Err(CompileError::new(
                        ErrorCode::BreakOutsideLoop,
                        "Must be within a loop statement to use 'break;'.",
                        line,
                    ));
                }
                Ok(Statement::Break(line))
            }
            "continue" => {
                self.lexer.next_token();
                self.expect(";")?;
                if !in_loop {
                    return Err(CompileError::new(
                        ErrorCode::ContinueOutsideLoop,
                        "Must be within a loop statement to use 'continue;'.",
                        line,
                    ));
                }
                Ok(Statement::Continue(line))
            }
            "return" => self.parse_return(line),
            "goto" => {
                self.lexer.next_token();
                let name = self.lexer.next_token();
                self.check_name(&name)?;
                self.expect(";")?;
                gotos.push((name.text.clone(), line));
                Ok(Statement::Goto {
                    name: name.text,
                    line,
                })
            }
            _ if is_label_declaration(&text) => self.parse_label(),
            _ if self.is_void_function(&text) => {
                if text == "main" {
                    return Err(CompileError::new(
                        ErrorCode::CallToEntryPoint,
                        "Cannot call the entry point 'main'.",
                        line,
                    ));
                }
                let call = self.parse_call()?;
                self.expect(";")?;
                Ok(Statement::VoidCall(call))
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(";")?;
                Ok(Statement::Expr(expr))
            }
        }
    }

    /// True if the token names a void function (a void-call statement).
    fn is_void_function(&self, name: &str) -> bool {
        is_valid_name(name)
            && self
                .program
                .function(name)
                .is_some_and(|(_, f)| f.return_type.is_void())
    }

    /// `if '(' Cond ')' Stmt ('else' Stmt)?`
    fn parse_if(&mut self, in_loop: bool, gotos: &mut Vec<(String, u32)>) -> Result<Statement> {
        self.lexer.next_token();
        self.expect("(")?;
        let cond = self.parse_expr()?;
        self.expect(")")?;
        let mut no_decls = false;
        let then_branch = Box::new(self.parse_statement(in_loop, gotos, &mut no_decls)?);
        let else_branch = if self.lexer.peek_token().text == "else" {
            self.lexer.next_token();
            let mut no_decls = false;
            Some(Box::new(self.parse_statement(in_loop, gotos, &mut no_decls)?))
        } else {
            None
        };
        Ok(Statement::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    /// `for '(' InitList? ';' Cond? ';' LoopList? ')' Stmt`. An absent
    /// condition is constant true.
    fn parse_for(&mut self, gotos: &mut Vec<(String, u32)>) -> Result<Statement> {
        self.lexer.next_token();
        self.expect("(")?;

        let mut init = Vec::new();
        if self.lexer.peek_token().text != ";" {
            loop {
                init.push(self.parse_expr()?);
                if self.lexer.peek_token().text == "," {
                    self.lexer.next_token();
                    continue;
                }
                break;
            }
        }
        self.expect(";")?;

        let cond = if self.lexer.peek_token().text != ";" {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(";")?;

        let mut step = Vec::new();
        if self.lexer.peek_token().text != ")" {
            loop {
                step.push(self.parse_expr()?);
                if self.lexer.peek_token().text == "," {
                    self.lexer.next_token();
                    continue;
                }
                break;
            }
        }
        self.expect(")")?;

        let mut no_decls = false;
        let body = Box::new(self.parse_statement(true, gotos, &mut no_decls)?);
        Ok(Statement::For {
            init,
            cond,
            step,
            body,
        })
    }

    /// `while '(' Cond ')' Stmt`
    fn parse_while(&mut self, gotos: &mut Vec<(String, u32)>) -> Result<Statement> {
        self.lexer.next_token();
        self.expect("(")?;
        let cond = self.parse_expr()?;
        self.expect(")")?;
        let mut no_decls = false;
        let body = Box::new(self.parse_statement(true, gotos, &mut no_decls)?);
        Ok(Statement::While { cond, body })
    }

    /// `do Stmt while '(' Cond ')' ';'`
    fn parse_do_while(&mut self, gotos: &mut Vec<(String, u32)>) -> Result<Statement> {
        self.lexer.next_token();
        let mut no_decls = false;
        let body = Box::new(self.parse_statement(true, gotos, &mut no_decls)?);
        self.expect("while")?;
        self.expect("(")?;
        let cond = self.parse_expr()?;
        self.expect(")")?;
        self.expect(";")?;
        Ok(Statement::DoWhile { body, cond })
    }

    /// `return Expr? ';'` with arity checked against the current
    /// function's return type.
    fn parse_return(&mut self, line: u32) -> Result<Statement> {
        self.lexer.next_token();
        let fn_idx = self.current_fn.expect("return outside of a function body");
        let is_void = self.program.functions[fn_idx].return_type.is_void();
        let fn_name = self.program.functions[fn_idx].name.clone();

        if self.lexer.peek_token().text == ";" {
            self.lexer.next_token();
            if !is_void {
                return Err(CompileError::new(
                    ErrorCode::MissingReturnValue,
                    format!("Must return a value from non-void function '{}'.", fn_name),
                    line,
                ));
            }
            return Ok(Statement::Return { value: None, line });
        }

        let value = self.parse_expr()?;
        self.expect(";")?;
        if is_void {
            return Err(CompileError::new(
                ErrorCode::ReturnValueFromVoid,
                format!("Cannot return a value from void function '{}'.", fn_name),
                line,
            ));
        }
        Ok(Statement::Return {
            value: Some(value),
            line,
        })
    }

    /// A label declaration token, `name:`.
    fn parse_label(&mut self) -> Result<Statement> {
        let token = self.lexer.next_token();
        let name = token
            .text
            .strip_suffix(':')
            .expect("label token must end with ':'")
            .to_string();
        if is_reserved_word(&name) {
            return Err(CompileError::new(
                ErrorCode::InvalidName,
                format!("Invalid name '{}'.", name),
                token.line,
            ));
        }
        let fn_idx = self.current_fn.expect("label outside of a function body");
        if self.program.functions[fn_idx].label(&name).is_some() {
            return Err(CompileError::new(
                ErrorCode::DuplicateLabel,
                format!("Label '{}' has already been declared.", name),
                token.line,
            ));
        }
        self.program.functions[fn_idx].labels.push(LabelDecl {
            name,
            line: token.line,
        });
        Ok(Statement::Label(
            self.program.functions[fn_idx].labels.len() - 1,
        ))
    }

    /// A local declaration: `Type Name ('=' (Expr | ArrayExpr))? ';'`.
    /// Initializers may be runtime expressions; the frame prologue emits
    /// them.
    fn parse_local_decl(&mut self) -> Result<Statement> {
        let ty = self.parse_type()?;
        let name = self.lexer.next_token();
        self.check_name(&name)?;
        if ty.is_void() {
            return Err(CompileError::new(
                ErrorCode::VoidLocal,
                format!("Local variable '{}' cannot be of type 'void'.", name.text),
                name.line,
            ));
        }
        self.check_collision(&name.text, name.line)?;

        let mut init = Vec::new();
        if self.lexer.peek_token().text == "=" {
            self.lexer.next_token();
            match ty {
                Type::Uint16Array(size) => {
                    init = self.parse_array_initializer()?;
                    if init.len() != size as usize {
                        return Err(CompileError::new(
                            ErrorCode::InitializerSizeMismatch,
                            format!(
                                "Expected {} values in array initializer, got {}.",
                                size,
                                init.len()
                            ),
                            name.line,
                        ));
                    }
                }
                _ => init.push(self.parse_expr()?),
            }
        }
        self.expect(";")?;

        let fn_idx = self.current_fn.expect("local outside of a function body");
        self.program.functions[fn_idx].locals.push(Local {
            name: name.text,
            ty,
            init,
            line: name.line,
        });
        Ok(Statement::LocalDecl(
            self.program.functions[fn_idx].locals.len() - 1,
        ))
    }
}
