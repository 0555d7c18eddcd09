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

//! Function definition parsing.
//!
//! A function enters the function table before its body is parsed so it
//! can call itself. Locals must all be declared before the first
//! non-declaration statement, and every `goto` must resolve to a label of
//! the same function by the time the closing brace is reached.

use super::Parser;
use crate::ast::{Function, Param, Type};
use crate::error::{CompileError, ErrorCode, Result};
use crate::lexer::Token;

impl Parser {
    /// Parse a function definition after its return type and name:
    /// `'(' ParamList? ')' '{' Body '}'`.
    pub(crate) fn parse_function(&mut self, return_type: Type, name: Token) -> Result<()> {
        if return_type.is_array() {
            return Err(CompileError::new(
                ErrorCode::InvalidType,
                format!("Function '{}' cannot return an array.", name.text),
                name.line,
            ));
        }
        self.check_collision(&name.text, name.line)?;

        self.expect("(")?;
        let params = self.parse_parameter_list()?;
        self.expect(")")?;

        self.program.functions.push(Function {
            name: name.text,
            return_type,
            params,
            locals: Vec::new(),
            labels: Vec::new(),
            body: Vec::new(),
            is_builtin: false,
            line: name.line,
        });
        let fn_idx = self.program.functions.len() - 1;
        self.current_fn = Some(fn_idx);

        self.expect("{")?;
        let mut body = Vec::new();
        let mut gotos: Vec<(String, u32)> = Vec::new();
        let mut decls_allowed = true;
        while self.lexer.peek_token().text != "}" {
            if self.lexer.peek_token().is_empty() {
                return Err(CompileError::new(
                    ErrorCode::UnexpectedEof,
                    "Unexpected EOF, expected '}'.",
                    self.lexer.peek_token().line,
                ));
            }
            body.push(self.parse_statement(false, &mut gotos, &mut decls_allowed)?);
        }
        self.expect("}")?;

        for (label, line) in gotos {
            if self.program.functions[fn_idx].label(&label).is_none() {
                return Err(CompileError::new(
                    ErrorCode::UnresolvedGoto,
                    format!("Label '{}' has not been declared.", label),
                    line,
                ));
            }
        }

        self.program.functions[fn_idx].body = body;
        self.current_fn = None;
        Ok(())
    }

    /// Parse a comma-separated list of `uint16 name` parameters. Array
    /// and void parameters are rejected.
    fn parse_parameter_list(&mut self) -> Result<Vec<Param>> {
        let mut params: Vec<Param> = Vec::new();
        if self.lexer.peek_token().text == ")" {
            return Ok(params);
        }
        loop {
            let ty = self.parse_type()?;
            let name = self.lexer.next_token();
            self.check_name(&name)?;
            if ty.is_array() {
                return Err(CompileError::new(
                    ErrorCode::ArrayParameter,
                    format!("Parameter '{}' cannot be an array.", name.text),
                    name.line,
                ));
            }
            if ty.is_void() {
                return Err(CompileError::new(
                    ErrorCode::VoidParameter,
                    format!("Parameter '{}' cannot be of type 'void'.", name.text),
                    name.line,
                ));
            }
            if self.program.global(&name.text).is_some()
                || self.program.function(&name.text).is_some()
                || params.iter().any(|p| p.name == name.text)
            {
                return Err(CompileError::new(
                    ErrorCode::NameCollision,
                    format!("Name '{}' is already in use.", name.text),
                    name.line,
                ));
            }
            params.push(Param {
                name: name.text,
                line: name.line,
            });
            if self.lexer.peek_token().text == "," {
                self.lexer.next_token();
                continue;
            }
            break;
        }
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::ast::{ExprAtom, Statement, Type};
    use crate::error::ErrorCode;

    fn parse_err(source: &str) -> crate::error::CompileError {
        parse(source).expect_err("expected a parse error")
    }

    #[test]
    fn test_function_with_parameters() {
        let (program, _) =
            parse("uint16 add(uint16 a, uint16 b) { return a + b; } void main() { }").unwrap();
        let (_, add) = program.function("add").unwrap();
        assert_eq!(add.return_type, Type::Uint16);
        assert_eq!(add.params.len(), 2);
        assert_eq!(add.params[0].name, "a");
        assert_eq!(add.params[1].name, "b");
        assert!(matches!(add.body[0], Statement::Return { .. }));
    }

    #[test]
    fn test_recursion_allowed() {
        let source = r#"
            uint16 fib(uint16 n) {
                if (n < 2) {
                    return n;
                }
                return fib(n - 1) + fib(n - 2);
            }
            void main() { }
        "#;
        let (program, _) = parse(source).unwrap();
        assert!(program.function("fib").is_some());
    }

    #[test]
    fn test_array_parameter_rejected() {
        let err = parse_err("void f(uint16[3] a) { } void main() { }");
        assert_eq!(err.code, ErrorCode::ArrayParameter);
    }

    #[test]
    fn test_void_parameter_rejected() {
        let err = parse_err("void f(void a) { } void main() { }");
        assert_eq!(err.code, ErrorCode::VoidParameter);
    }

    #[test]
    fn test_array_return_rejected() {
        let err = parse_err("uint16[2] f() { } void main() { }");
        assert_eq!(err.code, ErrorCode::InvalidType);
    }

    #[test]
    fn test_duplicate_parameter_names() {
        let err = parse_err("void f(uint16 a, uint16 a) { } void main() { }");
        assert_eq!(err.code, ErrorCode::NameCollision);
    }

    #[test]
    fn test_parameter_shadowing_global_rejected() {
        let err = parse_err("uint16 x; void f(uint16 x) { } void main() { }");
        assert_eq!(err.code, ErrorCode::NameCollision);
    }

    #[test]
    fn test_locals_first_enforced() {
        let err = parse_err("void main() { COLOR(1); uint16 x; }");
        assert_eq!(err.code, ErrorCode::DeclarationAfterStatement);
    }

    #[test]
    fn test_local_decl_in_nested_block_rejected() {
        let err = parse_err("void main() { { uint16 x; } }");
        assert_eq!(err.code, ErrorCode::DeclarationAfterStatement);
    }

    #[test]
    fn test_locals_then_statements() {
        let source = r#"
            void main() {
                uint16 x = 1;
                uint16[2] pair = { 2, 3 };
                x = x + pair[0];
            }
        "#;
        let (program, _) = parse(source).unwrap();
        let (_, main) = program.function("main").unwrap();
        assert_eq!(main.locals.len(), 2);
        assert_eq!(main.locals[0].name, "x");
        assert_eq!(main.locals[1].ty, Type::Uint16Array(2));
        assert!(matches!(main.body[0], Statement::LocalDecl(0)));
        assert!(matches!(main.body[1], Statement::LocalDecl(1)));
        assert!(matches!(main.body[2], Statement::Expr(_)));
    }

    #[test]
    fn test_local_array_initializer_size_mismatch() {
        let err = parse_err("void main() { uint16[3] a = { 1, 2 }; }");
        assert_eq!(err.code, ErrorCode::InitializerSizeMismatch);
    }

    #[test]
    fn test_void_local_rejected() {
        let err = parse_err("void main() { void x; }");
        assert_eq!(err.code, ErrorCode::VoidLocal);
    }

    #[test]
    fn test_break_outside_loop() {
        let err = parse_err("void main() { break; }");
        assert_eq!(err.code, ErrorCode::BreakOutsideLoop);
        assert_eq!(err.message, "Must be within a loop statement to use 'break;'.");
    }

    #[test]
    fn test_continue_outside_loop() {
        let err = parse_err("void main() { continue; }");
        assert_eq!(err.code, ErrorCode::ContinueOutsideLoop);
    }

    #[test]
    fn test_break_inside_nested_statement_of_loop() {
        let source = "void main() { while (1) { if (INPUT(0)) { break; } } }";
        assert!(parse(source).is_ok());
    }

    #[test]
    fn test_break_in_if_without_loop() {
        let err = parse_err("void main() { if (1) { break; } }");
        assert_eq!(err.code, ErrorCode::BreakOutsideLoop);
    }

    #[test]
    fn test_return_arity_void() {
        let err = parse_err("void main() { return 1; }");
        assert_eq!(err.code, ErrorCode::ReturnValueFromVoid);
    }

    #[test]
    fn test_return_arity_nonvoid() {
        let err = parse_err("uint16 f() { return; } void main() { }");
        assert_eq!(err.code, ErrorCode::MissingReturnValue);
    }

    #[test]
    fn test_goto_resolution() {
        let source = r#"
            void main() {
                uint16 i = 0;
                top:
                i = i + 1;
                if (i < 10) {
                    goto top;
                }
            }
        "#;
        let (program, _) = parse(source).unwrap();
        let (_, main) = program.function("main").unwrap();
        assert_eq!(main.labels.len(), 1);
        assert_eq!(main.labels[0].name, "top");
    }

    #[test]
    fn test_unresolved_goto() {
        let err = parse_err("void main() { goto nowhere; }");
        assert_eq!(err.code, ErrorCode::UnresolvedGoto);
    }

    #[test]
    fn test_duplicate_label() {
        let err = parse_err("void main() { here: ; here: ; }");
        assert_eq!(err.code, ErrorCode::DuplicateLabel);
    }

    #[test]
    fn test_goto_before_label_declaration() {
        // Forward gotos resolve at function end.
        let source = "void main() { goto done; done: ; }";
        assert!(parse(source).is_ok());
    }

    #[test]
    fn test_void_call_statement() {
        let (program, _) = parse("void beep() { COLOR(1); } void main() { beep(); }").unwrap();
        let (_, main) = program.function("main").unwrap();
        assert!(matches!(&main.body[0], Statement::VoidCall(c) if c.name == "beep"));
    }

    #[test]
    fn test_calling_main_rejected() {
        let err = parse_err("void main() { main(); }");
        assert_eq!(err.code, ErrorCode::CallToEntryPoint);
    }

    #[test]
    fn test_builtin_call_statement() {
        let (program, _) = parse("void main() { PIXEL(1, 2); }").unwrap();
        let (_, main) = program.function("main").unwrap();
        assert!(matches!(&main.body[0], Statement::VoidCall(c) if c.name == "PIXEL"));
    }

    #[test]
    fn test_builtin_arity_checked() {
        let err = parse_err("void main() { PIXEL(1); }");
        assert_eq!(err.code, ErrorCode::WrongArgumentCount);
    }

    #[test]
    fn test_for_without_clauses() {
        let (program, _) = parse("void main() { for ( ; ; ) break; }").unwrap();
        let (_, main) = program.function("main").unwrap();
        match &main.body[0] {
            Statement::For {
                init, cond, step, ..
            } => {
                assert!(init.is_empty());
                assert!(cond.is_none());
                assert!(step.is_empty());
            }
            other => panic!("expected for statement, got {:?}", other),
        }
    }

    #[test]
    fn test_for_with_comma_lists() {
        let source = r#"
            void main() {
                uint16 i;
                uint16 j;
                for (i = 0, j = 10; i < j; i = i + 1, j = j - 1) {
                    PIXEL(i, j);
                }
            }
        "#;
        let (program, _) = parse(source).unwrap();
        let (_, main) = program.function("main").unwrap();
        match &main.body[2] {
            Statement::For { init, step, .. } => {
                assert_eq!(init.len(), 2);
                assert_eq!(step.len(), 2);
            }
            other => panic!("expected for statement, got {:?}", other),
        }
    }

    #[test]
    fn test_do_while() {
        let source = "void main() { uint16 i = 0; do { i = i + 1; } while (i < 3); }";
        let (program, _) = parse(source).unwrap();
        let (_, main) = program.function("main").unwrap();
        assert!(matches!(main.body[1], Statement::DoWhile { .. }));
    }

    #[test]
    fn test_dangling_else_binds_inner() {
        let source = "void main() { if (1) if (0) COLOR(1); else COLOR(2); }";
        let (program, _) = parse(source).unwrap();
        let (_, main) = program.function("main").unwrap();
        match &main.body[0] {
            Statement::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert!(else_branch.is_none());
                assert!(matches!(**then_branch, Statement::If { ref else_branch, .. }
                        if else_branch.is_some()));
            }
            other => panic!("expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_expression_statement_binding() {
        let (program, _) = parse("uint16 x; void main() { x = 5; }").unwrap();
        let (_, main) = program.function("main").unwrap();
        match &main.body[0] {
            Statement::Expr(expr) => {
                assert!(matches!(expr.atoms[0], ExprAtom::Global(0)));
            }
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_eof_in_body() {
        let err = parse_err("void main() { COLOR(1);");
        assert_eq!(err.code, ErrorCode::UnexpectedEof);
    }
}
