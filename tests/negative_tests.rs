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

//! Negative tests: invalid programs must be rejected with the right
//! error code, message shape, and line number.

use coral16::{compile, format_error, CompileError, ErrorCode};
use test_case::test_case;

fn compile_err(source: &str) -> CompileError {
    compile(source).expect_err("expected a compile error")
}

// ============================================================================
// Syntax Errors
// ============================================================================

#[test_case("uint32 x; void main() { }", ErrorCode::InvalidType; "unknown_type")]
#[test_case("void main() { uint16 1x; }", ErrorCode::InvalidName; "name_starts_with_digit")]
#[test_case("uint16 while; void main() { }", ErrorCode::InvalidName; "reserved_word_as_global")]
#[test_case("void main() { uint16 goto; }", ErrorCode::InvalidName; "reserved_word_as_local")]
#[test_case("void main() { ", ErrorCode::UnexpectedEof; "eof_in_body")]
#[test_case("uint16", ErrorCode::UnexpectedEof; "eof_after_type")]
#[test_case("uint16 x", ErrorCode::UnexpectedEof; "eof_after_name")]
#[test_case("void main() { x = 1; }", ErrorCode::InvalidName; "undeclared_identifier")]
#[test_case("void main() { if 1 { } }", ErrorCode::UnexpectedToken; "if_without_parens")]
#[test_case("void main() { COLOR(1) }", ErrorCode::UnexpectedToken; "missing_semicolon")]
fn test_syntax_errors(source: &str, expected: ErrorCode) {
    assert_eq!(compile_err(source).code, expected);
}

// ============================================================================
// Declaration Errors
// ============================================================================

#[test_case("void x; void main() { }", ErrorCode::VoidGlobal; "void_global")]
#[test_case("void main() { void x; }", ErrorCode::VoidLocal; "void_local")]
#[test_case("void f(void a) { } void main() { }", ErrorCode::VoidParameter; "void_parameter")]
#[test_case("void f(uint16[2] a) { } void main() { }", ErrorCode::ArrayParameter; "array_parameter")]
#[test_case("uint16[2] f() { } void main() { }", ErrorCode::InvalidType; "array_return")]
#[test_case("uint16 x; uint16 x; void main() { }", ErrorCode::NameCollision; "duplicate_global")]
#[test_case("uint16 TIME; void main() { }", ErrorCode::NameCollision; "global_shadows_builtin")]
#[test_case("void f() { } uint16 f; void main() { }", ErrorCode::NameCollision; "global_shadows_function")]
#[test_case("uint16 x; void f(uint16 x) { } void main() { }", ErrorCode::NameCollision; "param_shadows_global")]
#[test_case("void main() { uint16 x; uint16 x; }", ErrorCode::NameCollision; "duplicate_local")]
#[test_case("void f(uint16 a) { uint16 a; } void main() { }", ErrorCode::NameCollision; "local_shadows_param")]
#[test_case("void main() { COLOR(1); uint16 x; }", ErrorCode::DeclarationAfterStatement; "decl_after_statement")]
fn test_declaration_errors(source: &str, expected: ErrorCode) {
    assert_eq!(compile_err(source).code, expected);
}

// ============================================================================
// Array and Initializer Errors
// ============================================================================

#[test_case("uint16 n; uint16[n] a; void main() { }", ErrorCode::ArraySizeNotConstant; "size_not_constant")]
#[test_case("uint16[0] a; void main() { }", ErrorCode::ArraySizeNotPositive; "size_zero")]
#[test_case("uint16[RND()] a; void main() { }", ErrorCode::ArraySizeNotConstant; "size_call")]
#[test_case("uint16[3] a = { 1, 2 }; void main() { }", ErrorCode::InitializerSizeMismatch; "too_few_values")]
#[test_case("uint16[1] a = { 1, 2 }; void main() { }", ErrorCode::InitializerSizeMismatch; "too_many_values")]
#[test_case("uint16 x = RND(); void main() { }", ErrorCode::InitializerNotConstant; "scalar_init_not_constant")]
#[test_case("uint16 a = 1; uint16 b = a; void main() { }", ErrorCode::InitializerNotConstant; "global_ref_not_constant")]
#[test_case("uint16[2] a = { 1, RND() }; void main() { }", ErrorCode::InitializerNotConstant; "array_init_not_constant")]
#[test_case("void main() { uint16[2] a = { 1 }; }", ErrorCode::InitializerSizeMismatch; "local_array_size_mismatch")]
fn test_array_and_initializer_errors(source: &str, expected: ErrorCode) {
    assert_eq!(compile_err(source).code, expected);
}

#[test]
fn test_array_size_error_message_and_line() {
    let err = compile_err("uint16 n;\nuint16[n] a;\nvoid main() { }");
    assert_eq!(err.message, "Array size must be known at compile time.");
    assert_eq!(err.line, Some(2));
}

// ============================================================================
// Control-Flow Errors
// ============================================================================

#[test_case("void main() { break; }", ErrorCode::BreakOutsideLoop; "break_outside_loop")]
#[test_case("void main() { continue; }", ErrorCode::ContinueOutsideLoop; "continue_outside_loop")]
#[test_case("void main() { if (1) break; }", ErrorCode::BreakOutsideLoop; "break_in_if")]
#[test_case("void main() { goto nowhere; }", ErrorCode::UnresolvedGoto; "unresolved_goto")]
#[test_case("void main() { x: ; x: ; }", ErrorCode::DuplicateLabel; "duplicate_label")]
#[test_case("void main() { return 1; }", ErrorCode::ReturnValueFromVoid; "value_from_void")]
#[test_case("uint16 f() { return; } void main() { }", ErrorCode::MissingReturnValue; "missing_return_value")]
fn test_control_flow_errors(source: &str, expected: ErrorCode) {
    assert_eq!(compile_err(source).code, expected);
}

#[test]
fn test_break_error_message_and_line() {
    let err = compile_err("void main() {\n    break;\n}");
    assert_eq!(err.message, "Must be within a loop statement to use 'break;'.");
    assert_eq!(err.line, Some(2));
    assert_eq!(
        format_error(&err),
        "Error:2: Must be within a loop statement to use 'break;'."
    );
}

// ============================================================================
// Entry-Point Errors
// ============================================================================

#[test_case("uint16 x;", ErrorCode::MissingEntryPoint; "no_main")]
#[test_case("", ErrorCode::MissingEntryPoint; "empty_source")]
#[test_case("uint16 main() { return 0; }", ErrorCode::EntryPointSignature; "main_returns_value")]
#[test_case("void main(uint16 a) { }", ErrorCode::EntryPointSignature; "main_takes_params")]
#[test_case("void main() { main(); }", ErrorCode::CallToEntryPoint; "main_calls_main")]
#[test_case("void f() { main(); } void main() { }", ErrorCode::CallToEntryPoint; "function_calls_main")]
fn test_entry_point_errors(source: &str, expected: ErrorCode) {
    assert_eq!(compile_err(source).code, expected);
}

#[test]
fn test_missing_main_has_no_line() {
    let err = compile_err("uint16 x;");
    assert!(err.line.is_none());
    assert_eq!(format_error(&err), "Error: Expected a 'void main()' function.");
}

// ============================================================================
// Expression Errors
// ============================================================================

#[test_case("void main() { 1 = 2; }", ErrorCode::AssignToRValue; "assign_to_literal")]
#[test_case("uint16 g; void main() { g + 1 = 2; }", ErrorCode::AssignToRValue; "assign_to_sum")]
#[test_case("void main() { uint16 x; x = &5; }", ErrorCode::AddressOfRValue; "address_of_literal")]
#[test_case("void main() { uint16 x; x = &RND(); }", ErrorCode::AddressOfRValue; "address_of_call")]
#[test_case("void main() { TIMERST() + 1; }", ErrorCode::VoidInExpression; "void_in_expression")]
#[test_case("void f() { } void main() { uint16 x; x = f(); }", ErrorCode::VoidInExpression; "void_user_fn_in_expression")]
#[test_case("void main() { PIXEL(1); }", ErrorCode::WrongArgumentCount; "too_few_arguments")]
#[test_case("void main() { TIMERST(1); }", ErrorCode::WrongArgumentCount; "too_many_arguments")]
#[test_case("uint16 g; void main() { g = (1 + 2; }", ErrorCode::UnexpectedToken; "unbalanced_paren")]
#[test_case("uint16 g; void main() { g = 1 +; }", ErrorCode::UnexpectedToken; "dangling_operator")]
#[test_case("uint16 g; void main() { g = 0x1g; }", ErrorCode::UnexpectedToken; "bad_hex_literal")]
#[test_case("uint16 g; void main() { g = 0b102; }", ErrorCode::UnexpectedToken; "bad_binary_literal")]
fn test_expression_errors(source: &str, expected: ErrorCode) {
    assert_eq!(compile_err(source).code, expected);
}

// ============================================================================
// Error Codes Are Stable
// ============================================================================

#[test]
fn test_error_code_strings_by_category() {
    assert!(compile_err("void main() { break; }")
        .code_str()
        .starts_with("E1"));
    assert!(compile_err("uint16[0] a; void main() { }")
        .code_str()
        .starts_with("E2"));
}

// ============================================================================
// First Error Wins
// ============================================================================

#[test]
fn test_first_error_reported() {
    // Both a break-outside-loop and an unknown identifier exist; the
    // parser aborts on the first.
    let err = compile_err("void main() { break; nope = 1; }");
    assert_eq!(err.code, ErrorCode::BreakOutsideLoop);
}
