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

//! Expression lowering: postfix atoms to operand-tracking instructions.
//!
//! The walk keeps an operand stack that mirrors the machine stack:
//! `Address` and `Value` operands occupy a machine-stack slot, `Register`
//! and `Literal` operands stay virtual until a consumer materializes them
//! with `value_to_reg`. Operands are evaluated left to right, so a binary
//! operator pops its right operand first.
//!
//! Calls save exactly the caller-side registers that are live: the
//! current function's register parameters plus any argument registers
//! already loaded for an enclosing call. Argument registers are marked
//! live as soon as they are loaded, so a nested call in a later argument
//! preserves them.

use super::emit::{hex16, DATA_SIZE};
use super::frame::FrameLayout;
use super::registers::{Operand, Reg, VarLocation, PARAM_REGS, RETURN_REG};
use super::CodeGenerator;
use crate::ast::{BinaryOp, CallExpr, Expr, ExprAtom, Function, UnaryOp};
use crate::error::{CompileError, ErrorCode, Result};

impl CodeGenerator<'_> {
    /// Place an operand's value in the given register.
    pub(super) fn value_to_reg(&mut self, operand: Operand, reg: Reg) {
        match operand {
            Operand::Address => {
                self.emit.write_inst(&format!("POP {}", reg));
                self.emit.write_inst(&format!("LOAD {} {}", reg, reg));
            }
            Operand::Register(src) => {
                self.emit.write_inst(&format!("MOV {} {}", reg, src));
            }
            Operand::Value => {
                self.emit.write_inst(&format!("POP {}", reg));
            }
            Operand::Literal(value) => {
                self.emit.write_inst(&format!("MOVI {} {}", reg, hex16(value)));
            }
        }
    }

    /// Compute `FP + offset` into `M` (clobbers `N`).
    pub(super) fn frame_address_to_m(&mut self, offset: i32) {
        self.emit.write_inst("MOV M FP");
        self.emit
            .write_inst(&format!("MOVI N {}", hex16(offset.unsigned_abs() as u16)));
        if offset >= 0 {
            self.emit.write_inst("ADD M N");
        } else {
            self.emit.write_inst("SUB M N");
        }
    }

    /// Lower a postfix expression, returning the operand holding its
    /// result.
    pub(super) fn gen_expr(
        &mut self,
        expr: &Expr,
        f: &Function,
        frame: &FrameLayout,
    ) -> Result<Operand> {
        let mut operands: Vec<Operand> = Vec::new();
        let underflow = || {
            CompileError::new(
                ErrorCode::MalformedExpression,
                "Malformed expression.",
                expr.line,
            )
        };

        for atom in &expr.atoms {
            match atom {
                ExprAtom::Literal(value) => operands.push(Operand::Literal(*value)),
                ExprAtom::Global(idx) => {
                    let name = &self.program.globals[*idx].name;
                    self.emit.write_inst(&format!("MOVI M {}", name));
                    self.emit.write_inst("PUSH M");
                    operands.push(Operand::Address);
                }
                ExprAtom::Param(idx) => {
                    operands.push(self.gen_var_ref(frame.param_locs[*idx]));
                }
                ExprAtom::Local(idx) => {
                    operands.push(self.gen_var_ref(frame.local_locs[*idx]));
                }
                ExprAtom::Call(call) => {
                    let operand = self
                        .gen_call(call, f, frame, true)?
                        .expect("non-void call must produce an operand");
                    operands.push(operand);
                }
                ExprAtom::Unary(op) => {
                    let operand = operands.pop().ok_or_else(underflow)?;
                    operands.push(self.gen_unary(*op, operand, expr.line)?);
                }
                ExprAtom::Binary(op) => {
                    let rhs = operands.pop().ok_or_else(underflow)?;
                    let lhs = operands.pop().ok_or_else(underflow)?;
                    operands.push(self.gen_binary(*op, lhs, rhs, expr.line)?);
                }
            }
        }

        operands.pop().ok_or_else(underflow)
    }

    /// Lower an expression and place its result in a register.
    pub(super) fn gen_expr_to_reg(
        &mut self,
        expr: &Expr,
        f: &Function,
        frame: &FrameLayout,
        reg: Reg,
    ) -> Result<()> {
        let operand = self.gen_expr(expr, f, frame)?;
        self.value_to_reg(operand, reg);
        Ok(())
    }

    /// Lower an expression and move its result into a variable location.
    pub(super) fn gen_expr_to_location(
        &mut self,
        expr: &Expr,
        f: &Function,
        frame: &FrameLayout,
        location: VarLocation,
    ) -> Result<()> {
        match location {
            VarLocation::Register(reg) => self.gen_expr_to_reg(expr, f, frame, reg),
            VarLocation::Offset(offset) => {
                let operand = self.gen_expr(expr, f, frame)?;
                self.value_to_reg(operand, RETURN_REG);
                self.frame_address_to_m(offset);
                self.emit.write_inst(&format!("STOR {} M", RETURN_REG));
                Ok(())
            }
        }
    }

    /// Lower an expression for its side effects and drop the result.
    pub(super) fn gen_expr_discard(
        &mut self,
        expr: &Expr,
        f: &Function,
        frame: &FrameLayout,
    ) -> Result<()> {
        let operand = self.gen_expr(expr, f, frame)?;
        if operand.on_stack() {
            self.emit.write_inst("POP N");
        }
        Ok(())
    }

    /// A variable reference: register variables stay virtual, frame
    /// variables push their slot address.
    fn gen_var_ref(&mut self, location: VarLocation) -> Operand {
        match location {
            VarLocation::Register(reg) => Operand::Register(reg),
            VarLocation::Offset(offset) => {
                self.frame_address_to_m(offset);
                self.emit.write_inst("PUSH M");
                Operand::Address
            }
        }
    }

    /// Lower a unary operator application.
    fn gen_unary(&mut self, op: UnaryOp, operand: Operand, line: u32) -> Result<Operand> {
        match op {
            UnaryOp::Neg => {
                self.value_to_reg(operand, Reg::M);
                self.emit.write_inst("MOVI N 0xffff");
                self.emit.write_inst("XOR M N");
                self.emit.write_inst("MOVI N 0x0001");
                self.emit.write_inst("ADD M N");
                self.emit.write_inst("PUSH M");
                Ok(Operand::Value)
            }
            UnaryOp::BitNot => {
                self.value_to_reg(operand, Reg::M);
                self.emit.write_inst("MOVI N 0xffff");
                self.emit.write_inst("XOR M N");
                self.emit.write_inst("PUSH M");
                Ok(Operand::Value)
            }
            UnaryOp::Plus => {
                self.value_to_reg(operand, Reg::M);
                self.emit.write_inst("PUSH M");
                Ok(Operand::Value)
            }
            UnaryOp::Not => {
                let true_label = self.emit.get_unused_label("not_true");
                let end_label = self.emit.get_unused_label("not_end");
                self.value_to_reg(operand, Reg::M);
                self.emit.write_inst("TST M");
                self.emit.write_inst(&format!("JEQ {}", true_label));
                self.emit.write_inst("MOVI M 0x0000");
                self.emit.write_inst(&format!("JMPI {}", end_label));
                self.emit.writeln(&format!("{}:", true_label));
                self.emit.write_inst("MOVI M 0x0001");
                self.emit.writeln(&format!("{}:", end_label));
                self.emit.write_inst("PUSH M");
                Ok(Operand::Value)
            }
            UnaryOp::Deref => {
                // A Value already holds the pointer on the stack; only
                // retag it. Everything else materializes the pointer.
                if operand != Operand::Value {
                    self.value_to_reg(operand, Reg::M);
                    self.emit.write_inst("PUSH M");
                }
                Ok(Operand::Address)
            }
            UnaryOp::AddrOf => {
                if operand != Operand::Address {
                    return Err(CompileError::new(
                        ErrorCode::AddressOfNonVariable,
                        "Cannot take the address of this expression.",
                        line,
                    ));
                }
                // The address on the stack becomes the value.
                Ok(Operand::Value)
            }
        }
    }

    /// Lower a binary operator application. Operands were pushed left to
    /// right, so the right-hand side is materialized first.
    fn gen_binary(
        &mut self,
        op: BinaryOp,
        lhs: Operand,
        rhs: Operand,
        line: u32,
    ) -> Result<Operand> {
        match op {
            BinaryOp::Assign => {
                self.value_to_reg(rhs, Reg::N);
                match lhs {
                    Operand::Address => {
                        self.emit.write_inst("POP M");
                        self.emit.write_inst("STOR N M");
                    }
                    Operand::Register(reg) => {
                        self.emit.write_inst(&format!("MOV {} N", reg));
                    }
                    _ => {
                        return Err(CompileError::new(
                            ErrorCode::InvalidAssignTarget,
                            "Cannot assign to an r-value.",
                            line,
                        ));
                    }
                }
                self.emit.write_inst("PUSH N");
                Ok(Operand::Value)
            }
            BinaryOp::Index => {
                self.value_to_reg(rhs, Reg::N);
                self.value_to_reg(lhs, Reg::M);
                self.emit
                    .write_inst(&format!("MOVI L {}", hex16(DATA_SIZE.ilog2() as u16)));
                self.emit.write_inst("SHL N L");
                self.emit.write_inst("ADD M N");
                self.emit.write_inst("PUSH M");
                Ok(Operand::Address)
            }
            BinaryOp::Mod => {
                self.value_to_reg(rhs, Reg::N);
                self.value_to_reg(lhs, Reg::M);
                self.emit.write_inst("MOV L M");
                self.emit.write_inst("DIV L N");
                self.emit.write_inst("MUL L N");
                self.emit.write_inst("SUB M L");
                self.emit.write_inst("PUSH M");
                Ok(Operand::Value)
            }
            BinaryOp::LogAnd | BinaryOp::LogOr => {
                self.value_to_reg(rhs, Reg::N);
                self.value_to_reg(lhs, Reg::M);
                self.normalize_bool(Reg::M);
                self.normalize_bool(Reg::N);
                let inst = if op == BinaryOp::LogAnd { "AND" } else { "OR" };
                self.emit.write_inst(&format!("{} M N", inst));
                self.emit.write_inst("PUSH M");
                Ok(Operand::Value)
            }
            BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::Eq
            | BinaryOp::Ne => {
                let jump = match op {
                    BinaryOp::Lt => "JB",
                    BinaryOp::Le => "JBE",
                    BinaryOp::Gt => "JA",
                    BinaryOp::Ge => "JAE",
                    BinaryOp::Eq => "JEQ",
                    _ => "JNE",
                };
                let true_label = self.emit.get_unused_label("cmp_true");
                let end_label = self.emit.get_unused_label("cmp_end");
                self.value_to_reg(rhs, Reg::N);
                self.value_to_reg(lhs, Reg::M);
                self.emit.write_inst("CMP M N");
                self.emit.write_inst(&format!("{} {}", jump, true_label));
                self.emit.write_inst("MOVI M 0x0000");
                self.emit.write_inst(&format!("JMPI {}", end_label));
                self.emit.writeln(&format!("{}:", true_label));
                self.emit.write_inst("MOVI M 0x0001");
                self.emit.writeln(&format!("{}:", end_label));
                self.emit.write_inst("PUSH M");
                Ok(Operand::Value)
            }
            _ => {
                let inst = match op {
                    BinaryOp::Add => "ADD",
                    BinaryOp::Sub => "SUB",
                    BinaryOp::Mul => "MUL",
                    BinaryOp::Div => "DIV",
                    BinaryOp::BitAnd => "AND",
                    BinaryOp::BitOr => "OR",
                    BinaryOp::BitXor => "XOR",
                    BinaryOp::Shl => "SHL",
                    _ => "SHRL",
                };
                self.value_to_reg(rhs, Reg::N);
                self.value_to_reg(lhs, Reg::M);
                self.emit.write_inst(&format!("{} M N", inst));
                self.emit.write_inst("PUSH M");
                Ok(Operand::Value)
            }
        }
    }

    /// Normalize a register to 0 or 1.
    fn normalize_bool(&mut self, reg: Reg) {
        let one_label = self.emit.get_unused_label("bool_one");
        let end_label = self.emit.get_unused_label("bool_end");
        self.emit.write_inst(&format!("TST {}", reg));
        self.emit.write_inst(&format!("JNE {}", one_label));
        self.emit.write_inst(&format!("MOVI {} 0x0000", reg));
        self.emit.write_inst(&format!("JMPI {}", end_label));
        self.emit.writeln(&format!("{}:", one_label));
        self.emit.write_inst(&format!("MOVI {} 0x0001", reg));
        self.emit.writeln(&format!("{}:", end_label));
    }

    /// Lower a function call. Built-ins expand to single instructions;
    /// user calls follow the calling convention. Returns the result
    /// operand, or `None` for void calls.
    pub(super) fn gen_call(
        &mut self,
        call: &CallExpr,
        f: &Function,
        frame: &FrameLayout,
        want_value: bool,
    ) -> Result<Option<Operand>> {
        let (_, callee) = self
            .program
            .function(&call.name)
            .ok_or_else(|| {
                CompileError::new(
                    ErrorCode::MalformedExpression,
                    format!("Unknown function '{}'.", call.name),
                    call.line,
                )
            })?;
        if callee.is_builtin {
            return self.gen_builtin(call, f, frame);
        }

        // Save the live caller-side registers.
        let saved: Vec<Reg> = PARAM_REGS
            .iter()
            .copied()
            .filter(|reg| {
                frame
                    .param_locs
                    .contains(&VarLocation::Register(*reg))
                    || self.call_arg_regs.contains(reg)
            })
            .collect();
        for reg in &saved {
            self.emit.write_inst(&format!("PUSH {}", reg));
        }

        // Overflow arguments, pushed right-to-left so the first overflow
        // argument lands closest to the return address.
        let arg_count = call.args.len();
        for i in (PARAM_REGS.len()..arg_count).rev() {
            let operand = self.gen_expr(&call.args[i], f, frame)?;
            self.value_to_reg(operand, Reg::M);
            self.emit.write_inst("PUSH M");
        }

        // Register arguments, marked live as they are loaded.
        let reg_args = arg_count.min(PARAM_REGS.len());
        for (i, reg) in PARAM_REGS.iter().enumerate().take(reg_args) {
            let operand = self.gen_expr(&call.args[i], f, frame)?;
            self.value_to_reg(operand, *reg);
            self.call_arg_regs.push(*reg);
        }

        self.emit.write_inst(&format!("CALL {}", call.name));
        self.call_arg_regs
            .truncate(self.call_arg_regs.len() - reg_args);

        for reg in saved.iter().rev() {
            self.emit.write_inst(&format!("POP {}", reg));
        }

        if want_value {
            self.emit.write_inst(&format!("PUSH {}", RETURN_REG));
            Ok(Some(Operand::Value))
        } else {
            Ok(None)
        }
    }

    /// Lower a built-in call to its single target instruction.
    fn gen_builtin(
        &mut self,
        call: &CallExpr,
        f: &Function,
        frame: &FrameLayout,
    ) -> Result<Option<Operand>> {
        match call.name.as_str() {
            "COLOR" => {
                let operand = self.gen_expr(&call.args[0], f, frame)?;
                self.value_to_reg(operand, Reg::M);
                self.emit.write_inst("COLOR M");
                Ok(None)
            }
            "PIXEL" => {
                let x = self.gen_expr(&call.args[0], f, frame)?;
                let y = self.gen_expr(&call.args[1], f, frame)?;
                self.value_to_reg(y, Reg::N);
                self.value_to_reg(x, Reg::M);
                self.emit.write_inst("PIXEL M N");
                Ok(None)
            }
            "TIMERST" => {
                self.emit.write_inst("TIMERST");
                Ok(None)
            }
            "TIME" => {
                self.emit.write_inst("TIME M");
                self.emit.write_inst("PUSH M");
                Ok(Some(Operand::Value))
            }
            "INPUT" => {
                let operand = self.gen_expr(&call.args[0], f, frame)?;
                self.value_to_reg(operand, Reg::N);
                self.emit.write_inst("INPUT M N");
                self.emit.write_inst("PUSH M");
                Ok(Some(Operand::Value))
            }
            "RND" => {
                self.emit.write_inst("RND M");
                self.emit.write_inst("PUSH M");
                Ok(Some(Operand::Value))
            }
            other => Err(CompileError::new(
                ErrorCode::MalformedExpression,
                format!("Unknown builtin '{}'.", other),
                call.line,
            )),
        }
    }
}
