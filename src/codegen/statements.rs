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

//! Statement lowering.
//!
//! Control flow is label-based: each statement kind mints the labels it
//! needs and conditionally jumps between them. `break` and `continue`
//! target the labels of the nearest enclosing loop, passed down through
//! [`LoopLabels`].

use super::frame::FrameLayout;
use super::registers::{Reg, RETURN_REG};
use super::CodeGenerator;
use crate::ast::{Function, Statement};
use crate::error::{CompileError, ErrorCode, Result};

/// The jump targets of the nearest enclosing loop.
#[derive(Debug, Clone)]
pub(super) struct LoopLabels {
    pub continue_label: String,
    pub break_label: String,
}

impl CodeGenerator<'_> {
    /// Lower one statement.
    pub(super) fn gen_statement(
        &mut self,
        stmt: &Statement,
        f: &Function,
        frame: &FrameLayout,
        loop_labels: Option<&LoopLabels>,
    ) -> Result<()> {
        match stmt {
            Statement::Compound(statements) => {
                for statement in statements {
                    self.gen_statement(statement, f, frame, loop_labels)?;
                }
                Ok(())
            }
            Statement::Expr(expr) => self.gen_expr_discard(expr, f, frame),
            Statement::VoidCall(call) => {
                self.gen_call(call, f, frame, false)?;
                Ok(())
            }
            Statement::Null | Statement::LocalDecl(_) => Ok(()),
            Statement::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let false_label = self.emit.get_unused_label("if_false");
                let end_label = self.emit.get_unused_label("if_end");
                self.gen_expr_to_reg(cond, f, frame, Reg::M)?;
                self.emit.write_inst("TST M");
                self.emit.write_inst(&format!("JEQ {}", false_label));
                self.gen_statement(then_branch, f, frame, loop_labels)?;
                match else_branch {
                    Some(else_branch) => {
                        self.emit.write_inst(&format!("JMPI {}", end_label));
                        self.emit.writeln(&format!("{}:", false_label));
                        self.gen_statement(else_branch, f, frame, loop_labels)?;
                    }
                    None => {
                        self.emit.writeln(&format!("{}:", false_label));
                    }
                }
                self.emit.writeln(&format!("{}:", end_label));
                Ok(())
            }
            Statement::While { cond, body } => {
                let labels = LoopLabels {
                    continue_label: self.emit.get_unused_label("while_continue"),
                    break_label: self.emit.get_unused_label("while_break"),
                };
                self.emit.writeln(&format!("{}:", labels.continue_label));
                self.gen_expr_to_reg(cond, f, frame, Reg::M)?;
                self.emit.write_inst("TST M");
                self.emit
                    .write_inst(&format!("JEQ {}", labels.break_label));
                self.gen_statement(body, f, frame, Some(&labels))?;
                self.emit
                    .write_inst(&format!("JMPI {}", labels.continue_label));
                self.emit.writeln(&format!("{}:", labels.break_label));
                Ok(())
            }
            Statement::DoWhile { body, cond } => {
                let labels = LoopLabels {
                    continue_label: self.emit.get_unused_label("do_continue"),
                    break_label: self.emit.get_unused_label("do_break"),
                };
                self.emit.writeln(&format!("{}:", labels.continue_label));
                self.gen_statement(body, f, frame, Some(&labels))?;
                self.gen_expr_to_reg(cond, f, frame, Reg::M)?;
                self.emit.write_inst("TST M");
                self.emit
                    .write_inst(&format!("JNE {}", labels.continue_label));
                self.emit.writeln(&format!("{}:", labels.break_label));
                Ok(())
            }
            Statement::For {
                init,
                cond,
                step,
                body,
            } => {
                let start_label = self.emit.get_unused_label("for_start");
                let labels = LoopLabels {
                    continue_label: self.emit.get_unused_label("for_continue"),
                    break_label: self.emit.get_unused_label("for_break"),
                };
                for expr in init {
                    self.gen_expr_discard(expr, f, frame)?;
                }
                self.emit.writeln(&format!("{}:", start_label));
                if let Some(cond) = cond {
                    self.gen_expr_to_reg(cond, f, frame, Reg::M)?;
                    self.emit.write_inst("TST M");
                    self.emit
                        .write_inst(&format!("JEQ {}", labels.break_label));
                }
                self.gen_statement(body, f, frame, Some(&labels))?;
                self.emit.writeln(&format!("{}:", labels.continue_label));
                for expr in step {
                    self.gen_expr_discard(expr, f, frame)?;
                }
                self.emit.write_inst(&format!("JMPI {}", start_label));
                self.emit.writeln(&format!("{}:", labels.break_label));
                Ok(())
            }
            Statement::Break(line) => {
                let labels = loop_labels.ok_or_else(|| {
                    CompileError::new(
                        ErrorCode::BreakOutsideLoop,
                        "Must be within a loop statement to use 'break;'.",
                        *line,
                    )
                })?;
                self.emit
                    .write_inst(&format!("JMPI {}", labels.break_label));
                Ok(())
            }
            Statement::Continue(line) => {
                let labels = loop_labels.ok_or_else(|| {
                    CompileError::new(
                        ErrorCode::ContinueOutsideLoop,
                        "Must be within a loop statement to use 'continue;'.",
                        *line,
                    )
                })?;
                self.emit
                    .write_inst(&format!("JMPI {}", labels.continue_label));
                Ok(())
            }
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    self.gen_expr_to_reg(value, f, frame, RETURN_REG)?;
                }
                self.emit.write_inst(&format!("JMPI {}", frame.end_label));
                Ok(())
            }
            Statement::Label(idx) => {
                self.emit
                    .writeln(&format!("{}:", frame.label_names[*idx]));
                Ok(())
            }
            Statement::Goto { name, line } => {
                let (idx, _) = f.label(name).ok_or_else(|| {
                    CompileError::new(
                        ErrorCode::UnresolvedGoto,
                        format!("Label '{}' has not been declared.", name),
                        *line,
                    )
                })?;
                self.emit
                    .write_inst(&format!("JMPI {}", frame.label_names[idx]));
                Ok(())
            }
        }
    }
}
