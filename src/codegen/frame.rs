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

//! Frame layout and register allocation.
//!
//! Per function: the first four parameters arrive in `A`..`D`, further
//! parameters on the stack below the frame pointer. Scalar locals take the
//! callee-saved registers `E`..`K` in declaration order; locals that do
//! not fit, arrays, and anything address-taken get frame offsets at and
//! above `FP`. Address-taken register parameters are pushed on entry and
//! relocated to the frame.
//!
//! Address-taken-ness is decided by a pre-pass over every expression of
//! the function before any location is assigned: in postfix, `&` applied
//! to a variable is always directly preceded by that variable's atom.

use super::emit::{hex16, ADDRESS_SIZE, DATA_SIZE};
use super::registers::{Reg, VarLocation, LOCAL_REGS, PARAM_REGS, RETURN_REG};
use super::CodeGenerator;
use crate::ast::{Expr, ExprAtom, Function, Statement, UnaryOp};
use crate::error::Result;

/// The per-function layout: where every parameter and local lives, what
/// the prologue must save, and what `RET` must pop.
#[derive(Debug)]
pub(super) struct FrameLayout {
    /// Location of each parameter.
    pub param_locs: Vec<VarLocation>,
    /// Location of each local's variable slot.
    pub local_locs: Vec<VarLocation>,
    /// Frame offset of each array local's data block.
    pub local_data_offsets: Vec<Option<i32>>,
    /// Callee-saved registers taken by register locals, in push order.
    pub saved_regs: Vec<Reg>,
    /// Address-taken register parameters: (parameter index, entry
    /// register). Pushed right after `MOV FP SP`, landing at their frame
    /// offsets.
    pub spilled_params: Vec<(usize, Reg)>,
    /// Total bytes of frame storage above `FP`, including spilled
    /// parameter slots and array data.
    pub frame_bytes: usize,
    /// Overflow argument bytes for `RET`.
    pub ret_bytes: usize,
    /// The minted end-of-function label (epilogue target).
    pub end_label: String,
    /// Minted assembly labels, parallel to the function's label table.
    pub label_names: Vec<String>,
}

/// Walk every expression of a function, including call arguments and
/// local initializers.
fn for_each_expr(f: &Function, visit: &mut impl FnMut(&Expr)) {
    fn visit_expr(expr: &Expr, visit: &mut impl FnMut(&Expr)) {
        visit(expr);
        for atom in &expr.atoms {
            if let ExprAtom::Call(call) = atom {
                for arg in &call.args {
                    visit_expr(arg, visit);
                }
            }
        }
    }
    fn visit_stmt(stmt: &Statement, visit: &mut impl FnMut(&Expr)) {
        match stmt {
            Statement::Compound(stmts) => stmts.iter().for_each(|s| visit_stmt(s, visit)),
            Statement::Expr(expr) => visit_expr(expr, visit),
            Statement::VoidCall(call) => {
                for arg in &call.args {
                    visit_expr(arg, visit);
                }
            }
            Statement::If {
                cond,
                then_branch,
                else_branch,
            } => {
                visit_expr(cond, visit);
                visit_stmt(then_branch, visit);
                if let Some(else_branch) = else_branch {
                    visit_stmt(else_branch, visit);
                }
            }
            Statement::For {
                init,
                cond,
                step,
                body,
            } => {
                init.iter().for_each(|e| visit_expr(e, visit));
                if let Some(cond) = cond {
                    visit_expr(cond, visit);
                }
                step.iter().for_each(|e| visit_expr(e, visit));
                visit_stmt(body, visit);
            }
            Statement::While { cond, body } => {
                visit_expr(cond, visit);
                visit_stmt(body, visit);
            }
            Statement::DoWhile { body, cond } => {
                visit_stmt(body, visit);
                visit_expr(cond, visit);
            }
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    visit_expr(value, visit);
                }
            }
            Statement::Null
            | Statement::Break(_)
            | Statement::Continue(_)
            | Statement::Label(_)
            | Statement::Goto { .. }
            | Statement::LocalDecl(_) => {}
        }
    }
    for local in &f.locals {
        for expr in &local.init {
            visit_expr(expr, visit);
        }
    }
    for stmt in &f.body {
        visit_stmt(stmt, visit);
    }
}

/// Flag every parameter and local whose address is taken anywhere in the
/// function.
fn address_taken(f: &Function) -> (Vec<bool>, Vec<bool>) {
    let mut params = vec![false; f.params.len()];
    let mut locals = vec![false; f.locals.len()];
    for_each_expr(f, &mut |expr| {
        for pair in expr.atoms.windows(2) {
            if pair[1] == ExprAtom::Unary(UnaryOp::AddrOf) {
                match pair[0] {
                    ExprAtom::Param(i) => params[i] = true,
                    ExprAtom::Local(i) => locals[i] = true,
                    _ => {}
                }
            }
        }
    });
    (params, locals)
}

impl CodeGenerator<'_> {
    /// Compute the frame layout for a function and mint its labels.
    pub(super) fn build_frame(&mut self, f: &Function) -> FrameLayout {
        let (param_taken, local_taken) = address_taken(f);

        let mut param_locs = vec![VarLocation::Offset(0); f.params.len()];
        let mut local_locs = vec![VarLocation::Offset(0); f.locals.len()];
        let mut local_data_offsets = vec![None; f.locals.len()];

        // Scalar locals take E..K in declaration order until exhausted.
        let mut saved_regs = Vec::new();
        for (i, local) in f.locals.iter().enumerate() {
            if !local.ty.is_array() && !local_taken[i] && saved_regs.len() < LOCAL_REGS.len() {
                let reg = LOCAL_REGS[saved_regs.len()];
                local_locs[i] = VarLocation::Register(reg);
                saved_regs.push(reg);
            }
        }

        // Frame slots: spilled parameters land first, at the offsets
        // their prologue pushes produce.
        let mut offset = 0i32;
        let mut spilled_params = Vec::new();
        for i in 0..f.params.len().min(PARAM_REGS.len()) {
            if param_taken[i] {
                param_locs[i] = VarLocation::Offset(offset);
                spilled_params.push((i, PARAM_REGS[i]));
                offset += DATA_SIZE as i32;
            } else {
                param_locs[i] = VarLocation::Register(PARAM_REGS[i]);
            }
        }

        // Remaining locals: a slot each, arrays with a data block after
        // their slot.
        for (i, local) in f.locals.iter().enumerate() {
            if matches!(local_locs[i], VarLocation::Register(_)) {
                continue;
            }
            local_locs[i] = VarLocation::Offset(offset);
            offset += DATA_SIZE as i32;
            if let Some(size) = local.ty.array_size() {
                local_data_offsets[i] = Some(offset);
                offset += size as i32 * DATA_SIZE as i32;
            }
        }
        let frame_bytes = offset as usize;

        // Overflow parameters sit below the saved registers, old FP, and
        // return address; the first overflow parameter is closest to the
        // return address.
        let k = saved_regs.len();
        for i in PARAM_REGS.len()..f.params.len() {
            let depth = ADDRESS_SIZE + (k + 1) * DATA_SIZE + (i - 3) * DATA_SIZE;
            param_locs[i] = VarLocation::Offset(-(depth as i32));
        }

        let ret_bytes = f.params.len().saturating_sub(PARAM_REGS.len()) * DATA_SIZE;

        let end_label = self.emit.get_unused_label(&format!("{}_end", f.name));
        let label_names = f
            .labels
            .iter()
            .map(|l| self.emit.get_unused_label(&format!("{}_{}", f.name, l.name)))
            .collect();

        FrameLayout {
            param_locs,
            local_locs,
            local_data_offsets,
            saved_regs,
            spilled_params,
            frame_bytes,
            ret_bytes,
            end_label,
            label_names,
        }
    }

    /// Emit the function prologue: callee saves, frame setup, parameter
    /// spills, local storage reservation, and local initializers.
    pub(super) fn emit_prologue(&mut self, f: &Function, frame: &FrameLayout) -> Result<()> {
        for reg in &frame.saved_regs {
            self.emit.write_inst(&format!("PUSH {}", reg));
        }
        self.emit.write_inst("PUSH FP");
        self.emit.write_inst("MOV FP SP");

        for (_, reg) in &frame.spilled_params {
            self.emit.write_inst(&format!("PUSH {}", reg));
        }

        let reserved = frame.spilled_params.len() * DATA_SIZE;
        let remaining = frame.frame_bytes - reserved;
        if remaining > 0 {
            self.emit
                .write_inst(&format!("MOVI M {}", hex16(remaining as u16)));
            self.emit.write_inst("ADD SP M");
        }

        for (i, local) in f.locals.iter().enumerate() {
            if local.ty.is_array() {
                self.emit_array_local_init(f, frame, i)?;
            } else if let Some(expr) = local.init.first() {
                self.gen_expr_to_location(expr, f, frame, frame.local_locs[i])?;
            }
        }
        Ok(())
    }

    /// Initialize an array local: store the data-block address into the
    /// variable slot, then each initializer element into its offset.
    fn emit_array_local_init(&mut self, f: &Function, frame: &FrameLayout, i: usize) -> Result<()> {
        let local = &f.locals[i];
        let slot_offset = match frame.local_locs[i] {
            VarLocation::Offset(offset) => offset,
            VarLocation::Register(_) => unreachable!("array locals never live in registers"),
        };
        let data_offset = frame.local_data_offsets[i].expect("array local without data block");

        self.frame_address_to_m(data_offset);
        self.emit.write_inst(&format!("MOV {} M", RETURN_REG));
        self.frame_address_to_m(slot_offset);
        self.emit.write_inst(&format!("STOR {} M", RETURN_REG));

        for (j, expr) in local.init.iter().enumerate() {
            let operand = self.gen_expr(expr, f, frame)?;
            self.value_to_reg(operand, RETURN_REG);
            self.frame_address_to_m(data_offset + j as i32 * DATA_SIZE as i32);
            self.emit.write_inst(&format!("STOR {} M", RETURN_REG));
        }
        Ok(())
    }

    /// Emit the epilogue at the end label: tear down the frame, restore
    /// callee saves, and return (popping overflow argument bytes).
    pub(super) fn emit_epilogue(&mut self, frame: &FrameLayout) {
        self.emit.write_inst("MOV SP FP");
        self.emit.write_inst("POP FP");
        for reg in frame.saved_regs.iter().rev() {
            self.emit.write_inst(&format!("POP {}", reg));
        }
        if frame.ret_bytes > 0 {
            self.emit
                .write_inst(&format!("RET {}", super::emit::hex8(frame.ret_bytes as u16)));
        } else {
            self.emit.write_inst("RET");
        }
    }
}
