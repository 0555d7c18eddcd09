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

//! Code generation for the Coral-16 target.
//!
//! The generator reads the bound program in one pass and writes assembly
//! text through the [`Emitter`]. Output order is fixed: the bootloader,
//! the globals (label, then data words), the functions, and finally the
//! stack label that `SP` is initialized with.

pub mod emit;
pub mod registers;

mod expressions;
mod frame;
mod statements;

use crate::ast::{Global, Program};
use crate::error::Result;
use emit::{Emitter, DATA_SIZE};
use registers::Reg;

/// Generate the assembly text for a bound program.
pub fn generate(program: &Program) -> Result<String> {
    CodeGenerator::new(program).run()
}

/// The code generator state.
pub(crate) struct CodeGenerator<'a> {
    /// The program being compiled.
    program: &'a Program,
    /// The output emitter.
    emit: Emitter,
    /// Argument registers loaded for calls currently being lowered, so a
    /// nested call saves them.
    call_arg_regs: Vec<Reg>,
    /// The minted label marking where the stack begins.
    stack_label: String,
}

impl<'a> CodeGenerator<'a> {
    /// Create a generator for the given program.
    pub(crate) fn new(program: &'a Program) -> Self {
        Self {
            program,
            emit: Emitter::new(),
            call_arg_regs: Vec::new(),
            stack_label: String::new(),
        }
    }

    /// Run the full output pass.
    fn run(mut self) -> Result<String> {
        // Source-named labels are reserved before any minting.
        for global in &self.program.globals {
            self.emit.add_label(&global.name);
        }
        for function in &self.program.functions {
            if !function.is_builtin {
                self.emit.add_label(&function.name);
            }
        }

        self.emit_bootloader();

        let program = self.program;
        for global in &program.globals {
            self.gen_global(global);
        }
        for function in &program.functions {
            if function.is_builtin {
                continue;
            }
            self.emit.writeln(&format!("{}:", function.name));
            let frame = self.build_frame(function);
            self.emit_prologue(function, &frame)?;
            for stmt in &function.body {
                self.gen_statement(stmt, function, &frame, None)?;
            }
            self.emit.writeln(&format!("{}:", frame.end_label));
            self.emit_epilogue(&frame);
        }

        let stack_label = self.stack_label.clone();
        self.emit.writeln(&format!("{}:", stack_label));
        Ok(self.emit.finish())
    }

    /// The fixed prologue: set up `SP`, call `main`, and halt in a
    /// self-jump when it returns.
    fn emit_bootloader(&mut self) {
        let stack_label = self.emit.get_unused_label("stack");
        let finished_label = self.emit.get_unused_label("program_finished");
        self.emit
            .write_inst(&format!("MOVI SP {}", stack_label));
        self.emit.write_inst("CALL main");
        self.emit.writeln(&format!("{}:", finished_label));
        self.emit.write_inst(&format!("JMPI {}", finished_label));
        self.stack_label = stack_label;
    }

    /// Emit a global: its label, then its data. A scalar's slot holds the
    /// value directly; an array's slot holds the address of the data
    /// block that follows it, so variable slots behave uniformly whether
    /// they live in the frame or in global storage.
    fn gen_global(&mut self, global: &Global) {
        self.emit.writeln(&format!("{}:", global.name));
        if global.ty.is_array() {
            let data_address = (self.emit.position() + DATA_SIZE) as u16;
            let mut words = Vec::with_capacity(global.array_values.len() + 1);
            words.push(data_address);
            words.extend_from_slice(&global.array_values);
            self.emit.write_data(&words);
        } else {
            self.emit.write_data(&[global.value]);
        }
    }
}
