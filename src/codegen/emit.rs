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

//! The assembly-text emitter.
//!
//! Lines are either labels (`name:` at column zero) or instructions
//! (eight spaces of indent). The emitter tracks the byte position of the
//! output for data-address computation: instructions are `INST_SIZE`
//! bytes, data words are `DATA_SIZE` bytes and pad up to instruction
//! alignment.
//!
//! The emitter owns the label registry (`get_unused_label`) and the one
//! optimization in the pipeline: a single pending `PUSH reg` is buffered,
//! and a directly following `POP` collapses the pair to a `MOV` (or to
//! nothing when the registers match). Any other write flushes the pending
//! `PUSH` first, so the rewrite never crosses a label or another
//! instruction.

use std::collections::HashSet;

/// Instruction size in bytes.
pub const INST_SIZE: usize = 4;
/// Data word size in bytes.
pub const DATA_SIZE: usize = 2;
/// Address size in bytes.
pub const ADDRESS_SIZE: usize = 2;

/// Format a value as a four-digit hex word, e.g. `0x00ff`.
pub fn hex16(value: u16) -> String {
    format!("0x{:04x}", value)
}

/// Format a value as a two-digit hex byte count, e.g. `0x04`.
pub fn hex8(value: u16) -> String {
    format!("0x{:02x}", value)
}

/// The line writer with byte-position tracking and the PUSH/POP peephole.
pub struct Emitter {
    /// The emitted lines.
    lines: Vec<String>,
    /// Byte position of the next emission.
    position: usize,
    /// All label names in use (globals, functions, minted labels).
    labels: HashSet<String>,
    /// A buffered `PUSH <reg>` waiting to see the next instruction.
    pending_push: Option<String>,
}

impl Emitter {
    /// Create an empty emitter.
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            position: 0,
            labels: HashSet::new(),
            pending_push: None,
        }
    }

    /// The byte position of the next emission. Flushes the pending push
    /// so the position is exact.
    pub fn position(&mut self) -> usize {
        self.flush();
        self.position
    }

    /// Write a raw line, typically a label. Flushes the pending push.
    pub fn writeln(&mut self, line: &str) {
        self.flush();
        self.lines.push(line.to_string());
    }

    /// Write one instruction, advancing the position by [`INST_SIZE`].
    ///
    /// `PUSH` instructions are buffered; a `POP` arriving while a `PUSH`
    /// is buffered collapses the pair.
    pub fn write_inst(&mut self, text: &str) {
        if let Some(src) = self.pending_push.take() {
            if let Some(dst) = text.strip_prefix("POP ") {
                if dst == src {
                    return;
                }
                self.emit_inst(&format!("MOV {} {}", dst, src));
                return;
            }
            self.emit_inst(&format!("PUSH {}", src));
        }
        if let Some(reg) = text.strip_prefix("PUSH ") {
            self.pending_push = Some(reg.to_string());
            return;
        }
        self.emit_inst(text);
    }

    /// Write data words on one line, advancing the position by the word
    /// count times [`DATA_SIZE`] and padding to instruction alignment so
    /// code following data stays aligned.
    pub fn write_data(&mut self, words: &[u16]) {
        self.flush();
        let text = words.iter().map(|w| hex16(*w)).collect::<Vec<_>>().join(" ");
        self.lines.push(format!("        {}", text));
        self.position += words.len() * DATA_SIZE;
        if self.position % INST_SIZE != 0 {
            self.position += INST_SIZE - self.position % INST_SIZE;
        }
    }

    /// True if the label name is already in use.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Register a label name as used (source-named globals, functions).
    pub fn add_label(&mut self, label: &str) {
        self.labels.insert(label.to_string());
    }

    /// Return `base` if it is unused, else the first `base<n>` that is,
    /// registering the result.
    pub fn get_unused_label(&mut self, base: &str) -> String {
        if !self.has_label(base) {
            self.add_label(base);
            return base.to_string();
        }
        let mut n = 0usize;
        loop {
            let candidate = format!("{}{}", base, n);
            if !self.has_label(&candidate) {
                self.add_label(&candidate);
                return candidate;
            }
            n += 1;
        }
    }

    /// Finish emission and return the assembly text.
    pub fn finish(mut self) -> String {
        self.flush();
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Emit any buffered `PUSH`.
    fn flush(&mut self) {
        if let Some(src) = self.pending_push.take() {
            self.emit_inst(&format!("PUSH {}", src));
        }
    }

    fn emit_inst(&mut self, text: &str) {
        self.lines.push(format!("        {}", text));
        self.position += INST_SIZE;
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}
