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

//! Program representation and symbol tables.
//!
//! The parser owns a [`Program`] and fills it top-down; the code generator
//! reads it in a single pass. Name lookup is a linear scan over the
//! relevant table, returning the first match - the tables are small and
//! append-only, and collision checks happen at insertion time.

use super::expr::Expr;
use super::stmt::Statement;
use super::types::Type;

/// A global variable with its constant initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    /// The source name, also the assembly label.
    pub name: String,
    /// The type, `uint16` or `uint16[N]`.
    pub ty: Type,
    /// The folded scalar initializer (0 if omitted). Unused for arrays.
    pub value: u16,
    /// The folded array initializer, one entry per element. Empty for
    /// scalars.
    pub array_values: Vec<u16>,
    /// The declaration line.
    pub line: u32,
}

/// A function parameter. Parameters are always scalar `uint16`.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// The source name.
    pub name: String,
    /// The declaration line.
    pub line: u32,
}

/// A local variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Local {
    /// The source name.
    pub name: String,
    /// The type, `uint16` or `uint16[N]`.
    pub ty: Type,
    /// Initializer expressions: at most one for a scalar, exactly
    /// `array_size` for an initialized array, empty when omitted.
    pub init: Vec<Expr>,
    /// The declaration line.
    pub line: u32,
}

/// A label declared in a function body.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDecl {
    /// The source name, without the trailing colon.
    pub name: String,
    /// The declaration line.
    pub line: u32,
}

/// A function definition, or one of the prebound built-ins.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// The source name, also the assembly label.
    pub name: String,
    /// The (non-array) return type.
    pub return_type: Type,
    /// The parameters, in declaration order.
    pub params: Vec<Param>,
    /// The locals, in declaration order.
    pub locals: Vec<Local>,
    /// The labels declared in the body.
    pub labels: Vec<LabelDecl>,
    /// The body statements.
    pub body: Vec<Statement>,
    /// True for the six built-in functions; they have no body and lower
    /// to single target instructions.
    pub is_builtin: bool,
    /// The definition line (0 for built-ins).
    pub line: u32,
}

impl Function {
    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<(usize, &Param)> {
        self.params
            .iter()
            .enumerate()
            .find(|(_, p)| p.name == name)
    }

    /// Look up a local by name.
    pub fn local(&self, name: &str) -> Option<(usize, &Local)> {
        self.locals
            .iter()
            .enumerate()
            .find(|(_, l)| l.name == name)
    }

    /// Look up a label by name.
    pub fn label(&self, name: &str) -> Option<(usize, &LabelDecl)> {
        self.labels
            .iter()
            .enumerate()
            .find(|(_, l)| l.name == name)
    }
}

/// The names of the six built-in functions, fixed by the target.
pub const BUILTIN_NAMES: [&str; 6] = ["COLOR", "PIXEL", "TIMERST", "TIME", "INPUT", "RND"];

/// The parsed program: globals and functions in declaration order, with
/// the built-ins seeded into the function table.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Global variables.
    pub globals: Vec<Global>,
    /// Functions, starting with the six built-ins.
    pub functions: Vec<Function>,
}

impl Program {
    /// Create an empty program with the built-in functions prebound.
    pub fn new() -> Self {
        let builtin = |name: &str, return_type: Type, param_names: &[&str]| Function {
            name: name.to_string(),
            return_type,
            params: param_names
                .iter()
                .map(|p| Param {
                    name: p.to_string(),
                    line: 0,
                })
                .collect(),
            locals: Vec::new(),
            labels: Vec::new(),
            body: Vec::new(),
            is_builtin: true,
            line: 0,
        };
        Self {
            globals: Vec::new(),
            functions: vec![
                builtin("COLOR", Type::Void, &["color"]),
                builtin("PIXEL", Type::Void, &["x", "y"]),
                builtin("TIMERST", Type::Void, &[]),
                builtin("TIME", Type::Uint16, &[]),
                builtin("INPUT", Type::Uint16, &["id"]),
                builtin("RND", Type::Uint16, &[]),
            ],
        }
    }

    /// Look up a global by name.
    pub fn global(&self, name: &str) -> Option<(usize, &Global)> {
        self.globals
            .iter()
            .enumerate()
            .find(|(_, g)| g.name == name)
    }

    /// Look up a function (or built-in) by name.
    pub fn function(&self, name: &str) -> Option<(usize, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .find(|(_, f)| f.name == name)
    }

    /// True if the name is one of the built-in functions.
    pub fn is_builtin(&self, name: &str) -> bool {
        BUILTIN_NAMES.contains(&name)
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_seeded() {
        let program = Program::new();
        assert_eq!(program.functions.len(), 6);
        for name in BUILTIN_NAMES {
            let (_, f) = program.function(name).expect("builtin missing");
            assert!(f.is_builtin);
        }
    }

    #[test]
    fn test_builtin_signatures() {
        let program = Program::new();
        let (_, color) = program.function("COLOR").unwrap();
        assert_eq!(color.return_type, Type::Void);
        assert_eq!(color.params.len(), 1);

        let (_, pixel) = program.function("PIXEL").unwrap();
        assert_eq!(pixel.return_type, Type::Void);
        assert_eq!(pixel.params.len(), 2);

        let (_, timerst) = program.function("TIMERST").unwrap();
        assert_eq!(timerst.return_type, Type::Void);
        assert!(timerst.params.is_empty());

        let (_, time) = program.function("TIME").unwrap();
        assert_eq!(time.return_type, Type::Uint16);
        assert!(time.params.is_empty());

        let (_, input) = program.function("INPUT").unwrap();
        assert_eq!(input.return_type, Type::Uint16);
        assert_eq!(input.params.len(), 1);

        let (_, rnd) = program.function("RND").unwrap();
        assert_eq!(rnd.return_type, Type::Uint16);
        assert!(rnd.params.is_empty());
    }

    #[test]
    fn test_lookup_returns_first_match() {
        let mut program = Program::new();
        program.globals.push(Global {
            name: "score".to_string(),
            ty: Type::Uint16,
            value: 0,
            array_values: Vec::new(),
            line: 1,
        });
        assert!(program.global("score").is_some());
        assert!(program.global("lives").is_none());
    }
}
