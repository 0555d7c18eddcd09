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

//! Coral16 Compiler CLI
//!
//! Compiles one Coral C source file into one assembly-text file for the
//! Coral-16 assembler. Exit code 0 on success, 1 on any error; warnings
//! go to stderr and do not affect the exit code.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use coral16::{format_error, format_warning};

/// Coral16 - a small C compiler for the Coral-16 fantasy console
#[derive(Parser, Debug)]
#[command(name = "coral16")]
#[command(version)]
#[command(about = "Compiles Coral C source into Coral-16 assembly text")]
#[command(long_about = r#"
Coral16 compiles a single source file written in Coral C - a small
C-like language with a 16-bit unsigned scalar type, fixed-size arrays,
functions, and the console's built-in drawing, timer, input, and random
operations - into human-readable assembly for the Coral-16 assembler.

Example usage:
  coral16 game.c game.asm
"#)]
struct Cli {
    /// Source file to compile
    source: PathBuf,

    /// Output assembly file
    output: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    // Usage errors exit with code 1 like every other failure, so clap's
    // default exit code 2 is not used.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    if cli.verbose {
        println!("Coral16 Compiler v{}", coral16::VERSION);
        println!("Source: {}", cli.source.display());
        println!("Output: {}", cli.output.display());
    }

    let source = match std::fs::read_to_string(&cli.source) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: Cannot read {}: {}", cli.source.display(), e);
            return ExitCode::from(1);
        }
    };

    let (asm, warnings) = match coral16::compile(&source) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}", format_error(&e));
            return ExitCode::from(1);
        }
    };

    // Warnings never prevent compilation.
    for warning in &warnings {
        eprintln!("{}", format_warning(warning));
    }

    if let Err(e) = std::fs::write(&cli.output, &asm) {
        eprintln!("Error: Cannot write {}: {}", cli.output.display(), e);
        return ExitCode::from(1);
    }

    if cli.verbose {
        println!(
            "Compiled {} -> {} ({} lines)",
            cli.source.display(),
            cli.output.display(),
            asm.lines().count()
        );
    }

    ExitCode::SUCCESS
}
