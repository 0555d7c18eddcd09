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

//! Performance benchmarks for the Coral16 compiler.
//!
//! Run with: cargo bench
//!
//! Inputs are generated programs of increasing size so the benchmarks
//! need no fixture files.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Generate a program with `functions` functions of a few statements
/// each, plus a `main` that calls them all in a loop.
fn generate_program(functions: usize) -> String {
    let mut source = String::new();
    source.push_str("uint16 total;\n");
    source.push_str("uint16[8] table = { 1, 2, 3, 4, 5, 6, 7, 8 };\n");
    for i in 0..functions {
        source.push_str(&format!(
            r#"
uint16 step{i}(uint16 a, uint16 b) {{
    uint16 acc = a * 2;
    uint16 j;
    for (j = 0; j < b; j = j + 1) {{
        acc = acc + table[j & 7];
        if (acc > 0x4000) {{
            acc = acc % 977;
        }}
    }}
    return acc + {i};
}}
"#,
            i = i
        ));
    }
    source.push_str("void main() {\n    uint16 i;\n    for (i = 0; i < 100; i = i + 1) {\n");
    for i in 0..functions {
        source.push_str(&format!("        total = total + step{}(i, 8);\n", i));
    }
    source.push_str("    }\n}\n");
    source
}

// ============================================================================
// Lexer Benchmarks
// ============================================================================

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");
    for (name, functions) in [("small", 2), ("medium", 16), ("large", 64)] {
        let source = generate_program(functions);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("scan", name), &source, |b, src| {
            b.iter(|| {
                let mut lexer = coral16::lexer::Lexer::new(black_box(src));
                let mut count = 0usize;
                while !lexer.next_token().is_empty() {
                    count += 1;
                }
                count
            })
        });
    }
    group.finish();
}

// ============================================================================
// Parser Benchmarks
// ============================================================================

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");
    for (name, functions) in [("small", 2), ("medium", 16), ("large", 64)] {
        let source = generate_program(functions);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse", name), &source, |b, src| {
            b.iter(|| coral16::parser::parse(black_box(src)).expect("benchmark input must parse"))
        });
    }
    group.finish();
}

// ============================================================================
// End-to-End Benchmarks
// ============================================================================

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    for (name, functions) in [("small", 2), ("medium", 16), ("large", 64)] {
        let source = generate_program(functions);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("full", name), &source, |b, src| {
            b.iter(|| coral16::compile(black_box(src)).expect("benchmark input must compile"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lexer, bench_parser, bench_compile);
criterion_main!(benches);
