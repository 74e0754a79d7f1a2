//! Lexer, AST, and recursive-descent parser for the svtool SystemVerilog
//! subset.
//!
//! The supported subset covers modules with ANSI ports,
//! `wire`/`logic`/`reg`/`integer` declarations with packed ranges and
//! initializers, `parameter`/`localparam`, continuous assigns, all four
//! always flavors, `initial`, begin/end blocks, `if`/`else`,
//! `case`/`casez`/`casex`, blocking and non-blocking assignments, `#delay`
//! controls, event controls, module instantiation with parameter overrides,
//! and `generate` with for/if/case.

#![warn(missing_docs)]

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

mod decl;
mod expr;
mod stmt;

use svtool_common::Interner;
use svtool_diagnostics::DiagnosticSink;
use svtool_source::FileId;

pub use lexer::lex;
pub use parser::Parser;

/// Lexes and parses one source file into a [`Design`](ast::Design).
///
/// Errors are reported to `sink`; the returned tree is best-effort when the
/// sink holds errors.
pub fn parse_source(
    source: &str,
    file: FileId,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> ast::Design {
    let tokens = lexer::lex(source, file, sink);
    Parser::new(tokens, source, file, interner, sink).parse_design()
}
