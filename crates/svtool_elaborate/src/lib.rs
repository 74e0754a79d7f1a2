//! Elaboration: parameter resolution, generate unrolling, and module
//! flattening.
//!
//! The elaborator consumes a parsed [`Design`](svtool_parser::ast::Design)
//! and produces an [`ElaboratedDesign`] whose modules carry a resolved
//! parameter table, a net list with concrete widths, an instance list, and
//! a flat item list with every generate construct replaced by its unrolled
//! items. Unrolled items are allocated in a caller-owned arena so the flat
//! list's references stay valid for the elaborated design's lifetime.

#![warn(missing_docs)]

pub mod const_eval;
pub mod design;
pub mod errors;
pub mod generate;
pub mod module;

use svtool_common::Interner;
use svtool_diagnostics::DiagnosticSink;
use svtool_parser::ast;

pub use const_eval::{eval_const, parse_int_literal, ConstEnv};
pub use design::{ElabInstance, ElabModule, ElabNet, ElabParam, ElaboratedDesign};
pub use errors::ElabError;

/// Backing storage for module items synthesized during generate unrolling.
///
/// Must outlive the [`ElaboratedDesign`] built from it.
pub type GenArena = typed_arena::Arena<ast::ModuleItem>;

/// Elaborates a parsed design.
///
/// Ill-formed-but-parseable items degrade by omission (with a warning
/// diagnostic); a generate-for without a genvar loop variable is the one
/// fatal error.
pub fn elaborate<'a>(
    design: &'a ast::Design,
    arena: &'a GenArena,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> Result<ElaboratedDesign<'a>, ElabError> {
    let mut modules = Vec::with_capacity(design.modules.len());
    for m in &design.modules {
        modules.push(module::elaborate_module(m, arena, interner, sink)?);
    }
    Ok(ElaboratedDesign { modules })
}
