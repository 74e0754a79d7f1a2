//! The RTL intermediate representation for svtool.
//!
//! An [`RtlModule`] is the lowered form of an elaborated module: nets,
//! continuous assigns, processes with a statement graph, primitive gates,
//! and instances. Statement cross-references (`first_stmt`, `next`, the
//! delayed body) are typed indices into the owning process's arena, so a
//! deep copy of a process or module can never alias the original's
//! statement storage.
//!
//! [`build_design`](build::build_design) lowers a parsed AST plus its
//! elaborated view into an [`RtlDesign`].

#![warn(missing_docs)]

pub mod arena;
pub mod build;
pub mod expr;
pub mod gate;
pub mod module;
pub mod process;
pub mod stmt;

pub use arena::{Arena, ArenaId};
pub use build::build_design;
pub use expr::{RtlBinOp, RtlExpr, RtlUnOp};
pub use gate::{RtlGate, RtlGateKind};
pub use module::{RtlDesign, RtlInstance, RtlModule, RtlNet, RtlParam};
pub use process::{RtlAssign, RtlAssignKind, RtlEdge, RtlProcess, RtlProcessKind, RtlSensitivity};
pub use stmt::{RtlStmt, RtlStmtId, RtlStmtOp};
