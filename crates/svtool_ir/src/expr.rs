//! RTL expression trees.
//!
//! [`RtlExpr`] is a deep-copyable owning tree of exactly four node kinds:
//! references, constants, unary, and binary operations. Ternary and
//! bit-select never reach this level; the IR builder desugars them.

use serde::{Deserialize, Serialize};
use svtool_common::Ident;

/// A unary RTL operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RtlUnOp {
    /// Identity (`+`).
    Plus,
    /// Two's-complement negation (`-`).
    Minus,
    /// Logical NOT (`!`), reducing to a 1-bit result.
    Not,
    /// Bitwise NOT (`~`).
    BitNot,
}

/// A binary RTL operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RtlBinOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division (division by zero yields 0).
    Div,
    /// Modulo (modulo by zero yields 0).
    Mod,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Logical AND (1-bit result).
    LogicalAnd,
    /// Logical OR (1-bit result).
    LogicalOr,
    /// Equality (1-bit result).
    Eq,
    /// Inequality (1-bit result).
    Neq,
    /// Case equality (`===`).
    CaseEq,
    /// Case inequality (`!==`).
    CaseNeq,
    /// Less than (signed projection).
    Lt,
    /// Greater than (signed projection).
    Gt,
    /// Less than or equal (signed projection).
    Le,
    /// Greater than or equal (signed projection).
    Ge,
    /// Logical left shift.
    Shl,
    /// Logical right shift.
    Shr,
    /// Arithmetic left shift.
    Ashl,
    /// Arithmetic right shift.
    Ashr,
}

/// An RTL expression.
///
/// Constants carry their literal text; the simulation evaluator parses the
/// sized/based forms at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RtlExpr {
    /// A reference to a net by name.
    Ref(Ident),
    /// A literal constant.
    Const(String),
    /// A unary operation.
    Unary {
        /// The operator.
        op: RtlUnOp,
        /// The operand.
        operand: Box<RtlExpr>,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: RtlBinOp,
        /// The left-hand side.
        lhs: Box<RtlExpr>,
        /// The right-hand side.
        rhs: Box<RtlExpr>,
    },
}

impl RtlExpr {
    /// Creates a constant node from literal text.
    pub fn constant(text: impl Into<String>) -> Self {
        RtlExpr::Const(text.into())
    }

    /// Calls `f` for every [`RtlExpr::Ref`] in the tree, in evaluation order.
    pub fn for_each_ref(&self, f: &mut impl FnMut(Ident)) {
        match self {
            RtlExpr::Ref(name) => f(*name),
            RtlExpr::Const(_) => {}
            RtlExpr::Unary { operand, .. } => operand.for_each_ref(f),
            RtlExpr::Binary { lhs, rhs, .. } => {
                lhs.for_each_ref(f);
                rhs.for_each_ref(f);
            }
        }
    }
}
