//! Constant expression evaluation for elaboration.
//!
//! Evaluates AST expressions to 64-bit integers over a parameter
//! environment. Supports numeric literals (decimal and sized/based forms),
//! identifier lookup, all unary and binary integer operators, and the
//! ternary operator. Any unresolved identifier, unsupported node, or
//! failing sub-evaluation yields `None`.

use std::collections::HashMap;

use svtool_common::Ident;
use svtool_parser::ast::{BinaryOp, Expression, UnaryOp};

/// A mapping from interned identifiers to their constant values.
///
/// Tracks parameter bindings during elaboration so that constant
/// expressions referencing parameters can be folded.
pub type ConstEnv = HashMap<Ident, i64>;

/// Parses a numeric literal from its source text.
///
/// Handles plain decimal (`42`), sized binary (`4'b1010`), sized hex
/// (`8'hFF`), sized octal (`8'o17`), sized decimal (`32'd100`), unsized
/// based literals (`'b1`, `'hFF`), and underscore separators (`1_000`).
/// X/Z/? digits count as 0 for constant evaluation purposes.
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let text = text.replace('_', "");

    if let Some(tick) = text.find('\'') {
        let after = &text[tick + 1..];
        if after.is_empty() {
            return None;
        }

        let base_char = after.as_bytes()[0].to_ascii_lowercase();
        let digits = &after[1..];

        let radix = match base_char {
            b'b' => 2,
            b'o' => 8,
            b'd' => 10,
            b'h' => 16,
            _ => return None,
        };

        let clean: String = digits
            .chars()
            .filter_map(|c| match c {
                'x' | 'X' | 'z' | 'Z' | '?' => Some('0'),
                '_' => None,
                other => Some(other),
            })
            .collect();
        if clean.is_empty() {
            return None;
        }

        return i64::from_str_radix(&clean, radix).ok();
    }

    text.parse::<i64>().ok()
}

/// Evaluates an expression to a compile-time integer constant.
///
/// Division and modulo by zero fold to 0; shift counts are masked by 63.
pub fn eval_const(expr: &Expression, env: &ConstEnv) -> Option<i64> {
    match expr {
        Expression::Number { text, .. } => parse_int_literal(text),
        Expression::Ref { name, .. } => env.get(name).copied(),
        Expression::Unary { op, operand, .. } => {
            let v = eval_const(operand, env)?;
            Some(match op {
                UnaryOp::Plus => v,
                UnaryOp::Minus => v.wrapping_neg(),
                UnaryOp::LogicalNot => i64::from(v == 0),
                UnaryOp::BitNot => !v,
            })
        }
        Expression::Binary { op, lhs, rhs, .. } => {
            let l = eval_const(lhs, env)?;
            let r = eval_const(rhs, env)?;
            Some(match op {
                BinaryOp::Add => l.wrapping_add(r),
                BinaryOp::Sub => l.wrapping_sub(r),
                BinaryOp::Mul => l.wrapping_mul(r),
                BinaryOp::Div => {
                    if r == 0 {
                        0
                    } else {
                        l / r
                    }
                }
                BinaryOp::Mod => {
                    if r == 0 {
                        0
                    } else {
                        l % r
                    }
                }
                BinaryOp::BitAnd => l & r,
                BinaryOp::BitOr => l | r,
                BinaryOp::BitXor => l ^ r,
                BinaryOp::LogicalAnd => i64::from(l != 0 && r != 0),
                BinaryOp::LogicalOr => i64::from(l != 0 || r != 0),
                BinaryOp::Eq | BinaryOp::CaseEq => i64::from(l == r),
                BinaryOp::Neq | BinaryOp::CaseNeq => i64::from(l != r),
                BinaryOp::Lt => i64::from(l < r),
                BinaryOp::Gt => i64::from(l > r),
                BinaryOp::Le => i64::from(l <= r),
                BinaryOp::Ge => i64::from(l >= r),
                BinaryOp::Shl | BinaryOp::Ashl => l << (r & 63),
                BinaryOp::Shr | BinaryOp::Ashr => l >> (r & 63),
            })
        }
        Expression::Ternary {
            cond,
            then_expr,
            else_expr,
            ..
        } => {
            let c = eval_const(cond, env)?;
            if c != 0 {
                eval_const(then_expr, env)
            } else {
                eval_const(else_expr, env)
            }
        }
        Expression::Str { .. }
        | Expression::Concat { .. }
        | Expression::Replicate { .. }
        | Expression::BitSelect { .. } => None,
    }
}
