//! Four-state expression evaluation primitives.
//!
//! Literal parsing, integer projections, and the unary/binary operator
//! semantics used by the kernel's expression evaluator. Width mismatches
//! extend the narrower operand with X bits, preserving the distinction
//! between known-zero-extended and unknown-extended operands.

use svtool_common::{Logic4, Value};
use svtool_ir::{RtlBinOp, RtlUnOp};

/// Parses a literal's text into a [`Value`].
///
/// Supported forms: `N'b…` (binary, X/Z preserved, width from the written
/// digits), `N'd…` (decimal, 32 bits), `N'h…` (hex, expanded nibble-wise
/// with X/Z digits becoming four X/Z lanes), `N'o…` (octal, 32 bits),
/// unsized binary strings containing x/z, and unsized decimal (32 bits).
/// Malformed literals read as a width-1 X.
pub fn parse_literal(text: &str) -> Value {
    let text = text.replace('_', "");

    if let Some(tick) = text.find('\'') {
        let Some(&base) = text.as_bytes().get(tick + 1) else {
            return Value::filled(1, Logic4::LX);
        };
        let digits = &text[tick + 2..];
        return match base.to_ascii_lowercase() {
            b'b' if digits.is_empty() => Value::filled(1, Logic4::LX),
            b'b' => Value::from_binary_str(digits).unwrap_or_else(|| Value::filled(1, Logic4::LX)),
            b'd' => Value::from_uint(32, digits.parse::<u64>().unwrap_or(0)),
            b'o' => Value::from_uint(32, u64::from_str_radix(digits, 8).unwrap_or(0)),
            b'h' => {
                let mut bin = String::with_capacity(digits.len() * 4);
                for c in digits.chars() {
                    match c.to_digit(16) {
                        Some(nibble) => {
                            for i in (0..4).rev() {
                                bin.push(if nibble & (1 << i) != 0 { '1' } else { '0' });
                            }
                        }
                        None if c == 'x' || c == 'X' => bin.push_str("xxxx"),
                        None if c == 'z' || c == 'Z' => bin.push_str("zzzz"),
                        None => {}
                    }
                }
                if bin.is_empty() {
                    Value::filled(1, Logic4::LX)
                } else {
                    Value::from_binary_str(&bin).unwrap()
                }
            }
            _ => Value::filled(1, Logic4::LX),
        };
    }

    // Unsized literal: binary when x/z digits are present, decimal otherwise.
    if !text.is_empty()
        && text.chars().any(|c| matches!(c, 'x' | 'X' | 'z' | 'Z'))
        && text.chars().all(|c| matches!(c, '0' | '1' | 'x' | 'X' | 'z' | 'Z'))
    {
        return Value::from_binary_str(&text).unwrap();
    }

    Value::from_uint(32, text.parse::<u64>().unwrap_or(0))
}

/// Unsigned 64-bit projection: 1-bits contribute, X/Z bits read as 0,
/// bits past 63 are dropped.
pub fn uint_projection(v: &Value) -> u64 {
    let mut result = 0u64;
    for i in 0..v.width().min(64) {
        if v.get(i) == Logic4::L1 {
            result |= 1 << i;
        }
    }
    result
}

/// Signed 64-bit projection (bit pattern of [`uint_projection`]).
pub fn int_projection(v: &Value) -> i64 {
    uint_projection(v) as i64
}

/// Evaluates a unary operation.
pub fn eval_unary(op: RtlUnOp, operand: &Value) -> Value {
    match op {
        RtlUnOp::Plus => operand.clone(),
        RtlUnOp::Minus => {
            let negated = (uint_projection(operand) as i64).wrapping_neg() as u64;
            Value::from_uint(operand.width(), negated)
        }
        RtlUnOp::Not => {
            let nonzero = uint_projection(operand) != 0;
            Value::from_uint(1, u64::from(!nonzero))
        }
        RtlUnOp::BitNot => !operand,
    }
}

/// Evaluates a binary operation.
///
/// Both operands are extended to the maximum width with X bits. Arithmetic
/// uses the unsigned projection (division and modulo by zero yield 0),
/// bitwise operations are per-bit four-state, comparisons use the signed
/// projection and yield one bit, logical operations yield one bit, and
/// shift counts are masked by 63. Zero-width operands yield a width-1 X.
pub fn eval_binary(op: RtlBinOp, lhs: &Value, rhs: &Value) -> Value {
    let width = lhs.width().max(rhs.width());
    if width == 0 {
        return Value::filled(1, Logic4::LX);
    }

    let lhs = lhs.xz_extend(width);
    let rhs = rhs.xz_extend(width);

    let ul = uint_projection(&lhs);
    let ur = uint_projection(&rhs);

    let bit = |b: bool| Value::from_uint(1, u64::from(b));

    match op {
        RtlBinOp::Add => Value::from_uint(width, ul.wrapping_add(ur)),
        RtlBinOp::Sub => Value::from_uint(width, ul.wrapping_sub(ur)),
        RtlBinOp::Mul => Value::from_uint(width, ul.wrapping_mul(ur)),
        RtlBinOp::Div => Value::from_uint(width, if ur == 0 { 0 } else { ul / ur }),
        RtlBinOp::Mod => Value::from_uint(width, if ur == 0 { 0 } else { ul % ur }),

        RtlBinOp::And => &lhs & &rhs,
        RtlBinOp::Or => &lhs | &rhs,
        RtlBinOp::Xor => &lhs ^ &rhs,

        RtlBinOp::LogicalAnd => bit(ul != 0 && ur != 0),
        RtlBinOp::LogicalOr => bit(ul != 0 || ur != 0),

        RtlBinOp::Eq | RtlBinOp::CaseEq => bit(int_projection(&lhs) == int_projection(&rhs)),
        RtlBinOp::Neq | RtlBinOp::CaseNeq => bit(int_projection(&lhs) != int_projection(&rhs)),
        RtlBinOp::Lt => bit(int_projection(&lhs) < int_projection(&rhs)),
        RtlBinOp::Gt => bit(int_projection(&lhs) > int_projection(&rhs)),
        RtlBinOp::Le => bit(int_projection(&lhs) <= int_projection(&rhs)),
        RtlBinOp::Ge => bit(int_projection(&lhs) >= int_projection(&rhs)),

        RtlBinOp::Shl | RtlBinOp::Ashl => Value::from_uint(width, ul << (ur & 63)),
        RtlBinOp::Shr | RtlBinOp::Ashr => Value::from_uint(width, ul >> (ur & 63)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(s: &str) -> Value {
        Value::from_binary_str(s).unwrap()
    }

    // ---- parse_literal ----

    #[test]
    fn parse_sized_binary_preserves_xz() {
        let v = parse_literal("4'b10xz");
        assert_eq!(v.width(), 4);
        assert_eq!(v.to_string(), "10xz");
    }

    #[test]
    fn parse_sized_binary_width_from_digits() {
        assert_eq!(parse_literal("1'b0").width(), 1);
        assert_eq!(parse_literal("4'b1010").width(), 4);
    }

    #[test]
    fn parse_sized_decimal_is_32_bits() {
        let v = parse_literal("8'd200");
        assert_eq!(v.width(), 32);
        assert_eq!(uint_projection(&v), 200);
    }

    #[test]
    fn parse_hex_expands_nibbles() {
        let v = parse_literal("8'hA5");
        assert_eq!(v.width(), 8);
        assert_eq!(v.to_string(), "10100101");
    }

    #[test]
    fn parse_hex_xz_nibbles() {
        let v = parse_literal("8'hxF");
        assert_eq!(v.to_string(), "xxxx1111");
    }

    #[test]
    fn parse_unsized_decimal_is_32_bits() {
        let v = parse_literal("10");
        assert_eq!(v.width(), 32);
        assert_eq!(uint_projection(&v), 10);
    }

    #[test]
    fn parse_unsized_binary_with_xz() {
        let v = parse_literal("1x0z");
        assert_eq!(v.width(), 4);
        assert_eq!(v.to_string(), "1x0z");
    }

    #[test]
    fn parse_underscores_stripped() {
        assert_eq!(uint_projection(&parse_literal("1_000")), 1000);
    }

    #[test]
    fn parse_malformed_is_x() {
        let v = parse_literal("4'q99");
        assert_eq!(v.width(), 1);
        assert_eq!(v.get(0), Logic4::LX);
    }

    #[test]
    fn parse_octal() {
        assert_eq!(uint_projection(&parse_literal("8'o17")), 15);
    }

    // ---- projections ----

    #[test]
    fn uint_projection_xz_as_zero() {
        assert_eq!(uint_projection(&bin("1x1z")), 0b1010);
    }

    #[test]
    fn uint_projection_wide_value_truncates() {
        let v = Value::from_uint(80, u64::MAX);
        assert_eq!(uint_projection(&v), u64::MAX);
    }

    // ---- unary ----

    #[test]
    fn unary_plus_identity() {
        let v = bin("10x");
        assert_eq!(eval_unary(RtlUnOp::Plus, &v), v);
    }

    #[test]
    fn unary_minus_twos_complement() {
        let v = Value::from_uint(8, 5);
        let r = eval_unary(RtlUnOp::Minus, &v);
        assert_eq!(uint_projection(&r), (-5i64 as u64) & 0xFF);
    }

    #[test]
    fn unary_logical_not() {
        assert_eq!(uint_projection(&eval_unary(RtlUnOp::Not, &bin("00"))), 1);
        assert_eq!(uint_projection(&eval_unary(RtlUnOp::Not, &bin("10"))), 0);
        // X projects to 0, so !x is 1
        assert_eq!(uint_projection(&eval_unary(RtlUnOp::Not, &bin("xx"))), 1);
    }

    #[test]
    fn unary_bitnot_per_bit() {
        assert_eq!(eval_unary(RtlUnOp::BitNot, &bin("10xz")).to_string(), "01xx");
    }

    // ---- binary ----

    #[test]
    fn binary_add() {
        let r = eval_binary(RtlBinOp::Add, &Value::from_uint(8, 3), &Value::from_uint(8, 4));
        assert_eq!(uint_projection(&r), 7);
        assert_eq!(r.width(), 8);
    }

    #[test]
    fn binary_width_is_max_of_operands() {
        let r = eval_binary(RtlBinOp::Add, &Value::from_uint(4, 1), &Value::from_uint(8, 1));
        assert_eq!(r.width(), 8);
    }

    #[test]
    fn binary_div_by_zero_is_zero() {
        let r = eval_binary(RtlBinOp::Div, &Value::from_uint(8, 42), &Value::from_uint(8, 0));
        assert_eq!(uint_projection(&r), 0);
        let r = eval_binary(RtlBinOp::Mod, &Value::from_uint(8, 42), &Value::from_uint(8, 0));
        assert_eq!(uint_projection(&r), 0);
    }

    #[test]
    fn binary_bitwise_four_state() {
        let a = bin("110z");
        let b = bin("1x10");
        assert_eq!(eval_binary(RtlBinOp::And, &a, &b).to_string(), "1x00");
        assert_eq!(eval_binary(RtlBinOp::Or, &a, &b).to_string(), "111x");
        assert_eq!(eval_binary(RtlBinOp::Xor, &a, &b).to_string(), "0x1x");
    }

    #[test]
    fn binary_width_extension_uses_x() {
        // Narrow operand is X-extended: upper AND bits become 0 only when
        // the wide operand has 0 there, X when it has 1.
        let wide = bin("1100");
        let narrow = bin("1");
        let r = eval_binary(RtlBinOp::And, &wide, &narrow);
        // bit 0: 0&1=0, bit 1: 0&x=0, bits 2-3: 1&x=x
        assert_eq!(r.to_string(), "xx00");
    }

    #[test]
    fn binary_comparisons_one_bit() {
        let a = Value::from_uint(8, 3);
        let b = Value::from_uint(8, 5);
        for (op, expect) in [
            (RtlBinOp::Lt, 1),
            (RtlBinOp::Gt, 0),
            (RtlBinOp::Le, 1),
            (RtlBinOp::Ge, 0),
            (RtlBinOp::Eq, 0),
            (RtlBinOp::Neq, 1),
        ] {
            let r = eval_binary(op, &a, &b);
            assert_eq!(r.width(), 1);
            assert_eq!(uint_projection(&r), expect, "{op:?}");
        }
    }

    #[test]
    fn binary_logical_one_bit() {
        let t = Value::from_uint(4, 2);
        let f = Value::from_uint(4, 0);
        assert_eq!(uint_projection(&eval_binary(RtlBinOp::LogicalAnd, &t, &t)), 1);
        assert_eq!(uint_projection(&eval_binary(RtlBinOp::LogicalAnd, &t, &f)), 0);
        assert_eq!(uint_projection(&eval_binary(RtlBinOp::LogicalOr, &f, &f)), 0);
        assert_eq!(uint_projection(&eval_binary(RtlBinOp::LogicalOr, &t, &f)), 1);
    }

    #[test]
    fn binary_shifts_masked() {
        let one = Value::from_uint(8, 1);
        let r = eval_binary(RtlBinOp::Shl, &one, &Value::from_uint(8, 3));
        assert_eq!(uint_projection(&r), 8);
        // 64 & 63 == 0, so the shift is a no-op rather than an overflow
        let r = eval_binary(RtlBinOp::Shl, &one, &Value::from_uint(32, 64));
        assert_eq!(uint_projection(&r), 1);
    }

    #[test]
    fn binary_shr() {
        let v = Value::from_uint(8, 0b1010);
        let r = eval_binary(RtlBinOp::Shr, &v, &Value::from_uint(8, 1));
        assert_eq!(uint_projection(&r), 0b101);
    }

    #[test]
    fn binary_zero_width_yields_x() {
        let empty = Value::new(0);
        let r = eval_binary(RtlBinOp::Add, &empty, &empty);
        assert_eq!(r.width(), 1);
        assert_eq!(r.get(0), Logic4::LX);
    }

    #[test]
    fn ternary_lowering_x_condition_mix() {
        // The lowered form (c&t)|(~c&f) with c=x, t=1, f=0 must read X.
        let c = bin("x");
        let t = bin("1");
        let f = bin("0");
        let and1 = eval_binary(RtlBinOp::And, &c, &t);
        let not_c = eval_unary(RtlUnOp::BitNot, &c);
        let and2 = eval_binary(RtlBinOp::And, &not_c, &f);
        let r = eval_binary(RtlBinOp::Or, &and1, &and2);
        assert_eq!(r.get(0), Logic4::LX);
    }
}
