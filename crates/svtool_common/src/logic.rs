//! Four-state logic values with truth-table-based operators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A single 4-state logic value.
///
/// The four states represent:
/// - `L0`: logic low (driven 0)
/// - `L1`: logic high (driven 1)
/// - `LX`: unknown or uninitialized value
/// - `LZ`: high-impedance (tri-state, not driven)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic4 {
    /// Logic low (0).
    L0 = 0,
    /// Logic high (1).
    L1 = 1,
    /// Unknown or uninitialized.
    LX = 2,
    /// High-impedance (tri-state).
    LZ = 3,
}

impl Logic4 {
    /// Converts a character to a [`Logic4`] value.
    ///
    /// Accepts '0', '1', 'x'/'X', and 'z'/'Z'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic4::L0),
            '1' => Some(Logic4::L1),
            'x' | 'X' => Some(Logic4::LX),
            'z' | 'Z' => Some(Logic4::LZ),
            _ => None,
        }
    }

    /// Returns the lowercase character form used in value strings and VCD output.
    pub fn to_char(self) -> char {
        match self {
            Logic4::L0 => '0',
            Logic4::L1 => '1',
            Logic4::LX => 'x',
            Logic4::LZ => 'z',
        }
    }
}

impl fmt::Display for Logic4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// AND truth table:
/// ```text
///     0  1  X  Z
/// 0 | 0  0  0  0
/// 1 | 0  1  X  X
/// X | 0  X  X  X
/// Z | 0  X  X  X
/// ```
impl BitAnd for Logic4 {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        use Logic4::*;
        match (self, rhs) {
            (L0, _) | (_, L0) => L0,
            (L1, L1) => L1,
            _ => LX,
        }
    }
}

/// OR truth table:
/// ```text
///     0  1  X  Z
/// 0 | 0  1  X  X
/// 1 | 1  1  1  1
/// X | X  1  X  X
/// Z | X  1  X  X
/// ```
impl BitOr for Logic4 {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        use Logic4::*;
        match (self, rhs) {
            (L1, _) | (_, L1) => L1,
            (L0, L0) => L0,
            _ => LX,
        }
    }
}

/// XOR truth table: any X or Z operand yields X, otherwise parity.
impl BitXor for Logic4 {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        use Logic4::*;
        match (self, rhs) {
            (L0, L0) | (L1, L1) => L0,
            (L0, L1) | (L1, L0) => L1,
            _ => LX,
        }
    }
}

/// NOT: `!0 = 1`, `!1 = 0`, `!X = X`, `!Z = X`.
impl Not for Logic4 {
    type Output = Self;

    fn not(self) -> Self {
        use Logic4::*;
        match self {
            L0 => L1,
            L1 => L0,
            LX | LZ => LX,
        }
    }
}
