//! Primitive gate cells of a mapped netlist.

use serde::{Deserialize, Serialize};
use svtool_common::Ident;

/// The kind of a primitive gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RtlGateKind {
    /// N-input AND.
    And,
    /// N-input OR.
    Or,
    /// Inverter.
    Not,
    /// N-input NAND.
    Nand,
    /// N-input NOR.
    Nor,
    /// N-input XOR (parity).
    Xor,
    /// N-input XNOR.
    Xnor,
    /// Buffer.
    Buf,
}

/// A primitive gate driving one output from its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtlGate {
    /// The gate kind.
    pub kind: RtlGateKind,
    /// Input nets, in order.
    pub inputs: Vec<Ident>,
    /// The driven output net.
    pub out: Ident,
}
