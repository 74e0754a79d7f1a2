//! RTL modules and the design root.
//!
//! RTL modules own all of their storage (statement arenas included) and do
//! not depend on the AST's lifetime after construction.

use crate::gate::RtlGate;
use crate::process::{RtlAssign, RtlProcess};
use serde::{Deserialize, Serialize};
use svtool_common::Ident;

/// A net with its resolved width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtlNet {
    /// The net name.
    pub name: Ident,
    /// Bit width; fixed at elaboration.
    pub width: u32,
}

/// A resolved parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtlParam {
    /// The parameter name.
    pub name: Ident,
    /// The folded integer value, when the expression was constant.
    pub value: Option<i64>,
    /// The literal text fallback.
    pub text: String,
}

/// A module instantiation surviving into the RTL design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtlInstance {
    /// The instantiated module's name.
    pub module_name: Ident,
    /// The instance name.
    pub instance_name: Ident,
    /// Resolved parameter overrides.
    pub params: Vec<RtlParam>,
    /// Port-to-net map: formal port name (None for positional) to the
    /// connected net (None when the actual was not an identifier).
    pub conns: Vec<(Option<Ident>, Option<Ident>)>,
}

/// A lowered module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtlModule {
    /// The module name.
    pub name: Ident,
    /// Resolved parameters.
    pub params: Vec<RtlParam>,
    /// All nets with their widths.
    pub nets: Vec<RtlNet>,
    /// Continuous assignments.
    pub continuous_assigns: Vec<RtlAssign>,
    /// Lowered processes.
    pub processes: Vec<RtlProcess>,
    /// Primitive gates (populated by the gate mapper).
    pub gates: Vec<RtlGate>,
    /// Module instantiations.
    pub instances: Vec<RtlInstance>,
}

impl RtlModule {
    /// Creates an empty module with the given name.
    pub fn new(name: Ident) -> Self {
        Self {
            name,
            params: Vec::new(),
            nets: Vec::new(),
            continuous_assigns: Vec::new(),
            processes: Vec::new(),
            gates: Vec::new(),
            instances: Vec::new(),
        }
    }

    /// Looks up a net's width by name.
    pub fn net_width(&self, name: Ident) -> Option<u32> {
        self.nets.iter().find(|n| n.name == name).map(|n| n.width)
    }
}

/// A complete lowered design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtlDesign {
    /// The modules, in source order.
    pub modules: Vec<RtlModule>,
}

impl RtlDesign {
    /// Finds a module by name.
    pub fn find_module(&self, name: Ident) -> Option<&RtlModule> {
        self.modules.iter().find(|m| m.name == name)
    }
}
