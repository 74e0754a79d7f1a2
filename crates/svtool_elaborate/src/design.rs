//! Elaborated design view: resolved parameters, nets, instances, and the
//! flat item list per module.
//!
//! Elaborated modules reference AST item nodes by shared borrow; the AST
//! (and the generate arena) must outlive the elaborated design.

use svtool_common::Ident;
use svtool_parser::ast::ModuleItem;

/// A resolved parameter: integer value when foldable, otherwise the
/// literal source text.
#[derive(Debug, Clone)]
pub struct ElabParam {
    /// The parameter name.
    pub name: Ident,
    /// The folded integer value, if the default expression was constant.
    pub value: Option<i64>,
    /// The literal text fallback.
    pub text: String,
}

/// A net with its resolved width.
#[derive(Debug, Clone)]
pub struct ElabNet {
    /// The net name.
    pub name: Ident,
    /// Bit width (1 for scalars).
    pub width: u32,
    /// The resolved packed range `(msb, lsb)`, if one was declared.
    pub range: Option<(i64, i64)>,
}

/// An instance with resolved parameter overrides and textual port
/// connections.
#[derive(Debug, Clone)]
pub struct ElabInstance {
    /// The instantiated module's name.
    pub module_name: Ident,
    /// The instance name.
    pub instance_name: Ident,
    /// Resolved parameter overrides.
    pub params: Vec<ElabParam>,
    /// Port connections: formal port name (None for positional) to the
    /// connected signal name (None when the actual is not an identifier).
    pub port_conns: Vec<(Option<Ident>, Option<Ident>)>,
}

/// A module after elaboration.
#[derive(Clone)]
pub struct ElabModule<'a> {
    /// The module name.
    pub name: Ident,
    /// The resolved parameter table, in declaration order.
    pub params: Vec<ElabParam>,
    /// All nets (including port-backed nets) with resolved widths.
    pub nets: Vec<ElabNet>,
    /// All instances.
    pub instances: Vec<ElabInstance>,
    /// The original items with every generate construct replaced by its
    /// unrolled and substituted items, in the order produced by unrolling.
    pub flat_items: Vec<&'a ModuleItem>,
}

impl ElabModule<'_> {
    /// Looks up a net's width by name.
    pub fn net_width(&self, name: Ident) -> Option<u32> {
        self.nets.iter().find(|n| n.name == name).map(|n| n.width)
    }
}

/// A fully elaborated design.
pub struct ElaboratedDesign<'a> {
    /// The elaborated modules, in source order.
    pub modules: Vec<ElabModule<'a>>,
}

impl<'a> ElaboratedDesign<'a> {
    /// Finds a module by name.
    pub fn find_module(&self, name: Ident) -> Option<&ElabModule<'a>> {
        self.modules.iter().find(|m| m.name == name)
    }
}
