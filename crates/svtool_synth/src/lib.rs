//! Syntax-directed mapping of RTL assigns onto primitive gates.
//!
//! Each assign becomes a tree of `And`/`Or`/`Xor`/`Not`/`Buf` gates with
//! synthesized intermediate nets, terminated by a `Buf` onto the assign's
//! target. The mapper performs no optimization; the produced gate-level
//! module is simulated by the kernel's gate processes.

#![warn(missing_docs)]

use svtool_common::{Ident, Interner};
use svtool_ir::{RtlAssign, RtlExpr, RtlGate, RtlGateKind, RtlModule, RtlNet, RtlUnOp};

/// Maps a module's continuous and flat process assigns to a gate-level
/// module.
///
/// The result carries the original nets plus one scalar net per
/// synthesized intermediate value; its `continuous_assigns` and
/// `processes` are empty and all behavior lives in `gates`.
pub fn map_module(module: &RtlModule, interner: &Interner) -> RtlModule {
    let mut mapper = GateMapper {
        interner,
        out: RtlModule::new(module.name),
    };

    for net in &module.nets {
        mapper.ensure_net(net.name, net.width);
    }

    for assign in &module.continuous_assigns {
        mapper.lower_assign(assign);
    }
    for process in &module.processes {
        for assign in &process.assigns {
            mapper.lower_assign(assign);
        }
    }

    mapper.out.params = module.params.clone();
    mapper.out.instances = module.instances.clone();
    mapper.out
}

struct GateMapper<'i> {
    interner: &'i Interner,
    out: RtlModule,
}

impl GateMapper<'_> {
    fn ensure_net(&mut self, name: Ident, width: u32) {
        if self.out.nets.iter().any(|n| n.name == name) {
            return;
        }
        self.out.nets.push(RtlNet { name, width });
    }

    /// Lowers an expression to a net carrying its value, emitting gates as
    /// needed, and returns that net.
    fn lower_expr(&mut self, e: &RtlExpr) -> Ident {
        match e {
            RtlExpr::Ref(name) => {
                self.ensure_net(*name, 1);
                *name
            }
            RtlExpr::Const(lit) => {
                let cname = self
                    .interner
                    .get_or_intern(&format!("const_{lit}"));
                self.ensure_net(cname, 1);
                cname
            }
            RtlExpr::Unary { op, operand } => {
                let input = self.lower_expr(operand);
                let out = self
                    .interner
                    .get_or_intern(&format!("u_{}", self.interner.resolve(input)));
                self.ensure_net(out, 1);
                self.out.gates.push(RtlGate {
                    kind: match op {
                        RtlUnOp::Not | RtlUnOp::BitNot => RtlGateKind::Not,
                        RtlUnOp::Plus | RtlUnOp::Minus => RtlGateKind::Buf,
                    },
                    inputs: vec![input],
                    out,
                });
                out
            }
            RtlExpr::Binary { op, lhs, rhs } => {
                let a = self.lower_expr(lhs);
                let b = self.lower_expr(rhs);
                let out = self.interner.get_or_intern(&format!(
                    "g_{}_{}",
                    self.interner.resolve(a),
                    self.interner.resolve(b)
                ));
                self.ensure_net(out, 1);
                self.out.gates.push(RtlGate {
                    kind: match op {
                        svtool_ir::RtlBinOp::And => RtlGateKind::And,
                        svtool_ir::RtlBinOp::Or => RtlGateKind::Or,
                        svtool_ir::RtlBinOp::Xor => RtlGateKind::Xor,
                        _ => RtlGateKind::Buf,
                    },
                    inputs: vec![a, b],
                    out,
                });
                out
            }
        }
    }

    fn lower_assign(&mut self, assign: &RtlAssign) {
        let rhs_net = self.lower_expr(&assign.rhs);
        self.ensure_net(assign.lhs, 1);
        self.out.gates.push(RtlGate {
            kind: RtlGateKind::Buf,
            inputs: vec![rhs_net],
            out: assign.lhs,
        });
    }
}
