//! Per-module elaboration: flat item list construction and derivation of
//! the parameter table, net list, and instance list.

use svtool_common::{Ident, Interner};
use svtool_diagnostics::DiagnosticSink;
use svtool_parser::ast::{self, DataType, Expression, ModuleItem};

use crate::const_eval::{eval_const, ConstEnv};
use crate::design::{ElabInstance, ElabModule, ElabNet, ElabParam};
use crate::errors::ElabError;
use crate::generate::expand_generate;
use crate::GenArena;

/// Elaborates one module.
///
/// Walks the items once to expand generate constructs into `flat_items`,
/// then derives the parameter table, net list, and instance list from the
/// flat view. Ports contribute nets as well so that every signal has a
/// declared width.
pub fn elaborate_module<'a>(
    module: &'a ast::ModuleDecl,
    arena: &'a GenArena,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> Result<ElabModule<'a>, ElabError> {
    let module_name = interner.resolve(module.name).to_string();

    // Parameter environment from the default values, in declaration order;
    // later parameters may reference earlier ones.
    let mut env = ConstEnv::new();
    for item in &module.items {
        if let ModuleItem::Param(p) = item {
            if let Some(v) = eval_const(&p.value, &env) {
                env.insert(p.name, v);
            }
        }
    }

    // Flatten: expand generate constructs, keep everything else in order.
    let mut flat_items: Vec<&'a ModuleItem> = Vec::new();
    for item in &module.items {
        match item {
            ModuleItem::Generate(gi) => {
                expand_generate(gi, &env, arena, &module_name, sink, &mut flat_items)?;
            }
            other => flat_items.push(other),
        }
    }

    // Parameter table.
    let mut params = Vec::new();
    for item in &flat_items {
        if let ModuleItem::Param(p) = item {
            params.push(resolve_param(p.name, &p.value, &env));
        }
    }

    // Net list: ports first, then declarations from the flat view.
    let mut nets = Vec::new();
    for port in &module.ports {
        push_net(&mut nets, port.name, &port.ty, &env);
    }
    for item in &flat_items {
        match item {
            ModuleItem::Net(n) => push_net(&mut nets, n.name, &n.ty, &env),
            ModuleItem::Var(v) => push_net(&mut nets, v.name, &v.ty, &env),
            _ => {}
        }
    }

    // Instance list.
    let mut instances = Vec::new();
    for item in &flat_items {
        if let ModuleItem::Instance(inst) = item {
            instances.push(resolve_instance(inst, &env));
        }
    }

    Ok(ElabModule {
        name: module.name,
        params,
        nets,
        instances,
        flat_items,
    })
}

/// Folds a parameter value, falling back to the literal source text.
fn resolve_param(name: Ident, value: &Expression, env: &ConstEnv) -> ElabParam {
    let folded = eval_const(value, env);
    let text = match value {
        Expression::Number { text, .. } | Expression::Str { text, .. } => text.clone(),
        _ => folded.map(|v| v.to_string()).unwrap_or_default(),
    };
    ElabParam {
        name,
        value: folded,
        text,
    }
}

fn push_net(nets: &mut Vec<ElabNet>, name: Ident, ty: &DataType, env: &ConstEnv) {
    let (width, range) = resolve_width(ty, env);
    nets.push(ElabNet { name, width, range });
}

/// Computes a net's width from its packed range. Scalars default to 1;
/// an unfoldable range degrades to a scalar.
fn resolve_width(ty: &DataType, env: &ConstEnv) -> (u32, Option<(i64, i64)>) {
    match &ty.range {
        Some(range) => {
            let msb = eval_const(&range.msb, env);
            let lsb = eval_const(&range.lsb, env);
            match (msb, lsb) {
                (Some(msb), Some(lsb)) => {
                    let width = (msb - lsb).unsigned_abs() as u32 + 1;
                    (width, Some((msb, lsb)))
                }
                _ => (1, None),
            }
        }
        None => (1, None),
    }
}

/// Resolves an instance's parameter overrides and port connections.
fn resolve_instance(inst: &ast::Instance, env: &ConstEnv) -> ElabInstance {
    let params = inst
        .param_overrides
        .iter()
        .filter_map(|conn| {
            let name = conn.formal?;
            let actual = conn.actual.as_ref()?;
            Some(resolve_param(name, actual, env))
        })
        .collect();

    let port_conns = inst
        .port_conns
        .iter()
        .map(|conn| {
            let signal = conn.actual.as_ref().and_then(|e| e.as_ref_name());
            (conn.formal, signal)
        })
        .collect();

    ElabInstance {
        module_name: inst.module_name,
        instance_name: inst.instance_name,
        params,
        port_conns,
    }
}
