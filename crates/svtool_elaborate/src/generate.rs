//! Generate unrolling: genvar substitution as cloning, and the
//! block/if/for/case expanders.
//!
//! Rather than carrying an environment into later passes, generate-for
//! substitutes the genvar with a numeric literal at clone time. This keeps
//! IR construction free of an implicit environment and makes bit-select
//! indices compile-time-constant.

use svtool_common::Ident;
use svtool_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use svtool_parser::ast::*;
use svtool_source::Span;

use crate::const_eval::{eval_const, ConstEnv};
use crate::errors::ElabError;
use crate::GenArena;

/// Expands a generate item, appending the produced items to `out`.
///
/// Cloned items live in `arena`, giving them the same lifetime as items
/// borrowed straight from the AST.
pub(crate) fn expand_generate<'a>(
    gi: &'a GenerateItem,
    env: &ConstEnv,
    arena: &'a GenArena,
    module_name: &str,
    sink: &DiagnosticSink,
    out: &mut Vec<&'a ModuleItem>,
) -> Result<(), ElabError> {
    match gi {
        GenerateItem::Block { items, .. } => {
            expand_item_list(items, env, arena, module_name, sink, out)
        }

        GenerateItem::If {
            cond,
            then_items,
            else_items,
            span,
        } => {
            match eval_const(cond, env) {
                Some(v) => {
                    let taken = if v != 0 { then_items } else { else_items };
                    expand_item_list(taken, env, arena, module_name, sink, out)?;
                }
                None => {
                    warn(sink, "generate-if condition is not constant; item skipped", *span);
                }
            }
            Ok(())
        }

        GenerateItem::For {
            genvar,
            init,
            cond,
            step,
            items,
            span,
            ..
        } => {
            let Some(genvar) = *genvar else {
                return Err(ElabError::MissingGenvar {
                    module: module_name.to_string(),
                });
            };

            let Some(start) = eval_const(init, env) else {
                warn(sink, "generate-for init is not constant; loop skipped", *span);
                return Ok(());
            };
            let Some(limit) = lt_limit(cond, genvar, env) else {
                warn(
                    sink,
                    "generate-for condition must be `genvar < constant`; loop skipped",
                    *span,
                );
                return Ok(());
            };
            let Some(incr) = add_step(step, genvar, env) else {
                warn(
                    sink,
                    "generate-for step must be `genvar = genvar + constant`; loop skipped",
                    *span,
                );
                return Ok(());
            };
            if incr <= 0 {
                warn(sink, "generate-for step must be positive; loop skipped", *span);
                return Ok(());
            }

            let mut gv = start;
            while gv < limit {
                for item in items {
                    if let Some(cloned) = clone_item_subst(item, genvar, gv) {
                        out.push(&*arena.alloc(cloned));
                    }
                }
                gv += incr;
            }
            Ok(())
        }

        GenerateItem::Case { expr, arms, span } => {
            let Some(sel) = eval_const(expr, env) else {
                warn(sink, "generate-case selector is not constant; item skipped", *span);
                return Ok(());
            };
            // First arm whose folded match equals the selector wins;
            // the default arm (empty matches) is used otherwise.
            for arm in arms {
                if arm
                    .matches
                    .iter()
                    .any(|m| eval_const(m, env) == Some(sel))
                {
                    return expand_item_list(&arm.items, env, arena, module_name, sink, out);
                }
            }
            if let Some(default) = arms.iter().find(|a| a.matches.is_empty()) {
                return expand_item_list(&default.items, env, arena, module_name, sink, out);
            }
            Ok(())
        }
    }
}

/// Expands a list of items, recursing into nested generate constructs and
/// appending everything else directly.
fn expand_item_list<'a>(
    items: &'a [ModuleItem],
    env: &ConstEnv,
    arena: &'a GenArena,
    module_name: &str,
    sink: &DiagnosticSink,
    out: &mut Vec<&'a ModuleItem>,
) -> Result<(), ElabError> {
    for item in items {
        match item {
            ModuleItem::Generate(nested) => {
                expand_generate(nested, env, arena, module_name, sink, out)?;
            }
            other => out.push(other),
        }
    }
    Ok(())
}

fn warn(sink: &DiagnosticSink, msg: &str, span: Span) {
    sink.emit(Diagnostic::warning(
        DiagnosticCode::new(Category::Warning, 210),
        msg,
        span,
    ));
}

/// Extracts the folded limit from a `genvar < limit` condition.
fn lt_limit(cond: &Expression, genvar: Ident, env: &ConstEnv) -> Option<i64> {
    match cond {
        Expression::Binary {
            op: BinaryOp::Lt,
            lhs,
            rhs,
            ..
        } if lhs.as_ref_name() == Some(genvar) => eval_const(rhs, env),
        _ => None,
    }
}

/// Extracts the folded increment from a `genvar + incr` step value.
fn add_step(step: &Expression, genvar: Ident, env: &ConstEnv) -> Option<i64> {
    match step {
        Expression::Binary {
            op: BinaryOp::Add,
            lhs,
            rhs,
            ..
        } if lhs.as_ref_name() == Some(genvar) => eval_const(rhs, env),
        _ => None,
    }
}

// ============================================================================
// Substitution cloning
// ============================================================================

/// Clones an expression, replacing every occurrence of `genvar` with the
/// integer literal `value`.
pub(crate) fn clone_expr_subst(e: &Expression, genvar: Ident, value: i64) -> Expression {
    let make_number = || Expression::Number {
        text: value.to_string(),
        span: Span::DUMMY,
    };

    match e {
        Expression::Ref { name, span } => {
            if *name == genvar {
                make_number()
            } else {
                Expression::Ref {
                    name: *name,
                    span: *span,
                }
            }
        }
        Expression::Number { .. } | Expression::Str { .. } => e.clone(),
        Expression::Unary { op, operand, span } => Expression::Unary {
            op: *op,
            operand: Box::new(clone_expr_subst(operand, genvar, value)),
            span: *span,
        },
        Expression::Binary { op, lhs, rhs, span } => Expression::Binary {
            op: *op,
            lhs: Box::new(clone_expr_subst(lhs, genvar, value)),
            rhs: Box::new(clone_expr_subst(rhs, genvar, value)),
            span: *span,
        },
        Expression::Ternary {
            cond,
            then_expr,
            else_expr,
            span,
        } => Expression::Ternary {
            cond: Box::new(clone_expr_subst(cond, genvar, value)),
            then_expr: Box::new(clone_expr_subst(then_expr, genvar, value)),
            else_expr: Box::new(clone_expr_subst(else_expr, genvar, value)),
            span: *span,
        },
        Expression::Concat { elems, span } => Expression::Concat {
            elems: elems
                .iter()
                .map(|el| clone_expr_subst(el, genvar, value))
                .collect(),
            span: *span,
        },
        Expression::Replicate { count, elems, span } => Expression::Replicate {
            count: Box::new(clone_expr_subst(count, genvar, value)),
            elems: elems
                .iter()
                .map(|el| clone_expr_subst(el, genvar, value))
                .collect(),
            span: *span,
        },
        Expression::BitSelect { base, index, span } => Expression::BitSelect {
            base: Box::new(clone_expr_subst(base, genvar, value)),
            index: Box::new(clone_expr_subst(index, genvar, value)),
            span: *span,
        },
    }
}

/// Clones a statement with genvar substitution in every expression.
pub(crate) fn clone_stmt_subst(s: &Statement, genvar: Ident, value: i64) -> Statement {
    match s {
        Statement::Null { span } => Statement::Null { span: *span },
        Statement::Block { label, stmts, span } => Statement::Block {
            label: *label,
            stmts: stmts
                .iter()
                .map(|st| clone_stmt_subst(st, genvar, value))
                .collect(),
            span: *span,
        },
        Statement::If {
            cond,
            then_stmt,
            else_stmt,
            span,
        } => Statement::If {
            cond: clone_expr_subst(cond, genvar, value),
            then_stmt: Box::new(clone_stmt_subst(then_stmt, genvar, value)),
            else_stmt: else_stmt
                .as_ref()
                .map(|e| Box::new(clone_stmt_subst(e, genvar, value))),
            span: *span,
        },
        Statement::Case {
            kind,
            expr,
            items,
            span,
        } => Statement::Case {
            kind: *kind,
            expr: clone_expr_subst(expr, genvar, value),
            items: items
                .iter()
                .map(|item| CaseItem {
                    matches: item
                        .matches
                        .iter()
                        .map(|m| clone_expr_subst(m, genvar, value))
                        .collect(),
                    body: clone_stmt_subst(&item.body, genvar, value),
                    span: item.span,
                })
                .collect(),
            span: *span,
        },
        Statement::BlockingAssign { lhs, rhs, span } => Statement::BlockingAssign {
            lhs: clone_expr_subst(lhs, genvar, value),
            rhs: clone_expr_subst(rhs, genvar, value),
            span: *span,
        },
        Statement::NonBlockingAssign { lhs, rhs, span } => Statement::NonBlockingAssign {
            lhs: clone_expr_subst(lhs, genvar, value),
            rhs: clone_expr_subst(rhs, genvar, value),
            span: *span,
        },
        Statement::Delay { delay, body, span } => Statement::Delay {
            delay: clone_expr_subst(delay, genvar, value),
            body: Box::new(clone_stmt_subst(body, genvar, value)),
            span: *span,
        },
        Statement::ExprStmt { expr, span } => Statement::ExprStmt {
            expr: clone_expr_subst(expr, genvar, value),
            span: *span,
        },
    }
}

/// Clones a module item with genvar substitution.
///
/// Nested generate constructs and genvar declarations are not cloned; they
/// are handled at the unrolling level.
pub(crate) fn clone_item_subst(item: &ModuleItem, genvar: Ident, value: i64) -> Option<ModuleItem> {
    match item {
        ModuleItem::Net(n) => Some(ModuleItem::Net(NetDecl {
            ty: n.ty.clone(),
            name: n.name,
            init: n.init.as_ref().map(|e| clone_expr_subst(e, genvar, value)),
            span: n.span,
        })),
        ModuleItem::Var(v) => Some(ModuleItem::Var(VarDecl {
            ty: v.ty.clone(),
            name: v.name,
            init: v.init.as_ref().map(|e| clone_expr_subst(e, genvar, value)),
            span: v.span,
        })),
        ModuleItem::Param(p) => Some(ModuleItem::Param(ParamDecl {
            local: p.local,
            name: p.name,
            value: clone_expr_subst(&p.value, genvar, value),
            span: p.span,
        })),
        ModuleItem::Assign(a) => Some(ModuleItem::Assign(ContinuousAssign {
            lhs: clone_expr_subst(&a.lhs, genvar, value),
            rhs: clone_expr_subst(&a.rhs, genvar, value),
            span: a.span,
        })),
        ModuleItem::Always(a) => {
            let sensitivity = match &a.sensitivity {
                SensitivityList::None => SensitivityList::None,
                SensitivityList::Star => SensitivityList::Star,
                SensitivityList::List(items) => SensitivityList::List(
                    items
                        .iter()
                        .map(|si| SensitivityItem {
                            edge: si.edge,
                            signal: clone_expr_subst(&si.signal, genvar, value),
                            span: si.span,
                        })
                        .collect(),
                ),
            };
            Some(ModuleItem::Always(AlwaysConstruct {
                kind: a.kind,
                sensitivity,
                body: clone_stmt_subst(&a.body, genvar, value),
                span: a.span,
            }))
        }
        ModuleItem::Initial(i) => Some(ModuleItem::Initial(InitialConstruct {
            body: clone_stmt_subst(&i.body, genvar, value),
            span: i.span,
        })),
        ModuleItem::Instance(inst) => Some(ModuleItem::Instance(Instance {
            module_name: inst.module_name,
            instance_name: inst.instance_name,
            param_overrides: inst
                .param_overrides
                .iter()
                .map(|c| Connection {
                    formal: c.formal,
                    actual: c.actual.as_ref().map(|e| clone_expr_subst(e, genvar, value)),
                    span: c.span,
                })
                .collect(),
            port_conns: inst
                .port_conns
                .iter()
                .map(|c| Connection {
                    formal: c.formal,
                    actual: c.actual.as_ref().map(|e| clone_expr_subst(e, genvar, value)),
                    span: c.span,
                })
                .collect(),
            span: inst.span,
        })),
        ModuleItem::Generate(_) | ModuleItem::Genvar(_) => None,
    }
}
