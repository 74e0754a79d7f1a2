//! Lowering from the elaborated view to RTL modules.
//!
//! Nets, parameters, and instances are copied over verbatim. Procedural
//! bodies become statement chains built in two phases: a structure pass
//! that creates arena entries and records pending links, and an RHS fill
//! pass that walks the AST a second time in the same order, attaching
//! lowered expressions to the corresponding entries in lockstep.

use svtool_common::{Ident, Interner};
use svtool_elaborate::{ElabModule, ElaboratedDesign};
use svtool_parser::ast::{
    AlwaysConstruct, AlwaysKind, BinaryOp, Expression, ModuleItem, SensitivityList, Statement,
    UnaryOp,
};

use crate::expr::{RtlBinOp, RtlExpr, RtlUnOp};
use crate::module::{RtlDesign, RtlInstance, RtlModule, RtlNet, RtlParam};
use crate::process::{
    RtlAssign, RtlAssignKind, RtlEdge, RtlProcess, RtlProcessKind, RtlSensitivity,
};
use crate::stmt::{RtlStmt, RtlStmtId, RtlStmtOp};

/// Lowers every module of an elaborated design.
pub fn build_design(elab: &ElaboratedDesign<'_>, interner: &Interner) -> RtlDesign {
    let builder = IrBuilder::new(interner);
    RtlDesign {
        modules: elab
            .modules
            .iter()
            .map(|m| builder.build_module(m))
            .collect(),
    }
}

struct IrBuilder {
    finish: Ident,
    lhs_fallback: Ident,
}

impl IrBuilder {
    fn new(interner: &Interner) -> Self {
        Self {
            finish: interner.get_or_intern("$finish"),
            lhs_fallback: interner.get_or_intern("<expr>"),
        }
    }

    fn build_module(&self, em: &ElabModule<'_>) -> RtlModule {
        let mut rm = RtlModule::new(em.name);

        rm.params = em
            .params
            .iter()
            .map(|p| RtlParam {
                name: p.name,
                value: p.value,
                text: p.text.clone(),
            })
            .collect();

        rm.nets = em
            .nets
            .iter()
            .map(|n| RtlNet {
                name: n.name,
                width: n.width,
            })
            .collect();

        rm.instances = em
            .instances
            .iter()
            .map(|i| RtlInstance {
                module_name: i.module_name,
                instance_name: i.instance_name,
                params: i
                    .params
                    .iter()
                    .map(|p| RtlParam {
                        name: p.name,
                        value: p.value,
                        text: p.text.clone(),
                    })
                    .collect(),
                conns: i.port_conns.clone(),
            })
            .collect();

        for item in &em.flat_items {
            match item {
                ModuleItem::Net(n) => {
                    if let Some(init) = &n.init {
                        rm.processes.push(self.init_process(n.name, init));
                    }
                }
                ModuleItem::Var(v) => {
                    if let Some(init) = &v.init {
                        rm.processes.push(self.init_process(v.name, init));
                    }
                }
                ModuleItem::Assign(ca) => {
                    rm.continuous_assigns.push(RtlAssign {
                        kind: RtlAssignKind::Continuous,
                        lhs: self.lhs_name(&ca.lhs),
                        rhs: self.lower_expr(&ca.rhs),
                    });
                }
                ModuleItem::Always(ac) => rm.processes.push(self.build_always(ac)),
                ModuleItem::Initial(ic) => {
                    let mut p = RtlProcess::new(RtlProcessKind::Initial);
                    p.assigns = self.collect_flat_assigns(&ic.body, None);
                    p.first_stmt = self.build_proc_body(&ic.body, None, &mut p);
                    rm.processes.push(p);
                }
                ModuleItem::Param(_)
                | ModuleItem::Instance(_)
                | ModuleItem::Genvar(_)
                | ModuleItem::Generate(_) => {}
            }
        }

        rm
    }

    /// Synthesizes the one-statement initial process of a declaration
    /// initializer.
    fn init_process(&self, name: Ident, init: &Expression) -> RtlProcess {
        let mut p = RtlProcess::new(RtlProcessKind::Initial);
        p.assigns.push(RtlAssign {
            kind: RtlAssignKind::Blocking,
            lhs: name,
            rhs: self.lower_expr(init),
        });
        p
    }

    fn build_always(&self, ac: &AlwaysConstruct) -> RtlProcess {
        let force = match ac.kind {
            AlwaysKind::AlwaysComb => Some(RtlAssignKind::Blocking),
            AlwaysKind::AlwaysFf => Some(RtlAssignKind::NonBlocking),
            AlwaysKind::Always | AlwaysKind::AlwaysLatch => None,
        };

        let mut p = RtlProcess::new(RtlProcessKind::Always);
        p.assigns = self.collect_flat_assigns(&ac.body, force);
        p.first_stmt = self.build_proc_body(&ac.body, force, &mut p);
        p.sensitivity = self.lower_sensitivity(ac, &p);
        p
    }

    /// Lowers the sensitivity specification of an always construct.
    ///
    /// `@*`, `@(*)`, and a bare `always_comb` derive level entries from the
    /// signals the body reads; explicit lists map to edge or level entries;
    /// unresolved forms are dropped.
    fn lower_sensitivity(&self, ac: &AlwaysConstruct, p: &RtlProcess) -> Vec<RtlSensitivity> {
        match &ac.sensitivity {
            SensitivityList::Star => self.level_entries_from_reads(p),
            SensitivityList::None => {
                if ac.kind == AlwaysKind::AlwaysComb || ac.kind == AlwaysKind::AlwaysLatch {
                    self.level_entries_from_reads(p)
                } else {
                    Vec::new()
                }
            }
            SensitivityList::List(items) => {
                let mut out = Vec::new();
                for item in items {
                    let Some(signal) = item.signal.as_ref_name() else {
                        continue;
                    };
                    let edge = match item.edge {
                        Some(svtool_parser::ast::EdgeKind::Posedge) => RtlEdge::Posedge,
                        Some(svtool_parser::ast::EdgeKind::Negedge) => RtlEdge::Negedge,
                        None => RtlEdge::Level,
                    };
                    out.push(RtlSensitivity { edge, signal });
                }
                out
            }
        }
    }

    fn level_entries_from_reads(&self, p: &RtlProcess) -> Vec<RtlSensitivity> {
        p.read_signals()
            .into_iter()
            .map(|signal| RtlSensitivity {
                edge: RtlEdge::Level,
                signal,
            })
            .collect()
    }

    /// Collects the flat view of top-level assigns (the body itself or the
    /// direct children of a block), with the always flavor's forced kind
    /// applied. An unlowered if/case contributes one X placeholder assign
    /// per net its bodies drive.
    fn collect_flat_assigns(
        &self,
        body: &Statement,
        force: Option<RtlAssignKind>,
    ) -> Vec<RtlAssign> {
        let mut out = Vec::new();
        let mut push = |stmt: &Statement| {
            match stmt {
                Statement::BlockingAssign { lhs, rhs, .. } => out.push(RtlAssign {
                    kind: force.unwrap_or(RtlAssignKind::Blocking),
                    lhs: self.lhs_name(lhs),
                    rhs: self.lower_expr(rhs),
                }),
                Statement::NonBlockingAssign { lhs, rhs, .. } => out.push(RtlAssign {
                    kind: force.unwrap_or(RtlAssignKind::NonBlocking),
                    lhs: self.lhs_name(lhs),
                    rhs: self.lower_expr(rhs),
                }),
                Statement::If { .. } | Statement::Case { .. } => {
                    for (lhs, kind) in self.branch_assign_targets(stmt, force) {
                        out.push(RtlAssign {
                            kind,
                            lhs,
                            rhs: RtlExpr::constant("x"),
                        });
                    }
                }
                _ => {}
            }
        };
        match body {
            Statement::Block { stmts, .. } => {
                for s in stmts {
                    push(s);
                }
            }
            other => push(other),
        }
        out
    }

    /// Collects the nets driven by assignments nested anywhere inside a
    /// branch statement, in source order with duplicates removed.
    ///
    /// Used to synthesize the placeholder assigns standing in for
    /// unlowered if/case bodies.
    fn branch_assign_targets(
        &self,
        stmt: &Statement,
        force: Option<RtlAssignKind>,
    ) -> Vec<(Ident, RtlAssignKind)> {
        fn walk(
            b: &IrBuilder,
            stmt: &Statement,
            force: Option<RtlAssignKind>,
            out: &mut Vec<(Ident, RtlAssignKind)>,
        ) {
            match stmt {
                Statement::BlockingAssign { lhs, .. } => {
                    let lhs = b.lhs_name(lhs);
                    if !out.iter().any(|(existing, _)| *existing == lhs) {
                        out.push((lhs, force.unwrap_or(RtlAssignKind::Blocking)));
                    }
                }
                Statement::NonBlockingAssign { lhs, .. } => {
                    let lhs = b.lhs_name(lhs);
                    if !out.iter().any(|(existing, _)| *existing == lhs) {
                        out.push((lhs, force.unwrap_or(RtlAssignKind::NonBlocking)));
                    }
                }
                Statement::Block { stmts, .. } => {
                    for s in stmts {
                        walk(b, s, force, out);
                    }
                }
                Statement::If {
                    then_stmt,
                    else_stmt,
                    ..
                } => {
                    walk(b, then_stmt, force, out);
                    if let Some(else_stmt) = else_stmt {
                        walk(b, else_stmt, force, out);
                    }
                }
                Statement::Case { items, .. } => {
                    for item in items {
                        walk(b, &item.body, force, out);
                    }
                }
                Statement::Delay { body, .. } => walk(b, body, force, out),
                Statement::Null { .. } | Statement::ExprStmt { .. } => {}
            }
        }

        let mut out = Vec::new();
        walk(self, stmt, force, &mut out);
        out
    }

    /// Extracts the driven net of an assignment target. Bit selects drive
    /// their base identifier.
    fn lhs_name(&self, lhs: &Expression) -> Ident {
        match lhs {
            Expression::Ref { name, .. } => *name,
            Expression::BitSelect { base, .. } => match base.as_ref() {
                Expression::Ref { name, .. } => *name,
                _ => self.lhs_fallback,
            },
            _ => self.lhs_fallback,
        }
    }

    /// Lowers an AST expression to an RTL expression.
    ///
    /// Ternary desugars to `(c & t) | (~c & f)`; a bit select desugars to
    /// `(base >> index) & 1`; concatenation and replication lower to an
    /// all-X placeholder constant so the driven net reads as X.
    fn lower_expr(&self, e: &Expression) -> RtlExpr {
        match e {
            Expression::Ref { name, .. } => RtlExpr::Ref(*name),
            Expression::Number { text, .. } => RtlExpr::Const(text.clone()),
            Expression::Unary { op, operand, .. } => RtlExpr::Unary {
                op: match op {
                    UnaryOp::Plus => RtlUnOp::Plus,
                    UnaryOp::Minus => RtlUnOp::Minus,
                    UnaryOp::LogicalNot => RtlUnOp::Not,
                    UnaryOp::BitNot => RtlUnOp::BitNot,
                },
                operand: Box::new(self.lower_expr(operand)),
            },
            Expression::Binary { op, lhs, rhs, .. } => RtlExpr::Binary {
                op: lower_binop(*op),
                lhs: Box::new(self.lower_expr(lhs)),
                rhs: Box::new(self.lower_expr(rhs)),
            },
            Expression::Ternary {
                cond,
                then_expr,
                else_expr,
                ..
            } => {
                let c = self.lower_expr(cond);
                let t = self.lower_expr(then_expr);
                let f = self.lower_expr(else_expr);
                RtlExpr::Binary {
                    op: RtlBinOp::Or,
                    lhs: Box::new(RtlExpr::Binary {
                        op: RtlBinOp::And,
                        lhs: Box::new(c.clone()),
                        rhs: Box::new(t),
                    }),
                    rhs: Box::new(RtlExpr::Binary {
                        op: RtlBinOp::And,
                        lhs: Box::new(RtlExpr::Unary {
                            op: RtlUnOp::BitNot,
                            operand: Box::new(c),
                        }),
                        rhs: Box::new(f),
                    }),
                }
            }
            Expression::BitSelect { base, index, .. } => RtlExpr::Binary {
                op: RtlBinOp::And,
                lhs: Box::new(RtlExpr::Binary {
                    op: RtlBinOp::Shr,
                    lhs: Box::new(self.lower_expr(base)),
                    rhs: Box::new(self.lower_expr(index)),
                }),
                rhs: Box::new(RtlExpr::constant("1")),
            },
            Expression::Str { .. }
            | Expression::Concat { .. }
            | Expression::Replicate { .. } => RtlExpr::constant("x"),
        }
    }

    /// Builds the statement chain of a process body into its arena and
    /// returns the head.
    fn build_proc_body(
        &self,
        body: &Statement,
        force: Option<RtlAssignKind>,
        p: &mut RtlProcess,
    ) -> Option<RtlStmtId> {
        let mut chain = ProcChainBuilder::default();
        let head = chain.build_stmt_list(body, None, force, self);
        let mut cursor = 0usize;
        chain.fill_stmt(body, &mut cursor, force, self);
        chain.finalize(p, head)
    }
}

fn lower_binop(op: BinaryOp) -> RtlBinOp {
    match op {
        BinaryOp::Add => RtlBinOp::Add,
        BinaryOp::Sub => RtlBinOp::Sub,
        BinaryOp::Mul => RtlBinOp::Mul,
        BinaryOp::Div => RtlBinOp::Div,
        BinaryOp::Mod => RtlBinOp::Mod,
        BinaryOp::BitAnd => RtlBinOp::And,
        BinaryOp::BitOr => RtlBinOp::Or,
        BinaryOp::BitXor => RtlBinOp::Xor,
        BinaryOp::LogicalAnd => RtlBinOp::LogicalAnd,
        BinaryOp::LogicalOr => RtlBinOp::LogicalOr,
        BinaryOp::Eq => RtlBinOp::Eq,
        BinaryOp::Neq => RtlBinOp::Neq,
        BinaryOp::CaseEq => RtlBinOp::CaseEq,
        BinaryOp::CaseNeq => RtlBinOp::CaseNeq,
        BinaryOp::Lt => RtlBinOp::Lt,
        BinaryOp::Gt => RtlBinOp::Gt,
        BinaryOp::Le => RtlBinOp::Le,
        BinaryOp::Ge => RtlBinOp::Ge,
        BinaryOp::Shl => RtlBinOp::Shl,
        BinaryOp::Shr => RtlBinOp::Shr,
        BinaryOp::Ashl => RtlBinOp::Ashl,
        BinaryOp::Ashr => RtlBinOp::Ashr,
    }
}

/// Pending link kind recorded during the structure pass.
enum LinkKind {
    Next,
    Delay,
}

struct Link {
    from: usize,
    to: Option<usize>,
    kind: LinkKind,
}

/// Two-phase chain builder.
///
/// The structure pass creates nodes (with placeholder expressions) and
/// records `(from, to)` links by index; the fill pass re-walks the AST in
/// the same order and attaches the lowered right-hand sides; finalize moves
/// the nodes into the process arena and converts the links into statement
/// IDs. Node indices equal arena indices because the arena appends in
/// creation order.
#[derive(Default)]
struct ProcChainBuilder {
    nodes: Vec<RtlStmt>,
    links: Vec<Link>,
}

impl ProcChainBuilder {
    fn make_node(&mut self, op: RtlStmtOp) -> usize {
        self.nodes.push(RtlStmt { op, next: None });
        self.nodes.len() - 1
    }

    /// Structure pass. Builds a linear chain for `s` with `tail` as the
    /// statement that should follow this subtree; returns the head node
    /// (or `tail` when nothing is created).
    fn build_stmt_list(
        &mut self,
        s: &Statement,
        tail: Option<usize>,
        force: Option<RtlAssignKind>,
        b: &IrBuilder,
    ) -> Option<usize> {
        match s {
            Statement::Null { .. } => tail,

            Statement::Block { stmts, .. } => {
                let mut local_tail = tail;
                for sub in stmts.iter().rev() {
                    local_tail = self.build_stmt_list(sub, local_tail, force, b);
                }
                local_tail
            }

            Statement::BlockingAssign { lhs, .. } => {
                let lhs = b.lhs_name(lhs);
                let op = match force {
                    Some(RtlAssignKind::NonBlocking) => RtlStmtOp::NonBlockingAssign {
                        lhs,
                        rhs: RtlExpr::constant("0"),
                    },
                    _ => RtlStmtOp::BlockingAssign {
                        lhs,
                        rhs: RtlExpr::constant("0"),
                    },
                };
                let idx = self.make_node(op);
                self.links.push(Link {
                    from: idx,
                    to: tail,
                    kind: LinkKind::Next,
                });
                Some(idx)
            }

            Statement::NonBlockingAssign { lhs, .. } => {
                let lhs = b.lhs_name(lhs);
                let op = match force {
                    Some(RtlAssignKind::Blocking) => RtlStmtOp::BlockingAssign {
                        lhs,
                        rhs: RtlExpr::constant("0"),
                    },
                    _ => RtlStmtOp::NonBlockingAssign {
                        lhs,
                        rhs: RtlExpr::constant("0"),
                    },
                };
                let idx = self.make_node(op);
                self.links.push(Link {
                    from: idx,
                    to: tail,
                    kind: LinkKind::Next,
                });
                Some(idx)
            }

            Statement::Delay { body, .. } => {
                let idx = self.make_node(RtlStmtOp::Delay {
                    delay: RtlExpr::constant("0"),
                    body: None,
                });
                let after = self.build_stmt_list(body, tail, force, b);
                self.links.push(Link {
                    from: idx,
                    to: after,
                    kind: LinkKind::Delay,
                });
                self.links.push(Link {
                    from: idx,
                    to: tail,
                    kind: LinkKind::Next,
                });
                Some(idx)
            }

            Statement::ExprStmt { expr, .. } => {
                if expr.as_ref_name() == Some(b.finish) {
                    let idx = self.make_node(RtlStmtOp::Finish);
                    self.links.push(Link {
                        from: idx,
                        to: tail,
                        kind: LinkKind::Next,
                    });
                    Some(idx)
                } else {
                    tail
                }
            }

            // If and case bodies are not lowered into the graph; every
            // net they drive gets a placeholder assign and reads as X.
            Statement::If { .. } | Statement::Case { .. } => {
                let targets = b.branch_assign_targets(s, force);
                let mut local_tail = tail;
                for (lhs, kind) in targets.iter().rev() {
                    let op = match kind {
                        RtlAssignKind::NonBlocking => RtlStmtOp::NonBlockingAssign {
                            lhs: *lhs,
                            rhs: RtlExpr::constant("x"),
                        },
                        _ => RtlStmtOp::BlockingAssign {
                            lhs: *lhs,
                            rhs: RtlExpr::constant("x"),
                        },
                    };
                    let idx = self.make_node(op);
                    self.links.push(Link {
                        from: idx,
                        to: local_tail,
                        kind: LinkKind::Next,
                    });
                    local_tail = Some(idx);
                }
                local_tail
            }
        }
    }

    /// RHS fill pass. Walks the AST in the same order as the structure
    /// pass, consuming nodes in lockstep and attaching lowered expressions.
    fn fill_stmt(
        &mut self,
        s: &Statement,
        cursor: &mut usize,
        force: Option<RtlAssignKind>,
        b: &IrBuilder,
    ) {
        match s {
            Statement::Null { .. } => {}

            Statement::If { .. } | Statement::Case { .. } => {
                // Placeholder nodes carry their final constant already;
                // just keep the cursor in step with the structure pass.
                *cursor += b.branch_assign_targets(s, force).len();
            }

            Statement::Block { stmts, .. } => {
                // The structure pass threads blocks back-to-front.
                for sub in stmts.iter().rev() {
                    self.fill_stmt(sub, cursor, force, b);
                }
            }

            Statement::BlockingAssign { rhs, .. }
            | Statement::NonBlockingAssign { rhs, .. } => {
                if *cursor >= self.nodes.len() {
                    return;
                }
                let node = &mut self.nodes[*cursor];
                *cursor += 1;
                match &mut node.op {
                    RtlStmtOp::BlockingAssign { rhs: slot, .. }
                    | RtlStmtOp::NonBlockingAssign { rhs: slot, .. } => {
                        *slot = b.lower_expr(rhs);
                    }
                    _ => {}
                }
            }

            Statement::Delay { delay, body, .. } => {
                if *cursor >= self.nodes.len() {
                    return;
                }
                let node = &mut self.nodes[*cursor];
                *cursor += 1;
                if let RtlStmtOp::Delay { delay: slot, .. } = &mut node.op {
                    *slot = b.lower_expr(delay);
                }
                self.fill_stmt(body, cursor, force, b);
            }

            Statement::ExprStmt { expr, .. } => {
                if expr.as_ref_name() == Some(b.finish) && *cursor < self.nodes.len() {
                    *cursor += 1;
                }
            }
        }
    }

    /// Finalize pass: move the nodes into the owning process arena and
    /// convert index links into statement IDs.
    fn finalize(mut self, p: &mut RtlProcess, head: Option<usize>) -> Option<RtlStmtId> {
        for link in &self.links {
            let to = link.to.map(|i| RtlStmtId::from_raw(i as u32));
            let node = &mut self.nodes[link.from];
            match link.kind {
                LinkKind::Next => node.next = to,
                LinkKind::Delay => {
                    if let RtlStmtOp::Delay { body, .. } = &mut node.op {
                        *body = to;
                    }
                }
            }
        }
        for node in self.nodes {
            p.stmts.alloc(node);
        }
        head.map(|i| RtlStmtId::from_raw(i as u32))
    }
}
