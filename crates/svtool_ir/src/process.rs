//! RTL processes: always/initial blocks after lowering.

use crate::arena::Arena;
use crate::expr::RtlExpr;
use crate::stmt::{RtlStmt, RtlStmtId, RtlStmtOp};
use serde::{Deserialize, Serialize};
use svtool_common::Ident;

/// The kind of a lowered process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RtlProcessKind {
    /// An always process, re-triggered by its sensitivity list (or
    /// free-running when the list is empty).
    Always,
    /// An initial process, run once at time zero.
    Initial,
}

/// Edge qualifier of a sensitivity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RtlEdge {
    /// Re-trigger on any value change.
    Level,
    /// Re-trigger on a 0 to 1 transition of bit 0.
    Posedge,
    /// Re-trigger on a 1 to 0 transition of bit 0.
    Negedge,
}

/// One sensitivity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtlSensitivity {
    /// The edge qualifier.
    pub edge: RtlEdge,
    /// The watched net.
    pub signal: Ident,
}

/// The flavor of a flat assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RtlAssignKind {
    /// A continuous assignment.
    Continuous,
    /// A blocking procedural assignment.
    Blocking,
    /// A non-blocking procedural assignment.
    NonBlocking,
}

/// A flat assignment: the form used by continuous assigns and by the
/// combinational fallback path for processes without a statement graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtlAssign {
    /// The assignment flavor.
    pub kind: RtlAssignKind,
    /// The driven net.
    pub lhs: Ident,
    /// The value expression.
    pub rhs: RtlExpr,
}

/// A lowered process.
///
/// The statement graph lives in `stmts`; `first_stmt` is its entry point.
/// `assigns` is a flat view of the top-level assignments kept for the
/// combinational engine path used when a process has no statement graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtlProcess {
    /// The process kind.
    pub kind: RtlProcessKind,
    /// The sensitivity entries (empty for free-running processes).
    pub sensitivity: Vec<RtlSensitivity>,
    /// Entry point of the statement graph, or `None` when only `assigns`
    /// carries the behavior.
    pub first_stmt: Option<RtlStmtId>,
    /// Owning arena of all statements of this process.
    pub stmts: Arena<RtlStmtId, RtlStmt>,
    /// Flat top-level assigns for the combinational fallback.
    pub assigns: Vec<RtlAssign>,
}

impl RtlProcess {
    /// Creates an empty process of the given kind.
    pub fn new(kind: RtlProcessKind) -> Self {
        Self {
            kind,
            sensitivity: Vec::new(),
            first_stmt: None,
            stmts: Arena::new(),
            assigns: Vec::new(),
        }
    }

    /// Returns `true` if `first_stmt` and every `next`/delayed-body link
    /// point inside this process's own arena.
    pub fn links_are_internal(&self) -> bool {
        if let Some(first) = self.first_stmt {
            if !self.stmts.contains(first) {
                return false;
            }
        }
        self.stmts.values().all(|s| {
            let next_ok = s.next.map_or(true, |n| self.stmts.contains(n));
            let body_ok = match s.op {
                RtlStmtOp::Delay { body, .. } => body.map_or(true, |b| self.stmts.contains(b)),
                _ => true,
            };
            next_ok && body_ok
        })
    }

    /// Returns `true` if the statement graph contains a delay.
    ///
    /// A free-running always process (empty sensitivity) only re-enters its
    /// chain when it can suspend; re-entering a delay-free chain would spin
    /// the scheduler at one timestamp.
    pub fn has_delay(&self) -> bool {
        self.stmts
            .values()
            .any(|s| matches!(s.op, RtlStmtOp::Delay { .. }))
    }

    /// Collects the nets read by this process (statement graph RHS
    /// expressions plus the flat assign view), in first-seen order.
    pub fn read_signals(&self) -> Vec<Ident> {
        let mut seen = Vec::new();
        let mut push = |id: Ident| {
            if !seen.contains(&id) {
                seen.push(id);
            }
        };
        for s in self.stmts.values() {
            match &s.op {
                RtlStmtOp::BlockingAssign { rhs, .. }
                | RtlStmtOp::NonBlockingAssign { rhs, .. } => rhs.for_each_ref(&mut push),
                RtlStmtOp::Delay { delay, .. } => delay.for_each_ref(&mut push),
                RtlStmtOp::Finish => {}
            }
        }
        for a in &self.assigns {
            a.rhs.for_each_ref(&mut push);
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::RtlBinOp;

    fn assign_stmt(lhs: u32, next: Option<RtlStmtId>) -> RtlStmt {
        RtlStmt {
            op: RtlStmtOp::BlockingAssign {
                lhs: Ident::from_raw(lhs),
                rhs: RtlExpr::Ref(Ident::from_raw(lhs + 10)),
            },
            next,
        }
    }

    #[test]
    fn new_process_is_empty() {
        let p = RtlProcess::new(RtlProcessKind::Always);
        assert_eq!(p.kind, RtlProcessKind::Always);
        assert!(p.first_stmt.is_none());
        assert!(p.stmts.is_empty());
        assert!(p.assigns.is_empty());
        assert!(p.links_are_internal());
    }

    #[test]
    fn links_internal_for_valid_chain() {
        let mut p = RtlProcess::new(RtlProcessKind::Initial);
        let tail = p.stmts.alloc(RtlStmt {
            op: RtlStmtOp::Finish,
            next: None,
        });
        let head = p.stmts.alloc(assign_stmt(1, Some(tail)));
        p.first_stmt = Some(head);
        assert!(p.links_are_internal());
    }

    #[test]
    fn links_external_detected() {
        let mut p = RtlProcess::new(RtlProcessKind::Initial);
        let head = p.stmts.alloc(assign_stmt(1, Some(RtlStmtId::from_raw(99))));
        p.first_stmt = Some(head);
        assert!(!p.links_are_internal());
    }

    #[test]
    fn first_stmt_out_of_arena_detected() {
        let mut p = RtlProcess::new(RtlProcessKind::Initial);
        p.first_stmt = Some(RtlStmtId::from_raw(0));
        assert!(!p.links_are_internal());
    }

    #[test]
    fn has_delay() {
        let mut p = RtlProcess::new(RtlProcessKind::Always);
        assert!(!p.has_delay());
        p.stmts.alloc(RtlStmt {
            op: RtlStmtOp::Delay {
                delay: RtlExpr::constant("5"),
                body: None,
            },
            next: None,
        });
        assert!(p.has_delay());
    }

    #[test]
    fn read_signals_deduplicates() {
        let mut p = RtlProcess::new(RtlProcessKind::Always);
        p.assigns.push(RtlAssign {
            kind: RtlAssignKind::Blocking,
            lhs: Ident::from_raw(1),
            rhs: RtlExpr::Binary {
                op: RtlBinOp::And,
                lhs: Box::new(RtlExpr::Ref(Ident::from_raw(2))),
                rhs: Box::new(RtlExpr::Ref(Ident::from_raw(2))),
            },
        });
        assert_eq!(p.read_signals(), vec![Ident::from_raw(2)]);
    }

    #[test]
    fn deep_copy_links_stay_in_clone() {
        let mut p = RtlProcess::new(RtlProcessKind::Initial);
        let tail = p.stmts.alloc(RtlStmt {
            op: RtlStmtOp::Finish,
            next: None,
        });
        let head = p.stmts.alloc(assign_stmt(1, Some(tail)));
        p.first_stmt = Some(head);

        let copy = p.clone();
        // The clone's links are valid indices into the clone's own arena.
        assert!(copy.links_are_internal());
        assert_eq!(copy.first_stmt, p.first_stmt);
        assert_eq!(copy.stmts.len(), p.stmts.len());
    }
}
