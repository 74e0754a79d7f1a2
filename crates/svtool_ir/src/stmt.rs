//! Procedural RTL statements.
//!
//! Statements form a linear chain owned by an arena on the process; the
//! `next` and delayed-body links are [`RtlStmtId`] indices into that arena.
//! The executor walks the chain at high frequency, and index links keep a
//! deep copy from aliasing the source's storage: a cloned arena's IDs are
//! the clone's own.

use crate::arena::ArenaId;
use crate::expr::RtlExpr;
use serde::{Deserialize, Serialize};
use svtool_common::Ident;

/// Opaque ID of a statement within its owning process arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct RtlStmtId(u32);

impl RtlStmtId {
    /// Creates an ID from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl ArenaId for RtlStmtId {
    fn from_raw(index: u32) -> Self {
        Self(index)
    }

    fn as_raw(self) -> u32 {
        self.0
    }
}

/// The operation performed by one statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RtlStmtOp {
    /// A blocking assignment: evaluate and drive immediately.
    BlockingAssign {
        /// The driven net.
        lhs: Ident,
        /// The value expression.
        rhs: RtlExpr,
    },
    /// A non-blocking assignment: evaluate now, apply in the NBA region.
    NonBlockingAssign {
        /// The driven net.
        lhs: Ident,
        /// The value expression.
        rhs: RtlExpr,
    },
    /// A delay: suspend the thread, resume at `body` after the delay.
    Delay {
        /// The delay expression (integer projection gives the tick count).
        delay: RtlExpr,
        /// Head of the delayed statement's chain, or `None` for a bare `#n;`.
        body: Option<RtlStmtId>,
    },
    /// `$finish`: request a clean stop of the simulation.
    Finish,
}

/// One statement in a process's chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtlStmt {
    /// The operation.
    pub op: RtlStmtOp,
    /// The statement that follows this one, or `None` at the chain tail.
    pub next: Option<RtlStmtId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn id_roundtrip() {
        let id = RtlStmtId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
    }

    #[test]
    fn chain_in_arena() {
        let mut stmts: Arena<RtlStmtId, RtlStmt> = Arena::new();
        let b = stmts.alloc(RtlStmt {
            op: RtlStmtOp::Finish,
            next: None,
        });
        let a = stmts.alloc(RtlStmt {
            op: RtlStmtOp::BlockingAssign {
                lhs: Ident::from_raw(1),
                rhs: RtlExpr::constant("1"),
            },
            next: Some(b),
        });
        assert_eq!(stmts[a].next, Some(b));
        assert!(stmts[b].next.is_none());
    }

    #[test]
    fn delay_body_link() {
        let mut stmts: Arena<RtlStmtId, RtlStmt> = Arena::new();
        let body = stmts.alloc(RtlStmt {
            op: RtlStmtOp::BlockingAssign {
                lhs: Ident::from_raw(1),
                rhs: RtlExpr::constant("1"),
            },
            next: None,
        });
        let delay = stmts.alloc(RtlStmt {
            op: RtlStmtOp::Delay {
                delay: RtlExpr::constant("10"),
                body: Some(body),
            },
            next: None,
        });
        match &stmts[delay].op {
            RtlStmtOp::Delay { body: b, .. } => assert_eq!(*b, Some(body)),
            other => panic!("expected Delay, got {other:?}"),
        }
    }

    #[test]
    fn serde_roundtrip() {
        let s = RtlStmt {
            op: RtlStmtOp::NonBlockingAssign {
                lhs: Ident::from_raw(2),
                rhs: RtlExpr::constant("1'b0"),
            },
            next: Some(RtlStmtId::from_raw(3)),
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: RtlStmt = serde_json::from_str(&json).unwrap();
        assert_eq!(back.next, Some(RtlStmtId::from_raw(3)));
    }
}
