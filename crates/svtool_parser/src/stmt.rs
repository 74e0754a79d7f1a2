//! Statement and always/initial construct parsing rules.

use crate::ast::*;
use crate::parser::Parser;
use crate::token::TokenKind;

impl Parser<'_> {
    /// Parses an always construct: flavor keyword, optional event control,
    /// then the body statement.
    pub(crate) fn parse_always(&mut self) -> AlwaysConstruct {
        let start = self.current_span();
        let kind = match self.current() {
            TokenKind::AlwaysComb => AlwaysKind::AlwaysComb,
            TokenKind::AlwaysFf => AlwaysKind::AlwaysFf,
            TokenKind::AlwaysLatch => AlwaysKind::AlwaysLatch,
            _ => AlwaysKind::Always,
        };
        self.advance();

        let sensitivity = if self.at(TokenKind::At) {
            self.parse_event_control()
        } else {
            SensitivityList::None
        };

        let body = self.parse_statement();

        AlwaysConstruct {
            kind,
            sensitivity,
            body,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses an initial construct.
    pub(crate) fn parse_initial(&mut self) -> InitialConstruct {
        let start = self.current_span();
        self.expect(TokenKind::Initial);
        let body = self.parse_statement();
        InitialConstruct {
            body,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses an event control: `@*`, `@(*)`, or `@( item { or|, item } )`.
    fn parse_event_control(&mut self) -> SensitivityList {
        self.expect(TokenKind::At);

        // @* without parentheses
        if self.eat(TokenKind::Star) {
            return SensitivityList::Star;
        }

        self.expect(TokenKind::LeftParen);
        if self.eat(TokenKind::Star) {
            self.expect(TokenKind::RightParen);
            return SensitivityList::Star;
        }

        let mut items = Vec::new();
        loop {
            let start = self.current_span();
            let edge = if self.eat(TokenKind::Posedge) {
                Some(EdgeKind::Posedge)
            } else if self.eat(TokenKind::Negedge) {
                Some(EdgeKind::Negedge)
            } else {
                None
            };
            let signal = self.parse_expr();
            items.push(SensitivityItem {
                edge,
                signal,
                span: start.merge(self.prev_span()),
            });
            if !(self.eat(TokenKind::Or) || self.eat(TokenKind::Comma)) {
                break;
            }
        }
        self.expect(TokenKind::RightParen);
        SensitivityList::List(items)
    }

    /// Parses one procedural statement.
    pub(crate) fn parse_statement(&mut self) -> Statement {
        let start = self.current_span();
        match self.current() {
            TokenKind::Semicolon => {
                self.advance();
                Statement::Null { span: start }
            }
            TokenKind::Begin => self.parse_block(),
            TokenKind::If => self.parse_if(),
            TokenKind::Case | TokenKind::Casez | TokenKind::Casex => self.parse_case(),
            TokenKind::Hash => {
                self.advance();
                let delay = self.parse_primary();
                let body = Box::new(self.parse_statement());
                Statement::Delay {
                    delay,
                    body,
                    span: start.merge(self.prev_span()),
                }
            }
            TokenKind::SystemIdentifier => {
                let name = self.interner.get_or_intern(self.current_text());
                let span = self.current_span();
                self.advance();
                // Arguments of system tasks are consumed and dropped; only
                // the bare call survives into the AST.
                if self.eat(TokenKind::LeftParen) {
                    while !self.at_eof() && !self.at(TokenKind::RightParen) {
                        self.advance();
                    }
                    self.expect(TokenKind::RightParen);
                }
                self.expect(TokenKind::Semicolon);
                Statement::ExprStmt {
                    expr: Expression::Ref { name, span },
                    span: start.merge(self.prev_span()),
                }
            }
            TokenKind::Identifier => self.parse_assignment(),
            _ => {
                self.expected("statement");
                self.recover_to_semicolon();
                Statement::Null {
                    span: start.merge(self.prev_span()),
                }
            }
        }
    }

    /// Parses `begin [: label] stmts end`.
    fn parse_block(&mut self) -> Statement {
        let start = self.current_span();
        self.expect(TokenKind::Begin);
        let label = if self.eat(TokenKind::Colon) {
            Some(self.expect_ident())
        } else {
            None
        };

        let mut stmts = Vec::new();
        while !self.at_eof() && !self.at(TokenKind::End) {
            let before = self.pos;
            stmts.push(self.parse_statement());
            if self.pos == before {
                self.advance();
            }
        }
        self.expect(TokenKind::End);

        Statement::Block {
            label,
            stmts,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses `if (cond) stmt [else stmt]`.
    fn parse_if(&mut self) -> Statement {
        let start = self.current_span();
        self.expect(TokenKind::If);
        self.expect(TokenKind::LeftParen);
        let cond = self.parse_expr();
        self.expect(TokenKind::RightParen);
        let then_stmt = Box::new(self.parse_statement());
        let else_stmt = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_statement()))
        } else {
            None
        };
        Statement::If {
            cond,
            then_stmt,
            else_stmt,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses `case|casez|casex (expr) items endcase`.
    fn parse_case(&mut self) -> Statement {
        let start = self.current_span();
        let kind = match self.current() {
            TokenKind::Casez => CaseKind::Casez,
            TokenKind::Casex => CaseKind::Casex,
            _ => CaseKind::Case,
        };
        self.advance();
        self.expect(TokenKind::LeftParen);
        let expr = self.parse_expr();
        self.expect(TokenKind::RightParen);

        let mut items = Vec::new();
        while !self.at_eof() && !self.at(TokenKind::Endcase) {
            let item_start = self.current_span();
            let matches = if self.eat(TokenKind::Default) {
                self.eat(TokenKind::Colon);
                Vec::new()
            } else {
                let mut exprs = vec![self.parse_expr()];
                while self.eat(TokenKind::Comma) {
                    exprs.push(self.parse_expr());
                }
                self.expect(TokenKind::Colon);
                exprs
            };
            let body = self.parse_statement();
            items.push(CaseItem {
                matches,
                body,
                span: item_start.merge(self.prev_span()),
            });
        }
        self.expect(TokenKind::Endcase);

        Statement::Case {
            kind,
            expr,
            items,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses a blocking (`=`) or non-blocking (`<=`) assignment statement.
    fn parse_assignment(&mut self) -> Statement {
        let start = self.current_span();
        let lhs = self.parse_lvalue();

        if self.eat(TokenKind::Equals) {
            let rhs = self.parse_expr();
            self.expect(TokenKind::Semicolon);
            Statement::BlockingAssign {
                lhs,
                rhs,
                span: start.merge(self.prev_span()),
            }
        } else if self.eat(TokenKind::LessEquals) {
            let rhs = self.parse_expr();
            self.expect(TokenKind::Semicolon);
            Statement::NonBlockingAssign {
                lhs,
                rhs,
                span: start.merge(self.prev_span()),
            }
        } else {
            self.expected("'=' or '<='");
            self.recover_to_semicolon();
            Statement::Null {
                span: start.merge(self.prev_span()),
            }
        }
    }

    /// Parses an assignment target: an identifier with an optional bit select.
    ///
    /// Targets are deliberately not full expressions; `q <= ~q` would
    /// otherwise parse `q <= ~q` as a comparison.
    pub(crate) fn parse_lvalue(&mut self) -> Expression {
        let start = self.current_span();
        let name = self.expect_ident();
        let mut expr = Expression::Ref { name, span: start };
        while self.at(TokenKind::LeftBracket) {
            self.advance();
            let index = self.parse_expr();
            self.expect(TokenKind::RightBracket);
            expr = Expression::BitSelect {
                base: Box::new(expr),
                index: Box::new(index),
                span: start.merge(self.prev_span()),
            };
        }
        expr
    }
}
