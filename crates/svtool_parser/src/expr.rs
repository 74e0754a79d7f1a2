//! Expression parsing via precedence climbing.

use crate::ast::*;
use crate::parser::Parser;
use crate::token::TokenKind;

/// Binding powers for binary operators, weakest first. The ternary operator
/// binds weaker than everything here and is handled separately.
fn binary_op(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    let op = match kind {
        TokenKind::DoublePipe => (BinaryOp::LogicalOr, 1),
        TokenKind::DoubleAmpersand => (BinaryOp::LogicalAnd, 2),
        TokenKind::Pipe => (BinaryOp::BitOr, 3),
        TokenKind::Caret => (BinaryOp::BitXor, 4),
        TokenKind::Ampersand => (BinaryOp::BitAnd, 5),
        TokenKind::DoubleEquals => (BinaryOp::Eq, 6),
        TokenKind::BangEquals => (BinaryOp::Neq, 6),
        TokenKind::TripleEquals => (BinaryOp::CaseEq, 6),
        TokenKind::BangDoubleEquals => (BinaryOp::CaseNeq, 6),
        TokenKind::LessThan => (BinaryOp::Lt, 7),
        TokenKind::LessEquals => (BinaryOp::Le, 7),
        TokenKind::GreaterThan => (BinaryOp::Gt, 7),
        TokenKind::GreaterEquals => (BinaryOp::Ge, 7),
        TokenKind::DoubleLess => (BinaryOp::Shl, 8),
        TokenKind::DoubleGreater => (BinaryOp::Shr, 8),
        TokenKind::TripleLess => (BinaryOp::Ashl, 8),
        TokenKind::TripleGreater => (BinaryOp::Ashr, 8),
        TokenKind::Plus => (BinaryOp::Add, 9),
        TokenKind::Minus => (BinaryOp::Sub, 9),
        TokenKind::Star => (BinaryOp::Mul, 10),
        TokenKind::Slash => (BinaryOp::Div, 10),
        TokenKind::Percent => (BinaryOp::Mod, 10),
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    /// Parses a full expression (ternary is the weakest-binding operator).
    pub(crate) fn parse_expr(&mut self) -> Expression {
        let start = self.current_span();
        let cond = self.parse_binary(1);
        if self.eat(TokenKind::Question) {
            let then_expr = self.parse_expr();
            self.expect(TokenKind::Colon);
            let else_expr = self.parse_expr();
            Expression::Ternary {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
                span: start.merge(self.prev_span()),
            }
        } else {
            cond
        }
    }

    /// Parses binary operators with binding power >= `min_bp`
    /// (left-associative precedence climbing).
    fn parse_binary(&mut self, min_bp: u8) -> Expression {
        let start = self.current_span();
        let mut lhs = self.parse_unary();

        while let Some((op, bp)) = binary_op(self.current()) {
            if bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(bp + 1);
            lhs = Expression::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span: start.merge(self.prev_span()),
            };
        }
        lhs
    }

    /// Parses prefix unary operators.
    fn parse_unary(&mut self) -> Expression {
        let start = self.current_span();
        let op = match self.current() {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Bang => Some(UnaryOp::LogicalNot),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary();
            return Expression::Unary {
                op,
                operand: Box::new(operand),
                span: start.merge(self.prev_span()),
            };
        }
        self.parse_postfix()
    }

    /// Parses postfix bit selects `base[index]`.
    fn parse_postfix(&mut self) -> Expression {
        let start = self.current_span();
        let mut expr = self.parse_primary();
        while self.at(TokenKind::LeftBracket) {
            self.advance();
            let index = self.parse_expr();
            if self.at(TokenKind::Colon) {
                self.error("part selects are not supported; expected a single bit index");
                while !self.at_eof() && !self.at(TokenKind::RightBracket) {
                    self.advance();
                }
            }
            self.expect(TokenKind::RightBracket);
            expr = Expression::BitSelect {
                base: Box::new(expr),
                index: Box::new(index),
                span: start.merge(self.prev_span()),
            };
        }
        expr
    }

    /// Parses a primary expression: literal, identifier, parenthesized
    /// expression, concatenation, or replication.
    pub(crate) fn parse_primary(&mut self) -> Expression {
        let start = self.current_span();
        match self.current() {
            TokenKind::IntLiteral | TokenKind::SizedLiteral => {
                let text = self.current_text().to_string();
                self.advance();
                Expression::Number { text, span: start }
            }
            TokenKind::StringLiteral => {
                let raw = self.current_text();
                let text = raw[1..raw.len() - 1].to_string();
                self.advance();
                Expression::Str { text, span: start }
            }
            TokenKind::Identifier => {
                let name = self.interner.get_or_intern(self.current_text());
                self.advance();
                Expression::Ref { name, span: start }
            }
            TokenKind::SystemIdentifier => {
                let name = self.interner.get_or_intern(self.current_text());
                self.advance();
                Expression::Ref { name, span: start }
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect(TokenKind::RightParen);
                inner
            }
            TokenKind::LeftBrace => self.parse_concat_or_replicate(),
            _ => {
                self.expected("expression");
                self.advance();
                Expression::Number {
                    text: "0".to_string(),
                    span: start,
                }
            }
        }
    }

    /// Parses `{a, b, c}` or `{N{a, b}}` after seeing `{`.
    fn parse_concat_or_replicate(&mut self) -> Expression {
        let start = self.current_span();
        self.expect(TokenKind::LeftBrace);
        let first = self.parse_expr();

        if self.at(TokenKind::LeftBrace) {
            // Replication: {count{elems}}
            self.advance();
            let mut elems = vec![self.parse_expr()];
            while self.eat(TokenKind::Comma) {
                elems.push(self.parse_expr());
            }
            self.expect(TokenKind::RightBrace);
            self.expect(TokenKind::RightBrace);
            return Expression::Replicate {
                count: Box::new(first),
                elems,
                span: start.merge(self.prev_span()),
            };
        }

        let mut elems = vec![first];
        while self.eat(TokenKind::Comma) {
            elems.push(self.parse_expr());
        }
        self.expect(TokenKind::RightBrace);
        Expression::Concat {
            elems,
            span: start.merge(self.prev_span()),
        }
    }
}
