//! Core parser infrastructure and top-level parsing rules.
//!
//! The [`Parser`] struct provides primitive operations (advance, expect,
//! eat) and error recovery, while top-level methods parse designs, modules,
//! and port lists. Declaration, statement, and expression rules live in the
//! sibling modules.

use crate::ast::*;
use crate::token::{Token, TokenKind};
use svtool_common::{Ident, Interner};
use svtool_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use svtool_source::{FileId, Span};

/// A recursive descent parser for the supported SystemVerilog subset.
///
/// The parser consumes a token stream produced by the lexer and builds a
/// [`Design`] AST. Errors are reported to the diagnostic sink; recovery
/// skips to the next `;` and substitutes placeholder nodes so a single
/// mistake does not cascade.
pub struct Parser<'src> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) source: &'src str,
    #[allow(dead_code)]
    file: FileId,
    pub(crate) interner: &'src Interner,
    pub(crate) sink: &'src DiagnosticSink,
}

impl<'src> Parser<'src> {
    /// Creates a new parser from a token stream produced by the lexer.
    ///
    /// The `tokens` must have been lexed from `source` for the given `file`.
    /// Identifiers are interned via `interner`, and parse errors are emitted
    /// to `sink`.
    pub fn new(
        tokens: Vec<Token>,
        source: &'src str,
        file: FileId,
        interner: &'src Interner,
        sink: &'src DiagnosticSink,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            file,
            interner,
            sink,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    /// Returns the kind of the current token.
    pub(crate) fn current(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    /// Returns the source text of the current token.
    pub(crate) fn current_text(&self) -> &'src str {
        let span = self.current_span();
        &self.source[span.start as usize..span.end as usize]
    }

    /// Returns `true` if the current token matches the given kind.
    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    /// Returns `true` if the parser is at end of file.
    pub(crate) fn at_eof(&self) -> bool {
        self.current() == TokenKind::Eof
    }

    /// Returns the span of the previous token.
    pub(crate) fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    /// Advances past the current token.
    pub(crate) fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    /// Consumes the current token if it matches. Returns `true` if consumed.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to match the given kind. Emits an error if not.
    pub(crate) fn expect(&mut self, kind: TokenKind) {
        if !self.eat(kind) {
            self.expected(&format!("{kind:?}"));
        }
    }

    /// Expects and returns an identifier. Emits an error and returns a dummy if not.
    pub(crate) fn expect_ident(&mut self) -> Ident {
        if self.at(TokenKind::Identifier) {
            let text = self.current_text();
            let ident = self.interner.get_or_intern(text);
            self.advance();
            ident
        } else {
            self.expected("identifier");
            self.interner.get_or_intern("<missing>")
        }
    }

    /// Returns the kind of the token at pos+offset.
    pub(crate) fn peek_kind(&self, offset: usize) -> TokenKind {
        let idx = self.pos + offset;
        if idx < self.tokens.len() {
            self.tokens[idx].kind
        } else {
            TokenKind::Eof
        }
    }

    // ========================================================================
    // Error handling and recovery
    // ========================================================================

    /// Emits an error diagnostic at the current position.
    pub(crate) fn error(&self, msg: &str) {
        self.sink.emit(Diagnostic::error(
            DiagnosticCode::new(Category::Error, 101),
            msg,
            self.current_span(),
        ));
    }

    /// Emits an "expected X" error at the current position.
    pub(crate) fn expected(&self, what: &str) {
        let actual = format!("{:?}", self.current());
        self.sink.emit(Diagnostic::error(
            DiagnosticCode::new(Category::Error, 101),
            format!("expected {what}, found {actual}"),
            self.current_span(),
        ));
    }

    /// Recovers to a semicolon, consuming everything before it (including it).
    pub(crate) fn recover_to_semicolon(&mut self) {
        while !self.at_eof() && !self.at(TokenKind::Semicolon) {
            self.advance();
        }
        self.eat(TokenKind::Semicolon);
    }

    // ========================================================================
    // Top-level parsing
    // ========================================================================

    /// Parses a complete design (a sequence of module declarations).
    pub fn parse_design(&mut self) -> Design {
        let start = self.current_span();
        let mut modules = Vec::new();

        while !self.at_eof() {
            if self.at(TokenKind::Module) {
                modules.push(self.parse_module());
            } else {
                self.error("expected 'module'");
                self.advance();
            }
        }

        let span = if modules.is_empty() {
            start
        } else {
            start.merge(self.prev_span())
        };

        Design { modules, span }
    }

    /// Parses a module declaration.
    fn parse_module(&mut self) -> ModuleDecl {
        let start = self.current_span();
        self.expect(TokenKind::Module);
        let name = self.expect_ident();

        let ports = if self.at(TokenKind::LeftParen) {
            self.parse_port_list()
        } else {
            Vec::new()
        };

        self.expect(TokenKind::Semicolon);

        let items = self.parse_module_items();

        self.expect(TokenKind::Endmodule);
        let span = start.merge(self.prev_span());

        ModuleDecl {
            name,
            ports,
            items,
            span,
        }
    }

    /// Parses an ANSI port list: `( [port_decl {, port_decl}] )`.
    ///
    /// Direction and type are sticky: `(input a, b, output c)` gives `b`
    /// the direction and type of `a`.
    fn parse_port_list(&mut self) -> Vec<PortDecl> {
        self.expect(TokenKind::LeftParen);

        let mut ports = Vec::new();
        if self.eat(TokenKind::RightParen) {
            return ports;
        }

        let mut direction = Direction::Input;
        let mut ty = DataType {
            kind: DataTypeKind::Wire,
            range: None,
        };

        loop {
            let start = self.current_span();

            if self.current().is_direction() {
                direction = match self.current() {
                    TokenKind::Input => Direction::Input,
                    TokenKind::Output => Direction::Output,
                    _ => Direction::Inout,
                };
                self.advance();
                // A new direction resets the sticky type to a scalar wire.
                ty = DataType {
                    kind: DataTypeKind::Wire,
                    range: None,
                };
                if self.current().is_data_type() || self.at(TokenKind::LeftBracket) {
                    ty = self.parse_data_type();
                }
            }

            let name = self.expect_ident();
            let span = start.merge(self.prev_span());
            ports.push(PortDecl {
                direction,
                ty: ty.clone(),
                name,
                span,
            });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RightParen);
        ports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_source;

    fn parse_ok(src: &str) -> (Design, Interner) {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let design = parse_source(src, FileId::from_raw(0), &interner, &sink);
        assert!(!sink.has_errors(), "errors: {:?}", sink.diagnostics());
        (design, interner)
    }

    #[test]
    fn empty_module() {
        let (design, interner) = parse_ok("module m; endmodule");
        assert_eq!(design.modules.len(), 1);
        assert_eq!(interner.resolve(design.modules[0].name), "m");
        assert!(design.modules[0].ports.is_empty());
        assert!(design.modules[0].items.is_empty());
    }

    #[test]
    fn module_with_empty_port_list() {
        let (design, _) = parse_ok("module m(); endmodule");
        assert!(design.modules[0].ports.is_empty());
    }

    #[test]
    fn module_with_ports() {
        let (design, interner) = parse_ok("module m(input clk, output y); endmodule");
        let ports = &design.modules[0].ports;
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].direction, Direction::Input);
        assert_eq!(interner.resolve(ports[0].name), "clk");
        assert_eq!(ports[1].direction, Direction::Output);
        assert_eq!(interner.resolve(ports[1].name), "y");
    }

    #[test]
    fn port_direction_is_sticky() {
        let (design, _) = parse_ok("module m(input a, b, output c); endmodule");
        let ports = &design.modules[0].ports;
        assert_eq!(ports.len(), 3);
        assert_eq!(ports[0].direction, Direction::Input);
        assert_eq!(ports[1].direction, Direction::Input);
        assert_eq!(ports[2].direction, Direction::Output);
    }

    #[test]
    fn port_with_packed_range() {
        let (design, _) = parse_ok("module m(output logic [7:0] data); endmodule");
        let ports = &design.modules[0].ports;
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].ty.kind, DataTypeKind::Logic);
        assert!(ports[0].ty.range.is_some());
    }

    #[test]
    fn multiple_modules() {
        let (design, _) = parse_ok("module a; endmodule module b; endmodule");
        assert_eq!(design.modules.len(), 2);
    }

    #[test]
    fn missing_endmodule_reports_error() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let _ = parse_source("module m; ", FileId::from_raw(0), &interner, &sink);
        assert!(sink.has_errors());
    }

    #[test]
    fn stray_token_reports_error() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let design = parse_source(
            "wire w; module m; endmodule",
            FileId::from_raw(0),
            &interner,
            &sink,
        );
        assert!(sink.has_errors());
        // Recovery still finds the module
        assert_eq!(design.modules.len(), 1);
    }
}
