//! Lexical analyzer for the supported SystemVerilog subset.
//!
//! Converts source text into a sequence of [`Token`]s, handling
//! case-sensitive keywords, sized/based literals with x/z digits
//! (`4'b10x0`), string literals, and line and block comments. Errors are
//! reported to the [`DiagnosticSink`] and produce [`TokenKind::Error`]
//! tokens.

use crate::token::{lookup_keyword, Token, TokenKind};
use svtool_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use svtool_source::{FileId, Span};

/// Lexes the given source text into a vector of tokens.
///
/// Whitespace and comments are skipped. The returned vector always ends
/// with a [`TokenKind::Eof`] token. Lexer errors are reported via the
/// diagnostic sink and produce [`TokenKind::Error`] tokens in the output.
pub fn lex(source: &str, file: FileId, sink: &DiagnosticSink) -> Vec<Token> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        file,
        sink,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    file: FileId,
    sink: &'a DiagnosticSink,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(self.file, self.pos as u32, self.pos as u32),
                });
                break;
            }
            tokens.push(self.next_token());
        }
        tokens
    }

    fn peek(&self) -> u8 {
        if self.pos < self.source.len() {
            self.source[self.pos]
        } else {
            0
        }
    }

    fn peek_at(&self, offset: usize) -> u8 {
        let idx = self.pos + offset;
        if idx < self.source.len() {
            self.source[idx]
        } else {
            0
        }
    }

    fn advance(&mut self) -> u8 {
        let b = self.source[self.pos];
        self.pos += 1;
        b
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file, start as u32, self.pos as u32)
    }

    fn error(&self, msg: &str, span: Span) {
        self.sink.emit(Diagnostic::error(
            DiagnosticCode::new(Category::Error, 100),
            msg,
            span,
        ));
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos >= self.source.len() {
                return;
            }
            // Line comment: //
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                self.pos += 2;
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            // Block comment: /* ... */ (non-nesting)
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos >= self.source.len() {
                        self.error("unterminated block comment", self.span_from(start));
                        break;
                    }
                    if self.source[self.pos] == b'*' && self.peek_at(1) == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            break;
        }
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.peek();

        if is_ident_start(b) {
            return self.lex_identifier_or_keyword(start);
        }

        // System identifier: $name
        if b == b'$' {
            return self.lex_system_identifier(start);
        }

        // Numeric literals (possibly sized: 4'b1010)
        if b.is_ascii_digit() {
            return self.lex_number(start);
        }

        // Unsized based literal: 'b1010, 'hFF etc.
        if b == b'\'' && self.pos + 1 < self.source.len() {
            let next = self.peek_at(1).to_ascii_lowercase();
            if matches!(next, b'b' | b'o' | b'd' | b'h') {
                return self.lex_unsized_based_literal(start);
            }
        }

        if b == b'"' {
            return self.lex_string(start);
        }

        self.lex_operator(start)
    }

    fn lex_identifier_or_keyword(&mut self, start: usize) -> Token {
        while self.pos < self.source.len() && is_ident_char(self.source[self.pos]) {
            self.pos += 1;
        }

        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
        let kind = lookup_keyword(text).unwrap_or(TokenKind::Identifier);

        Token {
            kind,
            span: self.span_from(start),
        }
    }

    fn lex_system_identifier(&mut self, start: usize) -> Token {
        self.pos += 1; // skip $
        if self.pos < self.source.len() && is_ident_start(self.source[self.pos]) {
            while self.pos < self.source.len() && is_ident_char(self.source[self.pos]) {
                self.pos += 1;
            }
            Token {
                kind: TokenKind::SystemIdentifier,
                span: self.span_from(start),
            }
        } else {
            self.error("expected identifier after '$'", self.span_from(start));
            Token {
                kind: TokenKind::Error,
                span: self.span_from(start),
            }
        }
    }

    fn lex_number(&mut self, start: usize) -> Token {
        self.eat_decimal_digits();

        // Sized literal: digits ' base digits
        if self.pos < self.source.len() && self.source[self.pos] == b'\'' {
            let next = if self.pos + 1 < self.source.len() {
                self.source[self.pos + 1].to_ascii_lowercase()
            } else {
                0
            };
            if matches!(next, b'b' | b'o' | b'd' | b'h') {
                self.pos += 2; // skip ' and base letter
                self.eat_based_digits(next);
                return Token {
                    kind: TokenKind::SizedLiteral,
                    span: self.span_from(start),
                };
            }
        }

        Token {
            kind: TokenKind::IntLiteral,
            span: self.span_from(start),
        }
    }

    /// Lex an unsized based literal starting with a tick: `'b1010`, `'hFF`.
    fn lex_unsized_based_literal(&mut self, start: usize) -> Token {
        self.pos += 1; // skip '
        let base = self.source[self.pos].to_ascii_lowercase();
        self.pos += 1; // skip base letter
        self.eat_based_digits(base);
        Token {
            kind: TokenKind::SizedLiteral,
            span: self.span_from(start),
        }
    }

    fn eat_decimal_digits(&mut self) {
        while self.pos < self.source.len() {
            let ch = self.source[self.pos];
            if ch.is_ascii_digit() || ch == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn eat_based_digits(&mut self, base: u8) {
        while self.pos < self.source.len() {
            let ch = self.source[self.pos].to_ascii_lowercase();
            let valid = match base {
                b'b' => matches!(ch, b'0' | b'1' | b'x' | b'z' | b'?' | b'_'),
                b'o' => matches!(ch, b'0'..=b'7' | b'x' | b'z' | b'?' | b'_'),
                b'd' => ch.is_ascii_digit() || ch == b'_',
                b'h' => ch.is_ascii_hexdigit() || matches!(ch, b'x' | b'z' | b'?' | b'_'),
                _ => false,
            };
            if valid {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn lex_string(&mut self, start: usize) -> Token {
        self.pos += 1; // skip opening "
        loop {
            if self.pos >= self.source.len() || self.source[self.pos] == b'\n' {
                self.error("unterminated string literal", self.span_from(start));
                return Token {
                    kind: TokenKind::Error,
                    span: self.span_from(start),
                };
            }
            if self.source[self.pos] == b'\\' {
                // C-style escape: skip the next character
                self.pos += 2;
                continue;
            }
            if self.source[self.pos] == b'"' {
                self.pos += 1; // skip closing "
                return Token {
                    kind: TokenKind::StringLiteral,
                    span: self.span_from(start),
                };
            }
            self.pos += 1;
        }
    }

    fn lex_operator(&mut self, start: usize) -> Token {
        let b = self.advance();
        let kind = match b {
            b'(' => TokenKind::LeftParen,
            b')' => TokenKind::RightParen,
            b'[' => TokenKind::LeftBracket,
            b']' => TokenKind::RightBracket,
            b'{' => TokenKind::LeftBrace,
            b'}' => TokenKind::RightBrace,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b':' => TokenKind::Colon,
            b'.' => TokenKind::Dot,
            b'#' => TokenKind::Hash,
            b'@' => TokenKind::At,
            b'?' => TokenKind::Question,
            b'=' => {
                if self.peek() == b'=' {
                    self.pos += 1;
                    if self.peek() == b'=' {
                        self.pos += 1;
                        TokenKind::TripleEquals
                    } else {
                        TokenKind::DoubleEquals
                    }
                } else {
                    TokenKind::Equals
                }
            }
            b'!' => {
                if self.peek() == b'=' {
                    self.pos += 1;
                    if self.peek() == b'=' {
                        self.pos += 1;
                        TokenKind::BangDoubleEquals
                    } else {
                        TokenKind::BangEquals
                    }
                } else {
                    TokenKind::Bang
                }
            }
            b'<' => {
                if self.peek() == b'=' {
                    self.pos += 1;
                    TokenKind::LessEquals
                } else if self.peek() == b'<' {
                    self.pos += 1;
                    if self.peek() == b'<' {
                        self.pos += 1;
                        TokenKind::TripleLess
                    } else {
                        TokenKind::DoubleLess
                    }
                } else {
                    TokenKind::LessThan
                }
            }
            b'>' => {
                if self.peek() == b'=' {
                    self.pos += 1;
                    TokenKind::GreaterEquals
                } else if self.peek() == b'>' {
                    self.pos += 1;
                    if self.peek() == b'>' {
                        self.pos += 1;
                        TokenKind::TripleGreater
                    } else {
                        TokenKind::DoubleGreater
                    }
                } else {
                    TokenKind::GreaterThan
                }
            }
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'&' => {
                if self.peek() == b'&' {
                    self.pos += 1;
                    TokenKind::DoubleAmpersand
                } else {
                    TokenKind::Ampersand
                }
            }
            b'|' => {
                if self.peek() == b'|' {
                    self.pos += 1;
                    TokenKind::DoublePipe
                } else {
                    TokenKind::Pipe
                }
            }
            b'^' => {
                if self.peek() == b'~' {
                    self.pos += 1;
                    TokenKind::TildeCaret
                } else {
                    TokenKind::Caret
                }
            }
            b'~' => {
                if self.peek() == b'^' {
                    self.pos += 1;
                    TokenKind::TildeCaret
                } else {
                    TokenKind::Tilde
                }
            }
            _ => {
                self.error(
                    &format!("unrecognized character '{}'", b as char),
                    self.span_from(start),
                );
                TokenKind::Error
            }
        };
        Token {
            kind,
            span: self.span_from(start),
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
