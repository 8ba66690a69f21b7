//! anemo-lex - Lexical analysis for the Anemo language.
//!
//! Transforms source text into a flat token stream terminated by a
//! single end-of-file token. Whitespace (space, tab, carriage return)
//! is skipped, `#` line comments run to end-of-line, and newlines are
//! emitted as explicit tokens because the grammar is newline-terminated.
//!
//! The lexer is greedy and fail-fast: the first unexpected byte,
//! unterminated string or unsupported escape aborts with a
//! position-qualified diagnostic.

pub mod cursor;
pub mod token;

pub use token::{keyword_from_ident, Token, TokenKind};

use anemo_util::{Diagnostic, Span};
use cursor::Cursor;

struct Lexer<'a> {
    file: &'a str,
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
}

/// Tokenizes `src`, which was read from `file` (used for diagnostics).
pub fn lex_source(file: &str, src: &str) -> Result<Vec<Token>, Diagnostic> {
    Lexer {
        file,
        cursor: Cursor::new(src),
        tokens: Vec::new(),
    }
    .run()
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Result<Vec<Token>, Diagnostic> {
        while !self.cursor.is_at_end() {
            let c = self.cursor.current_char();
            let span = Span::new(self.cursor.line(), self.cursor.column());

            match c {
                ' ' | '\t' | '\r' => self.cursor.advance(),
                '#' => {
                    while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                        self.cursor.advance();
                    }
                }
                '\n' => {
                    self.cursor.advance();
                    self.tokens.push(Token::simple(TokenKind::Newline, span));
                }
                '0'..='9' => self.lex_number(span),
                c if c.is_ascii_alphabetic() || c == '_' => self.lex_ident_or_keyword(span),
                '"' => self.lex_string(span)?,
                '+' => self.punct(TokenKind::Plus, span),
                '-' => self.punct(TokenKind::Minus, span),
                '*' => self.punct(TokenKind::Star, span),
                '/' => self.punct(TokenKind::Slash, span),
                '=' => self.punct(TokenKind::Assign, span),
                ',' => self.punct(TokenKind::Comma, span),
                ':' => self.punct(TokenKind::Colon, span),
                '[' => self.punct(TokenKind::LBracket, span),
                ']' => self.punct(TokenKind::RBracket, span),
                c => {
                    return Err(Diagnostic::at(
                        self.file,
                        span,
                        format!("unexpected character '{c}'"),
                    ));
                }
            }
        }

        let eof_span = Span::new(self.cursor.line(), self.cursor.column());
        self.tokens.push(Token::simple(TokenKind::Eof, eof_span));
        Ok(self.tokens)
    }

    fn punct(&mut self, kind: TokenKind, span: Span) {
        self.cursor.advance();
        self.tokens.push(Token::simple(kind, span));
    }

    fn lex_number(&mut self, span: Span) {
        let start = self.cursor.position();
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        let digits = self.cursor.slice_from(start);

        // Out-of-range literals wrap; runtime arithmetic is native
        // two's-complement anyway.
        let value = digits.bytes().fold(0i64, |acc, b| {
            acc.wrapping_mul(10).wrapping_add(i64::from(b - b'0'))
        });

        self.tokens.push(Token {
            kind: TokenKind::Int,
            lexeme: Some(digits.to_string()),
            int_value: value,
            span,
        });
    }

    fn lex_ident_or_keyword(&mut self, span: Span) {
        let start = self.cursor.position();
        while {
            let c = self.cursor.current_char();
            c.is_ascii_alphanumeric() || c == '_'
        } {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);

        match keyword_from_ident(text) {
            Some(kind) => self.tokens.push(Token::simple(kind, span)),
            None => self.tokens.push(Token {
                kind: TokenKind::Ident,
                lexeme: Some(text.to_string()),
                int_value: 0,
                span,
            }),
        }
    }

    fn lex_string(&mut self, span: Span) -> Result<(), Diagnostic> {
        self.cursor.advance();

        let mut content = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(Diagnostic::at(self.file, span, "unterminated string literal"));
            }

            let c = self.cursor.current_char();
            if c == '"' {
                self.cursor.advance();
                break;
            }
            if c == '\n' {
                return Err(Diagnostic::at(self.file, span, "newline in string literal"));
            }

            if c == '\\' {
                self.cursor.advance();
                if self.cursor.is_at_end() {
                    return Err(Diagnostic::at(self.file, span, "unterminated string escape"));
                }
                let esc = self.cursor.current_char();
                self.cursor.advance();
                match esc {
                    'n' => content.push('\n'),
                    't' => content.push('\t'),
                    'r' => content.push('\r'),
                    '"' => content.push('"'),
                    '\\' => content.push('\\'),
                    esc => {
                        return Err(Diagnostic::at(
                            self.file,
                            span,
                            format!("unsupported escape sequence \\{esc}"),
                        ));
                    }
                }
            } else {
                content.push(c);
                self.cursor.advance();
            }
        }

        self.tokens.push(Token {
            kind: TokenKind::Str,
            lexeme: Some(content),
            int_value: 0,
            span,
        });
        Ok(())
    }
}
