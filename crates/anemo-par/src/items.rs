//! Top-level declarations: glyphs and their signatures.

use anemo_lex::TokenKind;
use anemo_util::Diagnostic;

use crate::ast::{Function, Param, Type};
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_function(&mut self) -> Result<Function, Diagnostic> {
        let kw = self.expect(TokenKind::Glyph, "expected glyph")?;
        let span = kw.span;
        let name = self
            .expect(TokenKind::Ident, "expected function name after glyph")?
            .text()
            .to_string();

        self.expect(TokenKind::LBracket, "expected '[' to start parameter list")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RBracket) {
            loop {
                let name_tok = self.expect(TokenKind::Ident, "expected parameter name")?;
                let param_span = name_tok.span;
                let param_name = name_tok.text().to_string();
                self.expect(TokenKind::Colon, "expected ':' after parameter name")?;
                let ty = self.parse_type()?;

                params.push(Param {
                    name: param_name,
                    ty,
                    span: param_span,
                });

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBracket, "expected ']' to close parameter list")?;

        self.expect(TokenKind::Yields, "expected yields after parameter list")?;
        let return_type = self.parse_type()?;
        self.expect(TokenKind::Newline, "expected newline after function signature")?;
        self.skip_newlines();

        let body = self.parse_block_until(TokenKind::Seal, TokenKind::Seal)?;
        self.expect(TokenKind::Seal, "expected seal to close function")?;
        self.expect_line_end()?;

        Ok(Function {
            name,
            params,
            return_type,
            body,
            span,
        })
    }

    pub(crate) fn parse_type(&mut self) -> Result<Type, Diagnostic> {
        let t = self.peek();
        if self.eat(TokenKind::Ember) {
            return Ok(Type::Int);
        }
        if self.eat(TokenKind::Pulse) {
            return Ok(Type::Bool);
        }
        if self.eat(TokenKind::Text) {
            return Ok(Type::Text);
        }
        if self.eat(TokenKind::Mist) {
            return Ok(Type::Unit);
        }
        Err(self.error_at(t.span, "expected type keyword ember|pulse|text|mist"))
    }
}
