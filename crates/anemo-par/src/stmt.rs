//! Statement and block parsing.

use anemo_lex::TokenKind;
use anemo_util::Diagnostic;

use crate::ast::{Block, Stmt, StmtKind};
use crate::Parser;

impl<'a> Parser<'a> {
    /// Parses statements until end-of-file or one of the two closing
    /// keywords, skipping blank lines. The closers are not consumed.
    pub(crate) fn parse_block_until(
        &mut self,
        end_a: TokenKind,
        end_b: TokenKind,
    ) -> Result<Block, Diagnostic> {
        let mut block = Block::default();
        while !self.check(TokenKind::Eof) && !self.check(end_a) && !self.check(end_b) {
            if self.eat(TokenKind::Newline) {
                continue;
            }
            block.stmts.push(self.parse_stmt()?);
        }
        Ok(block)
    }

    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let span = self.peek().span;

        if self.eat(TokenKind::Bind) {
            let name = self
                .expect(TokenKind::Ident, "expected identifier after bind")?
                .text()
                .to_string();
            self.expect(TokenKind::Assign, "expected '=' in bind statement")?;
            let value = self.parse_expr()?;
            self.expect_line_end()?;
            return Ok(Stmt::new(StmtKind::Bind { name, value }, span));
        }

        if self.eat(TokenKind::Morph) {
            let name = self
                .expect(TokenKind::Ident, "expected identifier after morph")?
                .text()
                .to_string();
            self.expect(TokenKind::Assign, "expected '=' in morph statement")?;
            let value = self.parse_expr()?;
            self.expect_line_end()?;
            return Ok(Stmt::new(StmtKind::Morph { name, value }, span));
        }

        if self.eat(TokenKind::Shift) {
            let name = self
                .expect(TokenKind::Ident, "expected identifier after shift")?
                .text()
                .to_string();
            self.expect(TokenKind::Assign, "expected '=' in shift statement")?;
            let value = self.parse_expr()?;
            self.expect_line_end()?;
            return Ok(Stmt::new(StmtKind::Shift { name, value }, span));
        }

        if self.eat(TokenKind::Fork) {
            let cond = self.parse_expr()?;
            self.expect(TokenKind::Newline, "expected newline after fork condition")?;
            self.skip_newlines();
            let then_block = self.parse_block_until(TokenKind::Otherwise, TokenKind::Seal)?;

            let else_block = if self.eat(TokenKind::Otherwise) {
                self.expect(TokenKind::Newline, "expected newline after otherwise")?;
                self.skip_newlines();
                Some(self.parse_block_until(TokenKind::Seal, TokenKind::Seal)?)
            } else {
                None
            };

            self.expect(TokenKind::Seal, "expected seal to close fork")?;
            self.expect_line_end()?;
            return Ok(Stmt::new(
                StmtKind::Fork {
                    cond,
                    then_block,
                    else_block,
                },
                span,
            ));
        }

        if self.eat(TokenKind::Cycle) {
            let cond = self.parse_expr()?;
            self.expect(TokenKind::Newline, "expected newline after cycle condition")?;
            self.skip_newlines();
            let body = self.parse_block_until(TokenKind::Seal, TokenKind::Seal)?;
            self.expect(TokenKind::Seal, "expected seal to close cycle")?;
            self.expect_line_end()?;
            return Ok(Stmt::new(StmtKind::Cycle { cond, body }, span));
        }

        if self.eat(TokenKind::Offer) {
            let value = if self.check(TokenKind::Newline)
                || self.check(TokenKind::Seal)
                || self.check(TokenKind::Otherwise)
                || self.check(TokenKind::Eof)
            {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect_line_end()?;
            return Ok(Stmt::new(StmtKind::Offer { value }, span));
        }

        if self.eat(TokenKind::Chant) {
            let value = self.parse_expr()?;
            self.expect_line_end()?;
            return Ok(Stmt::new(StmtKind::Chant { value }, span));
        }

        let value = self.parse_expr()?;
        let span = value.span;
        self.expect_line_end()?;
        Ok(Stmt::new(StmtKind::Expr { value }, span))
    }
}
