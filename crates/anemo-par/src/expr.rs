//! Expression parsing.
//!
//! One function per precedence tier, lowest binding first; each tier
//! loops over its operators so all binary operators left-associate.

use anemo_lex::TokenKind;
use anemo_util::Diagnostic;

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, Diagnostic> {
        self.parse_either()
    }

    fn parse_either(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_both()?;
        while self.eat(TokenKind::Either) {
            let op_span = self.prev().span;
            let rhs = self.parse_both()?;
            expr = Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::Either,
                    left: Box::new(expr),
                    right: Box::new(rhs),
                },
                op_span,
            );
        }
        Ok(expr)
    }

    fn parse_both(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_eq()?;
        while self.eat(TokenKind::Both) {
            let op_span = self.prev().span;
            let rhs = self.parse_eq()?;
            expr = Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::Both,
                    left: Box::new(expr),
                    right: Box::new(rhs),
                },
                op_span,
            );
        }
        Ok(expr)
    }

    fn parse_eq(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_cmp()?;
        while self.check(TokenKind::Same) || self.check(TokenKind::Diff) {
            let op_tok = self.advance();
            let op = if op_tok.kind == TokenKind::Same {
                BinaryOp::Same
            } else {
                BinaryOp::Diff
            };
            let rhs = self.parse_cmp()?;
            expr = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(expr),
                    right: Box::new(rhs),
                },
                op_tok.span,
            );
        }
        Ok(expr)
    }

    fn parse_cmp(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_add()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Less => BinaryOp::Less,
                TokenKind::More => BinaryOp::More,
                TokenKind::AtMost => BinaryOp::AtMost,
                TokenKind::AtLeast => BinaryOp::AtLeast,
                _ => break,
            };
            let op_span = self.advance().span;
            let rhs = self.parse_add()?;
            expr = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(expr),
                    right: Box::new(rhs),
                },
                op_span,
            );
        }
        Ok(expr)
    }

    fn parse_add(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_mul()?;
        while self.check(TokenKind::Plus) || self.check(TokenKind::Minus) {
            let op_tok = self.advance();
            let op = if op_tok.kind == TokenKind::Plus {
                BinaryOp::Add
            } else {
                BinaryOp::Sub
            };
            let rhs = self.parse_mul()?;
            expr = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(expr),
                    right: Box::new(rhs),
                },
                op_tok.span,
            );
        }
        Ok(expr)
    }

    fn parse_mul(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_unary()?;
        while self.check(TokenKind::Star) || self.check(TokenKind::Slash) {
            let op_tok = self.advance();
            let op = if op_tok.kind == TokenKind::Star {
                BinaryOp::Mul
            } else {
                BinaryOp::Div
            };
            let rhs = self.parse_unary()?;
            expr = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(expr),
                    right: Box::new(rhs),
                },
                op_tok.span,
            );
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, Diagnostic> {
        if self.eat(TokenKind::Minus) {
            let op_span = self.prev().span;
            let operand = self.parse_unary()?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                op_span,
            ));
        }
        if self.eat(TokenKind::Flip) {
            let op_span = self.prev().span;
            let operand = self.parse_unary()?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Flip,
                    operand: Box::new(operand),
                },
                op_span,
            ));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, Diagnostic> {
        let t = self.peek();

        if self.eat(TokenKind::Int) {
            let tok = self.prev();
            return Ok(Expr::new(ExprKind::Int(tok.int_value), tok.span));
        }
        if self.eat(TokenKind::Str) {
            let tok = self.prev();
            return Ok(Expr::new(ExprKind::Str(tok.text().to_string()), tok.span));
        }
        if self.eat(TokenKind::Yes) {
            return Ok(Expr::new(ExprKind::Bool(true), self.prev().span));
        }
        if self.eat(TokenKind::No) {
            return Ok(Expr::new(ExprKind::Bool(false), self.prev().span));
        }
        if self.check(TokenKind::Invoke) {
            return self.parse_call();
        }
        if self.eat(TokenKind::Ident) {
            let tok = self.prev();
            return Ok(Expr::new(ExprKind::Var(tok.text().to_string()), tok.span));
        }

        Err(self.error_at(t.span, "expected expression"))
    }

    fn parse_call(&mut self) -> Result<Expr, Diagnostic> {
        let kw = self.expect(TokenKind::Invoke, "expected invoke")?;
        let span = kw.span;
        let name = self
            .expect(TokenKind::Ident, "expected function name after invoke")?
            .text()
            .to_string();

        let mut args = Vec::new();
        if self.eat(TokenKind::With) {
            args.push(self.parse_expr()?);
            while self.eat(TokenKind::Comma) {
                args.push(self.parse_expr()?);
            }
        }

        Ok(Expr::new(ExprKind::Call { name, args }, span))
    }
}
