//! anemo-par - Recursive-descent parser for the Anemo language.
//!
//! Single-token lookahead, no backtracking. Newlines terminate
//! statements; redundant newlines between statements and around block
//! boundaries are skipped. The final statement of a block may omit its
//! trailing newline because a block-closing keyword also terminates it.
//!
//! Any grammar violation halts with a position-qualified diagnostic.

pub mod ast;

mod expr;
mod items;
mod stmt;

use anemo_lex::{Token, TokenKind};
use anemo_util::{Diagnostic, Span};

use ast::Program;

/// Parses a whole token stream into a [`Program`].
///
/// `tokens` must be a stream produced by `anemo_lex::lex_source`, i.e.
/// terminated by exactly one end-of-file token.
pub fn parse_program(file: &str, tokens: &[Token]) -> Result<Program, Diagnostic> {
    Parser {
        file,
        tokens,
        pos: 0,
    }
    .run()
}

pub(crate) struct Parser<'a> {
    file: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn run(mut self) -> Result<Program, Diagnostic> {
        let mut program = Program::default();

        self.skip_newlines();
        while !self.check(TokenKind::Eof) {
            program.functions.push(self.parse_function()?);
            self.skip_newlines();
        }

        if program.functions.is_empty() {
            let t = self.peek();
            return Err(self.error_at(t.span, "program must declare at least one glyph"));
        }

        Ok(program)
    }

    pub(crate) fn peek(&self) -> &'a Token {
        &self.tokens[self.pos]
    }

    pub(crate) fn prev(&self) -> &'a Token {
        &self.tokens[self.pos - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn advance(&mut self) -> &'a Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.prev()
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    /// Consumes a token of the given kind or fails with `message`,
    /// naming the token actually found.
    pub(crate) fn expect(&mut self, kind: TokenKind, message: &str) -> Result<&'a Token, Diagnostic> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let t = self.peek();
        Err(self.error_at(
            t.span,
            format!("{} (found {})", message, t.kind.describe()),
        ))
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.eat(TokenKind::Newline) {}
    }

    /// After a statement: a newline (plus any run of blank lines), the
    /// end of input, or a block-closing keyword must follow.
    pub(crate) fn expect_line_end(&mut self) -> Result<(), Diagnostic> {
        if self.eat(TokenKind::Newline) {
            self.skip_newlines();
            return Ok(());
        }
        if self.check(TokenKind::Eof)
            || self.check(TokenKind::Seal)
            || self.check(TokenKind::Otherwise)
        {
            return Ok(());
        }
        let t = self.peek();
        Err(self.error_at(t.span, "expected newline"))
    }

    pub(crate) fn error_at(&self, span: Span, message: impl Into<String>) -> Diagnostic {
        Diagnostic::at(self.file, span, message)
    }
}

#[cfg(test)]
mod tests {
    use super::ast::*;
    use super::*;

    fn parse(src: &str) -> Result<Program, Diagnostic> {
        let tokens = anemo_lex::lex_source("test.anm", src).unwrap();
        parse_program("test.anm", &tokens)
    }

    fn parse_ok(src: &str) -> Program {
        parse(src).unwrap()
    }

    #[test]
    fn test_minimal_program() {
        let program = parse_ok("glyph main[] yields ember\noffer 0\nseal\n");
        assert_eq!(program.functions.len(), 1);

        let main = &program.functions[0];
        assert_eq!(main.name, "main");
        assert!(main.params.is_empty());
        assert_eq!(main.return_type, Type::Int);
        assert_eq!(main.body.stmts.len(), 1);
    }

    #[test]
    fn test_empty_program_is_rejected() {
        let err = parse("\n\n").unwrap_err();
        assert_eq!(err.message(), "program must declare at least one glyph");
    }

    #[test]
    fn test_parameters() {
        let program = parse_ok("glyph f[a: ember, b: pulse, c: text] yields mist\noffer\nseal\n");
        let f = &program.functions[0];
        assert_eq!(f.params.len(), 3);
        assert_eq!(f.params[0].name, "a");
        assert_eq!(f.params[0].ty, Type::Int);
        assert_eq!(f.params[1].ty, Type::Bool);
        assert_eq!(f.params[2].ty, Type::Text);
        assert_eq!(f.return_type, Type::Unit);
    }

    #[test]
    fn test_final_statement_may_omit_newline_before_seal() {
        let program = parse_ok("glyph main[] yields ember\noffer 0 seal\n");
        assert_eq!(program.functions[0].body.stmts.len(), 1);
    }

    #[test]
    fn test_missing_yields_is_reported() {
        let err = parse("glyph main[]\noffer 0\nseal\n").unwrap_err();
        assert_eq!(
            err.message(),
            "expected yields after parameter list (found newline)"
        );
    }

    #[test]
    fn test_bad_type_keyword() {
        let err = parse("glyph main[] yields number\noffer 0\nseal\n").unwrap_err();
        assert_eq!(err.message(), "expected type keyword ember|pulse|text|mist");
    }

    #[test]
    fn test_statement_forms() {
        let src = "glyph main[] yields ember\n\
                   bind a = 1\n\
                   morph b = 2\n\
                   shift b = 3\n\
                   chant a\n\
                   invoke main\n\
                   offer a\n\
                   seal\n";
        let program = parse_ok(src);
        let stmts = &program.functions[0].body.stmts;
        assert!(matches!(stmts[0].kind, StmtKind::Bind { .. }));
        assert!(matches!(stmts[1].kind, StmtKind::Morph { .. }));
        assert!(matches!(stmts[2].kind, StmtKind::Shift { .. }));
        assert!(matches!(stmts[3].kind, StmtKind::Chant { .. }));
        assert!(matches!(stmts[4].kind, StmtKind::Expr { .. }));
        assert!(matches!(stmts[5].kind, StmtKind::Offer { value: Some(_) }));
    }

    #[test]
    fn test_fork_with_otherwise() {
        let src = "glyph main[] yields ember\n\
                   fork yes\n\
                   chant 1\n\
                   otherwise\n\
                   chant 2\n\
                   seal\n\
                   offer 0\n\
                   seal\n";
        let program = parse_ok(src);
        let StmtKind::Fork {
            then_block,
            else_block,
            ..
        } = &program.functions[0].body.stmts[0].kind
        else {
            panic!("expected a fork statement");
        };
        assert_eq!(then_block.stmts.len(), 1);
        assert_eq!(else_block.as_ref().unwrap().stmts.len(), 1);
    }

    #[test]
    fn test_fork_without_otherwise() {
        let src = "glyph main[] yields ember\n\
                   fork yes\n\
                   chant 1\n\
                   seal\n\
                   offer 0\n\
                   seal\n";
        let program = parse_ok(src);
        let StmtKind::Fork { else_block, .. } = &program.functions[0].body.stmts[0].kind else {
            panic!("expected a fork statement");
        };
        assert!(else_block.is_none());
    }

    #[test]
    fn test_cycle() {
        let src = "glyph main[] yields ember\n\
                   cycle no\n\
                   chant 1\n\
                   seal\n\
                   offer 0\n\
                   seal\n";
        let program = parse_ok(src);
        let StmtKind::Cycle { body, .. } = &program.functions[0].body.stmts[0].kind else {
            panic!("expected a cycle statement");
        };
        assert_eq!(body.stmts.len(), 1);
    }

    #[test]
    fn test_bare_offer_keeps_no_value() {
        let program = parse_ok("glyph quiet[] yields mist\noffer\nseal\n");
        assert!(matches!(
            program.functions[0].body.stmts[0].kind,
            StmtKind::Offer { value: None }
        ));
    }

    #[test]
    fn test_two_statements_on_one_line_are_rejected() {
        let err = parse("glyph main[] yields ember\nbind a = 1 bind b = 2\noffer 0\nseal\n")
            .unwrap_err();
        assert_eq!(err.message(), "expected newline");
    }

    #[test]
    fn test_unclosed_function_reports_missing_seal() {
        let err = parse("glyph main[] yields ember\noffer 0\n").unwrap_err();
        assert_eq!(
            err.message(),
            "expected seal to close function (found end-of-file)"
        );
    }
}
