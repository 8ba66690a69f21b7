//! Token definitions for the Anemo language.

use anemo_util::Span;

/// The kind of a lexed token.
///
/// A few kinds are reserved for a future language revision: the lexer
/// never produces them and no grammar rule consumes them, but they keep
/// their slots so that tooling agrees on the full set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// End of input; emitted exactly once as the final token.
    Eof,
    /// Explicit newline; the grammar is newline-terminated.
    Newline,

    /// Identifier; the name lives in the token's lexeme.
    Ident,
    /// Integer literal; value in `int_value`, digits in the lexeme.
    Int,
    /// String literal; unescaped content in the lexeme.
    Str,

    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    Comma,
    Colon,
    LBracket,
    RBracket,
    /// Reserved; not produced by the current lexer.
    LParen,
    /// Reserved; not produced by the current lexer.
    RParen,

    /// "glyph" - procedure declaration
    Glyph,
    /// "yields" - return type marker
    Yields,
    /// "bind" - immutable binding
    Bind,
    /// "morph" - mutable binding
    Morph,
    /// "shift" - assignment to an existing mutable binding
    Shift,
    /// "fork" - two-armed conditional
    Fork,
    /// Reserved; not produced by the current lexer.
    Elseif,
    /// "otherwise" - else arm of a fork
    Otherwise,
    /// "cycle" - pre-tested loop
    Cycle,
    /// Reserved; not produced by the current lexer.
    Break,
    /// Reserved; not produced by the current lexer.
    Continue,
    /// "offer" - return from a glyph
    Offer,
    /// "invoke" - procedure call
    Invoke,
    /// "with" - argument list introducer
    With,
    /// "chant" - print primitive
    Chant,
    /// "seal" - block close
    Seal,

    /// "ember" - the integer type
    Ember,
    /// "pulse" - the boolean type
    Pulse,
    /// "text" - the string type
    Text,
    /// "mist" - the unit type, procedure returns only
    Mist,
    /// "yes" - boolean literal true
    Yes,
    /// "no" - boolean literal false
    No,

    /// "both" - logical and
    Both,
    /// "either" - logical or
    Either,
    /// "flip" - logical not
    Flip,
    /// "same" - equality
    Same,
    /// "diff" - inequality
    Diff,
    /// "less" - strictly less than
    Less,
    /// "more" - strictly greater than
    More,
    /// "atmost" - less than or equal
    AtMost,
    /// "atleast" - greater than or equal
    AtLeast,
}

impl TokenKind {
    /// The human-readable name used in parser diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Eof => "end-of-file",
            TokenKind::Newline => "newline",
            TokenKind::Ident => "identifier",
            TokenKind::Int => "integer",
            TokenKind::Str => "string",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Assign => "=",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Glyph => "glyph",
            TokenKind::Yields => "yields",
            TokenKind::Bind => "bind",
            TokenKind::Morph => "morph",
            TokenKind::Shift => "shift",
            TokenKind::Fork => "fork",
            TokenKind::Elseif => "elseif",
            TokenKind::Otherwise => "otherwise",
            TokenKind::Cycle => "cycle",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Offer => "offer",
            TokenKind::Invoke => "invoke",
            TokenKind::With => "with",
            TokenKind::Chant => "chant",
            TokenKind::Seal => "seal",
            TokenKind::Ember => "ember",
            TokenKind::Pulse => "pulse",
            TokenKind::Text => "text",
            TokenKind::Mist => "mist",
            TokenKind::Yes => "yes",
            TokenKind::No => "no",
            TokenKind::Both => "both",
            TokenKind::Either => "either",
            TokenKind::Flip => "flip",
            TokenKind::Same => "same",
            TokenKind::Diff => "diff",
            TokenKind::Less => "less",
            TokenKind::More => "more",
            TokenKind::AtMost => "atmost",
            TokenKind::AtLeast => "atleast",
        }
    }
}

/// Looks up the keyword table. Keywords are reserved: an identifier
/// spelled like one is always retagged.
pub fn keyword_from_ident(text: &str) -> Option<TokenKind> {
    let kind = match text {
        "glyph" => TokenKind::Glyph,
        "yields" => TokenKind::Yields,
        "bind" => TokenKind::Bind,
        "morph" => TokenKind::Morph,
        "shift" => TokenKind::Shift,
        "fork" => TokenKind::Fork,
        "otherwise" => TokenKind::Otherwise,
        "cycle" => TokenKind::Cycle,
        "offer" => TokenKind::Offer,
        "invoke" => TokenKind::Invoke,
        "with" => TokenKind::With,
        "chant" => TokenKind::Chant,
        "seal" => TokenKind::Seal,

        "ember" => TokenKind::Ember,
        "pulse" => TokenKind::Pulse,
        "text" => TokenKind::Text,
        "mist" => TokenKind::Mist,
        "yes" => TokenKind::Yes,
        "no" => TokenKind::No,

        "both" => TokenKind::Both,
        "either" => TokenKind::Either,
        "flip" => TokenKind::Flip,
        "same" => TokenKind::Same,
        "diff" => TokenKind::Diff,
        "less" => TokenKind::Less,
        "more" => TokenKind::More,
        "atmost" => TokenKind::AtMost,
        "atleast" => TokenKind::AtLeast,
        _ => return None,
    };
    Some(kind)
}

/// A lexed token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text; `Some` only for identifiers, integer literals and
    /// string literals (for strings, the unescaped content).
    pub lexeme: Option<String>,
    /// Parsed value; meaningful only for integer literals.
    pub int_value: i64,
    /// Position of the token's first character.
    pub span: Span,
}

impl Token {
    /// A token with no lexeme payload.
    pub fn simple(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            lexeme: None,
            int_value: 0,
            span,
        }
    }

    /// The lexeme, for token kinds that are guaranteed to carry one.
    pub fn text(&self) -> &str {
        self.lexeme.as_deref().unwrap_or("")
    }
}
