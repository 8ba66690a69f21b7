//! Character cursor for traversing source code.
//!
//! The cursor maintains the current position in the source string and
//! tracks line/column numbers for diagnostics. Anemo source is treated
//! as ASCII with arbitrary UTF-8 allowed inside string literals, so the
//! cursor has an ASCII fast path and falls back to full decoding only
//! when it has to.

/// A cursor for traversing source code character by character.
pub struct Cursor<'a> {
    /// The source text being traversed.
    source: &'a str,

    /// Current byte position in the source.
    position: usize,

    /// Current line number (1-based).
    line: u32,

    /// Current column number (1-based, in characters).
    column: u32,
}

impl<'a> Cursor<'a> {
    /// Creates a new cursor at the start of the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the character at the cursor position, or `'\0'` at the
    /// end of the source.
    #[inline]
    pub fn current_char(&self) -> char {
        if self.position >= self.source.len() {
            return '\0';
        }

        let b = self.source.as_bytes()[self.position];
        if b < 128 {
            return b as char;
        }

        self.source[self.position..].chars().next().unwrap_or('\0')
    }

    /// Consumes the current character, updating line/column bookkeeping.
    pub fn advance(&mut self) {
        let c = self.current_char();
        if c == '\0' {
            return;
        }

        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Returns true when the whole source has been consumed.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Current byte position in the source.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Current line number (1-based).
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current column number (1-based).
    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// The source text between `start` and the current position.
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.position]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_tracks_columns() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.current_char(), 'a');
        assert_eq!((cursor.line(), cursor.column()), (1, 1));

        cursor.advance();
        assert_eq!(cursor.current_char(), 'b');
        assert_eq!((cursor.line(), cursor.column()), (1, 2));
    }

    #[test]
    fn test_newline_resets_column() {
        let mut cursor = Cursor::new("a\nb");
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.current_char(), 'b');
        assert_eq!((cursor.line(), cursor.column()), (2, 1));
    }

    #[test]
    fn test_end_of_source() {
        let mut cursor = Cursor::new("x");
        cursor.advance();
        assert!(cursor.is_at_end());
        assert_eq!(cursor.current_char(), '\0');
        // Advancing past the end is a no-op.
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (1, 2));
    }

    #[test]
    fn test_slice_from() {
        let mut cursor = Cursor::new("hello world");
        let start = cursor.position();
        for _ in 0..5 {
            cursor.advance();
        }
        assert_eq!(cursor.slice_from(start), "hello");
    }

    #[test]
    fn test_non_ascii_advances_by_one_column() {
        let mut cursor = Cursor::new("é!");
        assert_eq!(cursor.current_char(), 'é');
        cursor.advance();
        assert_eq!(cursor.current_char(), '!');
        assert_eq!(cursor.column(), 2);
    }
}
