//! Converts SQL text into a stream of tokens.
//!
//! Uses memchr for accelerated quote scanning and tracks line/column/offset
//! for every token. The lexer never fails: malformed input produces a token
//! with a `terminated: false` flag or is skipped one character at a time, so
//! downstream consumers always get a complete token stream ending in `Eof`.

use memchr::memchr;
use sqlscope_ast::{Position, Span};
use tracing::debug;

use crate::token::{Token, TokenKind};
use crate::{Dialect, TokenizeOptions};

/// SQL lexer that produces a stream of tokens from source text.
pub struct Lexer<'a> {
    /// The source text.
    text: &'a str,
    /// The source bytes (UTF-8).
    src: &'a [u8],
    /// Current byte offset into src.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, counted in characters).
    col: u32,
    dialect: Dialect,
    keep_whitespace: bool,
    keep_comments: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given SQL source text.
    #[must_use]
    pub fn new(source: &'a str, options: &TokenizeOptions) -> Self {
        Self {
            text: source,
            src: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            dialect: options.dialect,
            keep_whitespace: options.preserve_whitespace,
            keep_comments: options.preserve_comments,
        }
    }

    /// Tokenize the entire input into a Vec of tokens, `Eof` last.
    #[must_use]
    pub fn tokenize(source: &'a str, options: &TokenizeOptions) -> Vec<Token> {
        let mut lexer = Self::new(source, options);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token();
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Token {
        loop {
            let start = self.position();

            let Some(ch) = self.peek() else {
                return self.token(TokenKind::Eof, start);
            };

            let kind = match ch {
                c if c.is_ascii_whitespace() => {
                    while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
                        self.advance();
                    }
                    if !self.keep_whitespace {
                        continue;
                    }
                    TokenKind::Whitespace
                }

                // Line comment: `-- ...` to end of line
                b'-' if self.peek_at(1) == Some(b'-') => {
                    let end = memchr(b'\n', &self.src[self.pos..])
                        .map_or(self.src.len() - self.pos, |n| n);
                    self.advance_str(end);
                    if !self.keep_comments {
                        continue;
                    }
                    TokenKind::Comment {
                        block: false,
                        terminated: true,
                    }
                }

                // Block comment: `/* ... */`, nestable
                b'/' if self.peek_at(1) == Some(b'*') => {
                    let terminated = self.lex_block_comment();
                    if !self.keep_comments {
                        continue;
                    }
                    TokenKind::Comment {
                        block: true,
                        terminated,
                    }
                }

                // String literals; both quote styles use doubled-quote escape
                b'\'' => self.lex_string(b'\''),
                b'"' => self.lex_string(b'"'),

                // Numbers
                b'0'..=b'9' => self.lex_number(),

                // Identifiers and keywords
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_identifier(),

                // Bracket-quoted identifier `[name]` (SQL Server); plain
                // punctuation under PostgreSQL
                b'[' if self.dialect == Dialect::SqlServer => self.lex_bracket_ident(),

                // Multi-character operators, longest match first
                b'<' => match self.peek_at(1) {
                    Some(b'=') => self.op(2, TokenKind::Le),
                    Some(b'>') => self.op(2, TokenKind::Ne),
                    _ => self.op(1, TokenKind::Lt),
                },
                b'>' => match self.peek_at(1) {
                    Some(b'=') => self.op(2, TokenKind::Ge),
                    _ => self.op(1, TokenKind::Gt),
                },
                b'!' if self.peek_at(1) == Some(b'=') => self.op(2, TokenKind::Ne),
                b':' if self.peek_at(1) == Some(b':') => self.op(2, TokenKind::DoubleColon),
                b'|' if self.peek_at(1) == Some(b'|') => self.op(2, TokenKind::Concat),
                b'&' if self.peek_at(1) == Some(b'&') => self.op(2, TokenKind::AndAnd),

                b'=' => self.op(1, TokenKind::Eq),
                b'+' => self.op(1, TokenKind::Plus),
                b'-' => self.op(1, TokenKind::Minus),
                b'*' => self.op(1, TokenKind::Star),
                b'/' => self.op(1, TokenKind::Slash),
                b'%' => self.op(1, TokenKind::Percent),

                b'(' => self.op(1, TokenKind::LeftParen),
                b')' => self.op(1, TokenKind::RightParen),
                b',' => self.op(1, TokenKind::Comma),
                b';' => self.op(1, TokenKind::Semicolon),
                b'.' => self.op(1, TokenKind::Dot),
                b'[' => self.op(1, TokenKind::LeftBracket),
                b']' => self.op(1, TokenKind::RightBracket),
                b'{' => self.op(1, TokenKind::LeftBrace),
                b'}' => self.op(1, TokenKind::RightBrace),

                // Anything else is skipped, one character at a time
                _ => {
                    self.skip_unknown();
                    continue;
                }
            };

            return self.token(kind, start);
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.col,
            offset: self.pos as u32,
        }
    }

    fn token(&self, kind: TokenKind, start: Position) -> Token {
        Token {
            kind,
            text: self.text[start.offset as usize..self.pos].to_owned(),
            span: Span {
                start,
                end: self.position(),
            },
        }
    }

    fn advance(&mut self) -> u8 {
        let ch = self.src[self.pos];
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    /// Advance over `n` bytes, counting lines and character columns.
    fn advance_str(&mut self, n: usize) {
        for ch in self.text[self.pos..self.pos + n].chars() {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.pos += n;
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn op(&mut self, len: usize, kind: TokenKind) -> TokenKind {
        for _ in 0..len {
            self.advance();
        }
        kind
    }

    fn skip_unknown(&mut self) {
        if let Some(ch) = self.text[self.pos..].chars().next() {
            debug!(
                line = self.line,
                column = self.col,
                character = %ch,
                "skipping unrecognized character"
            );
            self.pos += ch.len_utf8();
            self.col += 1;
        }
    }

    // -----------------------------------------------------------------------
    // Literal tokenizers
    // -----------------------------------------------------------------------

    /// Lex a quoted string. The quote character doubles to escape itself.
    /// Uses memchr for fast quote search. An unterminated string consumes
    /// the rest of the input and is flagged rather than dropped.
    fn lex_string(&mut self, quote: u8) -> TokenKind {
        self.advance(); // opening quote
        loop {
            match memchr(quote, &self.src[self.pos..]) {
                Some(offset) => {
                    self.advance_str(offset);
                    self.advance(); // the quote itself

                    // Doubled-quote escape: '' stays inside the literal
                    if self.peek() == Some(quote) {
                        self.advance();
                    } else {
                        return TokenKind::Str { terminated: true };
                    }
                }
                None => {
                    self.advance_str(self.src.len() - self.pos);
                    return TokenKind::Str { terminated: false };
                }
            }
        }
    }

    /// Consume a `/* ... */` comment, honoring nesting. Returns false when
    /// the comment runs to end of input without closing.
    fn lex_block_comment(&mut self) -> bool {
        self.advance(); // `/`
        self.advance(); // `*`
        let mut depth = 1u32;
        while self.pos < self.src.len() {
            if self.src[self.pos] == b'/' && self.peek_at(1) == Some(b'*') {
                self.advance();
                self.advance();
                depth += 1;
            } else if self.src[self.pos] == b'*' && self.peek_at(1) == Some(b'/') {
                self.advance();
                self.advance();
                depth -= 1;
                if depth == 0 {
                    return true;
                }
            } else {
                let n = self.text[self.pos..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                self.advance_str(n);
            }
        }
        false
    }

    fn lex_number(&mut self) -> TokenKind {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        // A fractional part needs a digit after the dot; `1.x` leaves the
        // dot for the next token.
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        TokenKind::Number
    }

    fn lex_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        let word = &self.text[start..self.pos];
        TokenKind::lookup_keyword(word, self.dialect).unwrap_or(TokenKind::Ident)
    }

    /// Lex `[name]`. A missing closing bracket consumes the rest of input.
    fn lex_bracket_ident(&mut self) -> TokenKind {
        self.advance(); // `[`
        match memchr(b']', &self.src[self.pos..]) {
            Some(offset) => {
                self.advance_str(offset);
                self.advance(); // `]`
            }
            None => {
                debug!(
                    line = self.line,
                    column = self.col,
                    "unterminated bracket identifier"
                );
                self.advance_str(self.src.len() - self.pos);
            }
        }
        TokenKind::QuotedIdent
    }
}

/// Strip the surrounding quotes from a string or bracket-identifier token
/// and collapse doubled-quote escapes.
#[must_use]
pub(crate) fn unquote(text: &str) -> String {
    let Some(quote) = text.chars().next() else {
        return String::new();
    };
    let close = if quote == '[' { ']' } else { quote };
    let inner = text
        .strip_prefix(quote)
        .map_or(text, |t| t.strip_suffix(close).unwrap_or(t));
    if quote == '[' {
        inner.to_owned()
    } else {
        let mut escape = String::with_capacity(2);
        escape.push(quote);
        escape.push(quote);
        let mut single = String::with_capacity(1);
        single.push(quote);
        inner.replace(&escape, &single)
    }
}
