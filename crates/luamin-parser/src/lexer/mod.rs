mod token;

pub use token::{is_keyword, Token, TokenKind, KEYWORDS};

use crate::ast::Comment;
use crate::span::SourcePosition;
use crate::ParseError;

/// Tokenises a Lua 5.3 source string into a flat list of [`Token`]s.
///
/// Comments are not tokens; they are collected separately so that callers can
/// inspect them (see [`Lexer::tokenize`]).
pub struct Lexer<'src> {
    src: &'src [u8],
    pos: usize,
    line: u32,
    line_start: usize,
    comments: Vec<Comment>,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
            line: 1,
            line_start: 0,
            comments: Vec::new(),
        }
    }

    /// Consume the entire source and return all tokens (ending with `Eof`)
    /// together with every comment in source order.
    pub fn tokenize(mut self) -> Result<(Vec<Token>, Vec<Comment>), ParseError> {
        self.skip_shebang();
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        Ok((tokens, self.comments))
    }

    // ── internal helpers ────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.src.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.line_start = self.pos;
        }
        Some(ch)
    }

    fn eat_if(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn position(&self) -> SourcePosition {
        SourcePosition::new(self.line, (self.pos - self.line_start) as u32)
    }

    fn slice(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.src[start..self.pos]).into_owned()
    }

    fn error(&self, message: impl Into<String>, position: SourcePosition) -> ParseError {
        ParseError::new(message, position)
    }

    fn skip_shebang(&mut self) {
        if self.src.starts_with(b"#") {
            while !matches!(self.peek(), Some(b'\n') | None) {
                self.advance();
            }
        }
    }

    // ── whitespace & comments ───────────────────────────────────────────────

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ParseError> {
        loop {
            while matches!(
                self.peek(),
                Some(b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C)
            ) {
                self.advance();
            }

            if self.peek() == Some(b'-') && self.peek_at(1) == Some(b'-') {
                self.read_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    fn read_comment(&mut self) -> Result<(), ParseError> {
        let position = self.position();
        let start = self.pos;
        self.advance(); // -
        self.advance(); // -

        if let Some(level) = self.long_bracket_level() {
            let body_start = self.pos + level + 2;
            self.read_long_bracket(level, "long comment")?;
            let body_end = self.pos - level - 2;
            let value = String::from_utf8_lossy(&self.src[body_start..body_end]).into_owned();
            self.comments.push(Comment {
                raw: self.slice(start),
                value,
                position,
            });
            return Ok(());
        }

        let body_start = self.pos;
        while !matches!(self.peek(), Some(b'\n') | None) {
            self.advance();
        }
        let mut raw = self.slice(start);
        let mut value = String::from_utf8_lossy(&self.src[body_start..self.pos]).into_owned();
        if raw.ends_with('\r') {
            raw.pop();
            value.pop();
        }
        self.comments.push(Comment {
            raw,
            value,
            position,
        });
        Ok(())
    }

    /// Looks at the cursor for a long-bracket opening `[`, `=`*N, `[` and
    /// returns N without consuming anything.
    fn long_bracket_level(&self) -> Option<usize> {
        if self.peek() != Some(b'[') {
            return None;
        }
        let mut level = 0;
        while self.peek_at(1 + level) == Some(b'=') {
            level += 1;
        }
        if self.peek_at(1 + level) == Some(b'[') {
            Some(level)
        } else {
            None
        }
    }

    /// Consume a complete long bracket `[==[ … ]==]` whose opening starts at
    /// the cursor.
    fn read_long_bracket(&mut self, level: usize, what: &str) -> Result<(), ParseError> {
        let position = self.position();
        for _ in 0..level + 2 {
            self.advance();
        }
        loop {
            match self.advance() {
                None => return Err(self.error(format!("unfinished {}", what), position)),
                Some(b']') => {
                    let mut eq = 0usize;
                    while self.peek_at(eq) == Some(b'=') {
                        eq += 1;
                    }
                    if eq == level && self.peek_at(eq) == Some(b']') {
                        for _ in 0..=eq {
                            self.advance();
                        }
                        return Ok(());
                    }
                }
                Some(_) => {}
            }
        }
    }

    // ── literals ────────────────────────────────────────────────────────────

    fn read_quoted_string(&mut self, quote: u8) -> Result<TokenKind, ParseError> {
        let position = self.position();
        let start = self.pos;
        self.advance(); // opening quote
        loop {
            match self.peek() {
                None | Some(b'\n') | Some(b'\r') => {
                    return Err(self.error("unfinished string", position));
                }
                Some(b'\\') => {
                    self.advance();
                    // The escaped byte may be a newline (line continuation);
                    // `advance` keeps the line count right either way.
                    if self.advance().is_none() {
                        return Err(self.error("unfinished string", position));
                    }
                }
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(TokenKind::LuaString(self.slice(start)));
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn read_number(&mut self) -> Result<TokenKind, ParseError> {
        let position = self.position();
        let start = self.pos;

        let is_hex = self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X'));
        let (exponent_marks, digit): (&[u8], fn(u8) -> bool) = if is_hex {
            self.advance();
            self.advance();
            (b"pP", |c: u8| c.is_ascii_hexdigit())
        } else {
            (b"eE", |c: u8| c.is_ascii_digit())
        };

        loop {
            match self.peek() {
                Some(c) if exponent_marks.contains(&c) => {
                    self.advance();
                    if matches!(self.peek(), Some(b'+' | b'-')) {
                        self.advance();
                    }
                }
                Some(c) if digit(c) || c == b'.' => {
                    self.advance();
                }
                _ => break,
            }
        }

        // A numeral running straight into a name character is malformed (`3x`).
        if matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            return Err(self.error("malformed number", position));
        }

        Ok(TokenKind::Number(self.slice(start)))
    }

    fn read_name(&mut self) -> TokenKind {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.advance();
        }
        let name = self.slice(start);
        TokenKind::keyword(&name).unwrap_or(TokenKind::Name(name))
    }

    // ── main dispatch ───────────────────────────────────────────────────────

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace_and_comments()?;
        let position = self.position();

        let Some(ch) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, position));
        };

        let kind = match ch {
            b'"' | b'\'' => self.read_quoted_string(ch)?,
            b'[' => match self.long_bracket_level() {
                Some(level) => {
                    let start = self.pos;
                    self.read_long_bracket(level, "long string")?;
                    TokenKind::LuaString(self.slice(start))
                }
                None => {
                    self.advance();
                    TokenKind::LBracket
                }
            },
            b'0'..=b'9' => self.read_number()?,
            b'.' if matches!(self.peek_at(1), Some(b'0'..=b'9')) => self.read_number()?,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.read_name(),
            _ => {
                self.advance();
                match ch {
                    b'+' => TokenKind::Plus,
                    b'-' => TokenKind::Minus,
                    b'*' => TokenKind::Star,
                    b'/' => {
                        if self.eat_if(b'/') {
                            TokenKind::SlashSlash
                        } else {
                            TokenKind::Slash
                        }
                    }
                    b'%' => TokenKind::Percent,
                    b'^' => TokenKind::Caret,
                    b'#' => TokenKind::Hash,
                    b'&' => TokenKind::Ampersand,
                    b'|' => TokenKind::Pipe,
                    b'~' => {
                        if self.eat_if(b'=') {
                            TokenKind::NotEq
                        } else {
                            TokenKind::Tilde
                        }
                    }
                    b'=' => {
                        if self.eat_if(b'=') {
                            TokenKind::Eq
                        } else {
                            TokenKind::Assign
                        }
                    }
                    b'<' => {
                        if self.eat_if(b'=') {
                            TokenKind::LtEq
                        } else if self.eat_if(b'<') {
                            TokenKind::ShiftLeft
                        } else {
                            TokenKind::Lt
                        }
                    }
                    b'>' => {
                        if self.eat_if(b'=') {
                            TokenKind::GtEq
                        } else if self.eat_if(b'>') {
                            TokenKind::ShiftRight
                        } else {
                            TokenKind::Gt
                        }
                    }
                    b'(' => TokenKind::LParen,
                    b')' => TokenKind::RParen,
                    b'{' => TokenKind::LBrace,
                    b'}' => TokenKind::RBrace,
                    b']' => TokenKind::RBracket,
                    b';' => TokenKind::Semicolon,
                    b',' => TokenKind::Comma,
                    b':' => {
                        if self.eat_if(b':') {
                            TokenKind::ColonColon
                        } else {
                            TokenKind::Colon
                        }
                    }
                    b'.' => {
                        if self.eat_if(b'.') {
                            if self.eat_if(b'.') {
                                TokenKind::DotDotDot
                            } else {
                                TokenKind::DotDot
                            }
                        } else {
                            TokenKind::Dot
                        }
                    }
                    other => {
                        return Err(self.error(
                            format!("unexpected symbol '{}'", other.escape_ascii()),
                            position,
                        ))
                    }
                }
            }
        };

        Ok(Token::new(kind, position))
    }
}
