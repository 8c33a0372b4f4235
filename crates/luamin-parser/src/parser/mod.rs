mod expression;
mod scope;
mod statement;

#[cfg(test)]
mod tests;

use crate::ast::{Chunk, Comment, Name};
use crate::lexer::{Token, TokenKind};
use crate::span::SourcePosition;
use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use thiserror::Error;

pub use expression::ExpressionParser;
pub use statement::StatementParser;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {position}")]
pub struct ParseError {
    pub message: String,
    pub position: SourcePosition,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: SourcePosition) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

/// Recursive-descent parser for Lua 5.3 with on-the-fly scope analysis.
///
/// Identifiers are resolved against the lexical scopes open at the point of
/// use; every unresolved name is recorded as a global.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    comments: Vec<Comment>,
    scopes: Vec<FxHashSet<String>>,
    globals: IndexSet<String>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, comments: Vec<Comment>) -> Self {
        Parser {
            tokens,
            position: 0,
            comments,
            scopes: Vec::new(),
            globals: IndexSet::new(),
        }
    }

    pub fn parse(mut self) -> Result<Chunk, ParseError> {
        self.push_scope();
        let body = self.parse_block()?;
        self.pop_scope();

        if !self.is_at_end() {
            return Err(self.unexpected("'<eof>'"));
        }

        Ok(Chunk {
            body,
            comments: self.comments,
            globals: self.globals.into_iter().collect(),
        })
    }

    // Token stream management
    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("Token stream should never be empty")
        })
    }

    fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.position + offset)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.check(&kind) {
            return Ok(self.advance());
        }
        Err(self.unexpected(expected))
    }

    fn consume_name(&mut self) -> Result<Name, ParseError> {
        let position = self.current_position();
        match &self.current().kind {
            TokenKind::Name(value) => {
                let value = value.clone();
                self.advance();
                Ok(Name { value, position })
            }
            _ => Err(self.unexpected("<name>")),
        }
    }

    fn current_position(&self) -> SourcePosition {
        self.current().position
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::new(
            format!("{} expected near {}", expected, describe(&self.current().kind)),
            self.current_position(),
        )
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(raw) | TokenKind::LuaString(raw) | TokenKind::Name(raw) => {
            format!("'{}'", raw)
        }
        TokenKind::Eof => "'<eof>'".to_string(),
        other => format!("{:?}", other),
    }
}
