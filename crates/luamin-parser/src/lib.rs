//! Lua 5.3 front-end used by luamin.
//!
//! [`parse`] turns source text into a located [`ast::Chunk`]: the statement
//! tree, every comment, and the list of free (global) identifiers the chunk
//! references.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod span;

pub use ast::Chunk;
pub use lexer::{is_keyword, Lexer, KEYWORDS};
pub use parser::{ParseError, Parser};
pub use span::SourcePosition;

/// Lex and parse a complete chunk.
pub fn parse(source: &str) -> Result<Chunk, ParseError> {
    let (tokens, comments) = Lexer::new(source).tokenize()?;
    Parser::new(tokens, comments).parse()
}
