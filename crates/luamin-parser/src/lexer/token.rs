use crate::span::SourcePosition;

/// A single lexical token produced by the [`crate::lexer::Lexer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: SourcePosition,
}

impl Token {
    pub fn new(kind: TokenKind, position: SourcePosition) -> Self {
        Self { kind, position }
    }
}

/// Every token kind in the Lua 5.3 grammar.
///
/// Literal tokens keep their raw source text so the printer can re-emit them
/// byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ───────────────────────────────────────────────────────────
    Number(String),
    LuaString(String),
    Name(String),

    // ── Keywords ───────────────────────────────────────────────────────────
    And,
    Break,
    Do,
    Else,
    Elseif,
    End,
    False,
    For,
    Function,
    Goto,
    If,
    In,
    Local,
    Nil,
    Not,
    Or,
    Repeat,
    Return,
    Then,
    True,
    Until,
    While,

    // ── Arithmetic / bitwise operators ─────────────────────────────────────
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    SlashSlash, // //
    Percent,    // %
    Caret,      // ^
    Ampersand,  // &
    Tilde,      // ~
    Pipe,       // |
    ShiftLeft,  // <<
    ShiftRight, // >>

    // ── Comparison / misc operators ────────────────────────────────────────
    Hash,  // #
    Eq,    // ==
    NotEq, // ~=
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=

    // ── Assignment ─────────────────────────────────────────────────────────
    Assign, // =

    // ── Delimiters / punctuation ───────────────────────────────────────────
    LParen,     // (
    RParen,     // )
    LBrace,     // {
    RBrace,     // }
    LBracket,   // [
    RBracket,   // ]
    ColonColon, // ::
    Semicolon,  // ;
    Colon,      // :
    Comma,      // ,
    Dot,        // .
    DotDot,     // ..
    DotDotDot,  // ...

    // ── End-of-file ────────────────────────────────────────────────────────
    Eof,
}

impl TokenKind {
    /// Map a keyword string to its `TokenKind`, or return `None` if it is not
    /// a keyword (caller should treat it as a [`TokenKind::Name`]).
    pub fn keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "and" => TokenKind::And,
            "break" => TokenKind::Break,
            "do" => TokenKind::Do,
            "else" => TokenKind::Else,
            "elseif" => TokenKind::Elseif,
            "end" => TokenKind::End,
            "false" => TokenKind::False,
            "for" => TokenKind::For,
            "function" => TokenKind::Function,
            "goto" => TokenKind::Goto,
            "if" => TokenKind::If,
            "in" => TokenKind::In,
            "local" => TokenKind::Local,
            "nil" => TokenKind::Nil,
            "not" => TokenKind::Not,
            "or" => TokenKind::Or,
            "repeat" => TokenKind::Repeat,
            "return" => TokenKind::Return,
            "then" => TokenKind::Then,
            "true" => TokenKind::True,
            "until" => TokenKind::Until,
            "while" => TokenKind::While,
            _ => return None,
        })
    }
}

/// Reserved words of the language, in the order the reference manual lists them.
pub const KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Returns `true` if `name` is a reserved word.
pub fn is_keyword(name: &str) -> bool {
    TokenKind::keyword(name).is_some()
}
