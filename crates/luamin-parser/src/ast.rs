//! Located Lua 5.3 syntax tree.
//!
//! Every statement and expression records the [`SourcePosition`] of its first
//! token. Identifiers additionally record whether they resolve to a local
//! binding at the point of use; the chunk carries the list of free (global)
//! names the parser saw.

use crate::span::SourcePosition;

/// A parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub body: Block,
    /// Every comment in source order.
    pub comments: Vec<Comment>,
    /// Free identifiers in order of first reference, without duplicates.
    pub globals: Vec<String>,
}

pub type Block = Vec<Statement>;

/// A comment as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Full text including the leading `--` (and long brackets, if any).
    pub raw: String,
    /// Text after `--`, or between the long brackets.
    pub value: String,
    pub position: SourcePosition,
}

/// A bare name that is never subject to renaming: member keys, table keys
/// and labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub value: String,
    pub position: SourcePosition,
}

/// A variable reference or binding site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    /// `true` when the name resolves to a local binding (including
    /// parameters, loop variables and the implicit `self`).
    pub is_local: bool,
    pub position: SourcePosition,
}

// ── Statements ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `varlist = explist`
    Assignment {
        targets: Vec<Expression>,
        values: Vec<Expression>,
    },
    /// `local namelist [= explist]`
    Local {
        names: Vec<Identifier>,
        values: Vec<Expression>,
    },
    /// A function call used as a statement.
    Call(Expression),
    /// `if … then … {elseif … then …} [else …] end`
    If(Vec<IfClause>),
    While {
        condition: Expression,
        body: Block,
    },
    Do(Block),
    Return(Vec<Expression>),
    Break,
    Repeat {
        body: Block,
        condition: Expression,
    },
    /// `function name body` or `local function name body`
    Function(FunctionDeclaration),
    ForNumeric {
        variable: Identifier,
        start: Expression,
        limit: Expression,
        step: Option<Expression>,
        body: Block,
    },
    ForGeneric {
        variables: Vec<Identifier>,
        iterators: Vec<Expression>,
        body: Block,
    },
    Label(Name),
    Goto(Name),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    If,
    ElseIf,
    Else,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfClause {
    pub kind: ClauseKind,
    /// Absent only for [`ClauseKind::Else`].
    pub condition: Option<Expression>,
    pub body: Block,
    pub position: SourcePosition,
}

/// Shared by function statements and function expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    /// `None` for anonymous function expressions. Otherwise an identifier, or
    /// a member chain such as `a.b:c`.
    pub name: Option<Box<Expression>>,
    pub is_local: bool,
    pub parameters: Vec<Parameter>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Name(Identifier),
    Vararg(SourcePosition),
}

// ── Expressions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub position: SourcePosition,
    /// Written inside `( … )` in the source.
    pub parenthesized: bool,
}

impl Expression {
    pub fn new(kind: ExpressionKind, position: SourcePosition) -> Self {
        Expression {
            kind,
            position,
            parenthesized: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Identifier(Identifier),
    Literal(Literal),
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Logical {
        operator: LogicalOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        operator: UnaryOperator,
        argument: Box<Expression>,
    },
    /// `base(args)`
    Call {
        base: Box<Expression>,
        arguments: Vec<Expression>,
    },
    /// `base{…}`
    TableCall {
        base: Box<Expression>,
        table: Box<Expression>,
    },
    /// `base"…"`
    StringCall {
        base: Box<Expression>,
        argument: Box<Expression>,
    },
    /// `base[index]`
    Index {
        base: Box<Expression>,
        index: Box<Expression>,
    },
    /// `base.name` or `base:name`
    Member {
        base: Box<Expression>,
        indexer: Indexer,
        identifier: Name,
    },
    Function(Box<FunctionDeclaration>),
    Table(Vec<TableField>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Source text of the literal, emitted unchanged.
    pub raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Number,
    Boolean,
    Nil,
    Vararg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indexer {
    Dot,
    Colon,
}

impl Indexer {
    pub fn as_str(self) -> &'static str {
        match self {
            Indexer::Dot => ".",
            Indexer::Colon => ":",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableField {
    /// `[key] = value`
    Keyed { key: Expression, value: Expression },
    /// `name = value`
    Named { name: Name, value: Expression },
    /// `value`
    Positional(Expression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Power,
    Concat,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    ShiftLeft,
    ShiftRight,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::FloorDivide => "//",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Power => "^",
            BinaryOperator::Concat => "..",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "~=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::BitwiseXor => "~",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Length,
    Negate,
    BitwiseNot,
}

impl UnaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Not => "not",
            UnaryOperator::Length => "#",
            UnaryOperator::Negate => "-",
            UnaryOperator::BitwiseNot => "~",
        }
    }
}
