//! Precedence and associativity of Lua operators as seen by the printer.
//!
//! The levels are coarser than the parser's binding powers: bitwise
//! operators all share one level, and every unary operator lives in its own
//! namespace so that unary `-` and binary `-` never compare equal.

use luamin_parser::ast::{BinaryOperator, LogicalOperator, UnaryOperator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Which operand of the parent operator an expression occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Associativity {
    pub fn side(self) -> Side {
        match self {
            Associativity::Left => Side::Left,
            Associativity::Right => Side::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
    Unary(UnaryOperator),
}

impl Operator {
    pub fn precedence(self) -> u8 {
        use BinaryOperator::*;
        match self {
            Operator::Logical(LogicalOperator::Or) => 1,
            Operator::Logical(LogicalOperator::And) => 2,
            Operator::Binary(
                LessThan | GreaterThan | LessThanOrEqual | GreaterThanOrEqual | NotEqual | Equal,
            ) => 3,
            Operator::Binary(BitwiseOr | BitwiseXor | BitwiseAnd | ShiftLeft | ShiftRight) => 4,
            Operator::Binary(Concat) => 5,
            Operator::Binary(Add | Subtract) => 6,
            Operator::Binary(Multiply | Divide | FloorDivide | Modulo) => 7,
            Operator::Unary(_) => 8,
            Operator::Binary(Power) => 10,
        }
    }

    pub fn associativity(self) -> Associativity {
        match self {
            Operator::Binary(BinaryOperator::Power | BinaryOperator::Concat) => {
                Associativity::Right
            }
            _ => Associativity::Left,
        }
    }

    /// Binary bitwise operators share one precedence level here although the
    /// language orders them; see [`Operator::precedence`].
    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            Operator::Binary(
                BinaryOperator::BitwiseOr
                    | BinaryOperator::BitwiseXor
                    | BinaryOperator::BitwiseAnd
                    | BinaryOperator::ShiftLeft
                    | BinaryOperator::ShiftRight
            )
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Binary(op) => op.as_str(),
            Operator::Logical(op) => op.as_str(),
            Operator::Unary(op) => op.as_str(),
        }
    }
}
