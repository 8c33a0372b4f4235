use super::{ParseError, Parser, StatementParser};
use crate::ast::*;
use crate::lexer::TokenKind;

/// Binding power of unary operators.
const UNARY_PRIORITY: u8 = 12;

pub trait ExpressionParser {
    fn parse_expression(&mut self) -> Result<Expression, ParseError>;
    fn parse_expression_list(&mut self) -> Result<Vec<Expression>, ParseError>;
}

impl ExpressionParser for Parser {
    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_subexpression(0)
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expression>, ParseError> {
        let mut expressions = vec![self.parse_expression()?];
        while self.match_token(&[TokenKind::Comma]) {
            expressions.push(self.parse_expression()?);
        }
        Ok(expressions)
    }
}

#[derive(Clone, Copy)]
enum Operator {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

/// Left and right binding powers, as in the reference implementation's
/// priority table.
fn binary_operator(kind: &TokenKind) -> Option<(Operator, u8, u8)> {
    use BinaryOperator::*;
    let (operator, left, right) = match kind {
        TokenKind::Or => (Operator::Logical(LogicalOperator::Or), 1, 1),
        TokenKind::And => (Operator::Logical(LogicalOperator::And), 2, 2),
        TokenKind::Lt => (Operator::Binary(LessThan), 3, 3),
        TokenKind::Gt => (Operator::Binary(GreaterThan), 3, 3),
        TokenKind::LtEq => (Operator::Binary(LessThanOrEqual), 3, 3),
        TokenKind::GtEq => (Operator::Binary(GreaterThanOrEqual), 3, 3),
        TokenKind::NotEq => (Operator::Binary(NotEqual), 3, 3),
        TokenKind::Eq => (Operator::Binary(Equal), 3, 3),
        TokenKind::Pipe => (Operator::Binary(BitwiseOr), 4, 4),
        TokenKind::Tilde => (Operator::Binary(BitwiseXor), 5, 5),
        TokenKind::Ampersand => (Operator::Binary(BitwiseAnd), 6, 6),
        TokenKind::ShiftLeft => (Operator::Binary(ShiftLeft), 7, 7),
        TokenKind::ShiftRight => (Operator::Binary(ShiftRight), 7, 7),
        TokenKind::DotDot => (Operator::Binary(Concat), 9, 8),
        TokenKind::Plus => (Operator::Binary(Add), 10, 10),
        TokenKind::Minus => (Operator::Binary(Subtract), 10, 10),
        TokenKind::Star => (Operator::Binary(Multiply), 11, 11),
        TokenKind::Slash => (Operator::Binary(Divide), 11, 11),
        TokenKind::SlashSlash => (Operator::Binary(FloorDivide), 11, 11),
        TokenKind::Percent => (Operator::Binary(Modulo), 11, 11),
        TokenKind::Caret => (Operator::Binary(Power), 14, 13),
        _ => return None,
    };
    Some((operator, left, right))
}

fn unary_operator(kind: &TokenKind) -> Option<UnaryOperator> {
    match kind {
        TokenKind::Not => Some(UnaryOperator::Not),
        TokenKind::Hash => Some(UnaryOperator::Length),
        TokenKind::Minus => Some(UnaryOperator::Negate),
        TokenKind::Tilde => Some(UnaryOperator::BitwiseNot),
        _ => None,
    }
}

impl Parser {
    /// `subexpr ::= (simpleexp | unop subexpr) { binop subexpr }`, where only
    /// operators binding tighter than `limit` are consumed.
    fn parse_subexpression(&mut self, limit: u8) -> Result<Expression, ParseError> {
        let position = self.current_position();

        let mut left = match unary_operator(&self.current().kind) {
            Some(operator) => {
                self.advance();
                let argument = self.parse_subexpression(UNARY_PRIORITY)?;
                Expression::new(
                    ExpressionKind::Unary {
                        operator,
                        argument: Box::new(argument),
                    },
                    position,
                )
            }
            None => self.parse_simple_expression()?,
        };

        while let Some((operator, left_priority, right_priority)) =
            binary_operator(&self.current().kind)
        {
            if left_priority <= limit {
                break;
            }
            self.advance();
            let right = Box::new(self.parse_subexpression(right_priority)?);
            let left_operand = Box::new(left);
            let kind = match operator {
                Operator::Binary(operator) => ExpressionKind::Binary {
                    operator,
                    left: left_operand,
                    right,
                },
                Operator::Logical(operator) => ExpressionKind::Logical {
                    operator,
                    left: left_operand,
                    right,
                },
            };
            left = Expression::new(kind, position);
        }

        Ok(left)
    }

    fn parse_simple_expression(&mut self) -> Result<Expression, ParseError> {
        let position = self.current_position();
        let literal = |kind: LiteralKind, raw: &str| {
            Expression::new(
                ExpressionKind::Literal(Literal {
                    kind,
                    raw: raw.to_string(),
                }),
                position,
            )
        };

        let expression = match &self.current().kind {
            TokenKind::Number(raw) => literal(LiteralKind::Number, raw),
            TokenKind::LuaString(raw) => literal(LiteralKind::String, raw),
            TokenKind::Nil => literal(LiteralKind::Nil, "nil"),
            TokenKind::True => literal(LiteralKind::Boolean, "true"),
            TokenKind::False => literal(LiteralKind::Boolean, "false"),
            TokenKind::DotDotDot => literal(LiteralKind::Vararg, "..."),
            TokenKind::LBrace => return self.parse_table_constructor(),
            TokenKind::Function => {
                self.advance();
                let (parameters, body) = self.parse_function_body(false)?;
                return Ok(Expression::new(
                    ExpressionKind::Function(Box::new(FunctionDeclaration {
                        name: None,
                        is_local: false,
                        parameters,
                        body,
                    })),
                    position,
                ));
            }
            _ => return self.parse_suffixed_expression(),
        };

        self.advance();
        Ok(expression)
    }

    /// `primaryexp ::= Name | '(' expr ')'`
    fn parse_primary_expression(&mut self) -> Result<Expression, ParseError> {
        let position = self.current_position();
        match &self.current().kind {
            TokenKind::Name(name) => {
                let name = name.clone();
                self.advance();
                let identifier = self.reference(name, position);
                Ok(Expression::new(ExpressionKind::Identifier(identifier), position))
            }
            TokenKind::LParen => {
                self.advance();
                let mut inner = self.parse_expression()?;
                self.consume(TokenKind::RParen, "')'")?;
                inner.parenthesized = true;
                Ok(inner)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `suffixedexp ::= primaryexp { '.' Name | '[' exp ']' | ':' Name args | args }`
    pub(super) fn parse_suffixed_expression(&mut self) -> Result<Expression, ParseError> {
        let mut expression = self.parse_primary_expression()?;
        let position = expression.position;

        loop {
            let kind = match &self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    let identifier = self.consume_name()?;
                    ExpressionKind::Member {
                        base: Box::new(expression),
                        indexer: Indexer::Dot,
                        identifier,
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.consume(TokenKind::RBracket, "']'")?;
                    ExpressionKind::Index {
                        base: Box::new(expression),
                        index: Box::new(index),
                    }
                }
                TokenKind::Colon => {
                    self.advance();
                    let identifier = self.consume_name()?;
                    let method = Expression::new(
                        ExpressionKind::Member {
                            base: Box::new(expression),
                            indexer: Indexer::Colon,
                            identifier,
                        },
                        position,
                    );
                    self.parse_call_arguments(method)?
                }
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LuaString(_) => {
                    self.parse_call_arguments(expression)?
                }
                _ => return Ok(expression),
            };
            expression = Expression::new(kind, position);
        }
    }

    /// `args ::= '(' [explist] ')' | tableconstructor | LiteralString`
    fn parse_call_arguments(&mut self, base: Expression) -> Result<ExpressionKind, ParseError> {
        let base = Box::new(base);
        match &self.current().kind {
            TokenKind::LParen => {
                self.advance();
                let arguments = if self.check(&TokenKind::RParen) {
                    Vec::new()
                } else {
                    self.parse_expression_list()?
                };
                self.consume(TokenKind::RParen, "')'")?;
                Ok(ExpressionKind::Call { base, arguments })
            }
            TokenKind::LBrace => {
                let table = Box::new(self.parse_table_constructor()?);
                Ok(ExpressionKind::TableCall { base, table })
            }
            TokenKind::LuaString(raw) => {
                let argument = Box::new(Expression::new(
                    ExpressionKind::Literal(Literal {
                        kind: LiteralKind::String,
                        raw: raw.clone(),
                    }),
                    self.current_position(),
                ));
                self.advance();
                Ok(ExpressionKind::StringCall { base, argument })
            }
            _ => Err(self.unexpected("function arguments")),
        }
    }

    /// `tableconstructor ::= '{' [field {sep field} [sep]] '}'`
    fn parse_table_constructor(&mut self) -> Result<Expression, ParseError> {
        let position = self.current_position();
        self.consume(TokenKind::LBrace, "'{'")?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let field = match &self.current().kind {
                TokenKind::LBracket => {
                    self.advance();
                    let key = self.parse_expression()?;
                    self.consume(TokenKind::RBracket, "']'")?;
                    self.consume(TokenKind::Assign, "'='")?;
                    let value = self.parse_expression()?;
                    TableField::Keyed { key, value }
                }
                TokenKind::Name(_)
                    if matches!(self.peek(1).map(|t| &t.kind), Some(TokenKind::Assign)) =>
                {
                    let name = self.consume_name()?;
                    self.advance();
                    let value = self.parse_expression()?;
                    TableField::Named { name, value }
                }
                _ => TableField::Positional(self.parse_expression()?),
            };
            fields.push(field);

            if !self.match_token(&[TokenKind::Comma, TokenKind::Semicolon]) {
                break;
            }
        }

        self.consume(TokenKind::RBrace, "'}'")?;
        Ok(Expression::new(ExpressionKind::Table(fields), position))
    }

    /// `funcbody ::= '(' [parlist] ')' block end`, starting at the `(`.
    ///
    /// Methods get an implicit `self` parameter in scope.
    pub(super) fn parse_function_body(
        &mut self,
        is_method: bool,
    ) -> Result<(Vec<Parameter>, Block), ParseError> {
        self.consume(TokenKind::LParen, "'('")?;
        self.push_scope();
        let result = self.parse_parameters_and_body(is_method);
        self.pop_scope();
        result
    }

    fn parse_parameters_and_body(
        &mut self,
        is_method: bool,
    ) -> Result<(Vec<Parameter>, Block), ParseError> {
        if is_method {
            self.declare("self");
        }

        let mut parameters = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let position = self.current_position();
                if self.match_token(&[TokenKind::DotDotDot]) {
                    parameters.push(Parameter::Vararg(position));
                    break;
                }
                let name = self.consume_name()?;
                self.declare(&name.value);
                parameters.push(Parameter::Name(self.binding(name.value, name.position)));
                if !self.match_token(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "')'")?;

        let body = self.parse_block()?;
        self.consume(TokenKind::End, "'end'")?;
        Ok((parameters, body))
    }
}
