use super::{ExpressionParser, ParseError, Parser};
use crate::ast::*;
use crate::lexer::TokenKind;

pub trait StatementParser {
    fn parse_statement(&mut self) -> Result<Statement, ParseError>;
    fn parse_block(&mut self) -> Result<Block, ParseError>;
}

impl StatementParser for Parser {
    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let position = self.current_position();
        let kind = match &self.current().kind {
            TokenKind::If => self.parse_if_statement()?,
            TokenKind::While => self.parse_while_statement()?,
            TokenKind::Do => {
                self.advance();
                let body = self.parse_scoped_block()?;
                self.consume(TokenKind::End, "'end'")?;
                StatementKind::Do(body)
            }
            TokenKind::For => self.parse_for_statement()?,
            TokenKind::Repeat => self.parse_repeat_statement()?,
            TokenKind::Function => self.parse_function_statement()?,
            TokenKind::Local => {
                if matches!(self.peek(1).map(|t| &t.kind), Some(TokenKind::Function)) {
                    self.parse_local_function()?
                } else {
                    self.parse_local_declaration()?
                }
            }
            TokenKind::ColonColon => {
                self.advance();
                let label = self.consume_name()?;
                self.consume(TokenKind::ColonColon, "'::'")?;
                StatementKind::Label(label)
            }
            TokenKind::Goto => {
                self.advance();
                StatementKind::Goto(self.consume_name()?)
            }
            TokenKind::Break => {
                self.advance();
                StatementKind::Break
            }
            _ => self.parse_expression_statement()?,
        };

        Ok(Statement { kind, position })
    }

    /// `block ::= {stat} [retstat]`
    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let mut statements = Vec::new();

        loop {
            while self.match_token(&[TokenKind::Semicolon]) {}

            if self.check(&TokenKind::Return) {
                statements.push(self.parse_return_statement()?);
                break;
            }

            if self.is_block_end() {
                break;
            }

            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }
}

// Statement implementations
impl Parser {
    fn is_block_end(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Eof | TokenKind::End | TokenKind::Else | TokenKind::Elseif | TokenKind::Until
        )
    }

    /// A block with its own lexical scope.
    fn parse_scoped_block(&mut self) -> Result<Block, ParseError> {
        self.push_scope();
        let block = self.parse_block();
        self.pop_scope();
        block
    }

    fn parse_return_statement(&mut self) -> Result<Statement, ParseError> {
        let position = self.current_position();
        self.consume(TokenKind::Return, "'return'")?;

        let values = if self.is_block_end() || self.check(&TokenKind::Semicolon) {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };
        self.match_token(&[TokenKind::Semicolon]);

        if !self.is_block_end() {
            return Err(self.unexpected("'end'"));
        }

        Ok(Statement {
            kind: StatementKind::Return(values),
            position,
        })
    }

    fn parse_if_statement(&mut self) -> Result<StatementKind, ParseError> {
        let mut clauses = Vec::new();

        let position = self.current_position();
        self.consume(TokenKind::If, "'if'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::Then, "'then'")?;
        let body = self.parse_scoped_block()?;
        clauses.push(IfClause {
            kind: ClauseKind::If,
            condition: Some(condition),
            body,
            position,
        });

        while self.check(&TokenKind::Elseif) {
            let position = self.current_position();
            self.advance();
            let condition = self.parse_expression()?;
            self.consume(TokenKind::Then, "'then'")?;
            let body = self.parse_scoped_block()?;
            clauses.push(IfClause {
                kind: ClauseKind::ElseIf,
                condition: Some(condition),
                body,
                position,
            });
        }

        if self.check(&TokenKind::Else) {
            let position = self.current_position();
            self.advance();
            let body = self.parse_scoped_block()?;
            clauses.push(IfClause {
                kind: ClauseKind::Else,
                condition: None,
                body,
                position,
            });
        }

        self.consume(TokenKind::End, "'end'")?;
        Ok(StatementKind::If(clauses))
    }

    fn parse_while_statement(&mut self) -> Result<StatementKind, ParseError> {
        self.consume(TokenKind::While, "'while'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::Do, "'do'")?;
        let body = self.parse_scoped_block()?;
        self.consume(TokenKind::End, "'end'")?;
        Ok(StatementKind::While { condition, body })
    }

    fn parse_repeat_statement(&mut self) -> Result<StatementKind, ParseError> {
        self.consume(TokenKind::Repeat, "'repeat'")?;

        // The condition can see the body's locals.
        self.push_scope();
        let result = self.parse_block().and_then(|body| {
            self.consume(TokenKind::Until, "'until'")?;
            let condition = self.parse_expression()?;
            Ok(StatementKind::Repeat { body, condition })
        });
        self.pop_scope();
        result
    }

    fn parse_for_statement(&mut self) -> Result<StatementKind, ParseError> {
        self.consume(TokenKind::For, "'for'")?;
        let first = self.consume_name()?;

        if self.match_token(&[TokenKind::Assign]) {
            let start = self.parse_expression()?;
            self.consume(TokenKind::Comma, "','")?;
            let limit = self.parse_expression()?;
            let step = if self.match_token(&[TokenKind::Comma]) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            self.consume(TokenKind::Do, "'do'")?;

            self.push_scope();
            self.declare(&first.value);
            let body = self.parse_block();
            self.pop_scope();
            let body = body?;
            self.consume(TokenKind::End, "'end'")?;

            return Ok(StatementKind::ForNumeric {
                variable: self.binding(first.value, first.position),
                start,
                limit,
                step,
                body,
            });
        }

        let mut names = vec![first];
        while self.match_token(&[TokenKind::Comma]) {
            names.push(self.consume_name()?);
        }
        self.consume(TokenKind::In, "'in'")?;
        let iterators = self.parse_expression_list()?;
        self.consume(TokenKind::Do, "'do'")?;

        self.push_scope();
        for name in &names {
            self.declare(&name.value);
        }
        let body = self.parse_block();
        self.pop_scope();
        let body = body?;
        self.consume(TokenKind::End, "'end'")?;

        let variables = names
            .into_iter()
            .map(|name| self.binding(name.value, name.position))
            .collect();
        Ok(StatementKind::ForGeneric {
            variables,
            iterators,
            body,
        })
    }

    /// `function a.b.c:d(params) body end`
    fn parse_function_statement(&mut self) -> Result<StatementKind, ParseError> {
        self.consume(TokenKind::Function, "'function'")?;

        let first = self.consume_name()?;
        let identifier = self.reference(first.value, first.position);
        let mut name = Expression::new(ExpressionKind::Identifier(identifier), first.position);

        while self.match_token(&[TokenKind::Dot]) {
            let field = self.consume_name()?;
            name = member(name, Indexer::Dot, field);
        }

        let is_method = self.match_token(&[TokenKind::Colon]);
        if is_method {
            let field = self.consume_name()?;
            name = member(name, Indexer::Colon, field);
        }

        let (parameters, body) = self.parse_function_body(is_method)?;
        Ok(StatementKind::Function(FunctionDeclaration {
            name: Some(Box::new(name)),
            is_local: false,
            parameters,
            body,
        }))
    }

    /// `local function name(params) body end`
    fn parse_local_function(&mut self) -> Result<StatementKind, ParseError> {
        self.consume(TokenKind::Local, "'local'")?;
        self.consume(TokenKind::Function, "'function'")?;
        let name = self.consume_name()?;

        // Visible inside its own body so it can recurse.
        self.declare(&name.value);
        let identifier = self.binding(name.value, name.position);

        let (parameters, body) = self.parse_function_body(false)?;
        Ok(StatementKind::Function(FunctionDeclaration {
            name: Some(Box::new(Expression::new(
                ExpressionKind::Identifier(identifier),
                name.position,
            ))),
            is_local: true,
            parameters,
            body,
        }))
    }

    fn parse_local_declaration(&mut self) -> Result<StatementKind, ParseError> {
        self.consume(TokenKind::Local, "'local'")?;

        let mut names = vec![self.consume_name()?];
        while self.match_token(&[TokenKind::Comma]) {
            names.push(self.consume_name()?);
        }

        let values = if self.match_token(&[TokenKind::Assign]) {
            self.parse_expression_list()?
        } else {
            Vec::new()
        };

        // Initializers still see the outer bindings.
        for name in &names {
            self.declare(&name.value);
        }

        let names = names
            .into_iter()
            .map(|name| self.binding(name.value, name.position))
            .collect();
        Ok(StatementKind::Local { names, values })
    }

    fn parse_expression_statement(&mut self) -> Result<StatementKind, ParseError> {
        let position = self.current_position();
        let first = self.parse_suffixed_expression()?;

        if self.check(&TokenKind::Assign) || self.check(&TokenKind::Comma) {
            let mut targets = vec![first];
            while self.match_token(&[TokenKind::Comma]) {
                targets.push(self.parse_suffixed_expression()?);
            }
            self.consume(TokenKind::Assign, "'='")?;
            let values = self.parse_expression_list()?;

            if let Some(target) = targets.iter().find(|t| !is_assignable(t)) {
                return Err(ParseError::new("syntax error: cannot assign", target.position));
            }
            return Ok(StatementKind::Assignment { targets, values });
        }

        let is_call = !first.parenthesized
            && matches!(
                first.kind,
                ExpressionKind::Call { .. }
                    | ExpressionKind::TableCall { .. }
                    | ExpressionKind::StringCall { .. }
            );
        if !is_call {
            return Err(ParseError::new("syntax error: expected statement", position));
        }
        Ok(StatementKind::Call(first))
    }
}

fn member(base: Expression, indexer: Indexer, identifier: Name) -> Expression {
    let position = base.position;
    Expression::new(
        ExpressionKind::Member {
            base: Box::new(base),
            indexer,
            identifier,
        },
        position,
    )
}

fn is_assignable(expression: &Expression) -> bool {
    !expression.parenthesized
        && matches!(
            expression.kind,
            ExpressionKind::Identifier(_)
                | ExpressionKind::Index { .. }
                | ExpressionKind::Member {
                    indexer: Indexer::Dot,
                    ..
                }
        )
}
