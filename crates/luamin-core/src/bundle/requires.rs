//! Static `require` discovery.

use indexmap::IndexSet;
use luamin_parser::ast::*;

/// Module names passed as a literal to the global `require`, in order of
/// first appearance.
pub fn collect_requires(chunk: &Chunk) -> Vec<String> {
    let mut collector = RequireCollector::default();
    collector.visit_block(&chunk.body);
    collector.names.into_iter().collect()
}

/// Value of a string literal, or `None` when it uses escapes that a module
/// name would not contain.
pub fn string_value(raw: &str) -> Option<String> {
    let quote = raw.chars().next()?;
    if quote == '"' || quote == '\'' {
        let inner = raw.get(1..raw.len().checked_sub(1)?)?;
        let mut value = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                value.push(c);
                continue;
            }
            match chars.next()? {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                c @ ('\\' | '"' | '\'') => value.push(c),
                _ => return None,
            }
        }
        return Some(value);
    }

    // Long bracket: `[==[ … ]==]`
    let level = raw.get(1..)?.chars().take_while(|&c| c == '=').count();
    let open = level + 2;
    let body = raw.get(open..raw.len().checked_sub(open)?)?;
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);
    Some(body.to_string())
}

#[derive(Default)]
struct RequireCollector {
    names: IndexSet<String>,
}

impl RequireCollector {
    fn visit_block(&mut self, block: &Block) {
        for statement in block {
            self.visit_statement(statement);
        }
    }

    fn visit_statement(&mut self, statement: &Statement) {
        match &statement.kind {
            StatementKind::Assignment { targets, values } => {
                self.visit_expressions(targets);
                self.visit_expressions(values);
            }
            StatementKind::Local { values, .. } => self.visit_expressions(values),
            StatementKind::Call(expression) => self.visit_expression(expression),
            StatementKind::If(clauses) => {
                for clause in clauses {
                    if let Some(condition) = &clause.condition {
                        self.visit_expression(condition);
                    }
                    self.visit_block(&clause.body);
                }
            }
            StatementKind::While { condition, body } => {
                self.visit_expression(condition);
                self.visit_block(body);
            }
            StatementKind::Do(body) => self.visit_block(body),
            StatementKind::Return(values) => self.visit_expressions(values),
            StatementKind::Repeat { body, condition } => {
                self.visit_block(body);
                self.visit_expression(condition);
            }
            StatementKind::Function(declaration) => self.visit_block(&declaration.body),
            StatementKind::ForNumeric {
                start,
                limit,
                step,
                body,
                ..
            } => {
                self.visit_expression(start);
                self.visit_expression(limit);
                if let Some(step) = step {
                    self.visit_expression(step);
                }
                self.visit_block(body);
            }
            StatementKind::ForGeneric {
                iterators, body, ..
            } => {
                self.visit_expressions(iterators);
                self.visit_block(body);
            }
            StatementKind::Break | StatementKind::Label(_) | StatementKind::Goto(_) => {}
        }
    }

    fn visit_expressions(&mut self, expressions: &[Expression]) {
        for expression in expressions {
            self.visit_expression(expression);
        }
    }

    fn visit_expression(&mut self, expression: &Expression) {
        match &expression.kind {
            ExpressionKind::Identifier(_) | ExpressionKind::Literal(_) => {}
            ExpressionKind::Binary { left, right, .. }
            | ExpressionKind::Logical { left, right, .. } => {
                self.visit_expression(left);
                self.visit_expression(right);
            }
            ExpressionKind::Unary { argument, .. } => self.visit_expression(argument),
            ExpressionKind::Call { base, arguments } => {
                if let [argument] = arguments.as_slice() {
                    self.record(base, argument);
                }
                self.visit_expression(base);
                self.visit_expressions(arguments);
            }
            ExpressionKind::StringCall { base, argument } => {
                self.record(base, argument);
                self.visit_expression(base);
            }
            ExpressionKind::TableCall { base, table } => {
                self.visit_expression(base);
                self.visit_expression(table);
            }
            ExpressionKind::Index { base, index } => {
                self.visit_expression(base);
                self.visit_expression(index);
            }
            ExpressionKind::Member { base, .. } => self.visit_expression(base),
            ExpressionKind::Function(declaration) => self.visit_block(&declaration.body),
            ExpressionKind::Table(fields) => {
                for field in fields {
                    match field {
                        TableField::Keyed { key, value } => {
                            self.visit_expression(key);
                            self.visit_expression(value);
                        }
                        TableField::Named { value, .. } | TableField::Positional(value) => {
                            self.visit_expression(value);
                        }
                    }
                }
            }
        }
    }

    fn record(&mut self, base: &Expression, argument: &Expression) {
        let ExpressionKind::Identifier(identifier) = &base.kind else {
            return;
        };
        if identifier.is_local || identifier.name != "require" {
            return;
        }
        if let ExpressionKind::Literal(Literal {
            kind: LiteralKind::String,
            raw,
        }) = &argument.kind
        {
            if let Some(name) = string_value(raw) {
                self.names.insert(name);
            }
        }
    }
}
