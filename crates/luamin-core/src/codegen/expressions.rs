use super::fragment::Fragment;
use super::operators::{Operator, Side};
use super::Printer;
use luamin_parser::ast::*;
use luamin_parser::SourcePosition;

/// What the enclosing operator requires of an operand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context {
    /// Zero at the top of an expression.
    pub precedence: u8,
    pub side: Option<Side>,
    pub parent: Option<Operator>,
}

impl Context {
    fn operand(parent: Operator, side: Side) -> Self {
        Context {
            precedence: parent.precedence(),
            side: Some(side),
            parent: Some(parent),
        }
    }
}

/// Whether a binary or logical expression must be parenthesized in `context`.
///
/// `+` parents and `*` parents over `*`/`/` children never force parentheses
/// at equal precedence, so `a+(b+c)` prints as `a+b+c`.
pub fn needs_parentheses(operator: Operator, context: Context) -> bool {
    let precedence = operator.precedence();
    if precedence < context.precedence {
        return true;
    }
    if precedence == context.precedence
        && Some(operator.associativity().side()) != context.side
        && context.parent != Some(Operator::Binary(BinaryOperator::Add))
        && !(context.parent == Some(Operator::Binary(BinaryOperator::Multiply))
            && matches!(
                operator,
                Operator::Binary(BinaryOperator::Divide | BinaryOperator::Multiply)
            ))
    {
        return true;
    }
    // Bitwise operators share a level in the table but not in the grammar.
    matches!(context.parent, Some(parent) if parent.is_bitwise() && operator.is_bitwise() && parent != operator)
}

/// Whether a unary expression must be parenthesized in `context`.
pub fn needs_unary_parentheses(operator: UnaryOperator, context: Context) -> bool {
    let precedence = Operator::Unary(operator).precedence();
    // The grammar always reads a unary operator on the right of `^`.
    let power_exponent = context.parent == Some(Operator::Binary(BinaryOperator::Power))
        && context.side == Some(Side::Right);
    precedence < context.precedence && !power_exponent
}

/// Kinds that are wrapped when they appear as the receiver of a call, index
/// or member.
fn needs_base_parentheses(expression: &Expression) -> bool {
    // Already wrapped as a truncated multi-value expression.
    if expression.parenthesized && is_multi_value(expression) {
        return false;
    }
    match &expression.kind {
        ExpressionKind::Binary { .. }
        | ExpressionKind::Logical { .. }
        | ExpressionKind::Unary { .. }
        | ExpressionKind::Call { .. }
        | ExpressionKind::TableCall { .. }
        | ExpressionKind::StringCall { .. }
        | ExpressionKind::Function(_)
        | ExpressionKind::Table(_) => true,
        ExpressionKind::Literal(literal) => literal.kind != LiteralKind::Vararg,
        _ => false,
    }
}

/// Parentheses around these change the number of values produced.
fn is_multi_value(expression: &Expression) -> bool {
    match &expression.kind {
        ExpressionKind::Call { .. }
        | ExpressionKind::TableCall { .. }
        | ExpressionKind::StringCall { .. } => true,
        ExpressionKind::Literal(literal) => literal.kind == LiteralKind::Vararg,
        _ => false,
    }
}

/// Whether the last token of `expression` is a numeral.
fn ends_with_numeral(expression: &Expression) -> bool {
    match &expression.kind {
        ExpressionKind::Literal(literal) => literal.kind == LiteralKind::Number,
        ExpressionKind::Binary { right, .. } | ExpressionKind::Logical { right, .. } => {
            ends_with_numeral(right)
        }
        ExpressionKind::Unary { argument, .. } => ends_with_numeral(argument),
        _ => false,
    }
}

impl Printer<'_> {
    pub fn print_expression(&mut self, expression: &Expression, context: Context) -> Fragment {
        let position = expression.position;
        let printed = match &expression.kind {
            ExpressionKind::Identifier(identifier) => self.print_identifier(identifier),
            ExpressionKind::Literal(literal) => {
                let mut fragment = self.node(position);
                fragment.append(literal.raw.as_str());
                fragment
            }
            ExpressionKind::Binary {
                operator,
                left,
                right,
            } => self.print_binary(Operator::Binary(*operator), left, right, position, context),
            ExpressionKind::Logical {
                operator,
                left,
                right,
            } => self.print_binary(Operator::Logical(*operator), left, right, position, context),
            ExpressionKind::Unary { operator, argument } => {
                let unary = Operator::Unary(*operator);
                let argument = self.print_expression(
                    argument,
                    Context {
                        precedence: unary.precedence(),
                        side: None,
                        parent: Some(unary),
                    },
                );
                let mut fragment = self.node(position);
                fragment.append(operator.as_str()).join(argument);
                if needs_unary_parentheses(*operator, context) {
                    self.parenthesize(fragment, position)
                } else {
                    fragment
                }
            }
            ExpressionKind::Call { base, arguments } => {
                let mut fragment = self.node(position);
                let base = self.print_base(base);
                let arguments = self.print_expression_list(arguments);
                fragment.append(base).join("(").join(arguments).append(")");
                fragment
            }
            ExpressionKind::TableCall { base, table } => {
                let mut fragment = self.node(position);
                let base = self.print_base(base);
                let table = self.print_expression(table, Context::default());
                fragment.append(base).join(table);
                fragment
            }
            ExpressionKind::StringCall { base, argument } => {
                let mut fragment = self.node(position);
                let base = self.print_base(base);
                let argument = self.print_expression(argument, Context::default());
                fragment.append(base).join(argument);
                fragment
            }
            ExpressionKind::Index { base, index } => {
                let mut fragment = self.node(position);
                let base = self.print_base(base);
                let index = self.print_expression(index, Context::default());
                fragment.append(base).join("[").join(index).append("]");
                fragment
            }
            ExpressionKind::Member {
                base,
                indexer,
                identifier,
            } => {
                let mut fragment = self.node(position);
                let base = self.print_base(base);
                fragment.append(base);
                fragment.join(format!("{}{}", indexer.as_str(), identifier.value));
                fragment
            }
            ExpressionKind::Function(declaration) => {
                let mut fragment = self.node(position);
                let body = self.print_function_body(declaration);
                fragment.append("function").join(body);
                fragment
            }
            ExpressionKind::Table(fields) => self.print_table(fields, position),
        };

        if expression.parenthesized && is_multi_value(expression) {
            self.parenthesize(printed, position)
        } else {
            printed
        }
    }

    pub fn print_expression_list(&mut self, expressions: &[Expression]) -> Fragment {
        self.print_list(expressions, |printer, expression| {
            printer.print_expression(expression, Context::default())
        })
    }

    fn print_binary(
        &mut self,
        operator: Operator,
        left: &Expression,
        right: &Expression,
        position: SourcePosition,
        context: Context,
    ) -> Fragment {
        let concat_after_numeral = matches!(operator, Operator::Binary(BinaryOperator::Concat))
            && ends_with_numeral(left);
        let left = self.print_expression(left, Context::operand(operator, Side::Left));
        let spaced = concat_after_numeral && left.last_char() != Some(')');
        let right = self.print_expression(right, Context::operand(operator, Side::Right));

        let mut fragment = self.node(position);
        fragment.append(left);
        if spaced {
            // `0x1F..x` would lex as one malformed numeral.
            fragment.append(" ");
        }
        fragment.join(operator.symbol()).join(right);

        if needs_parentheses(operator, context) {
            self.parenthesize(fragment, position)
        } else {
            fragment
        }
    }

    fn print_base(&mut self, base: &Expression) -> Fragment {
        let printed = self.print_expression(base, Context::default());
        if needs_base_parentheses(base) {
            self.parenthesize(printed, base.position)
        } else {
            printed
        }
    }

    fn print_table(&mut self, fields: &[TableField], position: SourcePosition) -> Fragment {
        let mut fragment = self.node(position);
        fragment.append("{");

        let mut last_field = None;
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                fragment.append(",");
            }
            let printed = match field {
                TableField::Keyed { key, value } => {
                    let mut entry = self.node(key.position);
                    let key = self.print_expression(key, Context::default());
                    let value = self.print_expression(value, Context::default());
                    entry.append("[").join(key).append("]=").join(value);
                    entry
                }
                TableField::Named { name, value } => {
                    let mut entry = self.node(name.position);
                    let value = self.print_expression(value, Context::default());
                    entry.append(format!("{}=", name.value)).join(value);
                    entry
                }
                TableField::Positional(value) => self.print_expression(value, Context::default()),
            };
            last_field = Some(printed.to_string());
            fragment.join(printed);
        }

        // Kept for runtimes that misparse a nested `}` right before the closing brace.
        if last_field.is_some_and(|text| text.contains('}')) {
            fragment.append(",");
        }
        fragment.append("}");
        fragment
    }

    fn parenthesize(&self, inner: Fragment, position: SourcePosition) -> Fragment {
        let mut fragment = self.node(position);
        fragment.append("(").append(inner).append(")");
        fragment
    }
}
